use std::default::Default;

/// Contains Config properties which will be used by the Server
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Determines whether a user is sent `CreatedNewInstance` when an instance
    /// starts, or becomes visible to it, after the user connected. When
    /// disabled, users only learn about such instances from their next bulk
    /// instance request.
    pub announce_new_instances: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            announce_new_instances: true,
        }
    }
}
