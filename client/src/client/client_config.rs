use std::{default::Default, time::Duration};

/// Whether application code may dispatch directly to a mirror
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum MirrorDispatchPolicy {
    /// Mirrors only change through server payloads
    #[default]
    Reject,
    /// Dispatch changes the local mirror and notifies its observers. Nothing
    /// is sent to the server. The next server payload is applied to the last
    /// server state, so every local edit is discarded then.
    AllowLocal,
}

/// Contains Config properties which will be used by the Client
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// How long to wait for the answer to a bulk instance request before
    /// sending it again
    pub instance_request_timeout: Duration,
    /// How many times a bulk instance request is sent before giving up.
    /// `None` keeps retrying forever.
    pub max_instance_request_attempts: Option<u32>,
    /// Whether direct dispatch on mirrors is allowed
    pub mirror_dispatch: MirrorDispatchPolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            instance_request_timeout: Duration::from_secs(5),
            max_instance_request_attempts: None,
            mirror_dispatch: MirrorDispatchPolicy::default(),
        }
    }
}
