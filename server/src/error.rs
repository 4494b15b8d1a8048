use thiserror::Error;

use replikit_shared::{CodecError, EntityError, PointerError, ProtocolError, TransportError};

/// Errors returned by [`Server`](crate::Server) operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServerError {
    /// No live shared instance with this id exists on the server
    #[error("Shared instance {id} does not exist on this server")]
    InstanceNotFound { id: String },

    /// The user is not connected
    #[error("User {user} is not connected to this server")]
    UserNotFound { user: String },

    /// Packets were sent or received before a transport was loaded
    #[error("Server IO is not loaded. Must call `io_load()` before sending or receiving packets")]
    IoNotLoaded,

    /// Class registration or resolution error
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Pointer registry error
    #[error("Pointer error: {0}")]
    Pointer(#[from] PointerError),

    /// Shared instance lifecycle error
    #[error("Entity error: {0}")]
    Entity(#[from] EntityError),

    /// Message encoding error
    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    /// Packet transport error
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),
}
