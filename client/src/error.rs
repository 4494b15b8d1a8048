use thiserror::Error;

use replikit_shared::{CodecError, EntityError, PointerError, ProtocolError, TransportError};

/// Errors returned by [`Client`](crate::Client) operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// No mirror with this id exists on the client
    #[error("Mirror {id} does not exist on this client")]
    InstanceNotFound { id: String },

    /// Direct dispatch on a mirror is disabled by `MirrorDispatchPolicy::Reject`
    #[error("Cannot dispatch to mirror {id}. Mirrors only change through server payloads unless `MirrorDispatchPolicy::AllowLocal` is configured")]
    MirrorDispatchRejected { id: String },

    /// The server never answered the bulk instance request
    #[error("Bulk instance request went unanswered after {attempts} attempts")]
    InstanceListTimedOut { attempts: u32 },

    /// Packets were sent or received before a transport was loaded
    #[error("Client IO is not loaded. Must call `io_load()` before sending or receiving packets")]
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
