use thiserror::Error;

/// Errors raised by shared instance lifecycle operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EntityError {
    /// Attempted to mutate an instance after it was destroyed
    #[error("Cannot {operation} shared instance {id} - instance is destroyed")]
    Destroyed { id: String, operation: &'static str },

    /// Attempted to replace an id that was already confirmed by the server
    #[error("Shared instance {id} already carries a confirmed id")]
    AlreadyConfirmed { id: String },

    /// A confirmed id must originate on the server
    #[error("Cannot confirm shared instance {provisional} with non-server id {confirmed}")]
    InvalidConfirmation {
        provisional: String,
        confirmed: String,
    },
}
