use thiserror::Error;

/// Errors raised by the pointer registry
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PointerError {
    /// A pointer with this name was already created
    #[error("Pointer with name {name} already exists")]
    AlreadyExists { name: String },

    /// No pointer with this name was created
    #[error("Pointer with name {name} does not exist")]
    NotFound { name: String },

    /// Attempted to bind a pointer that is bound to a different class
    #[error("Pointer {name} already bound to {bound}, cannot bind {requested}")]
    AlreadyBound {
        name: String,
        bound: String,
        requested: String,
    },

    /// Attempted to resolve a pointer with no binding
    #[error("Pointer {name} has no class bound")]
    Unbound { name: String },
}
