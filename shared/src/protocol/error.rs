use thiserror::Error;

/// Configuration errors raised while declaring shared classes, plus the
/// resolution failures reported when a class cannot be looked up
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    /// Protocol is locked and cannot be modified
    #[error("Protocol is already locked and cannot be modified. Protocol.lock() has been called and no further changes are allowed")]
    AlreadyLocked,

    /// The same class identifier was registered twice
    #[error("Shared class {identifier} is already registered")]
    DuplicateClass { identifier: String },

    /// A class names a parent that has not been registered yet
    #[error("Shared class {identifier} extends {parent}, which is not registered")]
    UnknownParent { identifier: String, parent: String },

    /// Two default-resolvable concrete classes share one root
    #[error("Shared classes {existing} and {conflicting} both implement shared root {root}; mark one as disambiguated")]
    ConflictingImplementations {
        root: String,
        existing: String,
        conflicting: String,
    },

    /// No class with this identifier has been registered
    #[error("Shared class {identifier} is not registered")]
    UnknownClass { identifier: String },

    /// Attempted to construct a class without a factory
    #[error("Shared class {identifier} is abstract and cannot be constructed")]
    AbstractClass { identifier: String },

    /// A shared root has no concrete implementation
    #[error("Shared root {root} has no concrete implementation")]
    NoImplementation { root: String },

    /// A shared root has several implementations and none is the default
    #[error("Shared root {root} is ambiguous between [{candidates}]")]
    AmbiguousImplementation { root: String, candidates: String },
}
