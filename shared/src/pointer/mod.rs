pub mod error;
pub mod pointer_registry;
