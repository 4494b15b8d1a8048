mod mirror;
pub use mirror::Mirror;

pub(crate) mod resolver;
