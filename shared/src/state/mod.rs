pub mod patch;
pub mod reconcile;
pub mod value;
