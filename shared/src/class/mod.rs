pub mod captured_args;
pub mod class_descriptor;
pub mod class_registry;
pub mod construction;
