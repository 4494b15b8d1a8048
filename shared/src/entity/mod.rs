pub mod behavior;
pub mod error;
pub mod instance_descriptor;
pub mod instance_id;
pub mod shared_entity;
