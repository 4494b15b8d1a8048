pub mod entity_mut;
pub mod entity_ref;
