pub mod key_set_observer;
pub mod observers;
pub mod subscription;
