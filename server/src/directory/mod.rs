pub mod instance_directory;
pub mod replication_state;
