//! # Replikit Server
//! The authoritative side of replikit. Owns shared instances, answers bulk
//! instance requests from connecting clients, hydrates their mirrors and
//! streams per-user filtered state patches.

#![deny(
    trivial_casts,
    trivial_numeric_casts,
    unstable_features,
    unused_import_braces
)]

pub mod transport;
pub mod shared {
    pub use replikit_shared::{
        ClassDescriptor, ClassId, ClientMessage, HostType, InstanceDescriptor, InstanceId,
        Pointer, Protocol, ServerMessage, SharedBehavior, Side, StateValue, Subscription,
        SyncPayload, UserKey,
    };
}

mod directory;
mod error;
mod io;
mod server;
mod user;
mod world;

pub use directory::{
    instance_directory::InstanceDirectory,
    replication_state::{ReplicationEntry, ReplicationState},
};
pub use error::ServerError;
pub use server::{Server, ServerConfig};
pub use user::{User, UserRef};
pub use world::{entity_mut::EntityMut, entity_ref::EntityRef};
