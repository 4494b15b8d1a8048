//! # Replikit Client
//! The mirrored side of replikit. Requests the live instance list from the
//! server, rebuilds every instance it may see through the local class
//! registry, and applies the snapshots and patches the server sends.

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
        SyncPayload,
    };
}

mod client;
mod error;
mod events;
mod io;
mod mirror;
mod request;

pub use client::{Client, ClientConfig, MirrorDispatchPolicy};
pub use error::ClientError;
pub use events::ClientEvent;
pub use mirror::Mirror;
