//! # Replikit Shared
//! Common functionality shared between replikit-server & replikit-client crates.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

mod class;
mod entity;
mod messages;
mod observer;
mod pointer;
mod protocol;
mod state;
mod transport;
mod types;

pub use class::{
    captured_args::CapturedArgs,
    class_descriptor::{ClassDescriptor, ClassId, ClassSubscription},
    class_registry::{ClassRegistry, ConstructedClass},
    construction::Construction,
};
pub use entity::{
    behavior::SharedBehavior,
    error::EntityError,
    instance_descriptor::InstanceDescriptor,
    instance_id::{InstanceId, InstanceIdGenerator},
    shared_entity::{EntityLifecycle, SharedEntity},
};
pub use messages::{
    codec::{decode, encode},
    error::CodecError,
    message::{ClientMessage, ServerMessage},
};
pub use observer::{
    key_set_observer::{KeySetChanges, KeySetObserver},
    observers::Observers,
    subscription::Subscription,
};
pub use pointer::{
    error::PointerError,
    pointer_registry::{Pointer, PointerRegistry},
};
pub use protocol::{Protocol, ProtocolError};
pub use state::{
    patch::{apply_patch, diff, StatePatch, SyncPayload},
    reconcile::reconcile,
    value::{StateTable, StateValue},
};
pub use transport::error::TransportError;
pub use types::{HostType, Side, UserKey};
