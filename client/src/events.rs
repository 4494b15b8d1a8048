use replikit_shared::{ClassId, InstanceId};

/// Something that happened to the client's mirrors while handling server
/// messages. Drained with [`Client::take_events`](crate::Client::take_events).
#[derive(Clone, Debug, PartialEq)]
pub enum ClientEvent {
    /// A bulk instance request was answered
    InstanceListReceived { request_id: u32, count: usize },
    /// A mirror was constructed and started
    InstanceCreated { id: InstanceId, class: ClassId },
    /// A mirror received its full state
    InstanceHydrated { id: InstanceId },
    /// A mirror was torn down
    InstanceDestroyed { id: InstanceId },
}
