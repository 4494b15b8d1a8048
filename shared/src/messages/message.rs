use serde::{Deserialize, Serialize};

use crate::{InstanceDescriptor, InstanceId, SyncPayload};

/// Messages a client sends to the server
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ClientMessage {
    /// The mirror with this id has started and wants its initial state
    Start { id: InstanceId },
    /// Requests every instance the client is allowed to know about. The
    /// response echoes `request_id`.
    GetAllInstances { request_id: u32 },
}

/// Messages the server sends to a client
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ServerMessage {
    Dispatch {
        id: InstanceId,
        payload: SyncPayload,
    },
    AllInstances {
        request_id: u32,
        instances: Vec<InstanceDescriptor>,
    },
    CreatedNewInstance(InstanceDescriptor),
    DestroyInstance { id: InstanceId },
}

impl ClientMessage {
    pub fn name(&self) -> &'static str {
        match self {
            ClientMessage::Start { .. } => "Start",
            ClientMessage::GetAllInstances { .. } => "GetAllInstances",
        }
    }
}

impl ServerMessage {
    pub fn name(&self) -> &'static str {
        match self {
            ServerMessage::Dispatch { .. } => "Dispatch",
            ServerMessage::AllInstances { .. } => "AllInstances",
            ServerMessage::CreatedNewInstance(_) => "CreatedNewInstance",
            ServerMessage::DestroyInstance { .. } => "DestroyInstance",
        }
    }

    /// Instance this message concerns, if it concerns exactly one
    pub fn instance_id(&self) -> Option<InstanceId> {
        match self {
            ServerMessage::Dispatch { id, .. } | ServerMessage::DestroyInstance { id } => Some(*id),
            ServerMessage::CreatedNewInstance(descriptor) => Some(descriptor.id),
            ServerMessage::AllInstances { .. } => None,
        }
    }
}
