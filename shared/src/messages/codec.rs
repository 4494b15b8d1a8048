use std::any::type_name;

use serde::{de::DeserializeOwned, Serialize};

use crate::CodecError;

fn short_type_name<M>() -> &'static str {
    let name = type_name::<M>();
    name.rsplit("::").next().unwrap_or(name)
}

/// Serializes a message into a packet payload
pub fn encode<M: Serialize>(message: &M) -> Result<Vec<u8>, CodecError> {
    serde_json::to_vec(message).map_err(|error| CodecError::EncodeFailed {
        message: short_type_name::<M>(),
        reason: error.to_string(),
    })
}

/// Deserializes a packet payload into a message
pub fn decode<M: DeserializeOwned>(packet: &[u8]) -> Result<M, CodecError> {
    serde_json::from_slice(packet).map_err(|error| CodecError::DecodeFailed {
        message: short_type_name::<M>(),
        packet_size: packet.len(),
        reason: error.to_string(),
    })
}
