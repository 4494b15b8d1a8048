use thiserror::Error;

/// Errors that can occur while turning messages into packets and back
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// Failed to serialize an outgoing message
    #[error("Failed to encode {message} message: {reason}")]
    EncodeFailed {
        message: &'static str,
        reason: String,
    },

    /// Failed to deserialize an incoming packet
    #[error("Failed to decode {message} message from packet of {packet_size} bytes: {reason}")]
    DecodeFailed {
        message: &'static str,
        packet_size: usize,
        reason: String,
    },
}
