use thiserror::Error;

/// Errors reported by a packet transport
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The transport refused an outgoing packet
    #[error("Failed to send packet: {reason}")]
    SendFailed { reason: String },

    /// The transport failed while polling for incoming packets
    #[error("Failed to receive packet: {reason}")]
    ReceiveFailed { reason: String },

    /// The other end of the transport is gone
    #[error("Transport is disconnected")]
    Disconnected,
}
