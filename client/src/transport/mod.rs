//! The contract between the client and whatever moves its bytes to and from
//! the server

use replikit_shared::TransportError;

/// Used to send packets from the Client to the Server
pub trait PacketSender: Send + Sync {
    /// Sends a packet to the Server
    fn send(&self, payload: &[u8]) -> Result<(), TransportError>;
}

/// Used to receive packets from the Server
pub trait PacketReceiver: Send + Sync {
    /// Receives the next packet from the Server, if one is waiting
    fn receive(&mut self) -> Result<Option<&[u8]>, TransportError>;
}
