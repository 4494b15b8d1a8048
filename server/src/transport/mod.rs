//! The contract between the server and whatever moves its bytes. A transport
//! must deliver packets in order per user; it does not need to know anything
//! about their contents.

use replikit_shared::{TransportError, UserKey};

/// Used to send packets from the Server to a connected user
pub trait PacketSender: Send + Sync {
    /// Sends a packet to the given user
    fn send(&self, user_key: &UserKey, payload: &[u8]) -> Result<(), TransportError>;
}

/// Used to receive packets from connected users
pub trait PacketReceiver: Send + Sync {
    /// Receives the next packet, if one is waiting
    fn receive(&mut self) -> Result<Option<(UserKey, &[u8])>, TransportError>;
}
