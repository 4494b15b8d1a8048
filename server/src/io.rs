use replikit_shared::UserKey;

use crate::{
    transport::{PacketReceiver, PacketSender},
    ServerError,
};

pub struct Io {
    packet_sender: Option<Box<dyn PacketSender>>,
    packet_receiver: Option<Box<dyn PacketReceiver>>,
}

impl Io {
    pub fn new() -> Self {
        Self {
            packet_sender: None,
            packet_receiver: None,
        }
    }

    pub fn load(
        &mut self,
        packet_sender: Box<dyn PacketSender>,
        packet_receiver: Box<dyn PacketReceiver>,
    ) {
        if self.is_loaded() {
            log::warn!("Server IO was already loaded, replacing transport");
        }

        self.packet_sender = Some(packet_sender);
        self.packet_receiver = Some(packet_receiver);
    }

    pub fn is_loaded(&self) -> bool {
        self.packet_sender.is_some()
    }

    pub fn send_packet(&self, user_key: &UserKey, payload: &[u8]) -> Result<(), ServerError> {
        let sender = self.packet_sender.as_ref().ok_or(ServerError::IoNotLoaded)?;
        sender.send(user_key, payload)?;
        Ok(())
    }

    pub fn recv_packet(&mut self) -> Result<Option<(UserKey, &[u8])>, ServerError> {
        let receiver = self
            .packet_receiver
            .as_mut()
            .ok_or(ServerError::IoNotLoaded)?;
        Ok(receiver.receive()?)
    }
}
