use log::warn;

use crate::{
    transport::{PacketReceiver, PacketSender},
    ClientError,
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
            warn!("Client IO was already loaded, replacing transport");
        }

        self.packet_sender = Some(packet_sender);
        self.packet_receiver = Some(packet_receiver);
    }

    pub fn is_loaded(&self) -> bool {
        self.packet_sender.is_some()
    }

    pub fn send_packet(&self, payload: &[u8]) -> Result<(), ClientError> {
        let sender = self.packet_sender.as_ref().ok_or(ClientError::IoNotLoaded)?;
        sender.send(payload)?;
        Ok(())
    }

    pub fn recv_packet(&mut self) -> Result<Option<&[u8]>, ClientError> {
        let receiver = self
            .packet_receiver
            .as_mut()
            .ok_or(ClientError::IoNotLoaded)?;
        Ok(receiver.receive()?)
    }
}
