use std::collections::VecDeque;

use replikit_shared::{ServerMessage, UserKey};

use crate::Server;

/// A connected peer and the messages waiting to be sent to it
pub struct User {
    key: UserKey,
    outgoing_messages: VecDeque<ServerMessage>,
}

impl User {
    pub(crate) fn new(key: UserKey) -> Self {
        Self {
            key,
            outgoing_messages: VecDeque::new(),
        }
    }

    pub fn key(&self) -> UserKey {
        self.key
    }

    pub(crate) fn queue_message(&mut self, message: ServerMessage) {
        self.outgoing_messages.push_back(message);
    }

    pub(crate) fn take_outgoing_messages(&mut self) -> Vec<ServerMessage> {
        self.outgoing_messages.drain(..).collect()
    }

    pub fn pending_message_count(&self) -> usize {
        self.outgoing_messages.len()
    }
}

// UserRef
pub struct UserRef<'s> {
    server: &'s Server,
    user: &'s User,
}

impl<'s> UserRef<'s> {
    pub(crate) fn new(server: &'s Server, user: &'s User) -> Self {
        Self { server, user }
    }

    pub fn key(&self) -> UserKey {
        self.user.key()
    }

    pub fn pending_message_count(&self) -> usize {
        self.user.pending_message_count()
    }

    /// Number of live instances this user has been told about
    pub fn visible_instance_count(&self) -> usize {
        let key = self.user.key();
        self.server
            .directory()
            .ids()
            .filter(|id| self.server.directory().is_visible(id, &key))
            .count()
    }
}
