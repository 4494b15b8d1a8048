use std::{cell::RefCell, rc::Weak};

use crate::HostType;

use super::observers::ListenerList;

/// Handle returned by every subscribe call. Dropping it keeps the listener
/// connected; disconnecting is explicit and takes effect immediately.
#[derive(Clone)]
pub struct Subscription {
    key: u64,
    host_type: HostType,
    list: Weak<RefCell<ListenerList>>,
}

impl Subscription {
    pub(crate) fn new(key: u64, host_type: HostType, list: Weak<RefCell<ListenerList>>) -> Self {
        Self {
            key,
            host_type,
            list,
        }
    }

    pub fn disconnect(&self) {
        if let Some(list) = self.list.upgrade() {
            list.borrow_mut().remove(self.key);
        }
    }

    /// Disconnects only when running on the server. Returns whether it did.
    pub fn disconnect_on_server(&self) -> bool {
        if self.host_type != HostType::Server {
            return false;
        }
        self.disconnect();
        true
    }

    /// Disconnects only when running on a client. Returns whether it did.
    pub fn disconnect_on_client(&self) -> bool {
        if self.host_type != HostType::Client {
            return false;
        }
        self.disconnect();
        true
    }

    pub fn is_connected(&self) -> bool {
        self.list
            .upgrade()
            .is_some_and(|list| list.borrow().contains(self.key))
    }
}
