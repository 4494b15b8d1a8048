use std::fmt;

use serde::{Deserialize, Serialize};

use crate::HostType;

/// Globally unique name of a shared instance: the side that generated it
/// plus a counter scoped to that side
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct InstanceId {
    origin: HostType,
    index: u64,
}

impl InstanceId {
    pub fn new(origin: HostType, index: u64) -> Self {
        Self { origin, index }
    }

    pub fn origin(&self) -> HostType {
        self.origin
    }

    pub fn index(&self) -> u64 {
        self.index
    }

    /// Client generated ids only live until the server confirms the instance
    pub fn is_provisional(&self) -> bool {
        self.origin == HostType::Client
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.origin.tag(), self.index)
    }
}

/// Hands out strictly increasing ids for one side. Ids are never recycled.
pub struct InstanceIdGenerator {
    origin: HostType,
    next_index: u64,
}

impl InstanceIdGenerator {
    pub fn new(origin: HostType) -> Self {
        Self {
            origin,
            next_index: 0,
        }
    }

    pub fn generate(&mut self) -> InstanceId {
        let id = InstanceId::new(self.origin, self.next_index);
        self.next_index += 1;
        id
    }

    pub fn origin(&self) -> HostType {
        self.origin
    }

    /// Whether `id` was handed out by this generator
    pub fn issued(&self, id: &InstanceId) -> bool {
        id.origin == self.origin && id.index < self.next_index
    }
}
