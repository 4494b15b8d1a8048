use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum HostType {
    Server,
    Client,
}

impl HostType {
    pub fn invert(self) -> Self {
        match self {
            HostType::Server => HostType::Client,
            HostType::Client => HostType::Server,
        }
    }

    pub(crate) fn tag(&self) -> &'static str {
        match self {
            HostType::Server => "server",
            HostType::Client => "client",
        }
    }
}

/// Which side(s) of the connection a class-level subscription runs on
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    Server,
    Client,
    Both,
}

impl Side {
    pub fn includes(&self, host_type: HostType) -> bool {
        match self {
            Side::Both => true,
            Side::Server => host_type == HostType::Server,
            Side::Client => host_type == HostType::Client,
        }
    }
}

/// Identifies a connected peer on the server
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserKey(u64);

impl UserKey {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn to_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for UserKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "user-{}", self.0)
    }
}
