//! Channel identity, roles and addressing.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Which side of the gateway a process plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Privileged side; the only role allowed to create channels.
    Authority,
    /// Non-privileged side; may only discover existing channels.
    Peer,
}

impl Role {
    pub fn is_authority(self) -> bool {
        matches!(self, Role::Authority)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Authority => write!(f, "authority"),
            Role::Peer => write!(f, "peer"),
        }
    }
}

/// Fire-and-forget or request/reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelKind {
    Event,
    Call,
}

impl fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelKind::Event => write!(f, "event"),
            ChannelKind::Call => write!(f, "call"),
        }
    }
}

/// Opaque transport-issued channel handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChannelHandle(pub u64);

/// A named channel registered in the shared namespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Channel {
    pub name: String,
    pub kind: ChannelKind,
    pub handle: ChannelHandle,
}

/// Transport-assigned identifier of a connected peer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PeerId(String);

impl PeerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PeerId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// One side of a connection. Handlers receive the sending endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Authority,
    Peer(PeerId),
}

impl Endpoint {
    pub fn role(&self) -> Role {
        match self {
            Endpoint::Authority => Role::Authority,
            Endpoint::Peer(_) => Role::Peer,
        }
    }

    /// Peer id, if this endpoint is a peer.
    pub fn peer_id(&self) -> Option<&PeerId> {
        match self {
            Endpoint::Authority => None,
            Endpoint::Peer(id) => Some(id),
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::Authority => write!(f, "authority"),
            Endpoint::Peer(id) => write!(f, "{id}"),
        }
    }
}

/// Delivery target for an outbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Authority,
    Peer(PeerId),
    AllPeers,
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Authority => write!(f, "authority"),
            Target::Peer(id) => write!(f, "{id}"),
            Target::AllPeers => write!(f, "all peers"),
        }
    }
}
