use crate::channel::{ChannelKind, PeerId};

/// Errors reported by the host transport or directory.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The channel handle is not registered in the namespace.
    #[error("unknown channel {0}")]
    UnknownChannel(String),

    /// The recipient peer is not connected.
    #[error("unknown peer {0}")]
    UnknownPeer(PeerId),

    /// No reply handler is installed for the call.
    #[error("no responder on channel {channel} at {target}")]
    NoResponder { channel: String, target: String },

    /// The target cannot be addressed from this endpoint.
    #[error("invalid target {target} for channel {channel}")]
    InvalidTarget { channel: String, target: String },

    /// The name already exists with a different kind.
    #[error("channel {name} already registered as {existing}")]
    KindConflict { name: String, existing: ChannelKind },

    /// The host refused the operation.
    #[error("rejected: {0}")]
    Rejected(String),

    /// The endpoint has been disconnected.
    #[error("disconnected: {0}")]
    Disconnected(String),
}

pub type Result<T> = std::result::Result<T, TransportError>;
