use remotegate_transport::{ChannelKind, TransportError};
use remotegate_validate::Verdict;

/// Errors that can occur while resolving or dispatching on channels.
///
/// Everything except [`GatewayError::Critical`] is handled inside the
/// gateway: logged, then dropped or turned into an absent reply.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// No channel with this name exists and this role may not create it.
    #[error("channel {0} not found")]
    ChannelNotFound(String),

    /// The name is registered with a different kind.
    #[error("channel {name} requested as {requested} but registered as {existing}")]
    KindMismatch {
        name: String,
        requested: ChannelKind,
        existing: ChannelKind,
    },

    /// A positional argument failed its check.
    #[error("sanity check failed on channel {channel}: argument {index} ({validator}: {verdict})")]
    ValidationFailed {
        channel: String,
        index: usize,
        validator: String,
        verdict: Verdict,
    },

    /// Transport-level error.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Unrecoverable misuse; the gateway aborts the current task.
    #[error("critical failure: {0}")]
    Critical(String),
}

pub type Result<T> = std::result::Result<T, GatewayError>;
