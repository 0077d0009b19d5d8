use std::sync::Arc;

use remotegate_value::Args;

use crate::channel::{Channel, ChannelKind, Endpoint, Target};
use crate::error::Result;

/// Inbound event handler. Receives the sending endpoint and the arguments.
pub type EventHandler = Arc<dyn Fn(&Endpoint, Args) + Send + Sync>;

/// Inbound call handler. The returned arguments are the reply.
pub type CallHandler = Arc<dyn Fn(&Endpoint, Args) -> Args + Send + Sync>;

/// Shared namespace of channels, visible to every role.
pub trait Directory: Send + Sync {
    /// Look up an existing channel by name.
    fn find(&self, name: &str) -> Option<Channel>;

    /// Register a new channel.
    ///
    /// Hosts reject creation from endpoints without authority privileges.
    fn create(&self, name: &str, kind: ChannelKind) -> Result<Channel>;
}

/// Message delivery between roles.
///
/// Implementations deliver reliably to the addressed endpoint and invoke
/// the handlers installed there. Repeated fires on the same channel from
/// the same sender arrive in order.
pub trait Transport: Send + Sync {
    /// Deliver an event without waiting for handlers.
    fn fire(&self, channel: &Channel, target: &Target, args: Args) -> Result<()>;

    /// Perform a blocking round trip and return the reply arguments.
    fn invoke(&self, channel: &Channel, target: &Target, args: Args) -> Result<Args>;

    /// Install a handler for inbound events on `channel`.
    fn listen(&self, channel: &Channel, handler: EventHandler) -> Result<()>;

    /// Install the reply handler for inbound calls on `channel`, replacing any previous one.
    fn answer(&self, channel: &Channel, handler: CallHandler) -> Result<()>;
}
