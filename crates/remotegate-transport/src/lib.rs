//! Host transport and namespace directory abstraction.
//!
//! The host environment owns message delivery and the shared channel
//! namespace. This crate describes both as traits:
//! - [`Directory`] finds and creates named channels
//! - [`Transport`] fires events, performs blocking calls, and installs handlers
//!
//! [`loopback`] provides an in-process host with synchronous delivery,
//! used for tests and single-process setups.

pub mod channel;
pub mod error;
pub mod loopback;
pub mod traits;

pub use channel::{Channel, ChannelHandle, ChannelKind, Endpoint, PeerId, Role, Target};
pub use error::{Result, TransportError};
pub use loopback::{LoopbackEndpoint, LoopbackHub};
pub use traits::{CallHandler, Directory, EventHandler, Transport};
