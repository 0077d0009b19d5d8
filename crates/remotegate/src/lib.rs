//! Validated messaging gateway with lazily created named channels.
//!
//! remotegate connects an authority role and any number of peer roles over
//! a flat namespace of named channels: fire-and-forget events and
//! request/reply calls, with optional per-argument validation before user
//! handlers run.
//!
//! # Crate Structure
//!
//! - [`value`]: Payload value model and structural cache keys
//! - [`transport`]: Host transport and directory traits, in-process loopback host
//! - [`validate`]: Memoized named validators and positional checks
//! - [`gateway`]: Channel registry, authority/peer gateways, batch dispatch
//! - [`logging`]: `tracing-subscriber` setup (behind `logging` feature)

/// Re-export value types.
pub mod value {
    pub use remotegate_value::*;
}

/// Re-export transport types.
pub mod transport {
    pub use remotegate_transport::*;
}

/// Re-export validation types.
pub mod validate {
    pub use remotegate_validate::*;
}

/// Re-export gateway types.
pub mod gateway {
    pub use remotegate_gateway::*;
}

#[cfg(feature = "logging")]
pub mod logging;

pub use remotegate_gateway::{AuthorityGateway, BatchReport, PeerGateway};
pub use remotegate_transport::{ChannelKind, Endpoint, LoopbackHub, PeerId};
pub use remotegate_validate::{CheckSpec, ValidationEngine};
pub use remotegate_value::{args, Args, Value};
