//! Channel registry and validated message dispatch.
//!
//! This is the layer applications talk to. The authority side creates
//! named channels on first use and the peer side attaches to them. Inbound
//! events and calls can be gated by positional [`CheckSpec`] lists before
//! user handlers run.
//!
//! Channel-not-found, validator-not-found and failed checks are never
//! returned to callers: they are logged with `tracing` and the message is
//! dropped, or the call yields no reply. The one fatal path is a directory
//! that refuses to create a channel for the authority, which panics.
//!
//! [`CheckSpec`]: remotegate_validate::CheckSpec

pub mod batch;
pub mod error;
pub mod gateway;
pub mod registry;

pub use batch::{BatchDispatcher, BatchReport};
pub use error::{GatewayError, Result};
pub use gateway::{AuthorityGateway, PeerGateway};
pub use registry::ChannelRegistry;
