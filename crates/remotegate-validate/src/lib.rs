//! Memoized named validators for channel arguments.
//!
//! Validators are pure predicates registered under a name and invoked as
//! `(value, params...) -> bool`. Every verdict is cached per validator and
//! structural argument key, and a cached verdict is never recomputed.
//!
//! [`CheckSpec`] lists describe positional argument checks; the gateway runs
//! them against inbound payloads before user handlers see them.

pub mod builtins;
pub mod check;
pub mod config;
pub mod engine;
pub mod error;
pub mod schema;

pub use check::{ArgumentRejected, CheckSpec, Verdict};
pub use config::EngineConfig;
pub use engine::{Predicate, ValidationEngine};
pub use error::{Result, ValidateError};
