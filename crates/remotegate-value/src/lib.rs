//! Payload value model for remotegate channels.
//!
//! Every argument carried on an event or call channel is a [`Value`]:
//! - JSON-like scalars and containers (nil, booleans, numbers, strings, lists, maps)
//! - Geometry and color payloads ([`Vector2`], [`Vector3`], [`Transform`], [`Color`])
//! - Enumeration objects and members ([`EnumType`], [`EnumItem`])
//! - Opaque host references (callables, object handles, task handles)
//!
//! [`CacheKey`] turns a value tuple into a structural, hashable key.

pub mod geometry;
pub mod key;
pub mod value;

pub use geometry::{Color, EnumItem, EnumType, Transform, Vector2, Vector3};
pub use key::{CacheKey, KeyAtom};
pub use value::{Args, CallableRef, HandleRef, TaskRef, Value};

/// Build an [`Args`] list from anything convertible into [`Value`].
///
/// ```
/// use remotegate_value::{args, Value};
///
/// let args = args![5, "hello", true];
/// assert_eq!(args[1], Value::from("hello"));
/// ```
#[macro_export]
macro_rules! args {
    () => {
        ::std::vec::Vec::<$crate::Value>::new()
    };
    ($($arg:expr),+ $(,)?) => {
        ::std::vec![$($crate::Value::from($arg)),+]
    };
}
