//! Built-in validators installed by [`ValidationEngine::new`].
//!
//! Type checks confirm the runtime tag only. Numeric comparisons require a
//! number and fail for NaN.
//!
//! [`ValidationEngine::new`]: crate::ValidationEngine::new

use std::collections::HashMap;

use parking_lot::Mutex;
use regex::Regex;
use remotegate_value::Value;

use crate::engine::ValidationEngine;

/// Number that is not NaN.
pub const IS_NUMBER: &str = "isNumber";
/// Non-NaN number with no fractional part.
pub const IS_INTEGER: &str = "isInteger";
pub const IS_STRING: &str = "isString";
pub const IS_BOOLEAN: &str = "isBoolean";
/// Structured container: list or map.
pub const IS_TABLE: &str = "isTable";
pub const IS_CALLABLE: &str = "isCallable";
/// Opaque host object handle.
pub const IS_HANDLE: &str = "isHandle";
/// Task handle.
pub const IS_TASK: &str = "isTask";
/// Inclusive range: params `(min, max)`.
pub const IS_IN_RANGE: &str = "isInRange";
pub const IS_POSITIVE: &str = "isPositive";
pub const IS_NEGATIVE: &str = "isNegative";
pub const IS_NON_NEGATIVE: &str = "isNonNegative";
pub const IS_NON_POSITIVE: &str = "isNonPositive";
pub const IS_VECTOR2: &str = "isVector2";
pub const IS_VECTOR3: &str = "isVector3";
pub const IS_TRANSFORM: &str = "isTransform";
pub const IS_COLOR: &str = "isColor";
/// An enumeration object.
pub const IS_ENUM: &str = "isEnum";
/// Any enumeration member.
pub const IS_ENUM_ITEM: &str = "isEnumItem";
/// Member of the enumeration given as param (enum object or its name).
pub const IS_ENUM_ITEM_OF: &str = "isEnumItemOf";
/// String containing a match for the regex given as param.
pub const MATCHES_PATTERN: &str = "matchesPattern";

/// Names of every built-in validator.
pub const BUILTIN_VALIDATORS: [&str; 21] = [
    IS_NUMBER,
    IS_INTEGER,
    IS_STRING,
    IS_BOOLEAN,
    IS_TABLE,
    IS_CALLABLE,
    IS_HANDLE,
    IS_TASK,
    IS_IN_RANGE,
    IS_POSITIVE,
    IS_NEGATIVE,
    IS_NON_NEGATIVE,
    IS_NON_POSITIVE,
    IS_VECTOR2,
    IS_VECTOR3,
    IS_TRANSFORM,
    IS_COLOR,
    IS_ENUM,
    IS_ENUM_ITEM,
    IS_ENUM_ITEM_OF,
    MATCHES_PATTERN,
];

pub(crate) fn install(engine: &ValidationEngine) {
    engine.register(IS_NUMBER, |value: &Value, _: &[Value]| number(value).is_some());
    engine.register(IS_INTEGER, |value: &Value, _: &[Value]| {
        number(value).is_some_and(|n| n.fract() == 0.0)
    });
    engine.register(IS_STRING, |value: &Value, _: &[Value]| {
        matches!(value, Value::String(_))
    });
    engine.register(IS_BOOLEAN, |value: &Value, _: &[Value]| {
        matches!(value, Value::Bool(_))
    });
    engine.register(IS_TABLE, |value: &Value, _: &[Value]| {
        matches!(value, Value::List(_) | Value::Map(_))
    });
    engine.register(IS_CALLABLE, |value: &Value, _: &[Value]| {
        matches!(value, Value::Callable(_))
    });
    engine.register(IS_HANDLE, |value: &Value, _: &[Value]| {
        matches!(value, Value::Handle(_))
    });
    engine.register(IS_TASK, |value: &Value, _: &[Value]| {
        matches!(value, Value::Task(_))
    });

    engine.register(IS_IN_RANGE, |value: &Value, params: &[Value]| {
        match (
            value.as_f64(),
            params.first().and_then(Value::as_f64),
            params.get(1).and_then(Value::as_f64),
        ) {
            (Some(n), Some(min), Some(max)) => min <= n && n <= max,
            _ => false,
        }
    });
    engine.register(IS_POSITIVE, |value: &Value, _: &[Value]| {
        value.as_f64().is_some_and(|n| n > 0.0)
    });
    engine.register(IS_NEGATIVE, |value: &Value, _: &[Value]| {
        value.as_f64().is_some_and(|n| n < 0.0)
    });
    engine.register(IS_NON_NEGATIVE, |value: &Value, _: &[Value]| {
        value.as_f64().is_some_and(|n| n >= 0.0)
    });
    engine.register(IS_NON_POSITIVE, |value: &Value, _: &[Value]| {
        value.as_f64().is_some_and(|n| n <= 0.0)
    });

    engine.register(IS_VECTOR2, |value: &Value, _: &[Value]| {
        matches!(value, Value::Vector2(_))
    });
    engine.register(IS_VECTOR3, |value: &Value, _: &[Value]| {
        matches!(value, Value::Vector3(_))
    });
    engine.register(IS_TRANSFORM, |value: &Value, _: &[Value]| {
        matches!(value, Value::Transform(_))
    });
    engine.register(IS_COLOR, |value: &Value, _: &[Value]| {
        matches!(value, Value::Color(_))
    });
    engine.register(IS_ENUM, |value: &Value, _: &[Value]| {
        matches!(value, Value::Enum(_))
    });
    engine.register(IS_ENUM_ITEM, |value: &Value, _: &[Value]| {
        matches!(value, Value::EnumItem(_))
    });
    engine.register(IS_ENUM_ITEM_OF, |value: &Value, params: &[Value]| {
        let expected = match params.first() {
            Some(Value::Enum(enum_type)) => enum_type.name.as_str(),
            Some(Value::String(name)) => name.as_str(),
            _ => return false,
        };
        matches!(value, Value::EnumItem(item) if item.is_member_of(expected))
    });

    let patterns = PatternCache::default();
    engine.register(MATCHES_PATTERN, move |value: &Value, params: &[Value]| {
        match (value.as_str(), params.first().and_then(Value::as_str)) {
            (Some(text), Some(pattern)) => patterns.is_match(pattern, text),
            _ => false,
        }
    });
}

fn number(value: &Value) -> Option<f64> {
    value.as_f64().filter(|n| !n.is_nan())
}

/// Compiled patterns keyed by source; invalid patterns never match.
#[derive(Default)]
struct PatternCache {
    compiled: Mutex<HashMap<String, Option<Regex>>>,
}

impl PatternCache {
    fn is_match(&self, pattern: &str, text: &str) -> bool {
        let regex = self
            .compiled
            .lock()
            .entry(pattern.to_string())
            .or_insert_with(|| match Regex::new(pattern) {
                Ok(regex) => Some(regex),
                Err(err) => {
                    tracing::debug!(%pattern, error = %err, "invalid pattern never matches");
                    None
                }
            })
            .clone();
        regex.is_some_and(|regex| regex.is_match(text))
    }
}
