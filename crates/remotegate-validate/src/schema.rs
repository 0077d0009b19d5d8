//! JSON Schema backed validators.
//!
//! A schema compiles once into a [`Predicate`] over the JSON form of the
//! validated value. Strict mode closes every object schema against
//! properties it does not declare.

use std::sync::Arc;

use jsonschema::Validator;
use remotegate_value::Value;
use serde_json::Map;

use crate::engine::Predicate;
use crate::error::{Result, ValidateError};

const MAX_REPORTED_ERRORS: usize = 4;

/// Compile `schema` into a predicate registered as `name`.
pub(crate) fn compile(name: &str, schema: &serde_json::Value, strict: bool) -> Result<Predicate> {
    let mut schema_to_compile = schema.clone();
    if strict {
        apply_strict_mode(&mut schema_to_compile);
    }

    let compiled =
        jsonschema::validator_for(&schema_to_compile).map_err(|err| ValidateError::CompileFailed {
            name: name.to_string(),
            message: err.to_string(),
        })?;

    let name = name.to_string();
    let predicate: Predicate = Arc::new(move |value: &Value, _params: &[Value]| {
        let Some(instance) = value.to_json() else {
            tracing::debug!(validator = %name, kind = value.type_name(), "value has no JSON form");
            return false;
        };
        match describe_errors(&compiled, &instance) {
            Some(message) => {
                tracing::debug!(validator = %name, %message, "schema rejected value");
                false
            }
            None => true,
        }
    });
    Ok(predicate)
}

fn describe_errors(validator: &Validator, instance: &serde_json::Value) -> Option<String> {
    let mut errors = validator.iter_errors(instance);
    let first = errors.next()?;
    let mut message = first.to_string();
    for err in errors.take(MAX_REPORTED_ERRORS - 1) {
        message.push_str("; ");
        message.push_str(&err.to_string());
    }
    Some(message)
}

fn apply_strict_mode(value: &mut serde_json::Value) {
    match value {
        serde_json::Value::Object(map) => {
            if is_object_schema(map) && !map.contains_key("additionalProperties") {
                map.insert(
                    "additionalProperties".to_string(),
                    serde_json::Value::Bool(false),
                );
            }

            for key in ["properties", "patternProperties", "$defs", "definitions"] {
                if let Some(serde_json::Value::Object(children)) = map.get_mut(key) {
                    children.values_mut().for_each(apply_strict_mode);
                }
            }
            for key in ["items", "additionalProperties", "not", "if", "then", "else"] {
                if let Some(child) = map.get_mut(key) {
                    apply_strict_mode(child);
                }
            }
            for key in ["prefixItems", "allOf", "anyOf", "oneOf"] {
                if let Some(serde_json::Value::Array(children)) = map.get_mut(key) {
                    children.iter_mut().for_each(apply_strict_mode);
                }
            }
        }
        serde_json::Value::Array(items) => items.iter_mut().for_each(apply_strict_mode),
        _ => {}
    }
}

fn is_object_schema(map: &Map<String, serde_json::Value>) -> bool {
    match map.get("type") {
        Some(serde_json::Value::String(kind)) => kind == "object",
        Some(serde_json::Value::Array(kinds)) => kinds
            .iter()
            .any(|kind| matches!(kind, serde_json::Value::String(kind) if kind == "object")),
        _ => ["properties", "required", "patternProperties"]
            .iter()
            .any(|keyword| map.contains_key(*keyword)),
    }
}
