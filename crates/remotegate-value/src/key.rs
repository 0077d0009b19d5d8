//! Structural cache keys.
//!
//! A key is the ordered sequence of tagged atoms for `(value, params...)`.
//! Strings stay whole, so `"a|b"` and `("a", "b")` produce different keys.

use crate::value::Value;

/// Hashable mirror of a [`Value`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum KeyAtom {
    Nil,
    Bool(bool),
    Number(u64),
    String(String),
    List(Vec<KeyAtom>),
    Map(Vec<(String, KeyAtom)>),
    Vector2([u64; 2]),
    Vector3([u64; 3]),
    Transform([u64; 12]),
    Color([u64; 3]),
    Enum(String),
    EnumItem {
        enum_type: String,
        name: String,
        value: i64,
    },
    Callable(u64),
    Handle {
        id: u64,
        class_name: String,
    },
    Task(u64),
}

impl From<&Value> for KeyAtom {
    fn from(value: &Value) -> Self {
        match value {
            Value::Nil => KeyAtom::Nil,
            Value::Bool(b) => KeyAtom::Bool(*b),
            Value::Number(n) => KeyAtom::Number(number_bits(*n)),
            Value::String(s) => KeyAtom::String(s.clone()),
            Value::List(items) => KeyAtom::List(items.iter().map(KeyAtom::from).collect()),
            Value::Map(map) => KeyAtom::Map(
                map.iter()
                    .map(|(key, value)| (key.clone(), KeyAtom::from(value)))
                    .collect(),
            ),
            Value::Vector2(v) => KeyAtom::Vector2([number_bits(v.x), number_bits(v.y)]),
            Value::Vector3(v) => {
                KeyAtom::Vector3([number_bits(v.x), number_bits(v.y), number_bits(v.z)])
            }
            Value::Transform(t) => KeyAtom::Transform(t.components().map(number_bits)),
            Value::Color(c) => KeyAtom::Color([number_bits(c.r), number_bits(c.g), number_bits(c.b)]),
            Value::Enum(e) => KeyAtom::Enum(e.name.clone()),
            Value::EnumItem(item) => KeyAtom::EnumItem {
                enum_type: item.enum_type.clone(),
                name: item.name.clone(),
                value: item.value,
            },
            Value::Callable(c) => KeyAtom::Callable(c.0),
            Value::Handle(h) => KeyAtom::Handle {
                id: h.id,
                class_name: h.class_name.clone(),
            },
            Value::Task(t) => KeyAtom::Task(t.0),
        }
    }
}

/// Memoization key for one validator invocation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(Vec<KeyAtom>);

impl CacheKey {
    /// Key for validating `value` with extra `params`.
    pub fn new(value: &Value, params: &[Value]) -> Self {
        let mut atoms = Vec::with_capacity(params.len() + 1);
        atoms.push(KeyAtom::from(value));
        atoms.extend(params.iter().map(KeyAtom::from));
        Self(atoms)
    }

    pub fn atoms(&self) -> &[KeyAtom] {
        &self.0
    }
}

// All NaNs share one key. Signed zeros stay distinct.
fn number_bits(n: f64) -> u64 {
    if n.is_nan() {
        f64::NAN.to_bits()
    } else {
        n.to_bits()
    }
}
