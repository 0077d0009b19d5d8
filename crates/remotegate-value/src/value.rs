use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::geometry::{Color, EnumItem, EnumType, Transform, Vector2, Vector3};

/// Positional argument list carried by a single message.
pub type Args = Vec<Value>;

/// Opaque reference to a host callable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CallableRef(pub u64);

/// Opaque reference to a host object.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HandleRef {
    pub id: u64,
    /// Host class name. Part of the validation cache key.
    pub class_name: String,
}

impl HandleRef {
    pub fn new(id: u64, class_name: impl Into<String>) -> Self {
        Self {
            id,
            class_name: class_name.into(),
        }
    }
}

/// Opaque reference to a host task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskRef(pub u64);

/// A single payload value.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Value {
    #[default]
    Nil,
    Bool(bool),
    Number(f64),
    String(String),
    List(Vec<Value>),
    Map(BTreeMap<String, Value>),
    Vector2(Vector2),
    Vector3(Vector3),
    Transform(Transform),
    Color(Color),
    Enum(EnumType),
    EnumItem(EnumItem),
    Callable(CallableRef),
    Handle(HandleRef),
    Task(TaskRef),
}

impl Value {
    /// Runtime tag name of this value.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Nil => "nil",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::List(_) => "list",
            Value::Map(_) => "map",
            Value::Vector2(_) => "vector2",
            Value::Vector3(_) => "vector3",
            Value::Transform(_) => "transform",
            Value::Color(_) => "color",
            Value::Enum(_) => "enum",
            Value::EnumItem(_) => "enum_item",
            Value::Callable(_) => "callable",
            Value::Handle(_) => "handle",
            Value::Task(_) => "task",
        }
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// JSON form of this value.
    ///
    /// Returns `None` for non-finite numbers and for values with no JSON
    /// counterpart (geometry, enumerations, host references).
    pub fn to_json(&self) -> Option<serde_json::Value> {
        use serde_json::Value as Json;

        match self {
            Value::Nil => Some(Json::Null),
            Value::Bool(b) => Some(Json::Bool(*b)),
            Value::Number(n) => number_to_json(*n),
            Value::String(s) => Some(Json::String(s.clone())),
            Value::List(items) => items
                .iter()
                .map(Value::to_json)
                .collect::<Option<Vec<_>>>()
                .map(Json::Array),
            Value::Map(map) => map
                .iter()
                .map(|(key, value)| value.to_json().map(|json| (key.clone(), json)))
                .collect::<Option<serde_json::Map<_, _>>>()
                .map(Json::Object),
            _ => None,
        }
    }
}

/// Whole numbers inside the exactly representable range become JSON integers.
fn number_to_json(n: f64) -> Option<serde_json::Value> {
    const MAX_EXACT: f64 = 9_007_199_254_740_992.0;
    if n.fract() == 0.0 && n.abs() <= MAX_EXACT {
        return Some(serde_json::Value::from(n as i64));
    }
    serde_json::Number::from_f64(n).map(serde_json::Value::Number)
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "nil"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Number(n) => write!(f, "{n}"),
            Value::String(s) => write!(f, "{s:?}"),
            Value::List(items) => write!(f, "list[{}]", items.len()),
            Value::Map(map) => write!(f, "map[{}]", map.len()),
            Value::Vector2(v) => write!(f, "({}, {})", v.x, v.y),
            Value::Vector3(v) => write!(f, "({}, {}, {})", v.x, v.y, v.z),
            Value::Transform(t) => write!(
                f,
                "transform({}, {}, {})",
                t.position.x, t.position.y, t.position.z
            ),
            Value::Color(c) => write!(f, "color({}, {}, {})", c.r, c.g, c.b),
            Value::Enum(e) => write!(f, "enum {}", e.name),
            Value::EnumItem(item) => write!(f, "{}.{}", item.enum_type, item.name),
            Value::Callable(c) => write!(f, "callable#{}", c.0),
            Value::Handle(h) => write!(f, "{}#{}", h.class_name, h.id),
            Value::Task(t) => write!(f, "task#{}", t.0),
        }
    }
}

macro_rules! impl_from_number {
    ($($ty:ty),+) => {
        $(
            impl From<$ty> for Value {
                fn from(n: $ty) -> Self {
                    Value::Number(f64::from(n))
                }
            }
        )+
    };
}

impl_from_number!(f64, f32, i8, i16, i32, u8, u16, u32);

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<usize> for Value {
    fn from(n: usize) -> Self {
        Value::Number(n as f64)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

impl From<BTreeMap<String, Value>> for Value {
    fn from(map: BTreeMap<String, Value>) -> Self {
        Value::Map(map)
    }
}

impl From<Vector2> for Value {
    fn from(v: Vector2) -> Self {
        Value::Vector2(v)
    }
}

impl From<Vector3> for Value {
    fn from(v: Vector3) -> Self {
        Value::Vector3(v)
    }
}

impl From<Transform> for Value {
    fn from(t: Transform) -> Self {
        Value::Transform(t)
    }
}

impl From<Color> for Value {
    fn from(c: Color) -> Self {
        Value::Color(c)
    }
}

impl From<EnumType> for Value {
    fn from(e: EnumType) -> Self {
        Value::Enum(e)
    }
}

impl From<EnumItem> for Value {
    fn from(item: EnumItem) -> Self {
        Value::EnumItem(item)
    }
}

impl From<CallableRef> for Value {
    fn from(c: CallableRef) -> Self {
        Value::Callable(c)
    }
}

impl From<HandleRef> for Value {
    fn from(h: HandleRef) -> Self {
        Value::Handle(h)
    }
}

impl From<TaskRef> for Value {
    fn from(t: TaskRef) -> Self {
        Value::Task(t)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Nil, Into::into)
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        use serde_json::Value as Json;

        match json {
            Json::Null => Value::Nil,
            Json::Bool(b) => Value::Bool(b),
            Json::Number(n) => n.as_f64().map_or(Value::Nil, Value::Number),
            Json::String(s) => Value::String(s),
            Json::Array(items) => Value::List(items.into_iter().map(Value::from).collect()),
            Json::Object(map) => Value::Map(
                map.into_iter()
                    .map(|(key, value)| (key, Value::from(value)))
                    .collect(),
            ),
        }
    }
}
