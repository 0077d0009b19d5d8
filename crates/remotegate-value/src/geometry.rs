//! Geometry, color and enumeration payload types.

use serde::{Deserialize, Serialize};

/// Two-component vector.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector2 {
    pub x: f64,
    pub y: f64,
}

impl Vector2 {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Three-component vector.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector3 {
    pub const ZERO: Self = Self {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// Rigid transform: a position plus a row-major 3x3 rotation matrix.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vector3,
    pub rotation: [[f64; 3]; 3],
}

impl Transform {
    pub const IDENTITY_ROTATION: [[f64; 3]; 3] = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];

    /// Identity rotation at the origin.
    pub fn identity() -> Self {
        Self::from_position(Vector3::ZERO)
    }

    /// Identity rotation at `position`.
    pub fn from_position(position: Vector3) -> Self {
        Self {
            position,
            rotation: Self::IDENTITY_ROTATION,
        }
    }

    /// Flattened components: position followed by the rotation rows.
    pub fn components(&self) -> [f64; 12] {
        let r = &self.rotation;
        [
            self.position.x,
            self.position.y,
            self.position.z,
            r[0][0],
            r[0][1],
            r[0][2],
            r[1][0],
            r[1][1],
            r[1][2],
            r[2][0],
            r[2][1],
            r[2][2],
        ]
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

/// RGB color with components in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Color {
    pub fn new(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b }
    }

    /// Build from 8-bit channels.
    pub fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self {
            r: f64::from(r) / 255.0,
            g: f64::from(g) / 255.0,
            b: f64::from(b) / 255.0,
        }
    }
}

/// An enumeration object, identified by name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EnumType {
    pub name: String,
}

impl EnumType {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Create a member of this enumeration.
    pub fn item(&self, name: impl Into<String>, value: i64) -> EnumItem {
        EnumItem {
            enum_type: self.name.clone(),
            name: name.into(),
            value,
        }
    }
}

/// A member of an enumeration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EnumItem {
    /// Name of the owning enumeration.
    pub enum_type: String,
    pub name: String,
    pub value: i64,
}

impl EnumItem {
    /// Returns true if this member belongs to `enum_type`.
    pub fn is_member_of(&self, enum_type: &str) -> bool {
        self.enum_type == enum_type
    }
}
