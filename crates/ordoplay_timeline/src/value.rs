// SPDX-License-Identifier: MIT OR Apache-2.0
//! Animated property values and per-entity state maps.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Logical property a command animates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PropertyKey {
    /// World position
    Position,
    /// Euler rotation in degrees
    Rotation,
    /// RGBA color
    Color,
}

impl PropertyKey {
    /// Get the display name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Position => "position",
            Self::Rotation => "rotation",
            Self::Color => "color",
        }
    }
}

/// Value stored for a property
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PropertyValue {
    /// 3D vector (position or Euler angles)
    Vec3([f32; 3]),
    /// Color (RGBA)
    Color([f32; 4]),
}

impl PropertyValue {
    /// Get as Vec3 if possible
    pub fn as_vec3(&self) -> Option<[f32; 3]> {
        match self {
            PropertyValue::Vec3(v) => Some(*v),
            PropertyValue::Color(_) => None,
        }
    }

    /// Get as color if possible
    pub fn as_color(&self) -> Option<[f32; 4]> {
        match self {
            PropertyValue::Color(v) => Some(*v),
            PropertyValue::Vec3(_) => None,
        }
    }

    /// Interpolate towards another value of the same shape.
    ///
    /// Returns `None` for mismatched shapes.
    pub fn lerp(&self, other: &PropertyValue, t: f32) -> Option<PropertyValue> {
        match (self, other) {
            (PropertyValue::Vec3(a), PropertyValue::Vec3(b)) => {
                Some(PropertyValue::Vec3(Interpolation::lerp_vec3(*a, *b, t)))
            }
            (PropertyValue::Color(a), PropertyValue::Color(b)) => {
                Some(PropertyValue::Color(Interpolation::lerp_vec4(*a, *b, t)))
            }
            _ => None,
        }
    }
}

/// Interpolation utilities
pub struct Interpolation;

impl Interpolation {
    /// Linear interpolation between two floats
    pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
        a + (b - a) * t
    }

    /// Interpolate Vec3 component-wise.
    ///
    /// Also used for Euler rotations, so a rotation from 350 to 10 degrees
    /// sweeps back through 180 rather than taking the short way round.
    pub fn lerp_vec3(a: [f32; 3], b: [f32; 3], t: f32) -> [f32; 3] {
        [
            Self::lerp(a[0], b[0], t),
            Self::lerp(a[1], b[1], t),
            Self::lerp(a[2], b[2], t),
        ]
    }

    /// Interpolate Vec4 component-wise
    pub fn lerp_vec4(a: [f32; 4], b: [f32; 4], t: f32) -> [f32; 4] {
        [
            Self::lerp(a[0], b[0], t),
            Self::lerp(a[1], b[1], t),
            Self::lerp(a[2], b[2], t),
            Self::lerp(a[3], b[3], t),
        ]
    }

    /// Component-wise sum
    pub fn add_vec3(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
        [a[0] + b[0], a[1] + b[1], a[2] + b[2]]
    }

    /// Fraction of `time` through `[start, end]`.
    ///
    /// Callers must have ruled out `time >= end`, so the span is positive.
    pub fn fraction(start: f32, end: f32, time: f32) -> f32 {
        (time - start) / (end - start)
    }
}

/// Snapshot of property values for one entity.
///
/// Insertion order is kept so the map reads in the order commands first
/// touched each property.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StateMap {
    values: IndexMap<PropertyKey, PropertyValue>,
}

impl StateMap {
    /// Create an empty map
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the value for a key
    pub fn get(&self, key: PropertyKey) -> Option<PropertyValue> {
        self.values.get(&key).copied()
    }

    /// Check whether a key is present
    pub fn contains(&self, key: PropertyKey) -> bool {
        self.values.contains_key(&key)
    }

    /// Insert or overwrite a value
    pub fn insert(&mut self, key: PropertyKey, value: PropertyValue) {
        self.values.insert(key, value);
    }

    /// Insert a value only if the key is absent and `value` yields one
    pub fn seed(&mut self, key: PropertyKey, value: impl FnOnce() -> Option<PropertyValue>) {
        if self.values.contains_key(&key) {
            return;
        }
        if let Some(value) = value() {
            self.values.insert(key, value);
        }
    }

    /// Replace this map's contents with a copy of another, reusing storage
    pub fn reset_from(&mut self, other: &StateMap) {
        self.values.clear();
        self.values
            .extend(other.values.iter().map(|(key, value)| (*key, *value)));
    }

    /// Remove every entry
    pub fn clear(&mut self) {
        self.values.clear();
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the map is empty
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate over entries
    pub fn iter(&self) -> impl Iterator<Item = (PropertyKey, PropertyValue)> + '_ {
        self.values.iter().map(|(key, value)| (*key, *value))
    }
}
