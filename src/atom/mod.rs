//! Atom representation and related functionality

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum number of characters kept in an atom label
pub const NAME_CAPACITY: usize = 2;

/// Label used when the input has no non-whitespace characters
pub const PLACEHOLDER_NAME: &str = "X";

/// A short atom label, at most [`NAME_CAPACITY`] characters.
///
/// Only the first whitespace-separated word of the input is kept, truncated
/// to fit; blank input becomes [`PLACEHOLDER_NAME`]. A label is therefore
/// never empty and never contains whitespace, so it survives a write and
/// re-read as a single XYZ field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AtomName {
    chars: [char; NAME_CAPACITY],
    len: u8,
}

impl AtomName {
    pub fn new(label: &str) -> Self {
        let mut chars = [' '; NAME_CAPACITY];
        let mut len = 0;
        let word = label.split_whitespace().next().unwrap_or(PLACEHOLDER_NAME);
        for (slot, c) in chars.iter_mut().zip(word.chars()) {
            *slot = c;
            len += 1;
        }
        Self { chars, len }
    }

    pub fn as_string(&self) -> String {
        self.chars[..self.len as usize].iter().collect()
    }

    pub fn len(&self) -> usize {
        self.len as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl Default for AtomName {
    fn default() -> Self {
        Self::new(PLACEHOLDER_NAME)
    }
}

impl From<&str> for AtomName {
    fn from(label: &str) -> Self {
        Self::new(label)
    }
}

impl fmt::Display for AtomName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Honors width flags such as `{:<2}`.
        f.pad(&self.as_string())
    }
}

impl Serialize for AtomName {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.as_string())
    }
}

impl<'de> Deserialize<'de> for AtomName {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        Ok(AtomName::new(&label))
    }
}

/// Represents an atom in 3D space
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    /// Label from the input file (e.g. "C", "H", "Cl")
    pub name: AtomName,

    /// 3D coordinates (in Angstroms)
    pub position: Vector3<f64>,
}

impl Atom {
    /// Create a new atom
    pub fn new(name: impl Into<AtomName>, position: Vector3<f64>) -> Self {
        Self {
            name: name.into(),
            position,
        }
    }

    /// Calculate distance to another atom
    pub fn distance(&self, other: &Atom) -> f64 {
        crate::math::magnitude(&crate::math::sub(&self.position, &other.position))
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}({}, {}, {})",
            self.name, self.position.x, self.position.y, self.position.z
        )
    }
}
