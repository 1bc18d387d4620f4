//! Vector arithmetic and the Rodrigues axis-angle rotation

use nalgebra::{Matrix3, Vector3};
use serde::{Deserialize, Serialize};

/// A wrapper type for Vector3 that implements Serialize and Deserialize
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn from_vector3(v: &Vector3<f64>) -> Self {
        Self {
            x: v[0],
            y: v[1],
            z: v[2],
        }
    }
}

/// Outcome of [`normalize`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Normalized {
    /// The input had non-zero length and was scaled to unit length
    Unit(Vector3<f64>),
    /// The input had exactly zero length and was returned unchanged
    Degenerate(Vector3<f64>),
}

impl Normalized {
    /// The resulting vector, whichever case applied
    pub fn vector(&self) -> Vector3<f64> {
        match *self {
            Normalized::Unit(v) | Normalized::Degenerate(v) => v,
        }
    }

    pub fn is_degenerate(&self) -> bool {
        matches!(self, Normalized::Degenerate(_))
    }
}

pub fn add(a: &Vector3<f64>, b: &Vector3<f64>) -> Vector3<f64> {
    a + b
}

/// Returns `a - b`
pub fn sub(a: &Vector3<f64>, b: &Vector3<f64>) -> Vector3<f64> {
    a - b
}

pub fn magnitude(v: &Vector3<f64>) -> f64 {
    (v.x * v.x + v.y * v.y + v.z * v.z).sqrt()
}

/// Scale `v` to unit length.
///
/// A vector of exactly zero length is handed back untouched as
/// [`Normalized::Degenerate`] so the caller can decide how to report it.
pub fn normalize(v: &Vector3<f64>) -> Normalized {
    let n = magnitude(v);
    if n == 0.0 {
        return Normalized::Degenerate(*v);
    }
    Normalized::Unit(Vector3::new(v.x / n, v.y / n, v.z / n))
}

/// Rotation matrix for angle `theta` (radians) about the unit vector `axis`.
///
/// The matrix is a proper rotation only when `axis` has unit length. This is
/// not checked.
pub fn rodrigues_matrix(axis: &Vector3<f64>, theta: f64) -> Matrix3<f64> {
    let (ax, ay, az) = (axis.x, axis.y, axis.z);
    let ct = theta.cos();
    let st = theta.sin();
    let omc = 1.0 - ct;

    Matrix3::new(
        ct + ax * ax * omc,
        ax * ay * omc - az * st,
        ay * st + ax * az * omc,
        az * st + ax * ay * omc,
        ct + ay * ay * omc,
        -ax * st + ay * az * omc,
        -ay * st + ax * az * omc,
        ax * st + ay * az * omc,
        ct + az * az * omc,
    )
}

/// Rotate `point` by `theta` radians about the unit vector `axis`
pub fn rotate(point: &Vector3<f64>, axis: &Vector3<f64>, theta: f64) -> Vector3<f64> {
    rotate_by(&rodrigues_matrix(axis, theta), point)
}

/// Apply a precomputed rotation matrix to `point`
pub fn rotate_by(rotation: &Matrix3<f64>, point: &Vector3<f64>) -> Vector3<f64> {
    rotation * point
}
