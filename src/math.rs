//! Linear algebra helpers on top of glam.
//!
//! glam uses column vectors, so a chain that applies `A` first and `B` second
//! is written `B * A`. Every kinematic chain in this crate is composed with
//! that convention; `to_row_major` produces the layout of shaders that declare
//! their matrices `row_major`.

pub use glam::{Mat3, Mat4, Vec3};

use std::f32::consts::{PI, TAU};

/// Principal rotation axis of a revolute joint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    /// Right-handed rotation about this axis through the origin
    #[inline]
    pub fn rotation(self, angle: f32) -> Mat4 {
        match self {
            Axis::X => Mat4::from_rotation_x(angle),
            Axis::Y => Mat4::from_rotation_y(angle),
            Axis::Z => Mat4::from_rotation_z(angle),
        }
    }
}

/// Rotation about an axis passing through `pivot`:
/// translate the pivot to the origin, rotate, translate back.
pub fn pivot_rotation(pivot: Vec3, axis: Axis, angle: f32) -> Mat4 {
    Mat4::from_translation(pivot) * axis.rotation(angle) * Mat4::from_translation(-pivot)
}

/// Transpose into a flat row-major array (row 0 first).
pub fn to_row_major(m: &Mat4) -> [f32; 16] {
    let mut result = [0.0f32; 16];
    let data = m.as_ref();
    for i in 0..4 {
        for j in 0..4 {
            result[i * 4 + j] = data[j * 4 + i];
        }
    }
    result
}

/// Unit normal of a counter-clockwise triangle, zero if degenerate
#[inline]
pub fn triangle_normal(a: Vec3, b: Vec3, c: Vec3) -> Vec3 {
    (b - a).cross(c - a).normalize_or_zero()
}

/// Wrap an angle into (-π, π]
pub fn wrap_angle(angle: f32) -> f32 {
    let mut r = angle % TAU;
    if r <= -PI {
        r += TAU;
    } else if r > PI {
        r -= TAU;
    }
    r
}
