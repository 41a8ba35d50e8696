use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

use crate::math::wrap_angle;

/// Default zoom limits and starting distance of the orbit camera
pub const DEFAULT_MIN_DISTANCE: f32 = 0.01;
pub const DEFAULT_MAX_DISTANCE: f32 = 100.0;
pub const DEFAULT_DISTANCE: f32 = 7.0;

/// Mouse pixels per radian of orbit rotation
pub const ROTATION_SENSITIVITY: f32 = 300.0;

/// Orbit camera looking at the world origin.
///
/// The eye sits `distance` along +Z, pitched by `angle_x` and then yawed by
/// `angle_y`. In the default scene the eye position doubles as the light.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    /// Pitch in radians, wrapped to (-π, π]
    pub angle_x: f32,
    /// Yaw in radians, wrapped to (-π, π]
    pub angle_y: f32,
    pub distance: f32,
    pub min_distance: f32,
    pub max_distance: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_DISTANCE, DEFAULT_MAX_DISTANCE, DEFAULT_DISTANCE)
    }
}

impl Camera {
    /// Negative minimums become zero and an inverted range collapses to the
    /// minimum; the distance is clamped into the result.
    pub fn new(min_distance: f32, max_distance: f32, distance: f32) -> Self {
        let min_distance = min_distance.max(0.0);
        let max_distance = max_distance.max(min_distance);
        Self {
            angle_x: 0.0,
            angle_y: 0.0,
            distance: distance.clamp(min_distance, max_distance),
            min_distance,
            max_distance,
        }
    }

    pub fn rotate(&mut self, dx: f32, dy: f32) {
        self.angle_x = wrap_angle(self.angle_x + dx);
        self.angle_y = wrap_angle(self.angle_y + dy);
    }

    /// Rotate from a mouse drag given in pixels
    pub fn rotate_pixels(&mut self, dx: f32, dy: f32) {
        self.rotate(dy / ROTATION_SENSITIVITY, dx / ROTATION_SENSITIVITY);
    }

    pub fn zoom(&mut self, d: f32) {
        self.distance = (self.distance + d).clamp(self.min_distance, self.max_distance);
    }

    /// Orientation of the eye around the origin
    fn orbit(&self) -> Mat4 {
        Mat4::from_rotation_y(self.angle_y) * Mat4::from_rotation_x(-self.angle_x)
    }

    pub fn eye_position(&self) -> Vec3 {
        self.orbit().transform_point3(Vec3::new(0.0, 0.0, self.distance))
    }

    /// World to view transform, right-handed, looking down -Z
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::from_translation(Vec3::new(0.0, 0.0, -self.distance))
            * Mat4::from_rotation_x(self.angle_x)
            * Mat4::from_rotation_y(-self.angle_y)
    }
}
