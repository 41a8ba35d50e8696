//! Target path animation: where the tool tip should be at a given time.

use std::f32::consts::{FRAC_PI_2, TAU};

use glam::{Mat4, Vec3};

use crate::config::PathConfig;

/// Animation clock, wrapped to one lap.
///
/// Immutable value type, replaced each frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct AnimationState {
    /// Seconds into the current lap, in `[0, lap_time)`
    pub lap: f32,
}

impl AnimationState {
    pub fn advance(self, delta_seconds: f32, lap_time: f32) -> AnimationState {
        // A non-finite step would poison every later frame
        if lap_time <= 0.0 || !delta_seconds.is_finite() {
            return self;
        }
        AnimationState {
            lap: (self.lap + delta_seconds).rem_euclid(lap_time),
        }
    }

    /// Angle along the path circle for the current lap time
    pub fn phase(&self, lap_time: f32, revolutions: f32) -> f32 {
        if lap_time <= 0.0 {
            return 0.0;
        }
        revolutions * self.lap / lap_time * TAU
    }
}

/// Circle on the tilted plate. The circle starts in the XY plane, is turned
/// a quarter turn about Y so it faces +X, tilted about Z, then moved to its
/// centre.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TargetPath {
    pub radius: f32,
    /// Circle space to world
    pub placement: Mat4,
    /// Plate normal, also the tool normal along the whole path
    pub normal: Vec3,
}

impl TargetPath {
    pub fn new(center: Vec3, radius: f32, tilt: f32) -> Self {
        let tilt = Mat4::from_rotation_z(tilt);
        Self {
            radius,
            placement: Mat4::from_translation(center) * tilt * Mat4::from_rotation_y(FRAC_PI_2),
            normal: tilt.transform_vector3(Vec3::X),
        }
    }

    pub fn from_config(config: &PathConfig) -> Self {
        Self::new(config.center, config.radius, config.tilt_degrees.to_radians())
    }

    pub fn normal(&self) -> Vec3 {
        self.normal
    }

    pub fn center(&self) -> Vec3 {
        self.placement.transform_point3(Vec3::ZERO)
    }

    /// Target position and normal at `phase` radians along the circle
    pub fn sample(&self, phase: f32) -> (Vec3, Vec3) {
        let (sin, cos) = phase.sin_cos();
        let local = Vec3::new(self.radius * cos, self.radius * sin, 0.0);
        (self.placement.transform_point3(local), self.normal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arm_constants::ArmGeometry;
    use crate::ik::{InverseKinematics, Reach};
    use crate::segment::ArmPose;

    #[test]
    fn test_advance_wraps_lap() {
        let state = AnimationState::default().advance(4.0, 10.0);
        assert_eq!(state.lap, 4.0);

        let state = state.advance(7.5, 10.0);
        assert!((state.lap - 1.5).abs() < 1e-5, "got {}", state.lap);

        // Large steps wrap more than once
        let state = state.advance(31.0, 10.0);
        assert!((state.lap - 2.5).abs() < 1e-4, "got {}", state.lap);
    }

    #[test]
    fn test_non_finite_step_is_ignored() {
        let state = AnimationState::default().advance(3.0, 10.0);
        assert_eq!(state.advance(f32::NAN, 10.0), state);
        assert_eq!(state.advance(f32::INFINITY, 10.0), state);

        let state = state.advance(f32::NEG_INFINITY, 10.0).advance(1.0, 10.0);
        assert_eq!(state.lap, 4.0);
    }

    #[test]
    fn test_phase_makes_two_revolutions_per_lap() {
        let state = AnimationState { lap: 2.5 };
        assert!((state.phase(10.0, 2.0) - std::f32::consts::PI).abs() < 1e-5);
        assert_eq!(AnimationState { lap: 1.0 }.phase(0.0, 2.0), 0.0);
    }

    #[test]
    fn test_plate_normal() {
        let path = TargetPath::from_config(&PathConfig::default());
        let expected = Vec3::new(3f32.sqrt() / 2.0, 0.5, 0.0);
        assert!(path.normal().distance(expected) < 1e-6);
    }

    #[test]
    fn test_path_is_a_circle_on_the_plate() {
        let config = PathConfig::default();
        let path = TargetPath::from_config(&config);
        assert!(path.center().distance(config.center) < 1e-6);

        for i in 0..36 {
            let (p, n) = path.sample(i as f32 * TAU / 36.0);
            let offset = p - config.center;
            assert!((offset.length() - config.radius).abs() < 1e-5);
            // In the plate plane
            assert!(offset.dot(n).abs() < 1e-5);
        }
    }

    #[test]
    fn test_default_path_is_reachable() {
        let geometry = ArmGeometry::PUMA;
        let solver = InverseKinematics::new(geometry);
        let path = TargetPath::from_config(&PathConfig::default());

        for i in 0..72 {
            let (target, normal) = path.sample(i as f32 * TAU / 72.0);
            let solution = solver.solve_with_reach(target, normal);
            assert_eq!(solution.reach, Reach::Within, "sample {} unreachable", i);

            let (tip, tool_normal) = ArmPose::new(geometry)
                .with_angles(solution.angles)
                .end_effector();
            assert!(
                tip.distance(target) < 1e-3,
                "sample {}: tip {:?} vs target {:?}",
                i,
                tip,
                target
            );
            assert!(tool_normal.distance(normal) < 1e-3);
        }
    }
}
