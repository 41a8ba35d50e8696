//! Shared arm geometry used by both build.rs and runtime code.
//!
//! This module is included by both the build script and the kinematics modules
//! so the compile-time check of `assets/puma.json` and the runtime solver agree
//! on what a valid arm looks like.

// Some helpers are only used by build.rs for validation
#![allow(dead_code)]

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Upper arm length, shoulder pivot to elbow pivot (meters)
pub const PUMA_L1: f32 = 0.91;
/// Forearm length, elbow pivot to wrist center (meters)
pub const PUMA_L2: f32 = 0.81;
/// Tool length, wrist center to tool tip (meters)
pub const PUMA_L3: f32 = 0.33;
/// Height of the shoulder pivot above the base origin (meters)
pub const PUMA_DY: f32 = 0.27;
/// Lateral offset of the forearm from the turret axis (meters)
pub const PUMA_DZ: f32 = 0.26;

/// Fixed link lengths and offsets of the 5-DOF arm.
///
/// In model space the arm reaches along -X, the shoulder sits `dy` above the
/// base and the forearm/wrist run `dz` behind the turret plane (-Z).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArmGeometry {
    pub l1: f32,
    pub l2: f32,
    pub l3: f32,
    pub dy: f32,
    pub dz: f32,
}

impl Default for ArmGeometry {
    fn default() -> Self {
        Self::PUMA
    }
}

impl ArmGeometry {
    pub const PUMA: ArmGeometry = ArmGeometry {
        l1: PUMA_L1,
        l2: PUMA_L2,
        l3: PUMA_L3,
        dy: PUMA_DY,
        dz: PUMA_DZ,
    };

    /// Longest shoulder-to-wrist distance (arm straight)
    #[inline]
    pub fn max_reach(&self) -> f32 {
        self.l1 + self.l2
    }

    /// Shortest shoulder-to-wrist distance (arm folded)
    #[inline]
    pub fn min_reach(&self) -> f32 {
        (self.l1 - self.l2).abs()
    }

    /// Pivot of the shoulder pitch joint (rotates about Z)
    pub fn shoulder_pivot(&self) -> Vec3 {
        Vec3::new(0.0, self.dy, 0.0)
    }

    /// Pivot of the elbow pitch joint (rotates about Z)
    pub fn elbow_pivot(&self) -> Vec3 {
        Vec3::new(-self.l1, self.dy, 0.0)
    }

    /// A point on the wrist roll axis (rotates about X)
    pub fn wrist_roll_pivot(&self) -> Vec3 {
        Vec3::new(0.0, self.dy, -self.dz)
    }

    /// A point on the wrist pitch axis (rotates about Z)
    pub fn wrist_pitch_pivot(&self) -> Vec3 {
        Vec3::new(-self.max_reach(), self.dy, 0.0)
    }

    /// Wrist center in model space; fixed by both wrist joints
    pub fn wrist_center(&self) -> Vec3 {
        Vec3::new(-self.max_reach(), self.dy, -self.dz)
    }

    /// Tool tip (end effector) in model space. The tool normal at rest is +X,
    /// pointing from the tip back towards the wrist.
    pub fn tool_tip(&self) -> Vec3 {
        self.wrist_center() - Vec3::X * self.l3
    }

    /// Check the geometry for values the closed-form solver cannot handle.
    /// Returns one message per problem; empty means valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        let check = |errors: &mut Vec<String>, name: &str, value: f32| {
            if !value.is_finite() || value <= 0.0 {
                errors.push(format!("  {} must be a positive length, got {}", name, value));
            }
        };

        check(&mut errors, "l1", self.l1);
        check(&mut errors, "l2", self.l2);
        check(&mut errors, "l3", self.l3);
        check(&mut errors, "dy", self.dy);

        if !self.dz.is_finite() || self.dz < 0.0 {
            errors.push(format!("  dz must be a non-negative offset, got {}", self.dz));
        }

        if self.dz >= self.max_reach() {
            errors.push(format!(
                "  dz ({:.3}m) must be smaller than the arm reach ({:.3}m)",
                self.dz,
                self.max_reach()
            ));
        }

        errors
    }
}
