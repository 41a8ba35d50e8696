//! Closed-form inverse kinematics for the 5-DOF Puma arm.
//!
//! The solver works in five dependent steps: wrist center from the tool
//! normal, base yaw, elbow (law of cosines), shoulder, then the two wrist
//! angles read off the normal expressed in the forearm frame.

use glam::{Mat3, Vec3};
use serde::{Deserialize, Serialize};

use crate::arm_constants::ArmGeometry;
use crate::{ArmError, Result};

/// Slack allowed on saturated arguments before a target counts as clamped;
/// a fully stretched arm lands a few ulps past 1.0 in f32.
const REACH_EPSILON: f32 = 1e-5;

/// Joint angles of the arm in radians
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct JointAngles {
    /// Base yaw (turret, about Y)
    pub a1: f32,
    /// Shoulder pitch (about Z)
    pub a2: f32,
    /// Elbow pitch (about Z)
    pub a3: f32,
    /// Wrist roll (about X)
    pub a4: f32,
    /// Wrist pitch (about Z)
    pub a5: f32,
}

impl JointAngles {
    pub const ZERO: JointAngles = JointAngles {
        a1: 0.0,
        a2: 0.0,
        a3: 0.0,
        a4: 0.0,
        a5: 0.0,
    };

    pub fn from_array(a: [f32; 5]) -> Self {
        Self {
            a1: a[0],
            a2: a[1],
            a3: a[2],
            a4: a[3],
            a5: a[4],
        }
    }

    pub fn to_array(self) -> [f32; 5] {
        [self.a1, self.a2, self.a3, self.a4, self.a5]
    }

    pub fn is_finite(&self) -> bool {
        self.to_array().iter().all(|a| a.is_finite())
    }
}

/// Whether the target could be reached exactly
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Reach {
    Within,
    /// At least one trigonometric argument was saturated; the pose is the
    /// closest boundary pose rather than an exact solution.
    Clamped,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Solution {
    pub angles: JointAngles,
    pub reach: Reach,
    /// Shoulder-to-wrist distance the planar two-link step had to span
    pub wrist_distance: f32,
}

/// Analytic solver bound to one arm geometry
#[derive(Debug, Clone, Copy, Default)]
pub struct InverseKinematics {
    pub geometry: ArmGeometry,
}

impl InverseKinematics {
    pub fn new(geometry: ArmGeometry) -> Self {
        Self { geometry }
    }

    /// Solve for a tool tip position and surface normal.
    ///
    /// Unreachable targets are silently saturated to the nearest boundary
    /// pose; use [`solve_checked`](Self::solve_checked) to reject them.
    pub fn solve(&self, position: Vec3, normal: Vec3) -> JointAngles {
        self.solve_with_reach(position, normal).angles
    }

    /// Like [`solve`](Self::solve) but fails with `OutOfReach` instead of clamping
    pub fn solve_checked(&self, position: Vec3, normal: Vec3) -> Result<JointAngles> {
        let solution = self.solve_with_reach(position, normal);
        match solution.reach {
            Reach::Within => Ok(solution.angles),
            Reach::Clamped => Err(ArmError::OutOfReach {
                distance: solution.wrist_distance,
                min: self.geometry.min_reach(),
                max: self.geometry.max_reach(),
            }),
        }
    }

    pub fn solve_with_reach(&self, position: Vec3, normal: Vec3) -> Solution {
        let ArmGeometry { l1, l2, l3, dy, dz } = self.geometry;
        let mut clamped = false;

        // 1. Wrist center sits l3 along the normal from the tool tip
        let normal = normal.normalize_or_zero();
        let pos1 = position + normal * l3;

        // 2. Base yaw; `e` is the planar reach once the lateral offset is removed
        let radicand = pos1.z * pos1.z + pos1.x * pos1.x - dz * dz;
        if radicand < -REACH_EPSILON {
            clamped = true;
        }
        let e = radicand.max(0.0).sqrt();
        let a1 = pos1.z.atan2(-pos1.x) + dz.atan2(e);

        // 3. Elbow: two-link planar problem in the arm plane
        let pos2 = Vec3::new(e, pos1.y - dy, 0.0);
        let cos_a3 = (pos2.x * pos2.x + pos2.y * pos2.y - l1 * l1 - l2 * l2) / (2.0 * l1 * l2);
        if cos_a3.abs() > 1.0 + REACH_EPSILON {
            clamped = true;
        }
        let a3 = -cos_a3.clamp(-1.0, 1.0).acos();

        // 4. Shoulder
        let k = l1 + l2 * a3.cos();
        let l = l2 * a3.sin();
        let a2 = -pos2.y.atan2((pos2.x * pos2.x + pos2.z * pos2.z).sqrt()) - l.atan2(k);

        // 5. Wrist: undo yaw, then the accumulated pitch of shoulder and elbow
        let to_forearm = Mat3::from_rotation_z(-(a2 + a3)) * Mat3::from_rotation_y(-a1);
        let local = to_forearm * normal;
        if local.x.abs() > 1.0 + REACH_EPSILON {
            clamped = true;
        }
        let a5 = local.x.clamp(-1.0, 1.0).acos();
        let a4 = local.z.atan2(local.y);

        let angles = JointAngles { a1, a2, a3, a4, a5 };
        let reach = if clamped {
            log::debug!(
                "IK target {:?} out of reach, wrist distance {:.4}",
                position,
                pos2.length()
            );
            Reach::Clamped
        } else {
            Reach::Within
        };

        Solution {
            angles,
            reach,
            wrist_distance: pos2.length(),
        }
    }
}
