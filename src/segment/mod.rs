//! Segment chain of the arm: ids, cached forward kinematics and poses.

pub mod cache;
pub mod id;
pub mod pose;

pub use cache::*;
pub use id::*;
pub use pose::*;

#[cfg(test)]
mod tests {
    use super::*;

    use crate::arm_constants::ArmGeometry;
    use crate::ik::JointAngles;
    use glam::{Mat4, Vec3};
    use std::f32::consts::FRAC_PI_2;

    fn mat_close(a: Mat4, b: Mat4) -> bool {
        a.abs_diff_eq(b, 1e-5)
    }

    #[test]
    fn test_rest_pose_is_identity() {
        let pose = ArmPose::new(ArmGeometry::PUMA);
        for m in pose.segment_matrices() {
            assert!(mat_close(m, Mat4::IDENTITY));
        }

        let (tip, normal) = pose.end_effector();
        assert!(tip.distance(ArmGeometry::PUMA.tool_tip()) < 1e-6);
        assert!(normal.distance(Vec3::X) < 1e-6);
    }

    #[test]
    fn test_base_never_moves() {
        let pose = ArmPose::new(ArmGeometry::PUMA).with_angles(JointAngles {
            a1: 1.0,
            a2: -0.5,
            a3: 0.7,
            a4: 2.0,
            a5: -1.0,
        });
        assert!(mat_close(pose.world_matrix(SegmentId::Base), Mat4::IDENTITY));
    }

    #[test]
    fn test_turret_yaw_moves_tip_about_y() {
        let geometry = ArmGeometry::PUMA;
        let pose = ArmPose::new(geometry).with_angle(SegmentId::Turret, FRAC_PI_2);

        // +90° about Y: (x, y, z) -> (z, y, -x)
        let rest = geometry.tool_tip();
        let expected = Vec3::new(rest.z, rest.y, -rest.x);
        let (tip, _) = pose.end_effector();
        assert!(tip.distance(expected) < 1e-5, "got {:?}", tip);
    }

    #[test]
    fn test_hand_joint_moves_only_hand() {
        let base = ArmPose::new(ArmGeometry::PUMA).with_angles(JointAngles {
            a1: 0.3,
            a2: 0.2,
            a3: -0.8,
            a4: 0.4,
            a5: 0.5,
        });
        let before = base.segment_matrices();
        let after = base.with_angle(SegmentId::Hand, 1.2).segment_matrices();

        for segment in SegmentId::ALL {
            let same = mat_close(before[segment.index()], after[segment.index()]);
            assert_eq!(same, segment != SegmentId::Hand, "{}", segment.name());
        }
    }

    #[test]
    fn test_wrist_center_ignores_wrist_joints() {
        let geometry = ArmGeometry::PUMA;
        let arm = JointAngles {
            a1: -0.7,
            a2: 0.1,
            a3: -1.1,
            a4: 0.0,
            a5: 0.0,
        };
        let a = ArmPose::new(geometry).with_angles(arm);
        let b = ArmPose::new(geometry).with_angles(JointAngles {
            a4: 2.1,
            a5: -0.9,
            ..arm
        });
        assert!(a.wrist_center().distance(b.wrist_center()) < 1e-5);

        // ... and the tool stays l3 away from it
        let (tip, _) = b.end_effector();
        assert!((tip.distance(b.wrist_center()) - geometry.l3).abs() < 1e-5);
    }

    #[test]
    fn test_straight_arm_reach() {
        let geometry = ArmGeometry::PUMA;
        let pose = ArmPose::new(geometry);
        let shoulder = pose
            .world_matrix(SegmentId::UpperArm)
            .transform_point3(geometry.shoulder_pivot());
        let wrist = pose.wrist_center();

        // Only the lateral dz offset separates the reach from l1 + l2
        let planar = Vec3::new(wrist.x - shoulder.x, wrist.y - shoulder.y, 0.0);
        assert!((planar.length() - geometry.max_reach()).abs() < 1e-5);
    }

    #[test]
    fn test_lazy_evaluation() {
        let pose = ArmPose::new(ArmGeometry::PUMA);
        assert!(pose.cache.borrow().dirty.is_dirty(SegmentId::Hand));

        let _ = pose.world_matrix(SegmentId::Forearm);

        let cache = pose.cache.borrow();
        assert!(!cache.dirty.is_dirty(SegmentId::Base));
        assert!(!cache.dirty.is_dirty(SegmentId::UpperArm));
        assert!(!cache.dirty.is_dirty(SegmentId::Forearm));
        assert!(cache.dirty.is_dirty(SegmentId::Wrist));
    }

    #[test]
    fn test_dirty_propagation() {
        let pose = ArmPose::new(ArmGeometry::PUMA);
        pose.compute_all();
        assert!(!pose.cache.borrow().dirty.is_any_dirty());

        let pose = pose.with_angle(SegmentId::Forearm, 0.5);
        let dirty = pose.cache.borrow().dirty;
        assert!(!dirty.is_dirty(SegmentId::UpperArm));
        assert!(dirty.is_dirty(SegmentId::Forearm));
        assert!(dirty.is_dirty(SegmentId::Hand));

        // Setting the same angle again leaves a clean cache alone
        pose.compute_all();
        let pose = pose.with_angle(SegmentId::Forearm, 0.5);
        assert!(!pose.cache.borrow().dirty.is_any_dirty());
    }

    #[test]
    fn test_segment_ids() {
        assert_eq!(SegmentId::from_index(0), Some(SegmentId::Base));
        assert_eq!(SegmentId::from_index(5), Some(SegmentId::Hand));
        assert_eq!(SegmentId::from_index(SegmentId::COUNT), None);

        assert_eq!(SegmentId::ALL.len(), SegmentId::COUNT);
        for (i, segment) in SegmentId::ALL.iter().enumerate() {
            assert_eq!(segment.index(), i);
        }
        assert_eq!(SegmentId::from_joint(0), Some(SegmentId::Turret));
        assert_eq!(SegmentId::from_joint(4), Some(SegmentId::Hand));
        assert_eq!(SegmentId::from_joint(5), None);
        assert_eq!(SegmentId::Base.joint(), None);
        assert_eq!(SegmentId::Hand.parent(), Some(SegmentId::Wrist));
    }
}
