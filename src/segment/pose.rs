use super::cache::PoseCache;
use super::id::SegmentId;
use crate::arm_constants::ArmGeometry;
use crate::ik::JointAngles;
use crate::math::pivot_rotation;
use glam::{Mat4, Vec3};
use std::cell::RefCell;

/// Joint-space pose of the arm.
///
/// Stores the five joint angles; the world matrix of every segment is
/// derived by forward kinematics and cached internally. Like the other
/// value types here it uses a functional API (`with_angles`) with interior
/// mutability (`RefCell`) so matrices are only rebuilt for the segments
/// downstream of a changed joint.
#[derive(Debug, Clone)]
pub struct ArmPose {
    pub geometry: ArmGeometry,

    /// a1..a5 in radians
    pub angles: [f32; SegmentId::JOINTS],

    pub cache: RefCell<PoseCache>,
}

impl Default for ArmPose {
    fn default() -> Self {
        Self::new(ArmGeometry::default())
    }
}

impl ArmPose {
    /// Rest pose: every joint at zero, every segment matrix the identity
    pub fn new(geometry: ArmGeometry) -> Self {
        Self {
            geometry,
            angles: [0.0; SegmentId::JOINTS],
            cache: RefCell::new(PoseCache::default()),
        }
    }

    /// Return a new pose with one joint angle replaced
    pub fn with_angle(self, segment: SegmentId, angle: f32) -> Self {
        let Some(joint) = segment.joint() else {
            return self;
        };
        let mut new_pose = self;
        if new_pose.angles[joint] != angle {
            new_pose.angles[joint] = angle;
            let mut cache = new_pose.cache.borrow_mut();
            cache.dirty = cache.dirty.with_marked_dirty(segment);
        }
        new_pose
    }

    /// Return a new pose with all five joint angles replaced
    pub fn with_angles(self, angles: JointAngles) -> Self {
        let mut new_pose = self;
        for (j, angle) in angles.to_array().into_iter().enumerate() {
            if let Some(segment) = SegmentId::from_joint(j) {
                new_pose = new_pose.with_angle(segment, angle);
            }
        }
        new_pose
    }

    pub fn angles(&self) -> JointAngles {
        JointAngles::from_array(self.angles)
    }

    /// World matrix of a segment (computes FK up the chain if needed)
    pub fn world_matrix(&self, segment: SegmentId) -> Mat4 {
        self.ensure_computed(segment);
        self.cache.borrow().world[segment.index()]
    }

    fn ensure_computed(&self, segment: SegmentId) {
        if !self.cache.borrow().dirty.is_dirty(segment) {
            return;
        }

        for ancestor in SegmentId::ALL.iter().take(segment.index()) {
            if self.cache.borrow().dirty.is_dirty(*ancestor) {
                self.compute_segment(*ancestor);
            }
        }

        self.compute_segment(segment);
    }

    /// world(i) = world(parent) * rotation about joint i's axis through its pivot
    fn compute_segment(&self, segment: SegmentId) {
        let mut cache = self.cache.borrow_mut();

        let parent_world = match segment.parent() {
            Some(parent) => cache.world[parent.index()],
            None => Mat4::IDENTITY,
        };

        let local = match (segment.joint(), segment.joint_axis(), segment.joint_pivot(&self.geometry)) {
            (Some(joint), Some(axis), Some(pivot)) => pivot_rotation(pivot, axis, self.angles[joint]),
            _ => Mat4::IDENTITY,
        };

        cache.world[segment.index()] = parent_world * local;
        cache.dirty = cache.dirty.with_cleared(segment);
    }

    pub fn compute_all(&self) {
        for segment in SegmentId::ALL {
            self.ensure_computed(segment);
        }
    }

    /// World matrices of all six segments in chain order
    pub fn segment_matrices(&self) -> [Mat4; SegmentId::COUNT] {
        self.compute_all();
        self.cache.borrow().world
    }

    /// Tool tip position and tool normal in world space
    pub fn end_effector(&self) -> (Vec3, Vec3) {
        let hand = self.world_matrix(SegmentId::Hand);
        let tip = hand.transform_point3(self.geometry.tool_tip());
        let normal = hand.transform_vector3(Vec3::X).normalize_or_zero();
        (tip, normal)
    }

    /// Wrist center in world space
    pub fn wrist_center(&self) -> Vec3 {
        self.world_matrix(SegmentId::Hand)
            .transform_point3(self.geometry.wrist_center())
    }
}
