use crate::arm_constants::ArmGeometry;
use crate::math::Axis;
use glam::Vec3;

/// One rigid segment of the arm.
/// Ordered base to tool so parents always precede children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum SegmentId {
    // Fixed to the world
    Base = 0,

    // Driven by a1..a5
    Turret = 1,
    UpperArm = 2,
    Forearm = 3,
    Wrist = 4,
    Hand = 5,
}

impl SegmentId {
    /// Total number of segments, base included
    pub const COUNT: usize = 6;

    /// Number of driven joints
    pub const JOINTS: usize = 5;

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// All segments in chain order
    pub const ALL: [SegmentId; Self::COUNT] = [
        SegmentId::Base,
        SegmentId::Turret,
        SegmentId::UpperArm,
        SegmentId::Forearm,
        SegmentId::Wrist,
        SegmentId::Hand,
    ];

    /// The segment this one is mounted on
    #[inline]
    pub const fn parent(self) -> Option<SegmentId> {
        match self {
            SegmentId::Base => None,
            SegmentId::Turret => Some(SegmentId::Base),
            SegmentId::UpperArm => Some(SegmentId::Turret),
            SegmentId::Forearm => Some(SegmentId::UpperArm),
            SegmentId::Wrist => Some(SegmentId::Forearm),
            SegmentId::Hand => Some(SegmentId::Wrist),
        }
    }

    /// Index into the joint angle array (a1 = 0), `None` for the base
    #[inline]
    pub const fn joint(self) -> Option<usize> {
        match self {
            SegmentId::Base => None,
            _ => Some(self.index() - 1),
        }
    }

    /// Segment at chain position `index`
    pub fn from_index(index: usize) -> Option<SegmentId> {
        Self::ALL.get(index).copied()
    }

    /// Segment driven by joint `j` (0-based)
    pub fn from_joint(j: usize) -> Option<SegmentId> {
        Self::ALL.get(j + 1).copied()
    }

    pub fn joint_axis(self) -> Option<Axis> {
        match self {
            SegmentId::Base => None,
            SegmentId::Turret => Some(Axis::Y),
            SegmentId::UpperArm | SegmentId::Forearm | SegmentId::Hand => Some(Axis::Z),
            SegmentId::Wrist => Some(Axis::X),
        }
    }

    /// A point on this segment's joint axis, in model space at rest
    pub fn joint_pivot(self, geometry: &ArmGeometry) -> Option<Vec3> {
        match self {
            SegmentId::Base => None,
            SegmentId::Turret => Some(Vec3::ZERO),
            SegmentId::UpperArm => Some(geometry.shoulder_pivot()),
            SegmentId::Forearm => Some(geometry.elbow_pivot()),
            SegmentId::Wrist => Some(geometry.wrist_roll_pivot()),
            SegmentId::Hand => Some(geometry.wrist_pitch_pivot()),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            SegmentId::Base => "base",
            SegmentId::Turret => "turret",
            SegmentId::UpperArm => "upper_arm",
            SegmentId::Forearm => "forearm",
            SegmentId::Wrist => "wrist",
            SegmentId::Hand => "hand",
        }
    }
}
