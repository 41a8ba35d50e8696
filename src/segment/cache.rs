use super::id::SegmentId;
use glam::Mat4;

/// Dirty flags for lazy forward kinematics.
/// Bit i corresponds to the segment with index i.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DirtyFlags(u8);

const fn compute_descendant_masks() -> [u8; SegmentId::COUNT] {
    let mut masks = [0u8; SegmentId::COUNT];
    let mut i = 0;
    while i < SegmentId::COUNT {
        let mut mask: u8 = 0;
        let mut j = 0;
        while j < SegmentId::COUNT {
            // Walk j's ancestry looking for i
            let mut curr = Some(SegmentId::ALL[j]);
            while let Some(seg) = curr {
                if seg.index() == i {
                    mask |= 1 << j;
                    break;
                }
                curr = seg.parent();
            }
            j += 1;
        }
        masks[i] = mask;
        i += 1;
    }
    masks
}

const DESCENDANT_MASKS: [u8; SegmentId::COUNT] = compute_descendant_masks();

impl DirtyFlags {
    pub fn all_dirty() -> Self {
        Self((1 << SegmentId::COUNT) - 1)
    }

    #[inline]
    pub fn is_dirty(&self, segment: SegmentId) -> bool {
        (self.0 & (1 << segment.index())) != 0
    }

    #[inline]
    pub fn is_any_dirty(&self) -> bool {
        self.0 != 0
    }

    /// Return new flags with a segment and everything mounted on it marked dirty
    pub fn with_marked_dirty(self, segment: SegmentId) -> Self {
        Self(self.0 | DESCENDANT_MASKS[segment.index()])
    }

    #[inline]
    pub fn with_cleared(self, segment: SegmentId) -> Self {
        Self(self.0 & !(1 << segment.index()))
    }

    #[inline]
    pub fn cleared() -> Self {
        Self(0)
    }
}

/// Cached world matrices of every segment
#[derive(Debug, Clone)]
pub struct PoseCache {
    pub world: [Mat4; SegmentId::COUNT],
    pub dirty: DirtyFlags,
}

impl Default for PoseCache {
    fn default() -> Self {
        Self {
            world: [Mat4::IDENTITY; SegmentId::COUNT],
            dirty: DirtyFlags::all_dirty(),
        }
    }
}
