//! Scene state and the per-frame pipeline.
//!
//! `PumaScene` owns everything that lives across frames: config, static
//! segment meshes, the animation clock, camera and current pose. One call to
//! [`PumaScene::update`] runs path sample → IK → pose → shadow volume and
//! stores the result as the current [`Frame`].
//!
//! Core functions take the scene explicitly; the thread-local holder at the
//! bottom exists only for the wasm bindings.

use std::cell::RefCell;

use glam::{Mat4, Vec3};
use serde::Serialize;

use crate::camera::Camera;
use crate::math::to_row_major;
use crate::config::{LightConfig, ReachPolicy, SceneConfig};
use crate::ik::{InverseKinematics, JointAngles, Reach};
use crate::mesh::SegmentMesh;
use crate::scene::{AnimationState, TargetPath};
use crate::segment::{ArmPose, SegmentId};
use crate::shadow::{ShadowVolume, ShadowVolumeBuilder};
use crate::{ArmError, Result};

/// Output of one frame, handed to the renderer
#[derive(Debug, Clone)]
pub struct Frame {
    pub target: Vec3,
    pub normal: Vec3,
    pub angles: JointAngles,
    pub reach: Reach,
    /// World matrix of each segment in chain order
    pub transforms: [Mat4; SegmentId::COUNT],
    pub shadow: ShadowVolume,
}

impl Default for Frame {
    fn default() -> Self {
        Self {
            target: Vec3::ZERO,
            normal: Vec3::X,
            angles: JointAngles::ZERO,
            reach: Reach::Within,
            transforms: [Mat4::IDENTITY; SegmentId::COUNT],
            shadow: ShadowVolume::default(),
        }
    }
}

impl Frame {
    /// Segment matrices flattened row-major, 16 floats each
    pub fn row_major_transforms(&self) -> Vec<f32> {
        self.transforms.iter().flat_map(to_row_major).collect()
    }
}

/// Serializable digest of a frame for the JS side
#[derive(Debug, Clone, Serialize)]
pub struct FrameSummary {
    pub target: Vec3,
    pub normal: Vec3,
    pub angles: JointAngles,
    pub reach: Reach,
    pub silhouette_edges: usize,
    pub shadow_indices: usize,
}

impl From<&Frame> for FrameSummary {
    fn from(frame: &Frame) -> Self {
        Self {
            target: frame.target,
            normal: frame.normal,
            angles: frame.angles,
            reach: frame.reach,
            silhouette_edges: frame.shadow.edge_count(),
            shadow_indices: frame.shadow.index_count(),
        }
    }
}

pub struct PumaScene {
    pub config: SceneConfig,
    /// One mesh per segment, chain order; empty meshes cast no shadow
    meshes: Vec<SegmentMesh>,
    pub animation: AnimationState,
    pub camera: Camera,
    pub path: TargetPath,
    solver: InverseKinematics,
    builder: ShadowVolumeBuilder,
    pose: ArmPose,
    frame: Frame,
}

impl PumaScene {
    /// Build the scene and compute its first frame.
    ///
    /// `meshes` is either empty (meshes attached later) or one per segment.
    pub fn new(config: SceneConfig, meshes: Vec<SegmentMesh>) -> Result<Self> {
        config.validate()?;

        let meshes = match meshes.len() {
            0 => vec![SegmentMesh::default(); SegmentId::COUNT],
            SegmentId::COUNT => meshes,
            n => {
                return Err(ArmError::SegmentCountMismatch {
                    meshes: n,
                    transforms: SegmentId::COUNT,
                })
            }
        };

        let camera = Camera::new(
            config.camera.min_distance,
            config.camera.max_distance,
            config.camera.distance,
        );

        let mut scene = Self {
            config,
            meshes,
            animation: AnimationState::default(),
            camera,
            path: TargetPath::from_config(&config.path),
            solver: InverseKinematics::new(config.geometry),
            builder: ShadowVolumeBuilder::new(config.extrusion),
            pose: ArmPose::new(config.geometry),
            frame: Frame::default(),
        };
        scene.update(0.0)?;

        log::info!(
            "Scene ready: reach {:.2}m, lap {:.1}s, {:?} policy",
            config.geometry.max_reach(),
            config.lap_time,
            config.reach_policy
        );
        Ok(scene)
    }

    /// Replace the mesh of one segment
    pub fn set_mesh(&mut self, segment: SegmentId, mesh: SegmentMesh) {
        self.meshes[segment.index()] = mesh;
    }

    pub fn meshes(&self) -> &[SegmentMesh] {
        &self.meshes
    }

    pub fn light_position(&self) -> Vec3 {
        match self.config.light {
            LightConfig::Camera => self.camera.eye_position(),
            LightConfig::Fixed { position } => position,
        }
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    pub fn pose(&self) -> &ArmPose {
        &self.pose
    }

    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    /// Frame-loop step with the delta in milliseconds, as browsers report it
    pub fn advance_millis(&mut self, delta_ms: f32) -> Result<&Frame> {
        self.update(delta_ms / 1000.0)
    }

    /// Advance the clock by `delta_seconds` and rebuild the frame
    pub fn update(&mut self, delta_seconds: f32) -> Result<&Frame> {
        let config = &self.config;
        self.animation = self.animation.advance(delta_seconds, config.lap_time);
        let phase = self
            .animation
            .phase(config.lap_time, config.path.revolutions_per_lap);
        let (target, normal) = self.path.sample(phase);

        let solution = self.solver.solve_with_reach(target, normal);
        match (solution.reach, config.reach_policy) {
            (Reach::Clamped, ReachPolicy::Reject) => {
                log::warn!(
                    "Target {:?} out of reach (wrist distance {:.3}m), keeping previous pose",
                    target,
                    solution.wrist_distance
                );
            }
            _ => {
                let pose = std::mem::take(&mut self.pose);
                self.pose = pose.with_angles(solution.angles);
            }
        }

        let transforms = self.pose.segment_matrices();
        let light = self.light_position();
        let shadow = self.builder.build(&self.meshes, &transforms, light)?;

        self.frame = Frame {
            target,
            normal,
            angles: self.pose.angles(),
            reach: solution.reach,
            transforms,
            shadow,
        };
        Ok(&self.frame)
    }
}

// Global state access, thin wrapper for WASM bindings only
thread_local! {
    static SCENE: RefCell<Option<PumaScene>> = const { RefCell::new(None) };
}

/// Execute a closure with immutable access to the scene
///
/// Returns None if the scene is not initialized
pub fn with_scene<F, R>(f: F) -> Option<R>
where
    F: FnOnce(&PumaScene) -> R,
{
    SCENE.with(|scene| {
        let borrowed = scene.borrow();
        borrowed.as_ref().map(f)
    })
}

/// Execute a closure with mutable access to the scene
///
/// Returns None if the scene is not initialized
pub fn with_scene_mut<F, R>(f: F) -> Option<R>
where
    F: FnOnce(&mut PumaScene) -> R,
{
    SCENE.with(|scene| {
        let mut borrowed = scene.borrow_mut();
        borrowed.as_mut().map(f)
    })
}

/// Install a scene, replacing any previous one
pub fn initialize_scene(scene: PumaScene) {
    SCENE.with(|slot| {
        *slot.borrow_mut() = Some(scene);
    });
}
