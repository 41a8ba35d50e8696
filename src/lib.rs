//! Puma arm scene - Wasm Core
//!
//! Closed-form inverse kinematics for a 5-DOF Puma-style arm, the segment
//! transform chain that places its six rigid meshes, and per-frame shadow
//! volumes built from silhouette edges.

mod arm_constants;
pub mod camera;
pub mod config;
mod error;
pub mod ik;
pub mod math;
pub mod mesh;
pub mod scene;
pub mod segment;
pub mod shadow;
pub mod state;

#[cfg(target_arch = "wasm32")]
pub mod web;

pub use arm_constants::ArmGeometry;
pub use error::{ArmError, Result};
pub use glam::{Mat4, Vec3};

pub use camera::Camera;
pub use config::{ReachPolicy, SceneConfig};
pub use ik::{InverseKinematics, JointAngles, Reach};
pub use mesh::{Edge, SegmentMesh};
pub use segment::{ArmPose, SegmentId};
pub use shadow::{Extrusion, ShadowVolume, ShadowVolumeBuilder, ShadowVolumeMesh};
pub use state::{Frame, PumaScene};

#[cfg(target_arch = "wasm32")]
pub use web::{
    advance_frame, init_scene, light_position, load_segment_mesh, rotate_camera, segment_matrices,
    shadow_indices, shadow_vertices, view_matrix, zoom_camera,
};

/// Install the log sink for the current target. Safe to call more than once.
pub fn init_logging() {
    cfg_if::cfg_if! {
        if #[cfg(target_arch = "wasm32")] {
            console_error_panic_hook::set_once();
            console_log::init_with_level(log::Level::Info).ok();
        } else {
            env_logger::try_init().ok();
        }
    }
}
