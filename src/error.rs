//! Error types shared by the loader, solver and frame pipeline.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ArmError {
    /// The topology text did not match its declared counts or indices
    #[error("malformed mesh data at line {line}: {reason}")]
    MalformedMeshData { line: usize, reason: String },

    /// Wrist center lies outside the annulus the two main links can reach
    #[error("target out of reach: wrist distance {distance:.4}m outside [{min:.4}, {max:.4}]")]
    OutOfReach { distance: f32, min: f32, max: f32 },

    #[error("{meshes} segment meshes but {transforms} segment transforms")]
    SegmentCountMismatch { meshes: usize, transforms: usize },

    #[error("invalid scene configuration:\n{0}")]
    InvalidGeometry(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config error: {0}")]
    Config(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ArmError>;
