//! Scene configuration loaded from JSON.
//!
//! Every field has a default, so `{}` is a valid config describing the stock
//! Puma scene. `assets/puma.json` is checked against the same geometry rules
//! by `build.rs`.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::arm_constants::ArmGeometry;
use crate::camera::{DEFAULT_DISTANCE, DEFAULT_MAX_DISTANCE, DEFAULT_MIN_DISTANCE};
use crate::shadow::Extrusion;
use crate::{ArmError, Result};

/// Seconds per lap of the target path animation
pub const DEFAULT_LAP_TIME: f32 = 10.0;

/// Circle the tool tip follows, lying on the tilted plate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathConfig {
    pub center: Vec3,
    pub radius: f32,
    /// Plate tilt about Z
    pub tilt_degrees: f32,
    pub revolutions_per_lap: f32,
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            center: Vec3::new(-0.9 - 0.65, -1.0 + 0.65 * 3f32.sqrt(), 0.0),
            radius: 0.5,
            tilt_degrees: 30.0,
            revolutions_per_lap: 2.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LightConfig {
    /// The light rides on the camera eye
    #[default]
    Camera,
    Fixed { position: Vec3 },
}

/// What the frame pipeline does with a target the arm cannot reach
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReachPolicy {
    /// Saturate to the closest boundary pose
    #[default]
    Clamp,
    /// Keep the previous pose and log a warning
    Reject,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub distance: f32,
    pub min_distance: f32,
    pub max_distance: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            distance: DEFAULT_DISTANCE,
            min_distance: DEFAULT_MIN_DISTANCE,
            max_distance: DEFAULT_MAX_DISTANCE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub geometry: ArmGeometry,
    pub lap_time: f32,
    pub path: PathConfig,
    pub light: LightConfig,
    pub extrusion: Extrusion,
    pub reach_policy: ReachPolicy,
    pub camera: CameraConfig,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            geometry: ArmGeometry::PUMA,
            lap_time: DEFAULT_LAP_TIME,
            path: PathConfig::default(),
            light: LightConfig::default(),
            extrusion: Extrusion::default(),
            reach_policy: ReachPolicy::default(),
            camera: CameraConfig::default(),
        }
    }
}

impl SceneConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: SceneConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        let mut errors = self.geometry.validate();
        if !self.lap_time.is_finite() || self.lap_time <= 0.0 {
            errors.push(format!("  lap_time must be positive, got {}", self.lap_time));
        }
        if !self.path.radius.is_finite() || self.path.radius < 0.0 {
            errors.push(format!("  path radius must be non-negative, got {}", self.path.radius));
        }
        if let Extrusion::Projected { distance } = self.extrusion {
            if !distance.is_finite() || distance <= 0.0 {
                errors.push(format!("  extrusion distance must be positive, got {}", distance));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ArmError::InvalidGeometry(errors.join("\n")))
        }
    }
}
