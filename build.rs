//! Build script for scene config validation
//!
//! Runs at compile time and checks `assets/puma.json`: the arm geometry must
//! be usable by the closed-form solver and every point of the target path
//! must put the wrist inside the annulus the two main links can reach.

// Include the shared arm geometry
#[path = "src/arm_constants.rs"]
mod arm_constants;

use arm_constants::ArmGeometry;
use glam::{Mat4, Vec3};
use serde::Deserialize;
use std::f32::consts::{FRAC_PI_2, TAU};
use std::fs;
use std::path::Path;

/// The parts of the scene config this script checks; the rest is ignored
#[derive(Debug, Deserialize)]
struct SceneFile {
    #[serde(default)]
    geometry: ArmGeometry,
    path: Option<PathFile>,
}

#[derive(Debug, Deserialize)]
struct PathFile {
    center: Vec3,
    radius: f32,
    tilt_degrees: f32,
}

/// Number of points checked along the path circle
const PATH_SAMPLES: usize = 360;

/// Check that the wrist center stays reachable along the whole path
fn validate_path(path: &PathFile, geometry: &ArmGeometry) -> Vec<String> {
    let mut errors = Vec::new();

    let tilt = Mat4::from_rotation_z(path.tilt_degrees.to_radians());
    let placement = Mat4::from_translation(path.center) * tilt * Mat4::from_rotation_y(FRAC_PI_2);
    let normal = tilt.transform_vector3(Vec3::X);

    for i in 0..PATH_SAMPLES {
        let t = i as f32 / PATH_SAMPLES as f32 * TAU;
        let local = Vec3::new(path.radius * t.cos(), path.radius * t.sin(), 0.0);
        let wrist = placement.transform_point3(local) + normal * geometry.l3;

        let planar_sq = wrist.x * wrist.x + wrist.z * wrist.z - geometry.dz * geometry.dz;
        if planar_sq < 0.0 {
            errors.push(format!(
                "  sample {} (t={:.3}): wrist {:?} inside the turret offset",
                i, t, wrist
            ));
            continue;
        }

        let height = wrist.y - geometry.dy;
        let distance = (planar_sq + height * height).sqrt();
        if distance > geometry.max_reach() || distance < geometry.min_reach() {
            errors.push(format!(
                "  sample {} (t={:.3}): wrist distance {:.3}m outside [{:.3}, {:.3}]",
                i,
                t,
                distance,
                geometry.min_reach(),
                geometry.max_reach()
            ));
        }
    }

    errors
}

fn validate_scene_file(path: &Path) -> Result<(), String> {
    let contents = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;

    let scene: SceneFile = serde_json::from_str(&contents)
        .map_err(|e| format!("Failed to parse {}: {}", path.display(), e))?;

    let mut errors = scene.geometry.validate();
    if errors.is_empty() {
        if let Some(target_path) = &scene.path {
            errors.extend(validate_path(target_path, &scene.geometry));
        }
    }

    if errors.is_empty() {
        println!(
            "cargo:warning=✓ {} validated (reach {:.2}m)",
            path.display(),
            scene.geometry.max_reach()
        );
        Ok(())
    } else {
        Err(format!(
            "Scene '{}' is invalid:\n{}",
            path.display(),
            errors.join("\n")
        ))
    }
}

fn main() {
    let scene_path = Path::new("assets/puma.json");

    // Rerun if shared constants change
    println!("cargo:rerun-if-changed=src/arm_constants.rs");

    if !scene_path.exists() {
        println!("cargo:warning=Scene config not found, skipping validation");
        return;
    }

    println!("cargo:rerun-if-changed={}", scene_path.display());

    if let Err(e) = validate_scene_file(scene_path) {
        println!("cargo:warning=VALIDATION ERROR: {}", e);
        panic!("Scene validation failed! Fix the geometry or target path in assets/puma.json.");
    }
}
