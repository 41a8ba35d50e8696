//! wasm-bindgen surface. Thin wrappers that reach the thread-local scene
//! and call into the core modules.

use wasm_bindgen::prelude::*;

use crate::config::SceneConfig;
use crate::math::to_row_major;
use crate::mesh::SegmentMesh;
use crate::segment::SegmentId;
use crate::state::{initialize_scene, with_scene, with_scene_mut, FrameSummary, PumaScene};

fn to_js(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn not_initialized() -> JsValue {
    JsValue::from_str("Scene not initialized, call init_scene first")
}

/// Create the scene from a JSON config (an empty string uses the defaults)
#[wasm_bindgen]
pub fn init_scene(config_json: &str) -> Result<(), JsValue> {
    crate::init_logging();

    let config = if config_json.trim().is_empty() {
        SceneConfig::default()
    } else {
        SceneConfig::from_json(config_json).map_err(to_js)?
    };
    let scene = PumaScene::new(config, Vec::new()).map_err(to_js)?;
    initialize_scene(scene);
    Ok(())
}

/// Parse and attach the topology of one segment (0 = base .. 5 = hand)
#[wasm_bindgen]
pub fn load_segment_mesh(index: usize, text: &str) -> Result<(), JsValue> {
    let segment = SegmentId::from_index(index)
        .ok_or_else(|| JsValue::from_str(&format!("Segment index {} out of range", index)))?;
    let mesh: SegmentMesh = text.parse().map_err(to_js)?;

    with_scene_mut(|scene| scene.set_mesh(segment, mesh)).ok_or_else(not_initialized)
}

/// Advance simulation time (call each frame with delta time) and return a
/// summary of the new frame
#[wasm_bindgen]
pub fn advance_frame(delta_ms: f32) -> Result<JsValue, JsValue> {
    let summary = with_scene_mut(|scene| scene.advance_millis(delta_ms).map(FrameSummary::from))
        .ok_or_else(not_initialized)?
        .map_err(to_js)?;
    serde_wasm_bindgen::to_value(&summary).map_err(to_js)
}

/// World matrices of all segments, row-major, 16 floats each
#[wasm_bindgen]
pub fn segment_matrices() -> Vec<f32> {
    with_scene(|scene| scene.frame().row_major_transforms()).unwrap_or_default()
}

#[wasm_bindgen]
pub fn shadow_vertices(segment: usize) -> Vec<f32> {
    with_scene(|scene| {
        scene
            .frame()
            .shadow
            .segments
            .get(segment)
            .map(|mesh| bytemuck::cast_slice::<_, f32>(&mesh.vertices).to_vec())
            .unwrap_or_default()
    })
    .unwrap_or_default()
}

#[wasm_bindgen]
pub fn shadow_indices(segment: usize) -> Vec<u32> {
    with_scene(|scene| {
        scene
            .frame()
            .shadow
            .segments
            .get(segment)
            .map(|mesh| mesh.indices.clone())
            .unwrap_or_default()
    })
    .unwrap_or_default()
}

/// Orbit the camera from a mouse drag in pixels
#[wasm_bindgen]
pub fn rotate_camera(dx: f32, dy: f32) {
    with_scene_mut(|scene| scene.camera_mut().rotate_pixels(dx, dy));
}

#[wasm_bindgen]
pub fn zoom_camera(d: f32) {
    with_scene_mut(|scene| scene.camera_mut().zoom(d));
}

/// Current light position (x, y, z)
#[wasm_bindgen]
pub fn light_position() -> Vec<f32> {
    with_scene(|scene| scene.light_position().to_array().to_vec()).unwrap_or_default()
}

/// Camera view matrix, row-major
#[wasm_bindgen]
pub fn view_matrix() -> Vec<f32> {
    with_scene(|scene| to_row_major(&scene.camera.view_matrix()).to_vec()).unwrap_or_default()
}
