//! Scene loading and saving
//!
//! A scene is one draw call plus the configuration to render it, stored as
//! RON (Rusty Object Notation) so it stays human-editable.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::rasterizer::{DrawCall, InterpRule, PipelineConfig, PipelineError, Topology};

/// Error type for scene loading
#[derive(Debug, Error)]
pub enum SceneError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("Serialize error: {0}")]
    Serialize(#[from] ron::Error),
    #[error("Invalid scene: {0}")]
    Invalid(#[from] PipelineError),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    pub name: String,
    pub width: usize,
    pub height: usize,
    pub config: PipelineConfig,
    pub topology: Topology,
    /// Floats per input vertex
    pub stride: usize,
    pub vertices: Vec<f32>,
    #[serde(default)]
    pub indices: Option<Vec<u32>>,
    /// Read-only data for both shader stages
    #[serde(default)]
    pub uniforms: Vec<f32>,
}

impl Scene {
    pub fn draw_call(&self) -> DrawCall<'_> {
        DrawCall {
            topology: self.topology,
            vertices: &self.vertices,
            stride: self.stride,
            indices: self.indices.as_deref(),
        }
    }

    /// Check the config and the draw call without rendering anything
    pub fn validate(&self) -> Result<(), PipelineError> {
        self.config.validate()?;
        if self.width == 0 || self.height == 0 {
            return Err(PipelineError::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }
        self.draw_call().validate()
    }
}

/// Load a scene from a RON file
pub fn load_scene<P: AsRef<Path>>(path: P) -> Result<Scene, SceneError> {
    let contents = fs::read_to_string(path)?;
    load_scene_from_str(&contents)
}

/// Load a scene from a RON string (for embedded scenes or testing)
pub fn load_scene_from_str(s: &str) -> Result<Scene, SceneError> {
    let scene: Scene = ron::from_str(s)?;
    scene.validate()?;
    Ok(scene)
}

/// Save a scene to a RON file
pub fn save_scene<P: AsRef<Path>>(scene: &Scene, path: P) -> Result<(), SceneError> {
    let config = ron::ser::PrettyConfig::new()
        .depth_limit(3)
        .indentor("  ".to_string());

    let contents = ron::ser::to_string_pretty(scene, config)?;
    fs::write(path, contents)?;
    Ok(())
}

/// Unit cube as 12 indexed triangles. Each vertex is
/// `x y z r g b`; the first three slots are smooth, the color flat per face.
pub fn cube_scene() -> Scene {
    let corners = [
        [-1.0, -1.0, -1.0],
        [1.0, -1.0, -1.0],
        [1.0, 1.0, -1.0],
        [-1.0, 1.0, -1.0],
        [-1.0, -1.0, 1.0],
        [1.0, -1.0, 1.0],
        [1.0, 1.0, 1.0],
        [-1.0, 1.0, 1.0],
    ];
    // (quad corners counter-clockwise from outside, face color)
    let faces: [([u32; 4], [f32; 3]); 6] = [
        ([4, 5, 6, 7], [0.9, 0.2, 0.2]),
        ([1, 0, 3, 2], [0.2, 0.9, 0.2]),
        ([5, 1, 2, 6], [0.2, 0.3, 0.9]),
        ([0, 4, 7, 3], [0.9, 0.8, 0.2]),
        ([7, 6, 2, 3], [0.8, 0.3, 0.9]),
        ([0, 1, 5, 4], [0.2, 0.8, 0.8]),
    ];

    let mut vertices = Vec::with_capacity(24 * 6);
    let mut indices = Vec::with_capacity(36);
    for (face, (quad, color)) in faces.iter().enumerate() {
        for &c in quad {
            vertices.extend_from_slice(&corners[c as usize]);
            vertices.extend_from_slice(color);
        }
        let base = face as u32 * 4;
        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    Scene {
        name: "cube".to_string(),
        width: 320,
        height: 240,
        config: PipelineConfig::uniform(6, InterpRule::Smooth)
            .with_rule(3, InterpRule::Flat)
            .with_rule(4, InterpRule::Flat)
            .with_rule(5, InterpRule::Flat),
        topology: Topology::Indexed,
        stride: 6,
        vertices,
        indices: Some(indices),
        uniforms: Vec::new(),
    }
}
