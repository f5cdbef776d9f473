//! Software triangle rasterizer
//!
//! Pipeline stages, in order:
//! - Primitive assembly (triangle list, indexed, fan, strip)
//! - Vertex shading into clip space
//! - Clipping against the six planes of the view volume
//! - Perspective divide, viewport transform, barycentric coverage
//! - Flat / perspective-correct / screen-linear attribute interpolation
//! - Fragment shading and z-buffered writes

mod assemble;
mod clip;
mod config;
mod error;
mod framebuffer;
mod math;
mod render;
mod shader;
mod types;

pub use assemble::*;
pub use clip::*;
pub use config::*;
pub use error::*;
pub use framebuffer::*;
pub use math::*;
pub use render::*;
pub use shader::*;
pub use types::*;

/// Static maximum number of attribute floats per vertex
pub const MAX_FLOATS_PER_VERTEX: usize = 64;
