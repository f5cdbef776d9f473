//! swraster: a CPU triangle rasterization pipeline
//!
//! Vertices go through a user vertex shader, get clipped in homogeneous clip
//! space, rasterized with barycentric coverage and shaded by a user fragment
//! shader into a z-buffered color target. See [`rasterizer::Pipeline`].

pub mod export;
pub mod logging;
pub mod rasterizer;
pub mod scene;

/// Version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
