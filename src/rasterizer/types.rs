//! Core types for the rasterizer

use std::ops::{Deref, DerefMut};

use serde::{Deserialize, Serialize};

use super::math::Vec4;
use super::MAX_FLOATS_PER_VERTEX;

/// RGBA color (0-255 per channel)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color { r: 0, g: 0, b: 0, a: 255 };
    pub const WHITE: Color = Color { r: 255, g: 255, b: 255, a: 255 };
    pub const RED: Color = Color { r: 255, g: 0, b: 0, a: 255 };
    pub const GREEN: Color = Color { r: 0, g: 255, b: 0, a: 255 };
    pub const BLUE: Color = Color { r: 0, g: 0, b: 255, a: 255 };

    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub fn with_alpha(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Build an opaque color from channels in 0.0-1.0 (clamped)
    pub fn from_unit(r: f32, g: f32, b: f32) -> Self {
        let q = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        Self::new(q(r), q(g), q(b))
    }

    /// Convert to [u8; 4] for framebuffer
    pub fn to_bytes(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    pub fn from_bytes(bytes: [u8; 4]) -> Self {
        Self::with_alpha(bytes[0], bytes[1], bytes[2], bytes[3])
    }
}

/// How one attribute slot is carried from the vertices to a fragment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InterpRule {
    /// Every fragment receives the provoking (first) vertex's value
    Flat,
    /// Perspective-correct interpolation
    Smooth,
    /// Linear in screen space, ignoring perspective
    NoPerspective,
}

/// Fixed-capacity attribute vector.
///
/// Length is set once when the vertex record is created and never changes,
/// so every record in a pipeline run has the same number of slots.
#[derive(Clone, Copy, PartialEq)]
pub struct Attributes {
    values: [f32; MAX_FLOATS_PER_VERTEX],
    len: usize,
}

impl Attributes {
    /// Zero-filled vector with `len` slots. Returns None past
    /// `MAX_FLOATS_PER_VERTEX`.
    pub fn zeroed(len: usize) -> Option<Self> {
        (len <= MAX_FLOATS_PER_VERTEX).then_some(Self {
            values: [0.0; MAX_FLOATS_PER_VERTEX],
            len,
        })
    }

    /// Copy `values` into a new vector. Returns None if there are more than
    /// `MAX_FLOATS_PER_VERTEX` of them.
    pub fn from_slice(values: &[f32]) -> Option<Self> {
        let mut out = Self::zeroed(values.len())?;
        out.values[..values.len()].copy_from_slice(values);
        Some(out)
    }
}

impl Deref for Attributes {
    type Target = [f32];
    fn deref(&self) -> &[f32] {
        &self.values[..self.len]
    }
}

impl DerefMut for Attributes {
    fn deref_mut(&mut self) -> &mut [f32] {
        &mut self.values[..self.len]
    }
}

impl std::fmt::Debug for Attributes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

/// Vertex shader output: clip-space position plus the attributes that get
/// clipped and interpolated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VertexRecord {
    pub position: Vec4,
    pub attributes: Attributes,
}

impl VertexRecord {
    /// Record with `len` zeroed attribute slots, ready to be filled in by a
    /// vertex shader. None if `len` is over the static maximum.
    pub fn new(len: usize) -> Option<Self> {
        Some(Self {
            position: Vec4::ZERO,
            attributes: Attributes::zeroed(len)?,
        })
    }

    pub fn with_attributes(position: Vec4, attributes: Attributes) -> Self {
        Self { position, attributes }
    }
}

/// Three vertex records; order matters for winding and the provoking vertex
pub type Triangle = [VertexRecord; 3];

/// Interpolated data handed to the fragment shader for one pixel
#[derive(Debug, Clone, Copy)]
pub struct Fragment {
    pub x: usize,
    pub y: usize,
    pub depth: f32,
    pub attributes: Attributes,
}

/// How the vertex stream is grouped into triangles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Topology {
    /// Each group of three vertices is a triangle
    Triangles,
    /// Each group of three indices is a triangle
    Indexed,
    /// Vertex 0 is shared by every triangle
    Fan,
    /// Sliding window of three vertices
    Strip,
}
