//! Color and depth buffers for one render target

use super::error::PipelineError;
use super::types::Color;

/// Framebuffer for software rendering.
///
/// Row-major with the bottom row first: pixel (x, y) lives at
/// `y * width + x`, y growing upward.
pub struct Framebuffer {
    pixels: Vec<u8>,   // RGBA, 4 bytes per pixel
    zbuffer: Vec<f32>, // Depth buffer
    width: usize,
    height: usize,
}

impl Framebuffer {
    /// Allocate a black target with every depth at +infinity
    pub fn new(width: usize, height: usize) -> Result<Self, PipelineError> {
        if width == 0 || height == 0 {
            return Err(PipelineError::InvalidDimensions { width, height });
        }
        let len = width
            .checked_mul(height)
            .filter(|n| n.checked_mul(4).is_some())
            .ok_or(PipelineError::InvalidDimensions { width, height })?;

        let mut fb = Self {
            pixels: vec![0; len * 4],
            zbuffer: vec![f32::INFINITY; len],
            width,
            height,
        };
        fb.clear();
        Ok(fb)
    }

    /// Reset every pixel to black and every depth to +infinity
    pub fn clear(&mut self) {
        let bytes = Color::BLACK.to_bytes();
        for px in self.pixels.chunks_exact_mut(4) {
            px.copy_from_slice(&bytes);
        }
        self.zbuffer.fill(f32::INFINITY);
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// RGBA bytes, bottom row first
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn depth(&self) -> &[f32] {
        &self.zbuffer
    }

    pub fn color_at(&self, x: usize, y: usize) -> Option<Color> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = (y * self.width + x) * 4;
        let mut bytes = [0u8; 4];
        bytes.copy_from_slice(&self.pixels[idx..idx + 4]);
        Some(Color::from_bytes(bytes))
    }

    pub fn depth_at(&self, x: usize, y: usize) -> Option<f32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.zbuffer[y * self.width + x])
    }

    /// Does `z` pass the depth test at (x, y)? Strictly closer only.
    #[inline]
    pub fn depth_test(&self, x: usize, y: usize, z: f32) -> bool {
        x < self.width && y < self.height && z < self.zbuffer[y * self.width + x]
    }

    /// Write color and depth for a fragment that already passed `depth_test`
    #[inline]
    pub fn write(&mut self, x: usize, y: usize, z: f32, color: Color) {
        if x < self.width && y < self.height {
            let idx = y * self.width + x;
            self.zbuffer[idx] = z;
            let pixel_idx = idx * 4;
            self.pixels[pixel_idx..pixel_idx + 4].copy_from_slice(&color.to_bytes());
        }
    }
}
