//! Color buffer export through the `image` crate

use std::path::Path;

use image::RgbaImage;

use crate::rasterizer::Framebuffer;

/// Copy the color buffer into an image with the usual top row first
/// orientation (the framebuffer stores the bottom row first).
pub fn to_rgba_image(fb: &Framebuffer) -> RgbaImage {
    let (width, height) = (fb.width(), fb.height());
    let row = width * 4;
    let mut flipped = Vec::with_capacity(fb.pixels().len());
    for src in fb.pixels().chunks_exact(row).rev() {
        flipped.extend_from_slice(src);
    }
    RgbaImage::from_raw(width as u32, height as u32, flipped)
        .unwrap_or_else(|| RgbaImage::new(width as u32, height as u32))
}

/// Save the color buffer as a PNG (format picked from the extension)
pub fn save_image<P: AsRef<Path>>(fb: &Framebuffer, path: P) -> Result<(), image::ImageError> {
    to_rgba_image(fb).save(path)
}
