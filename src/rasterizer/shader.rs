//! Programmable stages.
//!
//! Both stages are plain functions of their input and the read-only uniform
//! data; any `Fn` with the matching signature is a shader.

use super::types::{Color, Fragment, VertexRecord};

/// Transforms one raw vertex into a clip-space vertex record.
///
/// `out` arrives with its attribute vector already sized to the pipeline's
/// `floats_per_vertex` and zero-filled.
pub trait VertexShader<U: ?Sized> {
    fn shade(&self, input: &[f32], out: &mut VertexRecord, uniforms: &U);
}

impl<U: ?Sized, F> VertexShader<U> for F
where
    F: Fn(&[f32], &mut VertexRecord, &U),
{
    #[inline]
    fn shade(&self, input: &[f32], out: &mut VertexRecord, uniforms: &U) {
        self(input, out, uniforms)
    }
}

/// Computes the color of one accepted fragment.
pub trait FragmentShader<U: ?Sized> {
    fn shade(&self, fragment: &Fragment, uniforms: &U) -> Color;
}

impl<U: ?Sized, F> FragmentShader<U> for F
where
    F: Fn(&Fragment, &U) -> Color,
{
    #[inline]
    fn shade(&self, fragment: &Fragment, uniforms: &U) -> Color {
        self(fragment, uniforms)
    }
}
