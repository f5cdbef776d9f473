//! Core rendering functions
//! Triangle setup, coverage, interpolation and the z-buffered write

use std::ops::{AddAssign, RangeInclusive};

use log::{debug, trace, warn};

use super::assemble::DrawCall;
use super::clip::clip_triangle;
use super::config::PipelineConfig;
use super::error::PipelineError;
use super::framebuffer::Framebuffer;
use super::math::{edge_function, interpolate, perspective_weights, Vec2, Vec3, Vec4, DEGENERATE_AREA};
use super::shader::{FragmentShader, VertexShader};
use super::types::{Fragment, InterpRule, Triangle, VertexRecord};

/// Clip w below this is treated as a degenerate vertex
const MIN_W: f32 = 1e-7;

/// Counters for one or more draw calls
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// Triangles produced by primitive assembly
    pub primitives: usize,
    /// Assembled triangles with nothing left after clipping
    pub clipped_away: usize,
    /// Triangles (after clipping) handed to the rasterizer
    pub rasterized: usize,
    /// Rasterizer input skipped for zero area or w ~ 0
    pub degenerate: usize,
    /// Fragments that passed the depth test and were shaded
    pub fragments_shaded: usize,
    /// Covered pixels that failed the depth test
    pub depth_rejected: usize,
}

impl AddAssign for RenderStats {
    fn add_assign(&mut self, o: RenderStats) {
        self.primitives += o.primitives;
        self.clipped_away += o.clipped_away;
        self.rasterized += o.rasterized;
        self.degenerate += o.degenerate;
        self.fragments_shaded += o.fragments_shaded;
        self.depth_rejected += o.depth_rejected;
    }
}

/// Map a clip-space position to pixel coordinates. Pixel (i, j) has its
/// center at (i, j); z and w are carried along for depth and perspective.
pub fn viewport(position: Vec4, width: usize, height: usize) -> Vec3 {
    let ndc = position.project();
    let (hw, hh) = (0.5 * width as f32, 0.5 * height as f32);
    Vec3::new(hw * ndc.x + hw - 0.5, hh * ndc.y + hh - 0.5, ndc.z)
}

/// Interpolation weights at one covered pixel
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Weights {
    /// Screen-space barycentrics
    pub screen: [f32; 3],
    /// Perspective-corrected barycentrics
    pub world: [f32; 3],
}

/// A clipped triangle after the perspective divide and viewport transform
#[derive(Debug, Clone, Copy)]
pub struct ScreenTriangle {
    p: [Vec2; 3],
    z: [f32; 3],
    w: [f32; 3],
    /// Doubled area, made positive
    area: f32,
    /// -1 when the input winds clockwise on screen
    orient: f32,
    /// Which zero-valued edges count as covered
    owns: [bool; 3],
}

impl ScreenTriangle {
    /// Returns None for a degenerate triangle (w ~ 0 or zero screen area)
    pub fn setup(tri: &Triangle, width: usize, height: usize) -> Option<ScreenTriangle> {
        let w = [tri[0].position.w, tri[1].position.w, tri[2].position.w];
        if !w.iter().all(|w| w.abs() >= MIN_W) {
            return None;
        }
        let s = [
            viewport(tri[0].position, width, height),
            viewport(tri[1].position, width, height),
            viewport(tri[2].position, width, height),
        ];
        let p = [s[0].xy(), s[1].xy(), s[2].xy()];

        let signed = edge_function(p[0], p[1], p[2]);
        // also rejects NaN
        if !(signed.abs() >= DEGENERATE_AREA) || !signed.is_finite() {
            return None;
        }
        let flip = signed < 0.0;
        let orient = if flip { -1.0 } else { 1.0 };

        let owns = [0, 1, 2].map(|k| owns_edge(p[(k + 1) % 3], p[(k + 2) % 3], flip));

        Some(ScreenTriangle {
            p,
            z: [s[0].z, s[1].z, s[2].z],
            w,
            area: signed * orient,
            orient,
            owns,
        })
    }

    /// Pixel bounding box clamped to the image, or None if fully off-image
    pub fn bounds(&self, width: usize, height: usize) -> Option<(RangeInclusive<usize>, RangeInclusive<usize>)> {
        let min_x = self.p.iter().map(|v| v.x).fold(f32::INFINITY, f32::min).floor().max(0.0);
        let max_x = self.p.iter().map(|v| v.x).fold(f32::NEG_INFINITY, f32::max).ceil().min(width as f32 - 1.0);
        let min_y = self.p.iter().map(|v| v.y).fold(f32::INFINITY, f32::min).floor().max(0.0);
        let max_y = self.p.iter().map(|v| v.y).fold(f32::NEG_INFINITY, f32::max).ceil().min(height as f32 - 1.0);

        if min_x > max_x || min_y > max_y {
            return None;
        }
        Some((min_x as usize..=max_x as usize, min_y as usize..=max_y as usize))
    }

    /// Weights at the pixel center (x, y), or None if the pixel is not
    /// covered under the fill rule
    pub fn weights_at(&self, x: f32, y: f32) -> Option<Weights> {
        let pt = Vec2::new(x, y);
        let mut e = [0.0; 3];
        for k in 0..3 {
            e[k] = self.orient * edge_function(self.p[(k + 1) % 3], self.p[(k + 2) % 3], pt);
            if !(e[k] > 0.0 || (e[k] == 0.0 && self.owns[k])) {
                return None;
            }
        }
        let screen = [e[0] / self.area, e[1] / self.area, e[2] / self.area];
        let world = perspective_weights(screen, self.w)?;
        Some(Weights { screen, world })
    }

    /// Depth at a covered pixel: NDC z weighted perspective-correctly
    pub fn depth(&self, weights: &Weights) -> f32 {
        interpolate(weights.world, self.z)
    }
}

/// Fill rule for pixel centers exactly on an edge: with the triangle
/// wound counter-clockwise (y up), an edge owns its pixels if it runs
/// downward, or runs rightward along a row. A shared edge runs opposite
/// ways in its two triangles, so exactly one of them owns it.
fn owns_edge(a: Vec2, b: Vec2, flip: bool) -> bool {
    let (dx, dy) = if flip { (a.x - b.x, a.y - b.y) } else { (b.x - a.x, b.y - a.y) };
    dy < 0.0 || (dy == 0.0 && dx > 0.0)
}

/// Rasterize a single clipped triangle into the framebuffer
pub fn rasterize_triangle<U, F>(
    fb: &mut Framebuffer,
    tri: &Triangle,
    rules: &[InterpRule],
    fragment_shader: &F,
    uniforms: &U,
    stats: &mut RenderStats,
) where
    U: ?Sized,
    F: FragmentShader<U> + ?Sized,
{
    let (width, height) = (fb.width(), fb.height());
    let Some(st) = ScreenTriangle::setup(tri, width, height) else {
        trace!("skipping degenerate triangle {:?}", tri.map(|v| v.position));
        stats.degenerate += 1;
        return;
    };
    stats.rasterized += 1;

    let Some((xs, ys)) = st.bounds(width, height) else {
        return;
    };

    for y in ys {
        for x in xs.clone() {
            let Some(weights) = st.weights_at(x as f32, y as f32) else {
                continue;
            };

            let depth = st.depth(&weights);
            if !fb.depth_test(x, y, depth) {
                stats.depth_rejected += 1;
                continue;
            }

            let mut attributes = tri[0].attributes;
            for (slot, value) in attributes.iter_mut().enumerate() {
                let values = [tri[0].attributes[slot], tri[1].attributes[slot], tri[2].attributes[slot]];
                *value = match rules.get(slot) {
                    Some(InterpRule::Flat) => values[0],
                    Some(InterpRule::NoPerspective) => interpolate(weights.screen, values),
                    _ => interpolate(weights.world, values),
                };
            }

            let fragment = Fragment { x, y, depth, attributes };
            let color = fragment_shader.shade(&fragment, uniforms);
            fb.write(x, y, depth, color);
            stats.fragments_shaded += 1;
        }
    }
}

/// The whole driver: configuration plus the render target it draws into
pub struct Pipeline {
    config: PipelineConfig,
    rules: Vec<InterpRule>,
    /// Zeroed record handed to the vertex shader for every input vertex
    blank: VertexRecord,
    fb: Framebuffer,
}

impl Pipeline {
    /// Validate `config` and allocate a `width` x `height` target
    pub fn new(config: PipelineConfig, width: usize, height: usize) -> Result<Self, PipelineError> {
        let rules = config.rules()?;
        let blank = VertexRecord::new(config.floats_per_vertex)
            .ok_or(PipelineError::too_many_attributes(config.floats_per_vertex))?;
        let fb = Framebuffer::new(width, height)?;
        debug!(
            "pipeline ready: {}x{}, {} floats per vertex",
            width, height, config.floats_per_vertex
        );
        Ok(Self { config, rules, blank, fb })
    }

    /// Reallocate the render target: black, depth +infinity. Also the way
    /// to clear between frames at a new size.
    pub fn initialize_render_target(&mut self, width: usize, height: usize) -> Result<(), PipelineError> {
        self.fb = Framebuffer::new(width, height)?;
        Ok(())
    }

    /// Reset the existing target without reallocating
    pub fn clear(&mut self) {
        self.fb.clear();
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn framebuffer(&self) -> &Framebuffer {
        &self.fb
    }

    /// Assemble, clip and rasterize every primitive of `draw`.
    ///
    /// The draw call is validated first; on error nothing is shaded or
    /// written. Depth values from earlier draws into the same target are
    /// the baseline for this one.
    pub fn render<U, V, F>(
        &mut self,
        draw: &DrawCall<'_>,
        vertex_shader: &V,
        fragment_shader: &F,
        uniforms: &U,
    ) -> Result<RenderStats, PipelineError>
    where
        U: ?Sized,
        V: VertexShader<U> + ?Sized,
        F: FragmentShader<U> + ?Sized,
    {
        draw.validate()?;
        let trailing = draw.trailing();
        if trailing > 0 {
            warn!("{:?} draw ignores {} trailing vertices/indices", draw.topology, trailing);
        }

        let rules = &self.rules;
        let blank = self.blank;
        let fb = &mut self.fb;
        let mut stats = RenderStats::default();

        for indices in draw.primitives() {
            stats.primitives += 1;
            let tri: Triangle = indices.map(|i| {
                let mut out = blank;
                vertex_shader.shade(draw.vertex(i), &mut out, uniforms);
                out
            });

            let mut pieces = 0;
            clip_triangle(&tri, 0, rules, &mut |piece: &Triangle| {
                pieces += 1;
                rasterize_triangle(fb, piece, rules, fragment_shader, uniforms, &mut stats);
            });
            if pieces == 0 {
                stats.clipped_away += 1;
            }
        }

        debug!("{:?} draw: {:?}", draw.topology, stats);
        Ok(stats)
    }
}
