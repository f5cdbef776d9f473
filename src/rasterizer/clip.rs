//! Homogeneous clipping against the canonical view volume.
//!
//! A clip-space point is visible when `-w <= x, y, z <= w`. Each of the six
//! bounding half-spaces is resolved in turn, depth first: a triangle is split
//! against one plane and every piece is handed on to the next plane. Since
//! `x <= w` and `-x <= w` together force `w >= 0`, anything that survives all
//! six planes can be perspective-divided safely.

use super::math::{clip_fraction, lerp, screen_fraction};
use super::types::{InterpRule, Triangle, VertexRecord};

/// Number of clip planes; plane index `PLANE_COUNT` means "done clipping"
pub const PLANE_COUNT: usize = 6;

/// The six half-spaces `sign * component <= w`, in the order they are applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipPlane {
    /// x <= w
    Right,
    /// -x <= w
    Left,
    /// y <= w
    Top,
    /// -y <= w
    Bottom,
    /// z <= w
    Far,
    /// -z <= w
    Near,
}

impl ClipPlane {
    pub const ALL: [ClipPlane; PLANE_COUNT] = [
        ClipPlane::Right,
        ClipPlane::Left,
        ClipPlane::Top,
        ClipPlane::Bottom,
        ClipPlane::Far,
        ClipPlane::Near,
    ];

    pub fn from_index(i: usize) -> Option<ClipPlane> {
        ClipPlane::ALL.get(i).copied()
    }

    /// Axis (0 = x, 1 = y, 2 = z) and sign of the bounded component
    fn axis_sign(self) -> (usize, f32) {
        match self {
            ClipPlane::Right => (0, 1.0),
            ClipPlane::Left => (0, -1.0),
            ClipPlane::Top => (1, 1.0),
            ClipPlane::Bottom => (1, -1.0),
            ClipPlane::Far => (2, 1.0),
            ClipPlane::Near => (2, -1.0),
        }
    }

    /// `w - sign * component`: zero on the plane, non-negative inside
    pub fn signed_distance(self, v: &VertexRecord) -> f32 {
        let (axis, sign) = self.axis_sign();
        v.position.w - sign * v.position.axis(axis)
    }

    /// Pin a freshly interpolated vertex onto the plane so later planes see
    /// a distance of exactly zero
    fn snap(self, v: &mut VertexRecord) {
        let (axis, sign) = self.axis_sign();
        let on_plane = sign * v.position.w;
        match axis {
            0 => v.position.x = on_plane,
            1 => v.position.y = on_plane,
            _ => v.position.z = on_plane,
        }
    }
}

/// Result of clipping one triangle against one plane
#[derive(Debug, Clone)]
pub enum PlaneClip {
    /// All three vertices outside: nothing survives
    Outside,
    /// All three vertices inside: the input, untouched
    Inside(Triangle),
    /// One vertex inside: a smaller triangle
    Split1(Triangle),
    /// Two vertices inside: a quad, as two triangles with the input winding
    Split2([Triangle; 2]),
}

impl PlaneClip {
    pub fn triangles(&self) -> &[Triangle] {
        match self {
            PlaneClip::Outside => &[],
            PlaneClip::Inside(t) | PlaneClip::Split1(t) => std::slice::from_ref(t),
            PlaneClip::Split2(ts) => ts,
        }
    }
}

/// Intersect edge `inside -> outside` with the plane, interpolating the
/// position and every attribute slot at the same point
fn intersect(
    plane: ClipPlane,
    inside: &VertexRecord,
    outside: &VertexRecord,
    d_in: f32,
    d_out: f32,
    rules: &[InterpRule],
) -> VertexRecord {
    let t = clip_fraction(d_in, d_out);
    let mut v = *inside;
    v.position = inside.position.lerp(outside.position, t);
    plane.snap(&mut v);

    let s = if v.position.w.abs() > f32::EPSILON {
        screen_fraction(t, outside.position.w, v.position.w)
    } else {
        t
    };

    for (slot, value) in v.attributes.iter_mut().enumerate() {
        let to = outside.attributes[slot];
        *value = match rules.get(slot) {
            Some(InterpRule::NoPerspective) => lerp(*value, to, s),
            // provoking value is restored by carry_flat
            Some(InterpRule::Flat) => *value,
            _ => lerp(*value, to, t),
        };
    }
    v
}

/// Give every vertex of `tri` the provoking vertex's flat attributes, so a
/// re-triangulated piece shades with the same flat values as its parent
fn carry_flat(tri: &mut Triangle, provoking: &VertexRecord, rules: &[InterpRule]) {
    for (slot, rule) in rules.iter().enumerate() {
        if *rule == InterpRule::Flat {
            for v in tri.iter_mut() {
                v.attributes[slot] = provoking.attributes[slot];
            }
        }
    }
}

/// Clip one triangle against a single plane
pub fn clip_against_plane(tri: &Triangle, plane: ClipPlane, rules: &[InterpRule]) -> PlaneClip {
    let d = [
        plane.signed_distance(&tri[0]),
        plane.signed_distance(&tri[1]),
        plane.signed_distance(&tri[2]),
    ];
    let inside = [d[0] >= 0.0, d[1] >= 0.0, d[2] >= 0.0];
    let provoking = &tri[0];

    match inside.iter().filter(|&&i| i).count() {
        3 => PlaneClip::Inside(*tri),
        0 => PlaneClip::Outside,
        1 => {
            // Rotate so the inside vertex leads; rotation keeps the winding
            let i = inside.iter().position(|&b| b).unwrap_or(0);
            let (a, b) = ((i + 1) % 3, (i + 2) % 3);
            let pa = intersect(plane, &tri[i], &tri[a], d[i], d[a], rules);
            let pb = intersect(plane, &tri[i], &tri[b], d[i], d[b], rules);
            let mut out = [tri[i], pa, pb];
            carry_flat(&mut out, provoking, rules);
            PlaneClip::Split1(out)
        }
        _ => {
            // Walking o -> a -> b, the surviving region is pa, a, b, pb
            let o = inside.iter().position(|&b| !b).unwrap_or(0);
            let (a, b) = ((o + 1) % 3, (o + 2) % 3);
            let pa = intersect(plane, &tri[a], &tri[o], d[a], d[o], rules);
            let pb = intersect(plane, &tri[b], &tri[o], d[b], d[o], rules);
            let mut first = [pa, tri[a], tri[b]];
            let mut second = [pa, tri[b], pb];
            carry_flat(&mut first, provoking, rules);
            carry_flat(&mut second, provoking, rules);
            PlaneClip::Split2([first, second])
        }
    }
}

/// Clip `tri` against planes `plane..PLANE_COUNT`, handing each surviving
/// piece to `emit`. Called with `plane == PLANE_COUNT` it forwards the
/// triangle unchanged.
pub fn clip_triangle<F>(tri: &Triangle, plane: usize, rules: &[InterpRule], emit: &mut F)
where
    F: FnMut(&Triangle),
{
    let Some(clip_plane) = ClipPlane::from_index(plane) else {
        emit(tri);
        return;
    };
    for piece in clip_against_plane(tri, clip_plane, rules).triangles() {
        clip_triangle(piece, plane + 1, rules, emit);
    }
}

/// Clip against all six planes and collect the pieces
pub fn clip(tri: &Triangle, rules: &[InterpRule]) -> Vec<Triangle> {
    let mut out = Vec::new();
    clip_triangle(tri, 0, rules, &mut |t: &Triangle| out.push(*t));
    out
}
