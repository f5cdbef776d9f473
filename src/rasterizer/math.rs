//! Vector math and attribute interpolation
//!
//! Everything here is pure: the clipper and the rasterizer both build on
//! these helpers for lerping along edges and weighting across triangles.

use std::ops::Mul;

/// 2D Vector (screen-space positions)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// 3D Vector
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn xy(self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }
}

/// Homogeneous 4D vector (clip-space positions)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec4 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Vec4 {
    pub const ZERO: Vec4 = Vec4 { x: 0.0, y: 0.0, z: 0.0, w: 0.0 };

    pub fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }

    /// Component by axis index (0 = x, 1 = y, 2 = z, 3 = w)
    pub fn axis(self, axis: usize) -> f32 {
        match axis {
            0 => self.x,
            1 => self.y,
            2 => self.z,
            _ => self.w,
        }
    }

    pub fn lerp(self, other: Vec4, t: f32) -> Vec4 {
        Vec4 {
            x: lerp(self.x, other.x, t),
            y: lerp(self.y, other.y, t),
            z: lerp(self.z, other.z, t),
            w: lerp(self.w, other.w, t),
        }
    }

    /// Perspective divide. Caller guarantees w != 0.
    pub fn project(self) -> Vec3 {
        Vec3::new(self.x / self.w, self.y / self.w, self.z / self.w)
    }
}

/// Column-major 4x4 matrix, laid out the way it is packed into uniform data
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mat4 {
    pub cols: [[f32; 4]; 4],
}

impl Mat4 {
    pub const IDENTITY: Mat4 = Mat4 {
        cols: [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ],
    };

    /// Right-handed perspective projection mapping z into [-1, 1]
    pub fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
        let f = 1.0 / (fov_y * 0.5).tan();
        let nf = 1.0 / (near - far);
        Mat4 {
            cols: [
                [f / aspect, 0.0, 0.0, 0.0],
                [0.0, f, 0.0, 0.0],
                [0.0, 0.0, (far + near) * nf, -1.0],
                [0.0, 0.0, 2.0 * far * near * nf, 0.0],
            ],
        }
    }

    pub fn translation(t: Vec3) -> Mat4 {
        let mut m = Mat4::IDENTITY;
        m.cols[3] = [t.x, t.y, t.z, 1.0];
        m
    }

    pub fn rotation_x(angle: f32) -> Mat4 {
        let (s, c) = angle.sin_cos();
        Mat4 {
            cols: [
                [1.0, 0.0, 0.0, 0.0],
                [0.0, c, s, 0.0],
                [0.0, -s, c, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    pub fn rotation_y(angle: f32) -> Mat4 {
        let (s, c) = angle.sin_cos();
        Mat4 {
            cols: [
                [c, 0.0, -s, 0.0],
                [0.0, 1.0, 0.0, 0.0],
                [s, 0.0, c, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    pub fn transform(&self, v: Vec4) -> Vec4 {
        let c = &self.cols;
        Vec4 {
            x: c[0][0] * v.x + c[1][0] * v.y + c[2][0] * v.z + c[3][0] * v.w,
            y: c[0][1] * v.x + c[1][1] * v.y + c[2][1] * v.z + c[3][1] * v.w,
            z: c[0][2] * v.x + c[1][2] * v.y + c[2][2] * v.z + c[3][2] * v.w,
            w: c[0][3] * v.x + c[1][3] * v.y + c[2][3] * v.z + c[3][3] * v.w,
        }
    }

    pub fn to_array(&self) -> [f32; 16] {
        let mut out = [0.0; 16];
        for (i, col) in self.cols.iter().enumerate() {
            out[i * 4..i * 4 + 4].copy_from_slice(col);
        }
        out
    }

    /// Read a matrix back out of packed uniform data. Returns None if fewer
    /// than 16 floats are available.
    pub fn from_slice(data: &[f32]) -> Option<Mat4> {
        if data.len() < 16 {
            return None;
        }
        let mut cols = [[0.0; 4]; 4];
        for (i, col) in cols.iter_mut().enumerate() {
            col.copy_from_slice(&data[i * 4..i * 4 + 4]);
        }
        Some(Mat4 { cols })
    }
}

impl Mul for Mat4 {
    type Output = Mat4;
    fn mul(self, rhs: Mat4) -> Mat4 {
        let mut cols = [[0.0; 4]; 4];
        for (i, col) in cols.iter_mut().enumerate() {
            let [x, y, z, w] = rhs.cols[i];
            let v = self.transform(Vec4::new(x, y, z, w));
            *col = [v.x, v.y, v.z, v.w];
        }
        Mat4 { cols }
    }
}

impl Default for Mat4 {
    fn default() -> Self {
        Mat4::IDENTITY
    }
}

/// Linear interpolation from `a` (t = 0) to `b` (t = 1)
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Weighted sum of three per-vertex values
#[inline]
pub fn interpolate(weights: [f32; 3], values: [f32; 3]) -> f32 {
    weights[0] * values[0] + weights[1] * values[1] + weights[2] * values[2]
}

/// Fraction along the edge from an inside vertex to an outside vertex at
/// which the plane's signed distance reaches zero.
///
/// `d_in >= 0` and `d_out < 0`, so the denominator never vanishes.
#[inline]
pub fn clip_fraction(d_in: f32, d_out: f32) -> f32 {
    d_in / (d_in - d_out)
}

/// Convert a clip-space edge fraction into the equivalent screen-space
/// fraction for the same point.
///
/// `t` runs toward the endpoint with clip w `w_to`; `w_p` is the clip w of
/// the interpolated point itself.
#[inline]
pub fn screen_fraction(t: f32, w_to: f32, w_p: f32) -> f32 {
    t * w_to / w_p
}

/// Twice the signed area of (a, b, p); positive when p is left of a -> b.
///
/// Endpoints are evaluated in a canonical order, so `edge_function(b, a, p)`
/// is always exactly `-edge_function(a, b, p)`. Triangles sharing an edge
/// therefore agree bit-for-bit on which pixels lie on it.
#[inline]
pub fn edge_function(a: Vec2, b: Vec2, p: Vec2) -> f32 {
    if (a.x, a.y) <= (b.x, b.y) {
        (b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x)
    } else {
        -((a.x - b.x) * (p.y - b.y) - (a.y - b.y) * (p.x - b.x))
    }
}

/// Smallest doubled screen area (in pixels²) treated as a real triangle
pub const DEGENERATE_AREA: f32 = 1e-6;

/// Turn screen-space weights into perspective-correct weights: divide each
/// by its vertex's clip w and renormalize to sum to one.
pub fn perspective_weights(screen: [f32; 3], w: [f32; 3]) -> Option<[f32; 3]> {
    let p = [screen[0] / w[0], screen[1] / w[1], screen[2] / w[2]];
    let sum = p[0] + p[1] + p[2];
    if sum.abs() < f32::EPSILON || !sum.is_finite() {
        return None;
    }
    Some([p[0] / sum, p[1] / sum, p[2] / sum])
}
