//! End-to-end draws through `Pipeline::render`

use std::cell::{Cell, RefCell};

use swraster::rasterizer::{
    Color, DrawCall, Fragment, InterpRule, Mat4, Pipeline, PipelineConfig, PipelineError, Vec4, VertexRecord,
};

const SIZE: usize = 64;
const NO_UNIFORMS: &[f32] = &[];

/// Clip-space coordinate (w = 1) of pixel center `px` in a 64-pixel axis
fn px(p: f32) -> f32 {
    (p + 0.5 - 32.0) / 32.0
}

/// Input layout: `x y z w` clip position, then the attribute slots
fn passthrough(input: &[f32], out: &mut VertexRecord, _uniforms: &[f32]) {
    out.position = Vec4::new(input[0], input[1], input[2], input[3]);
    let n = out.attributes.len();
    out.attributes.copy_from_slice(&input[4..4 + n]);
}

/// Attributes 0..3 are RGB
fn rgb(fragment: &Fragment, _uniforms: &[f32]) -> Color {
    let a = &fragment.attributes;
    Color::from_unit(a[0], a[1], a[2])
}

fn vertex_at(x: f32, y: f32, z: f32, attrs: &[f32]) -> Vec<f32> {
    let mut v = vec![px(x), px(y), z, 1.0];
    v.extend_from_slice(attrs);
    v
}

fn pipeline(rules: &[InterpRule]) -> Pipeline {
    let config = PipelineConfig::new(rules.len()).with_rules(rules);
    Pipeline::new(config, SIZE, SIZE).unwrap()
}

#[test]
fn fresh_target_is_black_and_infinitely_deep() {
    let p = Pipeline::new(PipelineConfig::uniform(3, InterpRule::Smooth), 4, 4).unwrap();
    let fb = p.framebuffer();
    for y in 0..4 {
        for x in 0..4 {
            assert_eq!(fb.color_at(x, y), Some(Color::BLACK));
            assert_eq!(fb.depth_at(x, y), Some(f32::INFINITY));
        }
    }
}

#[test]
fn flat_color_and_smooth_value_on_axis_aligned_triangle() {
    use InterpRule::*;
    let mut p = pipeline(&[Flat, Flat, Flat, Smooth]);
    let mut verts = vertex_at(10.0, 10.0, 0.0, &[1.0, 0.0, 0.0, 0.0]);
    verts.extend(vertex_at(20.0, 10.0, 0.0, &[0.0, 0.0, 1.0, 1.0]));
    verts.extend(vertex_at(10.0, 20.0, 0.0, &[0.0, 1.0, 0.0, 1.0]));

    let seen = RefCell::new(Vec::new());
    let shade = |f: &Fragment, u: &[f32]| -> Color {
        seen.borrow_mut().push((f.x, f.y, f.attributes[3]));
        rgb(f, u)
    };
    let stats = p.render(&DrawCall::triangles(&verts, 8), &passthrough, &shade, NO_UNIFORMS).unwrap();
    assert_eq!(stats.rasterized, 1);

    let fb = p.framebuffer();
    assert_eq!(fb.color_at(10, 10), Some(Color::RED));
    // every fragment takes the provoking vertex's flat color
    assert_eq!(fb.color_at(14, 12), Some(Color::RED));
    assert_eq!(fb.color_at(9, 10), Some(Color::BLACK));

    let seen = seen.into_inner();
    let value_at = |x, y| seen.iter().find(|s| s.0 == x && s.1 == y).map(|s| s.2);
    assert_eq!(value_at(10, 10), Some(0.0));
    let centroid = value_at(13, 13).unwrap();
    assert!((centroid - 2.0 / 3.0).abs() < 0.1, "centroid value {}", centroid);
}

#[test]
fn shared_edge_is_shaded_exactly_once() {
    let mut p = pipeline(&[InterpRule::Smooth; 3]);
    let white = [1.0, 1.0, 1.0];
    let mut verts = Vec::new();
    for (x, y) in [(2.0, 2.0), (12.0, 2.0), (12.0, 12.0), (2.0, 2.0), (12.0, 12.0), (2.0, 12.0)] {
        verts.extend(vertex_at(x, y, 0.0, &white));
    }

    let hits = RefCell::new(vec![0u32; SIZE * SIZE]);
    let count = |f: &Fragment, _: &[f32]| -> Color {
        hits.borrow_mut()[f.y * SIZE + f.x] += 1;
        Color::WHITE
    };
    let stats = p.render(&DrawCall::triangles(&verts, 7), &passthrough, &count, NO_UNIFORMS).unwrap();
    assert_eq!(stats.depth_rejected, 0);

    let hits = hits.into_inner();
    assert!(hits.iter().all(|&h| h <= 1));
    for y in 3..12 {
        for x in 3..12 {
            assert_eq!(hits[y * SIZE + x], 1, "pixel ({}, {})", x, y);
        }
    }
}

#[test]
fn fan_center_vertex_is_covered_once() {
    let mut p = pipeline(&[InterpRule::Smooth; 3]);
    let ring = [
        (30.0, 20.0), (27.0, 27.0), (20.0, 30.0), (13.0, 27.0),
        (10.0, 20.0), (13.0, 13.0), (20.0, 10.0), (27.0, 13.0), (30.0, 20.0),
    ];
    let mut verts = vertex_at(20.0, 20.0, 0.0, &[1.0, 1.0, 1.0]);
    for (x, y) in ring {
        verts.extend(vertex_at(x, y, 0.0, &[1.0, 1.0, 1.0]));
    }

    let hits = RefCell::new(vec![0u32; SIZE * SIZE]);
    let count = |f: &Fragment, _: &[f32]| -> Color {
        hits.borrow_mut()[f.y * SIZE + f.x] += 1;
        Color::WHITE
    };
    let stats = p.render(&DrawCall::fan(&verts, 7), &passthrough, &count, NO_UNIFORMS).unwrap();
    assert_eq!(stats.primitives, 8);
    assert_eq!(stats.depth_rejected, 0);

    let hits = hits.into_inner();
    assert!(hits.iter().all(|&h| h <= 1));
    assert_eq!(hits[20 * SIZE + 20], 1);
    assert_eq!(hits[20 * SIZE + 25], 1);
}

#[test]
fn strip_fan_and_list_cover_the_same_quad() {
    let corners = [(4.0, 4.0), (20.0, 4.0), (20.0, 18.0), (4.0, 18.0)];
    let v = |i: usize| vertex_at(corners[i].0, corners[i].1, 0.0, &[1.0, 1.0, 1.0]);

    let list: Vec<f32> = [0, 1, 2, 0, 2, 3].iter().flat_map(|&i| v(i)).collect();
    let fan: Vec<f32> = [0, 1, 2, 3].iter().flat_map(|&i| v(i)).collect();
    let strip: Vec<f32> = [0, 1, 3, 2].iter().flat_map(|&i| v(i)).collect();

    let mut images = Vec::new();
    for draw in [DrawCall::triangles(&list, 7), DrawCall::fan(&fan, 7), DrawCall::strip(&strip, 7)] {
        let mut p = pipeline(&[InterpRule::Smooth; 3]);
        let stats = p.render(&draw, &passthrough, &rgb, NO_UNIFORMS).unwrap();
        assert_eq!(stats.primitives, 2);
        assert_eq!(stats.depth_rejected, 0);
        images.push(p.framebuffer().pixels().to_vec());
    }
    assert_eq!(images[0], images[1]);
    assert_eq!(images[0], images[2]);
}

#[test]
fn depth_accumulates_across_draws() {
    let mut p = pipeline(&[InterpRule::Smooth; 3]);
    let tri = |z: f32, color: [f32; 3], scale: f32| -> Vec<f32> {
        let mut v = vertex_at(5.0, 5.0, z, &color);
        v.extend(vertex_at(5.0 + 40.0 * scale, 5.0, z, &color));
        v.extend(vertex_at(5.0, 5.0 + 40.0 * scale, z, &color));
        v
    };

    let far_red = tri(0.5, [1.0, 0.0, 0.0], 1.0);
    let near_green = tri(-0.5, [0.0, 1.0, 0.0], 0.5);
    let behind_blue = tri(0.8, [0.0, 0.0, 1.0], 1.0);
    let tie_white = tri(0.5, [1.0, 1.0, 1.0], 1.0);

    for verts in [&far_red, &near_green, &behind_blue, &tie_white] {
        p.render(&DrawCall::triangles(verts, 7), &passthrough, &rgb, NO_UNIFORMS).unwrap();
    }

    let fb = p.framebuffer();
    assert_eq!(fb.color_at(8, 8), Some(Color::GREEN));
    assert!((fb.depth_at(8, 8).unwrap() + 0.5).abs() < 1e-5);
    assert_eq!(fb.color_at(30, 8), Some(Color::RED));
    assert!((fb.depth_at(30, 8).unwrap() - 0.5).abs() < 1e-5);
    assert_eq!(fb.color_at(50, 50), Some(Color::BLACK));
    assert!(fb.pixels().chunks_exact(4).all(|c| c != [0, 0, 255, 255] && c != [255, 255, 255, 255]));
}

#[test]
fn hidden_fragments_never_reach_the_shader() {
    let mut p = pipeline(&[InterpRule::Smooth; 3]);
    let tri = |z: f32| -> Vec<f32> {
        let mut v = vertex_at(4.0, 4.0, z, &[1.0, 0.0, 0.0]);
        v.extend(vertex_at(40.0, 6.0, z, &[1.0, 0.0, 0.0]));
        v.extend(vertex_at(8.0, 44.0, z, &[1.0, 0.0, 0.0]));
        v
    };
    let near = tri(-0.25);
    let far = tri(0.75);

    let first = p.render(&DrawCall::triangles(&near, 7), &passthrough, &rgb, NO_UNIFORMS).unwrap();
    assert!(first.fragments_shaded > 0);

    let calls = Cell::new(0);
    let counting = |_: &Fragment, _: &[f32]| -> Color {
        calls.set(calls.get() + 1);
        Color::BLUE
    };
    let second = p.render(&DrawCall::triangles(&far, 7), &passthrough, &counting, NO_UNIFORMS).unwrap();
    assert_eq!(calls.get(), 0);
    assert_eq!(second.fragments_shaded, 0);
    assert_eq!(second.depth_rejected, first.fragments_shaded);
    assert_eq!(p.framebuffer().color_at(10, 10), Some(Color::RED));
}

/// Input `x y z`; the uniforms are a packed model-view-projection matrix
fn project(input: &[f32], out: &mut VertexRecord, uniforms: &[f32]) {
    let mvp = Mat4::from_slice(uniforms).unwrap();
    out.position = mvp.transform(Vec4::new(input[0], input[1], input[2], 1.0));
    out.attributes[0] = input[0];
}

#[test]
fn clipped_perspective_mesh_covers_every_pixel_once() {
    // A wall turned away from the camera, much larger than the view, so
    // every side plane cuts it and w varies across the screen
    const CELLS: usize = 24;
    let mut vertices = Vec::new();
    for i in 0..=CELLS {
        for j in 0..=CELLS {
            let x = -6.0 + 0.5 * j as f32;
            let y = -6.0 + 0.5 * i as f32;
            vertices.extend_from_slice(&[x, y, -4.0 + 0.4 * x]);
        }
    }
    let mut indices = Vec::new();
    let at = |i: usize, j: usize| (i * (CELLS + 1) + j) as u32;
    for i in 0..CELLS {
        for j in 0..CELLS {
            let (a, b, c, d) = (at(i, j), at(i, j + 1), at(i + 1, j + 1), at(i + 1, j));
            // alternate the diagonal and the winding from cell to cell
            if (i + j) % 2 == 0 {
                indices.extend_from_slice(&[a, b, c, a, c, d]);
            } else {
                indices.extend_from_slice(&[b, a, d, b, d, c]);
            }
        }
    }

    let mvp = Mat4::perspective(1.0, 1.0, 0.5, 20.0).to_array();
    let mut p = Pipeline::new(PipelineConfig::uniform(1, InterpRule::Smooth), SIZE, SIZE).unwrap();
    let hits = RefCell::new(vec![0u32; SIZE * SIZE]);
    let count = |f: &Fragment, _: &[f32]| -> Color {
        hits.borrow_mut()[f.y * SIZE + f.x] += 1;
        Color::WHITE
    };
    let stats = p
        .render(&DrawCall::indexed(&vertices, 3, &indices), &project, &count, &mvp[..])
        .unwrap();

    assert_eq!(stats.primitives, 2 * CELLS * CELLS);
    assert!(stats.clipped_away > 0);
    // some triangles straddle a side plane and come back as two pieces
    assert!(stats.rasterized + stats.degenerate > stats.primitives - stats.clipped_away);
    assert_eq!(stats.depth_rejected, 0);
    let hits = hits.into_inner();
    for (i, &h) in hits.iter().enumerate() {
        assert_eq!(h, 1, "pixel ({}, {}) shaded {} times", i % SIZE, i / SIZE, h);
    }
}

#[test]
fn smooth_and_noperspective_differ_under_perspective() {
    use InterpRule::*;
    let mut p = pipeline(&[Smooth, NoPerspective]);
    // v1 sits at w = 4; scale its clip x/y so it still lands on (40, 10)
    let mut verts = vec![px(10.0), px(10.0), 0.0, 1.0, 0.0, 0.0];
    verts.extend([px(40.0) * 4.0, px(10.0) * 4.0, 0.0, 4.0, 1.0, 1.0]);
    verts.extend([px(10.0), px(40.0), 0.0, 1.0, 0.0, 0.0]);

    let samples = RefCell::new(Vec::new());
    let record = |f: &Fragment, _: &[f32]| -> Color {
        samples.borrow_mut().push((f.attributes[0], f.attributes[1]));
        Color::WHITE
    };
    p.render(&DrawCall::triangles(&verts, 6), &passthrough, &record, NO_UNIFORMS).unwrap();

    let samples = samples.into_inner();
    assert!(samples.len() > 100);
    for (smooth, linear) in samples {
        // world weight of v1 is (n / 4) / (1 - n + n / 4) for screen weight n
        let expected = (linear / 4.0) / (1.0 - linear + linear / 4.0);
        assert!((smooth - expected).abs() < 1e-4, "{} vs {}", smooth, expected);
        assert!(smooth <= linear + 1e-6);
    }
}

#[test]
fn triangle_through_near_plane_is_clipped_safely() {
    let mut p = pipeline(&[InterpRule::Smooth; 3]);
    let mut verts = vec![-0.5, -0.5, 0.0, 1.0, 1.0, 1.0, 1.0];
    verts.extend([0.5, -0.5, 0.0, 1.0, 1.0, 1.0, 1.0]);
    // behind the eye
    verts.extend([0.0, 0.5, 2.0, -1.0, 1.0, 1.0, 1.0]);

    let stats = p.render(&DrawCall::triangles(&verts, 7), &passthrough, &rgb, NO_UNIFORMS).unwrap();
    assert_eq!(stats.clipped_away, 0);
    assert!(stats.fragments_shaded > 0);
    for &d in p.framebuffer().depth() {
        assert!(d.is_infinite() || (-1.0001..=1.0001).contains(&d), "depth {}", d);
    }
}

#[test]
fn offscreen_triangle_is_clipped_away() {
    let mut p = pipeline(&[InterpRule::Smooth; 3]);
    let mut verts = vec![2.0, 2.0, 0.0, 1.0, 1.0, 1.0, 1.0];
    verts.extend([3.0, 2.0, 0.0, 1.0, 1.0, 1.0, 1.0]);
    verts.extend([2.0, 3.0, 0.0, 1.0, 1.0, 1.0, 1.0]);
    let stats = p.render(&DrawCall::triangles(&verts, 7), &passthrough, &rgb, NO_UNIFORMS).unwrap();
    assert_eq!(stats.clipped_away, 1);
    assert_eq!(stats.rasterized, 0);
    assert_eq!(stats.fragments_shaded, 0);
}

#[test]
fn invalid_index_draws_nothing() {
    let mut p = pipeline(&[InterpRule::Smooth; 3]);
    let mut verts = vertex_at(5.0, 5.0, 0.0, &[1.0, 1.0, 1.0]);
    verts.extend(vertex_at(30.0, 5.0, 0.0, &[1.0, 1.0, 1.0]));
    verts.extend(vertex_at(5.0, 30.0, 0.0, &[1.0, 1.0, 1.0]));
    let indices = [0, 1, 2, 2, 1, 7];

    let never = |_: &Fragment, _: &[f32]| -> Color { panic!("nothing should be shaded") };
    let err = p
        .render(&DrawCall::indexed(&verts, 7, &indices), &passthrough, &never, NO_UNIFORMS)
        .unwrap_err();
    assert_eq!(err, PipelineError::InvalidIndex { index: 7, position: 5, vertex_count: 3 });
    assert!(!err.is_configuration());
    assert!(p.framebuffer().depth().iter().all(|d| d.is_infinite()));
}

#[test]
fn configuration_errors_fail_at_setup() {
    let too_many = PipelineConfig::uniform(65, InterpRule::Flat);
    let err = Pipeline::new(too_many, 8, 8).err().unwrap();
    assert!(err.is_configuration());

    let unset = PipelineConfig::new(3).with_rules(&[InterpRule::Flat]);
    assert_eq!(Pipeline::new(unset, 8, 8).err(), Some(PipelineError::UnsetInterpRule { slot: 1 }));

    let ok = PipelineConfig::uniform(3, InterpRule::Flat);
    assert!(Pipeline::new(ok, 0, 8).err().unwrap().is_configuration());
}

#[test]
fn reinitializing_clears_the_target() {
    let mut p = pipeline(&[InterpRule::Smooth; 3]);
    let mut verts = vertex_at(5.0, 5.0, 0.0, &[1.0, 1.0, 1.0]);
    verts.extend(vertex_at(30.0, 5.0, 0.0, &[1.0, 1.0, 1.0]));
    verts.extend(vertex_at(5.0, 30.0, 0.0, &[1.0, 1.0, 1.0]));
    p.render(&DrawCall::triangles(&verts, 7), &passthrough, &rgb, NO_UNIFORMS).unwrap();
    assert_eq!(p.framebuffer().color_at(6, 6), Some(Color::WHITE));

    p.initialize_render_target(16, 8).unwrap();
    let fb = p.framebuffer();
    assert_eq!((fb.width(), fb.height()), (16, 8));
    assert!(fb.depth().iter().all(|d| d.is_infinite()));
    assert_eq!(fb.color_at(6, 6), Some(Color::BLACK));
}
