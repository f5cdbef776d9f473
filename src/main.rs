//! swraster viewer
//!
//! Renders a RON scene (or the built-in cube) through the software pipeline
//! every frame, spinning it in front of a perspective camera.
//!
//! Keys: Space pauses the rotation, S saves a PNG snapshot.

use macroquad::prelude::*;
use swraster::export::save_image;
use swraster::logging::{init_logging, LoggingConfig};
use swraster::rasterizer::{self as raster, Fragment, Pipeline, RenderStats, VertexRecord};
use swraster::scene::{cube_scene, load_scene, Scene};
use swraster::VERSION;

fn window_conf() -> Conf {
    Conf {
        window_title: format!("swraster v{}", VERSION),
        window_width: 960,
        window_height: 720,
        window_resizable: true,
        high_dpi: true,
        ..Default::default()
    }
}

/// Uniform layout: 16 floats of model-view-projection, then the scene's own
/// uniforms. Input `x y z ...` is transformed; every input float is also
/// passed through as an attribute.
fn vertex_shader(input: &[f32], out: &mut VertexRecord, uniforms: &[f32]) {
    let mvp = raster::Mat4::from_slice(uniforms).unwrap_or_default();
    let at = |i: usize| input.get(i).copied().unwrap_or(0.0);
    out.position = mvp.transform(raster::Vec4::new(at(0), at(1), at(2), 1.0));

    let n = out.attributes.len().min(input.len());
    out.attributes[..n].copy_from_slice(&input[..n]);
}

/// Attributes 3..6 are an RGB color in 0.0-1.0
fn fragment_shader(fragment: &Fragment, _uniforms: &[f32]) -> raster::Color {
    match fragment.attributes.get(3..6) {
        Some(rgb) => raster::Color::from_unit(rgb[0], rgb[1], rgb[2]),
        None => raster::Color::WHITE,
    }
}

fn load_initial_scene() -> Scene {
    match std::env::args().nth(1) {
        Some(path) => match load_scene(&path) {
            Ok(scene) => {
                log::info!("Loaded scene '{}' from {}", scene.name, path);
                scene
            }
            Err(e) => {
                log::error!("Failed to load {}: {}, using the built-in cube", path, e);
                cube_scene()
            }
        },
        None => cube_scene(),
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    init_logging(LoggingConfig::default());

    let scene = load_initial_scene();
    let mut pipeline = match Pipeline::new(scene.config.clone(), scene.width, scene.height) {
        Ok(pipeline) => pipeline,
        Err(e) => {
            log::error!("Invalid pipeline configuration: {}", e);
            return;
        }
    };

    log::info!("=== swraster v{} === {}x{}", VERSION, scene.width, scene.height);

    let aspect = scene.width as f32 / scene.height as f32;
    let projection = raster::Mat4::perspective(1.0, aspect, 0.5, 20.0);
    let view = raster::Mat4::translation(raster::Vec3::new(0.0, 0.0, -4.0));

    let mut angle = 0.0f32;
    let mut paused = false;
    let mut uniforms: Vec<f32> = Vec::with_capacity(16 + scene.uniforms.len());
    let mut stats = RenderStats::default();
    let mut snapshots = 0;

    loop {
        if is_key_pressed(KeyCode::Space) {
            paused = !paused;
        }
        if !paused {
            angle += get_frame_time();
        }

        let model = raster::Mat4::rotation_y(angle) * raster::Mat4::rotation_x(angle * 0.6);
        let mvp = projection * view * model;
        uniforms.clear();
        uniforms.extend_from_slice(&mvp.to_array());
        uniforms.extend_from_slice(&scene.uniforms);

        pipeline.clear();
        match pipeline.render(&scene.draw_call(), &vertex_shader, &fragment_shader, uniforms.as_slice()) {
            Ok(frame) => stats = frame,
            Err(e) => log::error!("Render failed: {}", e),
        }

        let fb = pipeline.framebuffer();

        if is_key_pressed(KeyCode::S) {
            snapshots += 1;
            let path = format!("{}-{:03}.png", scene.name, snapshots);
            match save_image(fb, &path) {
                Ok(()) => log::info!("Saved snapshot {}", path),
                Err(e) => log::error!("Snapshot failed: {}", e),
            }
        }

        clear_background(Color::from_rgba(30, 30, 35, 255));

        // Fit the framebuffer into the window, keeping its aspect
        let (screen_w, screen_h) = (screen_width(), screen_height());
        let (draw_w, draw_h) = if aspect > screen_w / screen_h {
            (screen_w, screen_w / aspect)
        } else {
            (screen_h * aspect, screen_h)
        };
        let draw_x = (screen_w - draw_w) * 0.5;
        let draw_y = (screen_h - draw_h) * 0.5;

        // Convert framebuffer to texture and draw; rows are stored bottom first
        let texture = Texture2D::from_rgba8(fb.width() as u16, fb.height() as u16, fb.pixels());
        texture.set_filter(FilterMode::Nearest);
        draw_texture_ex(
            &texture,
            draw_x,
            draw_y,
            WHITE,
            DrawTextureParams {
                dest_size: Some(vec2(draw_w, draw_h)),
                flip_y: true,
                ..Default::default()
            },
        );

        draw_text(
            &format!(
                "{} tris, {} clipped away, {} fragments",
                stats.primitives, stats.clipped_away, stats.fragments_shaded
            ),
            10.0,
            20.0,
            20.0,
            WHITE,
        );

        next_frame().await;
    }
}
