//! Cornell box render.
//!
//! Builds the classic box with an area light, accumulates a number of
//! progressive frames and saves the result as a PNG.
//!
//! Usage: cargo run --release --example cornell_box [frames] [output.png]

use anyhow::{Context, Result};
use ember_renderer::{
    Camera, Color, Dielectric, DiffuseLight, Lambertian, Material, Metal, Quad, RenderConfig,
    Renderer, Scene, Sphere, Vec3,
};
use std::sync::Arc;
use std::time::Instant;

const WIDTH: u32 = 400;
const HEIGHT: u32 = 400;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let frames: u32 = match args.next() {
        Some(arg) => arg.parse().context("frame count must be a number")?,
        None => 64,
    };
    let output = args.next().unwrap_or_else(|| "cornell_box.png".to_string());

    let camera = Camera::looking_at(
        Vec3::new(278.0, 278.0, -800.0),
        Vec3::new(278.0, 278.0, 0.0),
        Vec3::Y,
        40.0,
    );
    let config = RenderConfig {
        target_samples: frames,
        samples_per_frame: 4,
        max_depth: 8,
        ..RenderConfig::default()
    };

    let mut renderer = Renderer::new(camera, config)?;
    renderer.set_scene(build_scene()?)?;
    renderer.on_resize(WIDTH, HEIGHT)?;

    let start = Instant::now();
    for _ in 0..frames {
        renderer.on_update(0.0);
        renderer.render()?;
    }
    log::info!(
        "Rendered {} frames at {}x{} in {:?}",
        frames,
        WIDTH,
        HEIGHT,
        start.elapsed()
    );

    // Renderer rows run bottom-up; PNG rows run top-down
    let mut image = image::RgbaImage::from_raw(WIDTH, HEIGHT, renderer.as_bytes().to_vec())
        .context("pixel buffer does not match the viewport")?;
    image::imageops::flip_vertical_in_place(&mut image);
    image
        .save(&output)
        .with_context(|| format!("failed to save {}", output))?;

    log::info!("Saved to {}", output);
    Ok(())
}

fn build_scene() -> Result<Scene> {
    let red: Arc<dyn Material> = Arc::new(Lambertian::from_color(Color::new(0.65, 0.05, 0.05)));
    let white: Arc<dyn Material> = Arc::new(Lambertian::from_color(Color::splat(0.73)));
    let green: Arc<dyn Material> = Arc::new(Lambertian::from_color(Color::new(0.12, 0.45, 0.15)));
    let light: Arc<dyn Material> = Arc::new(DiffuseLight::from_color(Color::splat(15.0)));

    let mut scene = Scene::new();

    let quad = |q: Vec3, u: Vec3, v: Vec3, material: &Arc<dyn Material>| {
        Arc::new(Quad::new(q, u, v, material.clone()))
    };

    // Walls
    scene.add(quad(
        Vec3::new(555.0, 0.0, 0.0),
        Vec3::new(0.0, 555.0, 0.0),
        Vec3::new(0.0, 0.0, 555.0),
        &green,
    ))?;
    scene.add(quad(
        Vec3::ZERO,
        Vec3::new(0.0, 555.0, 0.0),
        Vec3::new(0.0, 0.0, 555.0),
        &red,
    ))?;
    scene.add(quad(
        Vec3::ZERO,
        Vec3::new(555.0, 0.0, 0.0),
        Vec3::new(0.0, 0.0, 555.0),
        &white,
    ))?;
    scene.add(quad(
        Vec3::new(555.0, 555.0, 555.0),
        Vec3::new(-555.0, 0.0, 0.0),
        Vec3::new(0.0, 0.0, -555.0),
        &white,
    ))?;
    scene.add(quad(
        Vec3::new(0.0, 0.0, 555.0),
        Vec3::new(555.0, 0.0, 0.0),
        Vec3::new(0.0, 555.0, 0.0),
        &white,
    ))?;

    // Ceiling light, facing down
    scene.add_light(quad(
        Vec3::new(343.0, 554.0, 332.0),
        Vec3::new(-130.0, 0.0, 0.0),
        Vec3::new(0.0, 0.0, -105.0),
        &light,
    ))?;

    scene.add(Arc::new(Sphere::new(
        Vec3::new(190.0, 90.0, 190.0),
        90.0,
        Arc::new(Dielectric::new(1.5)),
    )))?;
    scene.add(Arc::new(Sphere::new(
        Vec3::new(370.0, 120.0, 370.0),
        120.0,
        Arc::new(Metal::new(Color::new(0.8, 0.85, 0.88), 0.05)),
    )))?;

    Ok(scene)
}
