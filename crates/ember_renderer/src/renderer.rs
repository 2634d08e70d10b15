//! Progressive path tracing renderer.
//!
//! Each call to [`Renderer::render`] traces one frame of samples for every
//! pixel on the worker pool and folds it into a running average. Camera or
//! viewport changes throw the average away and start over.

use crate::bucket::{generate_buckets, render_bucket, Bucket, BucketResult, DEFAULT_BUCKET_SIZE};
use crate::material::{ScatterKind, ScatterRecord};
use crate::pdf::{HittablePdf, MixturePdf, Pdf};
use crate::{Camera, Color, Hittable, Ray, RenderError, RenderResult, Scene};
use ember_math::Interval;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

/// Closest distance a ray may hit, to avoid self-intersection.
const HIT_EPSILON: f32 = 0.001;

/// Sampling densities at or below this are treated as zero.
const PDF_EPSILON: f32 = 1e-6;

/// Render configuration.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Frames to accumulate before the image is converged
    pub target_samples: u32,
    /// Camera samples averaged per pixel in each frame
    pub samples_per_frame: u32,
    /// Maximum ray bounce depth
    pub max_depth: u32,
    /// Probability of drawing a bounce toward the lights instead of from
    /// the material. Zero samples the material only.
    pub light_sampling_weight: f32,
    /// Bucket edge length in pixels
    pub bucket_size: u32,
    /// Worker pool size
    pub worker_threads: usize,
    /// Base seed for per-bucket generators
    pub seed: u64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            target_samples: 1024,
            samples_per_frame: 1,
            max_depth: 10,
            light_sampling_weight: 0.5,
            bucket_size: DEFAULT_BUCKET_SIZE,
            worker_threads: 8,
            seed: 0,
        }
    }
}

impl RenderConfig {
    pub fn validate(&self) -> RenderResult<()> {
        if self.target_samples == 0 {
            return Err(RenderError::InvalidConfig(
                "target_samples must be at least 1".into(),
            ));
        }
        if self.samples_per_frame == 0 {
            return Err(RenderError::InvalidConfig(
                "samples_per_frame must be at least 1".into(),
            ));
        }
        if self.worker_threads == 0 {
            return Err(RenderError::InvalidConfig(
                "worker_threads must be at least 1".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.light_sampling_weight) {
            return Err(RenderError::InvalidConfig(format!(
                "light_sampling_weight {} is outside [0, 1]",
                self.light_sampling_weight
            )));
        }
        Ok(())
    }
}

/// Compute the radiance carried back along `ray`.
///
/// Diffuse bounces draw their direction from a mixture of the scene's
/// lights (with probability `light_sampling_weight`) and the material's
/// own distribution, then weight the sample by the material density over
/// the mixture density.
pub fn ray_color(
    ray: &Ray,
    scene: &Scene,
    depth: u32,
    light_sampling_weight: f32,
    rng: &mut dyn RngCore,
) -> Color {
    // If we've exceeded max depth, return black (no light)
    if depth == 0 {
        return Color::ZERO;
    }

    // No environment light
    let Some(rec) = scene.hit(ray, Interval::from_min(HIT_EPSILON)) else {
        return Color::ZERO;
    };

    let emitted = rec.material.emitted(rec.u, rec.v, rec.p);

    let Some(ScatterRecord { attenuation, kind }) = rec.material.scatter(ray, &rec, rng) else {
        return emitted;
    };

    let material_pdf = match kind {
        ScatterKind::Specular(next) => {
            let incoming = ray_color(&next, scene, depth - 1, light_sampling_weight, rng);
            return emitted + attenuation * incoming;
        }
        ScatterKind::Sampled(pdf) => pdf,
    };

    let light_pdf = HittablePdf::new(scene.lights(), rec.p);
    let mixture = MixturePdf::new(&light_pdf, material_pdf.as_ref(), light_sampling_weight);

    let scattered = Ray::new(rec.p, mixture.generate(rng));
    let pdf_value = mixture.value(scattered.direction());
    if !(pdf_value.is_finite() && pdf_value > PDF_EPSILON) {
        return emitted;
    }

    let scattering_pdf = rec.material.scattering_pdf(ray, &rec, &scattered);
    if scattering_pdf <= 0.0 {
        return emitted;
    }

    let incoming = ray_color(&scattered, scene, depth - 1, light_sampling_weight, rng);
    emitted + attenuation * scattering_pdf * incoming / pdf_value
}

/// Average `samples_per_frame` camera samples through pixel (x, y).
pub fn render_pixel(
    camera: &Camera,
    scene: &Scene,
    x: u32,
    y: u32,
    config: &RenderConfig,
    rng: &mut dyn RngCore,
) -> Color {
    let samples = config.samples_per_frame.max(1);
    let mut pixel_color = Color::ZERO;

    for _ in 0..samples {
        // Camera.get_ray already adds random offset for anti-aliasing
        let ray = camera.get_ray(x, y, rng);
        pixel_color += ray_color(
            &ray,
            scene,
            config.max_depth,
            config.light_sampling_weight,
            rng,
        );
    }

    pixel_color / samples as f32
}

/// Display gamma.
#[inline]
pub fn linear_to_gamma(linear: f32) -> f32 {
    if linear > 0.0 {
        linear.powf(1.0 / 2.2)
    } else {
        0.0
    }
}

/// Convert a linear color to 8-bit RGBA.
pub fn color_to_rgba(color: Color) -> [u8; 4] {
    let to_byte = |c: f32| (255.0 * linear_to_gamma(c).clamp(0.0, 1.0)) as u8;
    [to_byte(color.x), to_byte(color.y), to_byte(color.z), 255]
}

/// Linear-color image buffer, row-major from the top-left.
#[derive(Debug, Clone, Default)]
pub struct ImageBuffer {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Color>,
}

impl ImageBuffer {
    /// Create a new image buffer filled with black.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::ZERO; width as usize * height as usize],
        }
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Get the pixel at (x, y).
    pub fn get(&self, x: u32, y: u32) -> Option<Color> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.pixels[self.index(x, y)])
    }

    /// Add `color` to the pixel at (x, y), returning the new sum.
    fn accumulate(&mut self, x: u32, y: u32, color: Color) -> Color {
        let index = self.index(x, y);
        self.pixels[index] += color;
        self.pixels[index]
    }

    /// Reset every pixel to black.
    pub fn clear(&mut self) {
        self.pixels.fill(Color::ZERO);
    }
}

/// Where a renderer is in its accumulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderState {
    /// No samples accumulated yet.
    Idle,
    /// Some frames accumulated, more to go.
    Accumulating,
    /// `target_samples` frames accumulated; [`Renderer::render`] does nothing.
    Converged,
}

/// Progressive renderer owning the camera, scene, and worker pool.
pub struct Renderer {
    camera: Camera,
    config: RenderConfig,
    pool: ThreadPool,
    scene: Option<Scene>,
    width: u32,
    height: u32,
    buckets: Vec<Bucket>,
    /// Sum of every frame's sample per pixel.
    accumulation: ImageBuffer,
    /// Displayed RGBA, bottom row first.
    pixels: Vec<[u8; 4]>,
    /// One-based index of the next frame to render.
    frame_index: u32,
}

impl Renderer {
    /// Create a renderer and its worker pool.
    pub fn new(camera: Camera, config: RenderConfig) -> RenderResult<Self> {
        config.validate()?;

        let pool = ThreadPoolBuilder::new()
            .num_threads(config.worker_threads)
            .thread_name(|i| format!("ember-worker-{}", i))
            .build()?;

        Ok(Self {
            camera,
            config,
            pool,
            scene: None,
            width: 0,
            height: 0,
            buckets: Vec::new(),
            accumulation: ImageBuffer::default(),
            pixels: Vec::new(),
            frame_index: 1,
        })
    }

    /// Install the scene to render, building its BVH on the worker pool.
    pub fn set_scene(&mut self, mut scene: Scene) -> RenderResult<()> {
        scene.validate(self.config.light_sampling_weight)?;

        if scene.bvh().is_none() {
            scene.build_bvh(&self.pool);
        }

        self.scene = Some(scene);
        self.reset_accumulation();
        Ok(())
    }

    /// Resize the viewport. Clears accumulation when the size changes.
    pub fn on_resize(&mut self, width: u32, height: u32) -> RenderResult<()> {
        if width == 0 || height == 0 {
            return Err(RenderError::InvalidViewport { width, height });
        }
        if width == self.width && height == self.height {
            return Ok(());
        }

        self.width = width;
        self.height = height;
        self.camera.on_resize(width, height);
        self.accumulation = ImageBuffer::new(width, height);
        self.pixels = vec![[0, 0, 0, 255]; width as usize * height as usize];
        self.buckets = generate_buckets(width, height, self.config.bucket_size);
        self.reset_accumulation();

        log::info!(
            "Viewport resized to {}x{} ({} buckets)",
            width,
            height,
            self.buckets.len()
        );
        Ok(())
    }

    /// Per-tick hook for the host: picks up camera changes.
    pub fn on_update(&mut self, _delta_time: f32) {
        self.sync_camera();
    }

    /// Re-initialize a dirty camera and drop what was accumulated with it.
    ///
    /// The viewport always follows [`Renderer::on_resize`]; a size set
    /// directly on the camera is overridden here.
    fn sync_camera(&mut self) {
        let size = (self.width, self.height);
        if size.0 > 0 && size.1 > 0 && self.camera.viewport_size() != size {
            self.camera.on_resize(size.0, size.1);
        }

        if self.camera.is_dirty() {
            self.camera.initialize();
            self.reset_accumulation();
        }
    }

    /// Clear the accumulated samples and start again from frame 1.
    pub fn reset_accumulation(&mut self) {
        self.accumulation.clear();
        self.frame_index = 1;
        log::debug!("Accumulation reset");
    }

    /// Trace one frame and fold it into the running average.
    ///
    /// Does nothing once converged. Blocks until every bucket is done.
    pub fn render(&mut self) -> RenderResult<()> {
        if self.width == 0 || self.height == 0 {
            log::warn!("render() called before on_resize()");
            return Err(RenderError::InvalidViewport {
                width: self.width,
                height: self.height,
            });
        }

        self.sync_camera();

        let scene = self.scene.as_ref().ok_or(RenderError::SceneNotBuilt)?;

        if self.state() == RenderState::Converged {
            return Ok(());
        }

        let frame_index = self.frame_index;
        let camera = &self.camera;
        let config = &self.config;
        let buckets = &self.buckets;

        let results: Vec<BucketResult> = self.pool.install(|| {
            buckets
                .par_iter()
                .map(|bucket| {
                    let mut rng = bucket_rng(config.seed, frame_index, bucket);
                    let pixels = render_bucket(bucket, camera, scene, config, &mut rng);
                    BucketResult::new(*bucket, pixels)
                })
                .collect()
        });

        let scale = 1.0 / frame_index as f32;
        for result in &results {
            for (x, y, color) in result.iter() {
                let sum = self.accumulation.accumulate(x, y, color);
                let row = (self.height - 1 - y) as usize;
                self.pixels[row * self.width as usize + x as usize] = color_to_rgba(sum * scale);
            }
        }

        log::debug!("Frame {} done", frame_index);
        if frame_index == self.config.target_samples {
            log::info!("Converged after {} frames", frame_index);
        }

        self.frame_index += 1;
        Ok(())
    }

    pub fn state(&self) -> RenderState {
        if self.frame_index > self.config.target_samples {
            RenderState::Converged
        } else if self.frame_index <= 1 {
            RenderState::Idle
        } else {
            RenderState::Accumulating
        }
    }

    pub fn frame_index(&self) -> u32 {
        self.frame_index
    }

    /// Displayed pixels, RGBA8, rows from the bottom of the image up.
    pub fn pixels(&self) -> &[[u8; 4]] {
        &self.pixels
    }

    /// [`Renderer::pixels`] as tightly packed bytes.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }

    /// Current linear average at (x, y), counted from the top-left.
    pub fn accumulated(&self, x: u32, y: u32) -> Option<Color> {
        let frames = self.frame_index.saturating_sub(1);
        let sum = self.accumulation.get(x, y)?;
        if frames == 0 {
            return Some(Color::ZERO);
        }
        Some(sum / frames as f32)
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn scene(&self) -> Option<&Scene> {
        self.scene.as_ref()
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Mutable camera access. Pose changes reset accumulation on the next
    /// update or render. Resize through [`Renderer::on_resize`]: a viewport
    /// set on the camera is replaced by the renderer's own size.
    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }
}

/// Generator for one bucket of one frame.
fn bucket_rng(seed: u64, frame_index: u32, bucket: &Bucket) -> StdRng {
    StdRng::seed_from_u64(
        seed.wrapping_add((frame_index as u64) << 32)
            .wrapping_add(bucket.index as u64),
    )
}
