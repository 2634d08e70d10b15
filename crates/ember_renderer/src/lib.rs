//! Ember - progressive CPU path tracing
//!
//! A Monte Carlo path tracer with light importance sampling, a BVH built on
//! a worker pool, and bucketed progressive accumulation. The host owns the
//! window and scene loading; it fills a [`Scene`], drives a [`Renderer`]
//! and uploads [`Renderer::pixels`].

mod bucket;
mod bvh;
mod camera;
mod error;
mod hittable;
mod material;
mod quad;
mod renderer;
mod scene;
mod sphere;
mod texture;
mod triangle;

pub mod pdf;
pub mod sampling;

pub use bucket::{generate_buckets, render_bucket, Bucket, BucketResult, DEFAULT_BUCKET_SIZE};
pub use bvh::{Bvh, BvhNode};
pub use camera::Camera;
pub use error::{RenderError, RenderResult};
pub use hittable::{HitRecord, Hittable, HittableList};
pub use material::{
    Color, Dielectric, DiffuseLight, Lambertian, Material, MaterialLibrary, Metal, Phong,
    ScatterKind, ScatterRecord,
};
pub use pdf::{CosinePdf, HittablePdf, MixturePdf, Pdf, PhongPdf};
pub use quad::Quad;
pub use renderer::{
    color_to_rgba, linear_to_gamma, ray_color, render_pixel, ImageBuffer, RenderConfig,
    RenderState, Renderer,
};
pub use scene::Scene;
pub use sphere::Sphere;
pub use texture::{CheckerTexture, ImageTexture, SolidColor, Texture};
pub use triangle::Triangle;

/// Re-export the math types used throughout the public API
pub use ember_math::{Aabb, Interval, Onb, Ray, Vec2, Vec3};
