//! Scene container: every primitive plus the emissive subset.

use crate::{Bvh, HitRecord, Hittable, HittableList, Ray, RenderError, RenderResult};
use ember_math::{Aabb, Interval};
use rayon::ThreadPool;
use std::sync::Arc;

/// Primitives to render and the lights to importance-sample.
///
/// `lights` shares primitives with `world`. Once the BVH is built the
/// scene is only read.
#[derive(Default)]
pub struct Scene {
    world: HittableList,
    lights: HittableList,
    bvh: Option<Bvh>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a primitive to the world.
    ///
    /// Rejects primitives built from NaN or infinite input. Invalidates any
    /// previously built BVH.
    pub fn add(&mut self, object: Arc<dyn Hittable>) -> RenderResult<()> {
        if !object.has_finite_geometry() {
            return Err(RenderError::DegenerateGeometry(format!(
                "primitive #{} has non-finite coordinates",
                self.world.len()
            )));
        }

        self.world.add(object);
        self.bvh = None;
        Ok(())
    }

    /// Add an emitter to the world and to the light list.
    pub fn add_light(&mut self, object: Arc<dyn Hittable>) -> RenderResult<()> {
        self.add(object.clone())?;
        self.lights.add(object);
        Ok(())
    }

    pub fn world(&self) -> &HittableList {
        &self.world
    }

    pub fn lights(&self) -> &HittableList {
        &self.lights
    }

    pub fn bvh(&self) -> Option<&Bvh> {
        self.bvh.as_ref()
    }

    pub fn len(&self) -> usize {
        self.world.len()
    }

    pub fn is_empty(&self) -> bool {
        self.world.is_empty()
    }

    /// Build the BVH over the world on `pool`. Blocks until done.
    pub fn build_bvh(&mut self, pool: &ThreadPool) {
        self.bvh = Some(Bvh::build_in(pool, self.world.objects().to_vec()));
    }

    /// Check the scene can be rendered with the given light sampling weight.
    pub fn validate(&self, light_sampling_weight: f32) -> RenderResult<()> {
        if light_sampling_weight > 0.0 && self.lights.is_empty() {
            return Err(RenderError::EmptyLights);
        }

        log::info!(
            "Scene has {} primitives, {} lights",
            self.world.len(),
            self.lights.len()
        );
        Ok(())
    }
}

impl Hittable for Scene {
    /// Uses the BVH when built, otherwise scans the world list.
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'a>> {
        match &self.bvh {
            Some(bvh) => bvh.hit(ray, ray_t),
            None => self.world.hit(ray, ray_t),
        }
    }

    fn bounding_box(&self) -> Aabb {
        self.world.bounding_box()
    }
}
