//! Sampling distributions over directions.
//!
//! A [`Pdf`] can both draw a direction and evaluate the density of any
//! direction. Materials hand one to the integrator, which mixes it with a
//! light-sampling distribution.

use crate::sampling::{gen_f32, random_cosine_direction, random_phong_direction};
use crate::Hittable;
use ember_math::{Onb, Vec3};
use rand::RngCore;
use std::f32::consts::PI;

/// A probability density over directions.
pub trait Pdf: Send + Sync {
    /// Solid-angle density of `direction`.
    fn value(&self, direction: Vec3) -> f32;

    /// Draw a direction distributed according to [`Pdf::value`].
    fn generate(&self, rng: &mut dyn RngCore) -> Vec3;
}

/// Cosine-weighted hemisphere around a normal.
pub struct CosinePdf {
    uvw: Onb,
}

impl CosinePdf {
    pub fn new(normal: Vec3) -> Self {
        Self {
            uvw: Onb::from_w(normal),
        }
    }
}

impl Pdf for CosinePdf {
    fn value(&self, direction: Vec3) -> f32 {
        let cosine_theta = direction.normalize_or_zero().dot(self.uvw.w());
        (cosine_theta / PI).max(0.0)
    }

    fn generate(&self, rng: &mut dyn RngCore) -> Vec3 {
        self.uvw.local(random_cosine_direction(rng))
    }
}

/// Diffuse lobe plus a Phong specular lobe around the mirror direction.
///
/// `diffuse_weight` is the probability of drawing from the diffuse lobe;
/// the specular lobe gets the rest.
pub struct PhongPdf {
    normal_basis: Onb,
    reflect_basis: Onb,
    diffuse_weight: f32,
    shininess: f32,
}

impl PhongPdf {
    pub fn new(normal: Vec3, reflect_dir: Vec3, diffuse_weight: f32, shininess: f32) -> Self {
        Self {
            normal_basis: Onb::from_w(normal),
            reflect_basis: Onb::from_w(reflect_dir),
            diffuse_weight: diffuse_weight.clamp(0.0, 1.0),
            shininess: shininess.max(0.0),
        }
    }
}

impl Pdf for PhongPdf {
    fn value(&self, direction: Vec3) -> f32 {
        let direction = direction.normalize_or_zero();

        let cos_theta = direction.dot(self.normal_basis.w()).max(0.0);
        let cos_alpha = direction.dot(self.reflect_basis.w()).max(0.0);

        let diffuse = cos_theta / PI;
        let specular = (self.shininess + 1.0) / (2.0 * PI) * cos_alpha.powf(self.shininess);

        self.diffuse_weight * diffuse + (1.0 - self.diffuse_weight) * specular
    }

    fn generate(&self, rng: &mut dyn RngCore) -> Vec3 {
        if gen_f32(rng) < self.diffuse_weight {
            self.normal_basis.local(random_cosine_direction(rng))
        } else {
            self.reflect_basis
                .local(random_phong_direction(rng, self.shininess))
        }
    }
}

/// Samples directions toward a hittable, typically the scene's lights.
pub struct HittablePdf<'a> {
    objects: &'a dyn Hittable,
    origin: Vec3,
}

impl<'a> HittablePdf<'a> {
    pub fn new(objects: &'a dyn Hittable, origin: Vec3) -> Self {
        Self { objects, origin }
    }
}

impl Pdf for HittablePdf<'_> {
    fn value(&self, direction: Vec3) -> f32 {
        self.objects.pdf_value(self.origin, direction)
    }

    fn generate(&self, rng: &mut dyn RngCore) -> Vec3 {
        self.objects.random(self.origin, rng)
    }
}

/// Weighted combination of two distributions.
///
/// `generate` draws from the first with probability `weight`.
pub struct MixturePdf<'a> {
    p0: &'a dyn Pdf,
    p1: &'a dyn Pdf,
    weight: f32,
}

impl<'a> MixturePdf<'a> {
    pub fn new(p0: &'a dyn Pdf, p1: &'a dyn Pdf, weight: f32) -> Self {
        Self {
            p0,
            p1,
            weight: weight.clamp(0.0, 1.0),
        }
    }

    /// Even split between the two.
    pub fn even(p0: &'a dyn Pdf, p1: &'a dyn Pdf) -> Self {
        Self::new(p0, p1, 0.5)
    }
}

impl Pdf for MixturePdf<'_> {
    fn value(&self, direction: Vec3) -> f32 {
        self.weight * self.p0.value(direction) + (1.0 - self.weight) * self.p1.value(direction)
    }

    fn generate(&self, rng: &mut dyn RngCore) -> Vec3 {
        if gen_f32(rng) < self.weight {
            self.p0.generate(rng)
        } else {
            self.p1.generate(rng)
        }
    }
}
