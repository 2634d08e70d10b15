//! Material trait for surface scattering.

use crate::pdf::{CosinePdf, PhongPdf, Pdf};
use crate::sampling::{gen_f32, luminance, near_zero, random_unit_vector, reflect, refract};
use crate::texture::{SolidColor, Texture};
use crate::{hittable::HitRecord, Ray};
use ember_math::Vec3;
use rand::RngCore;
use std::collections::HashMap;
use std::f32::consts::PI;
use std::sync::Arc;

/// Color type alias (linear RGB, typically 0-1)
pub type Color = Vec3;

/// Smallest index of refraction a [`Dielectric`] accepts.
const MIN_IOR: f32 = 1e-3;

/// How a scattered ray continues.
pub enum ScatterKind {
    /// Mirror or refraction: follow this exact ray, no importance sampling.
    Specular(Ray),
    /// Draw the continuation direction from this distribution.
    Sampled(Box<dyn Pdf>),
}

/// Result of a successful [`Material::scatter`].
pub struct ScatterRecord {
    pub attenuation: Color,
    pub kind: ScatterKind,
}

impl ScatterRecord {
    pub fn specular(attenuation: Color, ray: Ray) -> Self {
        Self {
            attenuation,
            kind: ScatterKind::Specular(ray),
        }
    }

    pub fn sampled(attenuation: Color, pdf: impl Pdf + 'static) -> Self {
        Self {
            attenuation,
            kind: ScatterKind::Sampled(Box::new(pdf)),
        }
    }

    /// True when the continuation bypasses importance sampling.
    pub fn skip_pdf(&self) -> bool {
        matches!(self.kind, ScatterKind::Specular(_))
    }
}

/// Trait for materials that describe how light interacts with surfaces.
///
/// Materials are immutable and shared by every primitive that uses them.
pub trait Material: Send + Sync {
    /// Scatter an incoming ray.
    ///
    /// Returns `None` if the ray is absorbed (or the material only emits).
    fn scatter(
        &self,
        ray_in: &Ray,
        rec: &HitRecord,
        rng: &mut dyn RngCore,
    ) -> Option<ScatterRecord>;

    /// Get emitted light from this material.
    ///
    /// Most materials return black (no emission).
    fn emitted(&self, _u: f32, _v: f32, _p: Vec3) -> Color {
        Color::ZERO
    }

    /// Density the material itself assigns to `scattered`, whichever
    /// distribution actually produced it.
    fn scattering_pdf(&self, _ray_in: &Ray, _rec: &HitRecord, _scattered: &Ray) -> f32 {
        0.0
    }
}

/// Lambertian (diffuse) material.
pub struct Lambertian {
    albedo: Arc<dyn Texture>,
}

impl Lambertian {
    pub fn new(albedo: Arc<dyn Texture>) -> Self {
        Self { albedo }
    }

    pub fn from_color(albedo: Color) -> Self {
        Self::new(Arc::new(SolidColor::new(albedo)))
    }
}

impl Material for Lambertian {
    fn scatter(
        &self,
        _ray_in: &Ray,
        rec: &HitRecord,
        _rng: &mut dyn RngCore,
    ) -> Option<ScatterRecord> {
        let attenuation = self.albedo.value(rec.u, rec.v, rec.p);
        Some(ScatterRecord::sampled(attenuation, CosinePdf::new(rec.normal)))
    }

    fn scattering_pdf(&self, _ray_in: &Ray, rec: &HitRecord, scattered: &Ray) -> f32 {
        let cosine = rec.normal.dot(scattered.direction().normalize_or_zero());
        if cosine < 0.0 {
            0.0
        } else {
            cosine / PI
        }
    }
}

/// Metal (specular) material.
pub struct Metal {
    albedo: Color,
    fuzz: f32,
}

impl Metal {
    /// Create a new Metal material.
    ///
    /// - `albedo`: The color of the metal
    /// - `fuzz`: Roughness, 0.0 = perfect mirror, 1.0 = very rough
    pub fn new(albedo: Color, fuzz: f32) -> Self {
        Self {
            albedo,
            fuzz: fuzz.clamp(0.0, 1.0),
        }
    }

    /// Metal whose roughness follows a Phong shininess exponent.
    pub fn from_shininess(albedo: Color, shininess: f32) -> Self {
        Self::new(albedo, Self::shininess_to_fuzz(shininess))
    }

    pub fn shininess_to_fuzz(shininess: f32) -> f32 {
        (-shininess / 2000.0).exp().clamp(0.0, 1.0)
    }

    pub fn fuzz(&self) -> f32 {
        self.fuzz
    }
}

impl Material for Metal {
    fn scatter(
        &self,
        ray_in: &Ray,
        rec: &HitRecord,
        rng: &mut dyn RngCore,
    ) -> Option<ScatterRecord> {
        let reflected = reflect(ray_in.direction().normalize_or_zero(), rec.normal);
        let scattered_dir = reflected + self.fuzz * random_unit_vector(rng);

        // Fuzzed below the surface: absorbed
        if scattered_dir.dot(rec.normal) <= 0.0 {
            return None;
        }

        Some(ScatterRecord::specular(
            self.albedo,
            Ray::new(rec.p, scattered_dir),
        ))
    }
}

/// Dielectric (glass) material.
pub struct Dielectric {
    /// Index of refraction
    ior: f32,
}

impl Dielectric {
    /// Create a new Dielectric material.
    ///
    /// - `ior`: Index of refraction (1.0 = air, 1.5 = glass, 2.4 = diamond)
    pub fn new(ior: f32) -> Self {
        let ior = if ior.is_finite() && ior >= MIN_IOR {
            ior
        } else {
            log::warn!("Dielectric index of refraction {} out of range, using 1.0", ior);
            1.0
        };
        Self { ior }
    }

    pub fn ior(&self) -> f32 {
        self.ior
    }

    /// Schlick's approximation for reflectance
    fn reflectance(cosine: f32, ior: f32) -> f32 {
        let r0 = ((1.0 - ior) / (1.0 + ior)).powi(2);
        r0 + (1.0 - r0) * (1.0 - cosine).powi(5)
    }
}

impl Material for Dielectric {
    fn scatter(
        &self,
        ray_in: &Ray,
        rec: &HitRecord,
        rng: &mut dyn RngCore,
    ) -> Option<ScatterRecord> {
        let refraction_ratio = if rec.front_face {
            1.0 / self.ior
        } else {
            self.ior
        };

        let unit_direction = ray_in.direction().normalize_or_zero();
        if unit_direction == Vec3::ZERO {
            return None;
        }

        let cos_theta = (-unit_direction).dot(rec.normal).min(1.0);
        let sin_theta = (1.0 - cos_theta * cos_theta).max(0.0).sqrt();

        // Check for total internal reflection
        let cannot_refract = refraction_ratio * sin_theta > 1.0;

        let direction = if cannot_refract
            || Self::reflectance(cos_theta, refraction_ratio) > gen_f32(rng)
        {
            reflect(unit_direction, rec.normal)
        } else {
            refract(unit_direction, rec.normal, refraction_ratio)
        };

        if near_zero(direction) {
            return None;
        }

        Some(ScatterRecord::specular(Color::ONE, Ray::new(rec.p, direction)))
    }
}

/// Diffuse plus glossy material with a Phong specular lobe.
///
/// Lobe probabilities follow the luminance of the two textures at the hit.
pub struct Phong {
    diffuse: Arc<dyn Texture>,
    specular: Arc<dyn Texture>,
    shininess: f32,
}

/// Colors of both lobes at a hit and the diffuse lobe probability.
struct PhongLobes {
    diffuse: Color,
    specular: Color,
    diffuse_weight: f32,
}

impl Phong {
    pub fn new(diffuse: Arc<dyn Texture>, specular: Arc<dyn Texture>, shininess: f32) -> Self {
        Self {
            diffuse,
            specular,
            shininess: shininess.max(0.0),
        }
    }

    pub fn from_colors(diffuse: Color, specular: Color, shininess: f32) -> Self {
        Self::new(
            Arc::new(SolidColor::new(diffuse)),
            Arc::new(SolidColor::new(specular)),
            shininess,
        )
    }

    pub fn shininess(&self) -> f32 {
        self.shininess
    }

    /// `None` when neither lobe reflects anything.
    fn lobes(&self, rec: &HitRecord) -> Option<PhongLobes> {
        let diffuse = self.diffuse.value(rec.u, rec.v, rec.p);
        let specular = self.specular.value(rec.u, rec.v, rec.p);

        let kd = luminance(diffuse).max(0.0);
        let ks = luminance(specular).max(0.0);
        let total = kd + ks;
        if !(total > 0.0) {
            return None;
        }

        Some(PhongLobes {
            diffuse,
            specular,
            diffuse_weight: kd / total,
        })
    }
}

impl Material for Phong {
    fn scatter(
        &self,
        ray_in: &Ray,
        rec: &HitRecord,
        _rng: &mut dyn RngCore,
    ) -> Option<ScatterRecord> {
        let lobes = self.lobes(rec)?;
        let reflect_dir = reflect(ray_in.direction().normalize_or_zero(), rec.normal);

        let pdf = PhongPdf::new(rec.normal, reflect_dir, lobes.diffuse_weight, self.shininess);
        Some(ScatterRecord::sampled(lobes.diffuse + lobes.specular, pdf))
    }

    fn scattering_pdf(&self, ray_in: &Ray, rec: &HitRecord, scattered: &Ray) -> f32 {
        let Some(lobes) = self.lobes(rec) else {
            return 0.0;
        };

        let direction = scattered.direction().normalize_or_zero();
        let cos_theta = direction.dot(rec.normal);
        if cos_theta <= 0.0 {
            return 0.0;
        }

        let reflect_dir = reflect(ray_in.direction().normalize_or_zero(), rec.normal);
        let cos_alpha = direction.dot(reflect_dir).clamp(0.0, 1.0);

        let diffuse = lobes.diffuse_weight / PI;
        let specular = (1.0 - lobes.diffuse_weight) * (self.shininess + 2.0) / (2.0 * PI)
            * cos_alpha.powf(self.shininess);

        cos_theta * (diffuse + specular)
    }
}

/// Diffuse light emitter.
pub struct DiffuseLight {
    emit: Arc<dyn Texture>,
}

impl DiffuseLight {
    pub fn new(emit: Arc<dyn Texture>) -> Self {
        Self { emit }
    }

    /// Create a new diffuse light with the given emission color.
    pub fn from_color(emit: Color) -> Self {
        Self::new(Arc::new(SolidColor::new(emit)))
    }
}

impl Material for DiffuseLight {
    fn scatter(
        &self,
        _ray_in: &Ray,
        _rec: &HitRecord,
        _rng: &mut dyn RngCore,
    ) -> Option<ScatterRecord> {
        // Lights don't scatter rays
        None
    }

    fn emitted(&self, u: f32, v: f32, p: Vec3) -> Color {
        self.emit.value(u, v, p)
    }
}

/// Named materials shared between primitives, filled in by scene loaders.
#[derive(Clone, Default)]
pub struct MaterialLibrary {
    materials: HashMap<String, Arc<dyn Material>>,
}

impl MaterialLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `material` under `name`, replacing any previous entry.
    pub fn add(&mut self, name: impl Into<String>, material: Arc<dyn Material>) {
        let name = name.into();
        if self.materials.insert(name.clone(), material).is_some() {
            log::debug!("Replaced material '{}'", name);
        }
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Material>> {
        self.materials.get(name).cloned()
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }
}
