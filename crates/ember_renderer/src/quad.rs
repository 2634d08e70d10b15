//! Parallelogram primitive, mostly used for area lights and box walls.

use crate::{
    hittable::{HitRecord, Hittable},
    sampling::gen_f32,
    Material, Ray,
};
use ember_math::{Aabb, Interval, Vec3};
use rand::RngCore;
use std::sync::Arc;

/// A parallelogram with corner `q` and edges `u`, `v`.
pub struct Quad {
    q: Vec3,
    u: Vec3,
    v: Vec3,
    /// `n / (n·n)` with `n = u × v`, for planar coordinates
    w: Vec3,
    normal: Vec3,
    /// Plane offset: `normal · p = d` on the plane
    d: f32,
    area: f32,
    material: Arc<dyn Material>,
    bbox: Aabb,
}

impl Quad {
    pub fn new(q: Vec3, u: Vec3, v: Vec3, material: Arc<dyn Material>) -> Self {
        let n = u.cross(v);
        let normal = n.normalize_or_zero();
        let n_len_sq = n.length_squared();
        let w = if n_len_sq > 0.0 { n / n_len_sq } else { Vec3::ZERO };

        let bbox = Aabb::surrounding(
            &Aabb::from_points(q, q + u + v),
            &Aabb::from_points(q + u, q + v),
        );

        Self {
            q,
            u,
            v,
            w,
            normal,
            d: normal.dot(q),
            area: n.length(),
            material,
            bbox,
        }
    }

    pub fn area(&self) -> f32 {
        self.area
    }
}

impl Hittable for Quad {
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'a>> {
        let denom = self.normal.dot(ray.direction());

        // Parallel to the plane
        if denom.abs() < 1e-8 {
            return None;
        }

        let t = (self.d - self.normal.dot(ray.origin())) / denom;
        if !ray_t.contains(t) {
            return None;
        }

        let planar = ray.at(t) - self.q;
        let alpha = self.w.dot(planar.cross(self.v));
        let beta = self.w.dot(self.u.cross(planar));

        let unit = Interval::new(0.0, 1.0);
        if !unit.contains(alpha) || !unit.contains(beta) {
            return None;
        }

        Some(HitRecord::new(
            ray,
            t,
            self.normal,
            (alpha, beta),
            self.material.as_ref(),
        ))
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }

    fn pdf_value(&self, origin: Vec3, direction: Vec3) -> f32 {
        let Some(rec) = self.hit(&Ray::new(origin, direction), Interval::from_min(0.001)) else {
            return 0.0;
        };

        let distance_squared = rec.t * rec.t * direction.length_squared();
        let cosine = (direction.dot(rec.normal) / direction.length()).abs();
        let denom = cosine * self.area;
        if denom <= f32::EPSILON {
            return 0.0;
        }

        distance_squared / denom
    }

    fn random(&self, origin: Vec3, rng: &mut dyn RngCore) -> Vec3 {
        let p = self.q + gen_f32(rng) * self.u + gen_f32(rng) * self.v;
        p - origin
    }

    fn has_finite_geometry(&self) -> bool {
        self.q.is_finite() && self.u.is_finite() && self.v.is_finite()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DiffuseLight;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn ceiling_light() -> Quad {
        Quad::new(
            Vec3::new(-1.0, 4.0, -1.0),
            Vec3::new(2.0, 0.0, 0.0),
            Vec3::new(0.0, 0.0, 2.0),
            Arc::new(DiffuseLight::from_color(Vec3::splat(4.0))),
        )
    }

    #[test]
    fn test_quad_hit_inside_and_outside() {
        let quad = ceiling_light();

        let ray = Ray::new(Vec3::new(0.5, 0.0, 0.5), Vec3::Y);
        let rec = quad.hit(&ray, Interval::from_min(0.001)).unwrap();
        assert!((rec.t - 4.0).abs() < 1e-5);
        assert!((rec.u - 0.75).abs() < 1e-5);
        assert!((rec.v - 0.75).abs() < 1e-5);
        // Normal faces back toward the ray
        assert!(rec.normal.dot(ray.direction()) < 0.0);

        let ray = Ray::new(Vec3::new(3.0, 0.0, 0.0), Vec3::Y);
        assert!(quad.hit(&ray, Interval::from_min(0.001)).is_none());
    }

    #[test]
    fn test_quad_bbox_is_padded() {
        let quad = ceiling_light();
        let bbox = quad.bounding_box();
        assert!(bbox.y.size() > 0.0);
        assert!(bbox.y.contains(4.0));
    }

    #[test]
    fn test_quad_pdf_matches_solid_angle_formula() {
        let quad = ceiling_light();
        assert_eq!(quad.area(), 4.0);

        // Distance 4, head-on: 16 / (1 * 4)
        let pdf = quad.pdf_value(Vec3::ZERO, Vec3::Y);
        assert!((pdf - 4.0).abs() < 1e-4);

        let mut rng = StdRng::seed_from_u64(9);
        for _ in 0..100 {
            let direction = quad.random(Vec3::ZERO, &mut rng);
            assert!((direction.y - 4.0).abs() < 1e-5);
        }
    }
}
