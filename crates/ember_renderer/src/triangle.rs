//! Triangle primitive for ray tracing.
//!
//! Uses the Möller-Trumbore algorithm for ray-triangle intersection.

use crate::{
    hittable::{HitRecord, Hittable},
    sampling::gen_f32,
    Material, Ray,
};
use ember_math::{Aabb, Interval, Vec2, Vec3};
use rand::RngCore;
use std::sync::Arc;

/// Determinant below which a ray counts as parallel to the triangle.
const PARALLEL_EPSILON: f32 = 1e-8;

/// A triangle primitive.
pub struct Triangle {
    /// Vertices
    v0: Vec3,
    v1: Vec3,
    v2: Vec3,
    /// Pre-computed face normal (unit length, counter-clockwise winding)
    normal: Vec3,
    area: f32,
    /// Per-vertex texture coordinates
    uvs: Option<[Vec2; 3]>,
    material: Arc<dyn Material>,
    bbox: Aabb,
}

impl Triangle {
    /// Create a new triangle from three vertices.
    pub fn new(v0: Vec3, v1: Vec3, v2: Vec3, material: Arc<dyn Material>) -> Self {
        let n = (v1 - v0).cross(v2 - v0);
        let area = 0.5 * n.length();
        if area <= f32::EPSILON {
            log::warn!("Zero-area triangle at {:?}", v0);
        }

        // from_points pads the flat axis
        let min = v0.min(v1).min(v2);
        let max = v0.max(v1).max(v2);

        Self {
            v0,
            v1,
            v2,
            normal: n.normalize_or_zero(),
            area,
            uvs: None,
            material,
            bbox: Aabb::from_points(min, max),
        }
    }

    /// Attach per-vertex texture coordinates, interpolated at hit points.
    pub fn with_uvs(mut self, uv0: Vec2, uv1: Vec2, uv2: Vec2) -> Self {
        self.uvs = Some([uv0, uv1, uv2]);
        self
    }

    pub fn normal(&self) -> Vec3 {
        self.normal
    }

    pub fn area(&self) -> f32 {
        self.area
    }
}

impl Hittable for Triangle {
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'a>> {
        let edge1 = self.v1 - self.v0;
        let edge2 = self.v2 - self.v0;

        let h = ray.direction().cross(edge2);
        let a = edge1.dot(h);

        // Ray is parallel to triangle
        if a.abs() < PARALLEL_EPSILON {
            return None;
        }

        let f = 1.0 / a;
        let s = ray.origin() - self.v0;
        let b1 = f * s.dot(h);
        if !(0.0..=1.0).contains(&b1) {
            return None;
        }

        let q = s.cross(edge1);
        let b2 = f * ray.direction().dot(q);
        if b2 < 0.0 || b1 + b2 > 1.0 {
            return None;
        }

        let t = f * edge2.dot(q);
        if !ray_t.contains(t) {
            return None;
        }

        let uv = match self.uvs {
            Some([uv0, uv1, uv2]) => {
                let uv = (1.0 - b1 - b2) * uv0 + b1 * uv1 + b2 * uv2;
                (uv.x, uv.y)
            }
            None => (b1, b2),
        };

        Some(HitRecord::new(ray, t, self.normal, uv, self.material.as_ref()))
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

    /// Direction toward a uniformly distributed point on the triangle.
    fn random(&self, origin: Vec3, rng: &mut dyn RngCore) -> Vec3 {
        let mut r1 = gen_f32(rng);
        let mut r2 = gen_f32(rng);

        // Fold the unit square onto the triangle
        if r1 + r2 >= 1.0 {
            r1 = 1.0 - r1;
            r2 = 1.0 - r2;
        }

        let point = self.v0 + r1 * (self.v1 - self.v0) + r2 * (self.v2 - self.v0);
        point - origin
    }

    fn has_finite_geometry(&self) -> bool {
        self.v0.is_finite() && self.v1.is_finite() && self.v2.is_finite()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::Lambertian;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn material() -> Arc<dyn Material> {
        Arc::new(Lambertian::from_color(Vec3::splat(0.5)))
    }

    fn unit_triangle() -> Triangle {
        Triangle::new(
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
            material(),
        )
    }

    #[test]
    fn test_triangle_hit_centroid() {
        let tri = unit_triangle();
        let centroid = Vec3::new(1.0 / 3.0, 1.0 / 3.0, 0.0);
        let ray = Ray::new(centroid + Vec3::new(0.0, 0.0, 2.0), Vec3::new(0.0, 0.0, -1.0));

        let rec = tri.hit(&ray, Interval::from_min(0.001)).unwrap();
        assert!((rec.t - 2.0).abs() < 1e-4);

        // Barycentric weights all positive
        let w0 = 1.0 - rec.u - rec.v;
        assert!(rec.u > 0.0 && rec.v > 0.0 && w0 > 0.0);
        assert!((rec.u - 1.0 / 3.0).abs() < 1e-4);

        // Counter-clockwise winding seen from +z faces the ray
        assert_eq!(tri.normal(), Vec3::Z);
        assert!(rec.front_face);
        assert!((rec.normal - Vec3::Z).length() < 1e-5);
    }

    #[test]
    fn test_triangle_miss() {
        let tri = unit_triangle();

        // Outside the edge u + v = 1
        let ray = Ray::new(Vec3::new(0.8, 0.8, 2.0), Vec3::new(0.0, 0.0, -1.0));
        assert!(tri.hit(&ray, Interval::from_min(0.001)).is_none());

        // Parallel to the plane
        let ray = Ray::new(Vec3::new(0.2, 0.2, 1.0), Vec3::new(1.0, 0.0, 0.0));
        assert!(tri.hit(&ray, Interval::from_min(0.001)).is_none());
    }

    #[test]
    fn test_triangle_uv_interpolation() {
        let tri = unit_triangle().with_uvs(
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(1.0, 1.0),
        );
        let ray = Ray::new(Vec3::new(0.5, 0.25, 1.0), Vec3::new(0.0, 0.0, -1.0));
        let rec = tri.hit(&ray, Interval::from_min(0.001)).unwrap();

        // b1 = 0.5, b2 = 0.25 -> uv = 0.5 * (1,0) + 0.25 * (1,1)
        assert!((rec.u - 0.75).abs() < 1e-5);
        assert!((rec.v - 0.25).abs() < 1e-5);
    }

    #[test]
    fn test_triangle_light_sampling() {
        let tri = Triangle::new(
            Vec3::new(-1.0, 3.0, -1.0),
            Vec3::new(1.0, 3.0, -1.0),
            Vec3::new(0.0, 3.0, 1.0),
            material(),
        );
        let mut rng = StdRng::seed_from_u64(5);

        for _ in 0..100 {
            let direction = tri.random(Vec3::ZERO, &mut rng);
            assert!((direction.y - 3.0).abs() < 1e-5);
            assert!(tri.pdf_value(Vec3::ZERO, direction) > 0.0);
        }

        // Straight up hits at distance 3 with the normal aligned: 9 / area
        let pdf = tri.pdf_value(Vec3::ZERO, Vec3::Y);
        assert!((pdf - 9.0 / tri.area()).abs() < 1e-3);
    }

    #[test]
    fn test_triangle_nan_vertex_is_not_finite() {
        let tri = Triangle::new(
            Vec3::new(f32::NAN, 0.0, 0.0),
            Vec3::X,
            Vec3::Y,
            material(),
        );
        assert!(!tri.has_finite_geometry());
        assert!(unit_triangle().has_finite_geometry());
    }
}
