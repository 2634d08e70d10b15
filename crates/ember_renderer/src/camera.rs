//! Camera for ray generation.

use crate::sampling::{random_in_unit_disk, sample_square};
use crate::Ray;
use ember_math::Vec3;
use glam::Quat;
use rand::RngCore;

/// Pitch stops short of the up axis by this much (in cosine).
const MAX_PITCH_COS: f32 = 0.999;

/// Pinhole or thin-lens camera generating primary rays.
///
/// Pose and viewport changes mark the camera dirty; [`Camera::initialize`]
/// must run before the next [`Camera::get_ray`].
#[derive(Debug, Clone)]
pub struct Camera {
    // Pose
    position: Vec3,
    forward: Vec3,
    up: Vec3,

    // Lens settings
    vfov: f32,          // Vertical field of view in degrees
    defocus_angle: f32, // Variation angle of rays through each pixel
    focus_dist: f32,    // Distance from camera to plane of perfect focus

    viewport_width: u32,
    viewport_height: u32,
    dirty: bool,

    // Cached computed values (set by initialize())
    pixel00_loc: Vec3,
    pixel_delta_u: Vec3,
    pixel_delta_v: Vec3,
    u: Vec3,
    v: Vec3,
    w: Vec3,
    defocus_disk_u: Vec3,
    defocus_disk_v: Vec3,
}

impl Camera {
    /// Camera at `position` looking along `forward`, with +Y up.
    pub fn new(position: Vec3, forward: Vec3, vfov: f32) -> Self {
        let forward = forward.try_normalize().unwrap_or_else(|| {
            log::warn!("Camera forward {:?} has no direction, using -Z", forward);
            Vec3::NEG_Z
        });

        Self {
            position,
            forward,
            up: Vec3::Y,
            vfov,
            defocus_angle: 0.0,
            focus_dist: 1.0,
            viewport_width: 0,
            viewport_height: 0,
            dirty: true,
            pixel00_loc: Vec3::ZERO,
            pixel_delta_u: Vec3::ZERO,
            pixel_delta_v: Vec3::ZERO,
            u: Vec3::X,
            v: Vec3::Y,
            w: Vec3::Z,
            defocus_disk_u: Vec3::ZERO,
            defocus_disk_v: Vec3::ZERO,
        }
    }

    /// Camera at `position` looking at `target` with the given up vector.
    pub fn looking_at(position: Vec3, target: Vec3, up: Vec3, vfov: f32) -> Self {
        let mut camera = Self::new(position, target - position, vfov);
        camera.up = up.try_normalize().unwrap_or(Vec3::Y);
        camera
    }

    /// Set lens settings for depth of field.
    pub fn with_focus(mut self, focus_dist: f32, defocus_angle: f32) -> Self {
        self.focus_dist = if focus_dist > 0.0 { focus_dist } else { 1.0 };
        self.defocus_angle = defocus_angle.max(0.0);
        self.dirty = true;
        self
    }

    /// Record a new viewport size. Unchanged sizes are ignored.
    pub fn on_resize(&mut self, width: u32, height: u32) {
        if self.viewport_width == width && self.viewport_height == height {
            return;
        }

        self.viewport_width = width;
        self.viewport_height = height;
        self.dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn forward(&self) -> Vec3 {
        self.forward
    }

    pub fn up(&self) -> Vec3 {
        self.up
    }

    pub fn vfov(&self) -> f32 {
        self.vfov
    }

    pub fn viewport_size(&self) -> (u32, u32) {
        (self.viewport_width, self.viewport_height)
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
        self.dirty = true;
    }

    pub fn set_forward(&mut self, forward: Vec3) {
        if let Some(forward) = forward.try_normalize() {
            self.forward = forward;
            self.dirty = true;
        }
    }

    /// Turn to face `target`. Ignored if `target` is the camera position.
    pub fn look_at(&mut self, target: Vec3) {
        self.set_forward(target - self.position);
    }

    /// Translate by `offset` in world space.
    pub fn move_by(&mut self, offset: Vec3) {
        self.set_position(self.position + offset);
    }

    /// Yaw about the up axis and pitch about the right axis, in degrees.
    ///
    /// Positive yaw turns left, positive pitch looks up. Pitch that would
    /// point the camera along the up axis is dropped.
    pub fn rotate(&mut self, yaw_deg: f32, pitch_deg: f32) {
        if yaw_deg == 0.0 && pitch_deg == 0.0 {
            return;
        }

        let right = self.right();
        let yaw = Quat::from_axis_angle(self.up, yaw_deg.to_radians());
        let pitch = Quat::from_axis_angle(right, pitch_deg.to_radians());

        let pitched = (pitch * self.forward).normalize();
        let forward = if pitched.dot(self.up).abs() < MAX_PITCH_COS {
            pitched
        } else {
            self.forward
        };

        self.forward = (yaw * forward).normalize();
        self.dirty = true;
    }

    fn right(&self) -> Vec3 {
        self.forward
            .cross(self.up)
            .try_normalize()
            .unwrap_or_else(|| self.forward.any_orthonormal_vector())
    }

    /// Recompute the basis and pixel grid from the pose and viewport.
    ///
    /// Leaves the camera dirty if the viewport has a zero dimension.
    pub fn initialize(&mut self) {
        if self.viewport_width == 0 || self.viewport_height == 0 {
            log::warn!(
                "Camera viewport is {}x{}, skipping initialize",
                self.viewport_width,
                self.viewport_height
            );
            return;
        }

        let width = self.viewport_width as f32;
        let height = self.viewport_height as f32;

        // Calculate viewport dimensions
        let theta = self.vfov.to_radians();
        let h = (theta / 2.0).tan();
        let viewport_height = 2.0 * h * self.focus_dist;
        let viewport_width = viewport_height * (width / height);

        // Calculate camera basis vectors
        self.w = -self.forward;
        self.u = self
            .up
            .cross(self.w)
            .try_normalize()
            .unwrap_or_else(|| self.w.any_orthonormal_vector());
        self.v = self.w.cross(self.u);

        // Calculate viewport vectors
        let viewport_u = viewport_width * self.u;
        let viewport_v = -viewport_height * self.v;

        // Calculate pixel delta vectors
        self.pixel_delta_u = viewport_u / width;
        self.pixel_delta_v = viewport_v / height;

        // Calculate upper left pixel location
        let viewport_upper_left =
            self.position - self.focus_dist * self.w - viewport_u / 2.0 - viewport_v / 2.0;

        self.pixel00_loc = viewport_upper_left + 0.5 * (self.pixel_delta_u + self.pixel_delta_v);

        // Calculate defocus disk basis vectors
        let defocus_radius = self.focus_dist * (self.defocus_angle / 2.0).to_radians().tan();
        self.defocus_disk_u = self.u * defocus_radius;
        self.defocus_disk_v = self.v * defocus_radius;

        self.dirty = false;
    }

    /// Generate a ray for pixel (i, j), counted from the top-left, with a
    /// random offset inside the pixel.
    pub fn get_ray(&self, i: u32, j: u32, rng: &mut dyn RngCore) -> Ray {
        let offset = sample_square(rng);

        let pixel_sample = self.pixel00_loc
            + ((i as f32) + offset.x) * self.pixel_delta_u
            + ((j as f32) + offset.y) * self.pixel_delta_v;

        let ray_origin = if self.defocus_angle <= 0.0 {
            self.position
        } else {
            self.defocus_disk_sample(rng)
        };

        Ray::new(ray_origin, pixel_sample - ray_origin)
    }

    /// Sample a point on the defocus disk.
    fn defocus_disk_sample(&self, rng: &mut dyn RngCore) -> Vec3 {
        let p = random_in_unit_disk(rng);
        self.position + p.x * self.defocus_disk_u + p.y * self.defocus_disk_v
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn ready_camera(width: u32, height: u32) -> Camera {
        let mut camera = Camera::new(Vec3::ZERO, Vec3::NEG_Z, 90.0);
        camera.on_resize(width, height);
        camera.initialize();
        camera
    }

    #[test]
    fn test_camera_initialize() {
        let camera = ready_camera(800, 600);

        assert!(!camera.is_dirty());
        assert!((camera.w - Vec3::Z).length() < 0.001);
        assert!((camera.u - Vec3::X).length() < 0.001);
        assert!((camera.v - Vec3::Y).length() < 0.001);
    }

    #[test]
    fn test_camera_center_ray() {
        let camera = ready_camera(101, 101);
        let mut rng = StdRng::seed_from_u64(42);

        for _ in 0..50 {
            let ray = camera.get_ray(50, 50, &mut rng);
            let dir = ray.direction().normalize();
            assert_eq!(ray.origin(), Vec3::ZERO);
            // Within half a pixel of straight ahead
            assert!(dir.dot(Vec3::NEG_Z) > 0.999, "dir = {:?}", dir);
        }
    }

    #[test]
    fn test_camera_pixel_grid_orientation() {
        let camera = ready_camera(100, 100);
        let mut rng = StdRng::seed_from_u64(1);

        let top_left = camera.get_ray(0, 0, &mut rng).direction();
        let bottom_right = camera.get_ray(99, 99, &mut rng).direction();
        assert!(top_left.x < 0.0 && top_left.y > 0.0);
        assert!(bottom_right.x > 0.0 && bottom_right.y < 0.0);
    }

    #[test]
    fn test_camera_resize_marks_dirty_only_on_change() {
        let mut camera = ready_camera(64, 32);

        camera.on_resize(64, 32);
        assert!(!camera.is_dirty());

        camera.on_resize(32, 32);
        assert!(camera.is_dirty());
        camera.initialize();
        assert!(!camera.is_dirty());
    }

    #[test]
    fn test_camera_zero_viewport_stays_dirty() {
        let mut camera = Camera::new(Vec3::ZERO, Vec3::NEG_Z, 60.0);
        camera.on_resize(0, 10);
        camera.initialize();
        assert!(camera.is_dirty());
    }

    #[test]
    fn test_camera_rotate() {
        let mut camera = ready_camera(10, 10);

        camera.rotate(90.0, 0.0);
        assert!(camera.is_dirty());
        assert!((camera.forward() - Vec3::NEG_X).length() < 1e-5);

        camera.rotate(-90.0, 30.0);
        assert!(camera.forward().y > 0.0);
        assert!((camera.forward().length() - 1.0).abs() < 1e-5);

        // Looking straight up is refused
        let mut level = ready_camera(10, 10);
        level.rotate(0.0, 90.0);
        assert!((level.forward() - Vec3::NEG_Z).length() < 1e-5);
    }

    #[test]
    fn test_camera_move_and_look_at() {
        let mut camera = ready_camera(10, 10);

        camera.move_by(Vec3::new(0.0, 0.0, 5.0));
        assert!(camera.is_dirty());
        assert_eq!(camera.position(), Vec3::new(0.0, 0.0, 5.0));

        camera.look_at(Vec3::new(5.0, 0.0, 5.0));
        assert!((camera.forward() - Vec3::X).length() < 1e-6);

        // Looking at itself keeps the old direction
        camera.look_at(camera.position());
        assert!((camera.forward() - Vec3::X).length() < 1e-6);
    }

    #[test]
    fn test_camera_defocus_origins_on_disk() {
        let mut camera =
            Camera::looking_at(Vec3::ZERO, Vec3::new(0.0, 0.0, -10.0), Vec3::Y, 40.0)
                .with_focus(10.0, 2.0);
        camera.on_resize(64, 64);
        camera.initialize();

        let radius = 10.0 * 1.0f32.to_radians().tan();
        let mut rng = StdRng::seed_from_u64(9);
        let mut offset_seen = false;
        for _ in 0..200 {
            let origin = camera.get_ray(32, 32, &mut rng).origin();
            assert!(origin.z.abs() < 1e-5);
            assert!(origin.length() <= radius + 1e-5);
            offset_seen |= origin.length() > 1e-4;
        }
        assert!(offset_seen);
    }
}
