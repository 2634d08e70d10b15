use crate::Vec3;

/// Orthonormal basis built around a single axis `w`.
///
/// Used to rotate directions sampled in a canonical z-up frame into world
/// space around a surface normal or a reflection direction.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Onb {
    axis: [Vec3; 3],
}

impl Onb {
    /// Build a basis whose `w` axis is `n` (normalized here).
    pub fn from_w(n: Vec3) -> Self {
        let w = n.normalize();
        let a = if w.x.abs() > 0.9 { Vec3::Y } else { Vec3::X };
        let v = w.cross(a).normalize();
        let u = w.cross(v);
        Self { axis: [u, v, w] }
    }

    #[inline]
    pub fn u(&self) -> Vec3 {
        self.axis[0]
    }

    #[inline]
    pub fn v(&self) -> Vec3 {
        self.axis[1]
    }

    #[inline]
    pub fn w(&self) -> Vec3 {
        self.axis[2]
    }

    /// Transform a vector expressed in this basis into world space.
    #[inline]
    pub fn local(&self, a: Vec3) -> Vec3 {
        a.x * self.axis[0] + a.y * self.axis[1] + a.z * self.axis[2]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_orthonormal(onb: &Onb) {
        assert!((onb.u().length() - 1.0).abs() < 1e-5);
        assert!((onb.v().length() - 1.0).abs() < 1e-5);
        assert!((onb.w().length() - 1.0).abs() < 1e-5);
        assert!(onb.u().dot(onb.v()).abs() < 1e-5);
        assert!(onb.v().dot(onb.w()).abs() < 1e-5);
        assert!(onb.u().dot(onb.w()).abs() < 1e-5);
    }

    #[test]
    fn test_onb_orthonormal() {
        assert_orthonormal(&Onb::from_w(Vec3::new(0.0, 0.0, 3.0)));
        assert_orthonormal(&Onb::from_w(Vec3::new(1.0, 0.0, 0.0)));
        assert_orthonormal(&Onb::from_w(Vec3::new(-0.3, 0.8, 0.2)));
    }

    #[test]
    fn test_onb_local_z_maps_to_w() {
        let n = Vec3::new(1.0, 2.0, -1.0);
        let onb = Onb::from_w(n);
        let mapped = onb.local(Vec3::Z);
        assert!((mapped - n.normalize()).length() < 1e-5);
    }
}
