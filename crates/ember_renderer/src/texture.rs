//! Textures: spatially varying colors looked up by surface coordinates.

use crate::Color;
use ember_math::Vec3;
use image::{DynamicImage, RgbImage};
use std::sync::Arc;

/// Color returned by an [`ImageTexture`] with no pixels.
const MISSING_TEXTURE_COLOR: Color = Color::new(0.0, 0.1, 0.1);

/// A color lookup at surface coordinates `(u, v)` and world position `p`.
pub trait Texture: Send + Sync {
    fn value(&self, u: f32, v: f32, p: Vec3) -> Color;
}

/// A constant color.
#[derive(Debug, Clone, Copy)]
pub struct SolidColor {
    albedo: Color,
}

impl SolidColor {
    pub fn new(albedo: Color) -> Self {
        Self { albedo }
    }

    pub fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self::new(Color::new(r, g, b))
    }
}

impl Texture for SolidColor {
    fn value(&self, _u: f32, _v: f32, _p: Vec3) -> Color {
        self.albedo
    }
}

/// 3D checkerboard alternating between two textures.
pub struct CheckerTexture {
    inv_scale: f32,
    even: Arc<dyn Texture>,
    odd: Arc<dyn Texture>,
}

impl CheckerTexture {
    pub fn new(scale: f32, even: Arc<dyn Texture>, odd: Arc<dyn Texture>) -> Self {
        Self {
            inv_scale: 1.0 / scale,
            even,
            odd,
        }
    }

    /// Checker of two solid colors.
    pub fn from_colors(scale: f32, even: Color, odd: Color) -> Self {
        Self::new(
            scale,
            Arc::new(SolidColor::new(even)),
            Arc::new(SolidColor::new(odd)),
        )
    }
}

impl Texture for CheckerTexture {
    fn value(&self, u: f32, v: f32, p: Vec3) -> Color {
        let cell = (self.inv_scale * p).floor();
        let sum = cell.x as i64 + cell.y as i64 + cell.z as i64;

        if sum.rem_euclid(2) == 0 {
            self.even.value(u, v, p)
        } else {
            self.odd.value(u, v, p)
        }
    }
}

/// Texture backed by an in-memory image.
///
/// Pixels are converted from 8-bit sRGB to linear floats once at
/// construction. Lookups wrap `u`, flip `v` (image rows run top-down), and
/// take the nearest texel. Decoding files is left to the host.
#[derive(Clone, Debug)]
pub struct ImageTexture {
    width: u32,
    height: u32,
    pixels: Vec<Color>,
}

impl ImageTexture {
    pub fn new(image: &RgbImage) -> Self {
        let pixels = image
            .pixels()
            .map(|p| {
                Color::new(
                    srgb_to_linear(p[0]),
                    srgb_to_linear(p[1]),
                    srgb_to_linear(p[2]),
                )
            })
            .collect();

        Self {
            width: image.width(),
            height: image.height(),
            pixels,
        }
    }

    pub fn from_dynamic(image: &DynamicImage) -> Self {
        Self::new(&image.to_rgb8())
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }
}

impl Texture for ImageTexture {
    fn value(&self, u: f32, v: f32, _p: Vec3) -> Color {
        if self.width == 0 || self.height == 0 {
            return MISSING_TEXTURE_COLOR;
        }

        let u = u.rem_euclid(1.0);
        let v = v.rem_euclid(1.0);

        let i = ((u * self.width as f32) as u32).min(self.width - 1);
        let j = (((1.0 - v) * self.height as f32) as u32).min(self.height - 1);

        self.pixels[(j * self.width + i) as usize]
    }
}

#[inline]
fn srgb_to_linear(byte: u8) -> f32 {
    (byte as f32 / 255.0).powf(2.2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_solid_color() {
        let tex = SolidColor::rgb(0.1, 0.2, 0.3);
        assert_eq!(tex.value(0.7, 0.1, Vec3::ONE), Color::new(0.1, 0.2, 0.3));
    }

    #[test]
    fn test_checker_alternates() {
        let checker = CheckerTexture::from_colors(1.0, Color::ONE, Color::ZERO);
        let a = checker.value(0.0, 0.0, Vec3::new(0.5, 0.5, 0.5));
        let b = checker.value(0.0, 0.0, Vec3::new(1.5, 0.5, 0.5));
        let c = checker.value(0.0, 0.0, Vec3::new(-0.5, 0.5, 0.5));
        assert_eq!(a, Color::ONE);
        assert_eq!(b, Color::ZERO);
        assert_eq!(c, Color::ZERO);
    }

    #[test]
    fn test_image_texture_lookup() {
        // 2x1 image: red on the left, white on the right
        let mut img = RgbImage::new(2, 1);
        img.put_pixel(0, 0, Rgb([255, 0, 0]));
        img.put_pixel(1, 0, Rgb([255, 255, 255]));
        let tex = ImageTexture::new(&img);

        assert_eq!(tex.value(0.25, 0.5, Vec3::ZERO), Color::new(1.0, 0.0, 0.0));
        assert_eq!(tex.value(0.75, 0.5, Vec3::ZERO), Color::ONE);
        // u wraps around
        assert_eq!(tex.value(1.25, 0.5, Vec3::ZERO), Color::new(1.0, 0.0, 0.0));
        // u = 1 clamps to the last column
        assert_eq!(tex.value(0.999, 0.0, Vec3::ZERO), Color::ONE);
    }

    #[test]
    fn test_image_texture_empty() {
        let tex = ImageTexture::new(&RgbImage::new(0, 0));
        assert_eq!(tex.value(0.5, 0.5, Vec3::ZERO), MISSING_TEXTURE_COLOR);
    }
}
