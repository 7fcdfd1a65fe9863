//! Pixel type for 2D rendering

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

/// Straight (non-premultiplied) RGBA8 pixel, laid out like canvas `ImageData`
#[repr(C)]
#[derive(
    Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Pod, Zeroable, Serialize, Deserialize,
)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba::new(0, 0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    /// From a `0xRRGGBB` literal
    pub const fn hex(rgb: u32) -> Self {
        Self::rgb((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8)
    }

    /// Packed `0xRRGGBBAA`
    pub const fn to_u32(self) -> u32 {
        (self.r as u32) << 24 | (self.g as u32) << 16 | (self.b as u32) << 8 | self.a as u32
    }

    /// Same color with alpha scaled by `factor` (0..1)
    pub fn with_alpha(self, factor: f32) -> Self {
        let a = (self.a as f32 * factor.clamp(0.0, 1.0)).round() as u8;
        Self { a, ..self }
    }

    /// Per-channel linear interpolation, rounded like the canvas hex blend
    pub fn lerp(self, other: Rgba, t: f32) -> Rgba {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
        Rgba::new(
            mix(self.r, other.r),
            mix(self.g, other.g),
            mix(self.b, other.b),
            mix(self.a, other.a),
        )
    }

    /// Source-over composite of `src` onto `self` with an extra global alpha
    pub fn blend(self, src: Rgba, global_alpha: f32) -> Rgba {
        let sa = src.a as f32 / 255.0 * global_alpha.clamp(0.0, 1.0);
        if sa <= 0.0 {
            return self;
        }
        let da = self.a as f32 / 255.0;
        let out_a = sa + da * (1.0 - sa);
        if out_a <= 0.0 {
            return Rgba::TRANSPARENT;
        }
        let ch = |s: u8, d: u8| {
            ((s as f32 * sa + d as f32 * da * (1.0 - sa)) / out_a).round() as u8
        };
        Rgba::new(
            ch(src.r, self.r),
            ch(src.g, self.g),
            ch(src.b, self.b),
            (out_a * 255.0).round() as u8,
        )
    }

    /// CSS `rgba(...)` string for the browser canvas
    pub fn css(&self) -> String {
        format!(
            "rgba({}, {}, {}, {:.3})",
            self.r,
            self.g,
            self.b,
            self.a as f32 / 255.0
        )
    }
}

/// Colors for scene elements
pub mod colors {
    use super::Rgba;

    pub const SKY_DAY: Rgba = Rgba::hex(0x87CEEB);
    pub const SKY_NIGHT: Rgba = Rgba::hex(0x1a1a2e);
    pub const TEXT_DAY: Rgba = Rgba::hex(0x2d2d2d);
    pub const TEXT_NIGHT: Rgba = Rgba::hex(0xffffff);
    pub const SUN_CORE: Rgba = Rgba::hex(0xFFD700);
    /// Radial glow stops, inner to outer
    pub const SUN_GLOW: [Rgba; 4] = [
        Rgba::new(255, 255, 150, 204),
        Rgba::new(255, 220, 100, 102),
        Rgba::new(255, 200, 80, 51),
        Rgba::new(255, 180, 60, 0),
    ];
    pub const MOON: Rgba = Rgba::hex(0xF0E68C);
    pub const STAR: Rgba = Rgba::hex(0xffffff);
    pub const ROAD: Rgba = Rgba::hex(0x333333);
    pub const CENTER_LINE: Rgba = Rgba::hex(0xffffff);
    pub const BILLBOARD_PANEL: Rgba = Rgba::hex(0xf5f5f5);
    pub const BILLBOARD_TEXT: Rgba = Rgba::hex(0x2d2d2d);
    pub const HITBOX_PLAYER: Rgba = Rgba::new(255, 0, 0, 128);
    pub const HITBOX_OBSTACLE: Rgba = Rgba::new(0, 255, 0, 128);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex() {
        assert_eq!(Rgba::hex(0x87CEEB), Rgba::rgb(0x87, 0xCE, 0xEB));
    }

    #[test]
    fn test_lerp_endpoints() {
        assert_eq!(colors::SKY_DAY.lerp(colors::SKY_NIGHT, 0.0), colors::SKY_DAY);
        assert_eq!(colors::SKY_DAY.lerp(colors::SKY_NIGHT, 1.0), colors::SKY_NIGHT);
    }

    #[test]
    fn test_blend_opaque_replaces() {
        let dst = Rgba::rgb(10, 20, 30);
        let src = Rgba::rgb(200, 100, 50);
        assert_eq!(dst.blend(src, 1.0), src);
    }

    #[test]
    fn test_blend_transparent_keeps() {
        let dst = Rgba::rgb(10, 20, 30);
        assert_eq!(dst.blend(Rgba::TRANSPARENT, 1.0), dst);
        assert_eq!(dst.blend(Rgba::rgb(255, 255, 255), 0.0), dst);
    }

    #[test]
    fn test_pixels_cast_to_bytes() {
        let pixels = [Rgba::new(1, 2, 3, 4), Rgba::new(5, 6, 7, 8)];
        let bytes: &[u8] = bytemuck::cast_slice(&pixels);
        assert_eq!(bytes, &[1, 2, 3, 4, 5, 6, 7, 8]);
    }
}
