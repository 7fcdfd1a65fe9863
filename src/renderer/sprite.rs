//! Sprite rasterization and the bitmap cache
//!
//! Sprites are grids of palette indices (0 = transparent). Rasterizing one
//! at a given scale/flip/palette is done once; every later draw with the same
//! `SpriteKey` reuses the cached bitmap.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::canvas::Canvas;
use super::pixel::Rgba;
use crate::assets::SpriteName;

/// A palette-indexed sprite grid
#[derive(Debug, Clone, PartialEq)]
pub struct Sprite {
    pub name: SpriteName,
    pub width: usize,
    pub height: usize,
    /// Row-major palette indices
    pub cells: Vec<u8>,
}

impl Sprite {
    /// Build from text rows: `.` is transparent, `1`-`9` and `a`-`f` are
    /// palette indices 1-15. Short rows are padded with transparency.
    pub fn from_rows<S: AsRef<str>>(name: SpriteName, rows: &[S]) -> Self {
        let width = rows
            .iter()
            .map(|r| r.as_ref().chars().count())
            .max()
            .unwrap_or(0);
        let height = rows.len();
        let mut cells = vec![0u8; width * height];
        for (row, line) in rows.iter().enumerate() {
            for (col, ch) in line.as_ref().chars().enumerate() {
                cells[row * width + col] = ch.to_digit(16).unwrap_or(0) as u8;
            }
        }
        Self {
            name,
            width,
            height,
            cells,
        }
    }

    #[inline]
    pub fn cell(&self, col: usize, row: usize) -> u8 {
        self.cells[row * self.width + col]
    }

    /// Pixel size once every cell is drawn as a `scale` x `scale` block
    pub fn dimensions(&self, scale: u32) -> (f32, f32) {
        (
            (self.width as u32 * scale) as f32,
            (self.height as u32 * scale) as f32,
        )
    }
}

/// Value identity of a palette, part of the cache key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaletteId {
    Default,
    /// Vehicle paint variant (index into the vehicle color table)
    Vehicle(u8),
}

/// Index -> color table
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    pub id: PaletteId,
    pub colors: Vec<Rgba>,
}

impl Palette {
    /// Color for a palette index; unknown and zero indices are transparent
    #[inline]
    pub fn color(&self, index: u8) -> Rgba {
        if index == 0 {
            return Rgba::TRANSPARENT;
        }
        self.colors
            .get(index as usize)
            .copied()
            .unwrap_or(Rgba::TRANSPARENT)
    }
}

/// Structural cache key: everything that changes the rasterized output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SpriteKey {
    pub sprite: SpriteName,
    pub scale: u32,
    pub flip_h: bool,
    pub palette: PaletteId,
}

/// A rasterized sprite
#[derive(Debug, Clone, PartialEq)]
pub struct Bitmap {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Rgba>,
}

impl Bitmap {
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> Rgba {
        self.pixels[(y * self.width + x) as usize]
    }

    /// Raw RGBA bytes (for canvas `ImageData`)
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }
}

/// Rasterize a sprite into a fresh bitmap
pub fn rasterize(sprite: &Sprite, scale: u32, flip_h: bool, palette: &Palette) -> Bitmap {
    let scale = scale.max(1);
    let width = sprite.width as u32 * scale;
    let height = sprite.height as u32 * scale;
    let mut pixels = vec![Rgba::TRANSPARENT; (width * height) as usize];

    for row in 0..sprite.height {
        for col in 0..sprite.width {
            let index = sprite.cell(col, row);
            if index == 0 {
                continue;
            }
            let color = palette.color(index);
            let dst_col = (if flip_h { sprite.width - 1 - col } else { col }) as u32;
            for dy in 0..scale {
                let y = row as u32 * scale + dy;
                let start = (y * width + dst_col * scale) as usize;
                pixels[start..start + scale as usize].fill(color);
            }
        }
    }

    Bitmap {
        width,
        height,
        pixels,
    }
}

/// Memoized bitmaps keyed by `SpriteKey`
#[derive(Debug, Default)]
pub struct SpriteCache {
    bitmaps: HashMap<SpriteKey, Bitmap>,
    rasterized: u64,
}

impl SpriteCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch the bitmap for this combination, rasterizing on first use
    pub fn get_or_rasterize(
        &mut self,
        sprite: &Sprite,
        scale: u32,
        flip_h: bool,
        palette: &Palette,
    ) -> (SpriteKey, &Bitmap) {
        let key = SpriteKey {
            sprite: sprite.name,
            scale,
            flip_h,
            palette: palette.id,
        };
        let rasterized = &mut self.rasterized;
        let bitmap = self.bitmaps.entry(key).or_insert_with(|| {
            *rasterized += 1;
            rasterize(sprite, scale, flip_h, palette)
        });
        (key, bitmap)
    }

    /// Whether a key has already been rasterized
    pub fn contains(&self, key: &SpriteKey) -> bool {
        self.bitmaps.contains_key(key)
    }

    /// Number of cached bitmaps
    pub fn len(&self) -> usize {
        self.bitmaps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bitmaps.is_empty()
    }

    /// Total rasterizations performed (cache misses)
    pub fn rasterized_count(&self) -> u64 {
        self.rasterized
    }

    /// Draw a sprite at floored integer coordinates
    #[allow(clippy::too_many_arguments)]
    pub fn draw(
        &mut self,
        canvas: &mut dyn Canvas,
        sprite: &Sprite,
        x: f32,
        y: f32,
        scale: u32,
        flip_h: bool,
        palette: &Palette,
    ) {
        let (key, bitmap) = self.get_or_rasterize(sprite, scale, flip_h, palette);
        canvas.draw_bitmap(&key, bitmap, x.floor() as i32, y.floor() as i32);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::canvas::Framebuffer;

    fn test_palette(id: PaletteId, color: Rgba) -> Palette {
        Palette {
            id,
            colors: vec![Rgba::TRANSPARENT, color, Rgba::rgb(0, 0, 255)],
        }
    }

    fn arrow() -> Sprite {
        Sprite::from_rows(SpriteName::BirdUp, &["1.", "12"])
    }

    #[test]
    fn test_from_rows_pads_short_rows() {
        let sprite = Sprite::from_rows(SpriteName::Car, &["111", "1"]);
        assert_eq!(sprite.width, 3);
        assert_eq!(sprite.height, 2);
        assert_eq!(sprite.cell(2, 1), 0);
        assert_eq!(sprite.dimensions(3), (9.0, 6.0));
    }

    #[test]
    fn test_rasterize_scale_and_transparency() {
        let palette = test_palette(PaletteId::Default, Rgba::rgb(255, 0, 0));
        let bitmap = rasterize(&arrow(), 2, false, &palette);
        assert_eq!((bitmap.width, bitmap.height), (4, 4));
        assert_eq!(bitmap.pixel(0, 0), Rgba::rgb(255, 0, 0));
        assert_eq!(bitmap.pixel(1, 1), Rgba::rgb(255, 0, 0));
        assert_eq!(bitmap.pixel(2, 0), Rgba::TRANSPARENT);
        assert_eq!(bitmap.pixel(3, 3), Rgba::rgb(0, 0, 255));
    }

    #[test]
    fn test_rasterize_flip() {
        let palette = test_palette(PaletteId::Default, Rgba::rgb(255, 0, 0));
        let bitmap = rasterize(&arrow(), 1, true, &palette);
        assert_eq!(bitmap.pixel(0, 0), Rgba::TRANSPARENT);
        assert_eq!(bitmap.pixel(1, 0), Rgba::rgb(255, 0, 0));
        assert_eq!(bitmap.pixel(0, 1), Rgba::rgb(0, 0, 255));
    }

    #[test]
    fn test_cache_hit_does_not_rerasterize() {
        let mut cache = SpriteCache::new();
        let palette = test_palette(PaletteId::Default, Rgba::rgb(255, 0, 0));
        let sprite = arrow();

        let (key_a, first) = cache.get_or_rasterize(&sprite, 3, false, &palette);
        let first = first.clone();
        let (key_b, second) = cache.get_or_rasterize(&sprite, 3, false, &palette);

        assert_eq!(key_a, key_b);
        assert_eq!(&first, second);
        assert_eq!(cache.rasterized_count(), 1);
    }

    #[test]
    fn test_distinct_palettes_get_distinct_bitmaps() {
        let mut cache = SpriteCache::new();
        let red = test_palette(PaletteId::Vehicle(0), Rgba::rgb(255, 0, 0));
        let green = test_palette(PaletteId::Vehicle(1), Rgba::rgb(0, 255, 0));
        let sprite = arrow();

        let red_px = cache.get_or_rasterize(&sprite, 1, false, &red).1.pixel(0, 0);
        let green_px = cache.get_or_rasterize(&sprite, 1, false, &green).1.pixel(0, 0);

        assert_eq!(red_px, Rgba::rgb(255, 0, 0));
        assert_eq!(green_px, Rgba::rgb(0, 255, 0));
        assert_eq!(cache.len(), 2);

        // Flip and scale are part of the key too
        cache.get_or_rasterize(&sprite, 1, true, &red);
        cache.get_or_rasterize(&sprite, 2, false, &red);
        assert_eq!(cache.len(), 4);
    }

    #[test]
    fn test_draw_floors_coordinates() {
        let mut cache = SpriteCache::new();
        let palette = test_palette(PaletteId::Default, Rgba::rgb(255, 0, 0));
        let mut fb = Framebuffer::new(8, 8);
        cache.draw(&mut fb, &arrow(), 2.9, 3.7, 1, false, &palette);
        assert_eq!(fb.pixel(2, 3), Rgba::rgb(255, 0, 0));
        assert_eq!(fb.pixel(3, 4), Rgba::rgb(0, 0, 255));
    }
}
