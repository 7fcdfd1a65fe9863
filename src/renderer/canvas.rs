//! Drawing surface abstraction
//!
//! The scene renderer only talks to `Canvas`. The browser build implements it
//! over `CanvasRenderingContext2d`; `Framebuffer` is a software implementation
//! used by the native build and tests.

use super::pixel::Rgba;
use super::sprite::{Bitmap, SpriteKey};

/// Horizontal text anchor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

/// Font and placement for a text run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub size: f32,
    pub bold: bool,
    pub align: TextAlign,
    /// Vertically center on `y` instead of sitting on the baseline
    pub middle: bool,
    pub color: Rgba,
}

impl TextStyle {
    pub fn new(size: f32, color: Rgba) -> Self {
        Self {
            size,
            bold: false,
            align: TextAlign::Center,
            middle: false,
            color,
        }
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn align(mut self, align: TextAlign) -> Self {
        self.align = align;
        self
    }

    pub fn middle(mut self) -> Self {
        self.middle = true;
        self
    }

    /// CSS font shorthand for the browser canvas
    pub fn css_font(&self) -> String {
        format!(
            "{}{}px 'Courier New', monospace",
            if self.bold { "bold " } else { "" },
            self.size
        )
    }
}

/// 2D drawing surface
pub trait Canvas {
    /// Surface size in pixels
    fn size(&self) -> (u32, u32);
    /// Clear to transparent
    fn clear(&mut self);
    /// Alpha multiplied into every following draw (1.0 = opaque)
    fn set_global_alpha(&mut self, alpha: f32);
    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: Rgba);
    fn stroke_rect(&mut self, x: f32, y: f32, width: f32, height: f32, line: f32, color: Rgba);
    fn fill_circle(&mut self, cx: f32, cy: f32, radius: f32, color: Rgba);
    /// Blit a cached sprite bitmap; `key` lets implementations keep their own
    /// upload cache (e.g. one offscreen canvas per key)
    fn draw_bitmap(&mut self, key: &SpriteKey, bitmap: &Bitmap, x: i32, y: i32);
    fn fill_text(&mut self, text: &str, x: f32, y: f32, style: TextStyle);
}

/// A text run recorded by `Framebuffer`
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub text: String,
    pub x: f32,
    pub y: f32,
    pub style: TextStyle,
    pub alpha: f32,
}

/// Software RGBA canvas
///
/// Shapes and bitmaps are composited into `pixels`; text has no glyph
/// rasterizer and is recorded as `TextRun`s instead.
#[derive(Debug, Clone)]
pub struct Framebuffer {
    width: u32,
    height: u32,
    pixels: Vec<Rgba>,
    alpha: f32,
    texts: Vec<TextRun>,
    bitmap_draws: usize,
}

impl Framebuffer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Rgba::TRANSPARENT; (width * height) as usize],
            alpha: 1.0,
            texts: Vec::new(),
            bitmap_draws: 0,
        }
    }

    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> Rgba {
        self.pixels[(y * self.width + x) as usize]
    }

    pub fn pixels(&self) -> &[Rgba] {
        &self.pixels
    }

    /// Text recorded since the last `clear`
    pub fn texts(&self) -> &[TextRun] {
        &self.texts
    }

    /// Bitmaps blitted since the last `clear`
    pub fn bitmap_draws(&self) -> usize {
        self.bitmap_draws
    }

    /// Whether any recorded text run contains `needle`
    pub fn has_text(&self, needle: &str) -> bool {
        self.texts.iter().any(|t| t.text.contains(needle))
    }

    #[inline]
    fn blend_at(&mut self, x: i32, y: i32, color: Rgba) {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return;
        }
        let idx = (y as u32 * self.width + x as u32) as usize;
        self.pixels[idx] = self.pixels[idx].blend(color, self.alpha);
    }

    /// Pixel span covered by `[start, start + len)` after rounding
    fn span(start: f32, len: f32) -> (i32, i32) {
        (start.round() as i32, (start + len).round() as i32)
    }
}

impl Canvas for Framebuffer {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn clear(&mut self) {
        self.pixels.fill(Rgba::TRANSPARENT);
        self.texts.clear();
        self.bitmap_draws = 0;
        self.alpha = 1.0;
    }

    fn set_global_alpha(&mut self, alpha: f32) {
        self.alpha = alpha.clamp(0.0, 1.0);
    }

    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: Rgba) {
        let (x0, x1) = Self::span(x, width);
        let (y0, y1) = Self::span(y, height);
        for py in y0.max(0)..y1.min(self.height as i32) {
            for px in x0.max(0)..x1.min(self.width as i32) {
                self.blend_at(px, py, color);
            }
        }
    }

    fn stroke_rect(&mut self, x: f32, y: f32, width: f32, height: f32, line: f32, color: Rgba) {
        let half = line / 2.0;
        self.fill_rect(x - half, y - half, width + line, line, color);
        self.fill_rect(x - half, y + height - half, width + line, line, color);
        self.fill_rect(x - half, y + half, line, height - line, color);
        self.fill_rect(x + width - half, y + half, line, height - line, color);
    }

    fn fill_circle(&mut self, cx: f32, cy: f32, radius: f32, color: Rgba) {
        let r2 = radius * radius;
        let y0 = (cy - radius).floor() as i32;
        let y1 = (cy + radius).ceil() as i32;
        let x0 = (cx - radius).floor() as i32;
        let x1 = (cx + radius).ceil() as i32;
        for py in y0..=y1 {
            for px in x0..=x1 {
                let dx = px as f32 + 0.5 - cx;
                let dy = py as f32 + 0.5 - cy;
                if dx * dx + dy * dy <= r2 {
                    self.blend_at(px, py, color);
                }
            }
        }
    }

    fn draw_bitmap(&mut self, _key: &SpriteKey, bitmap: &Bitmap, x: i32, y: i32) {
        self.bitmap_draws += 1;
        for by in 0..bitmap.height {
            for bx in 0..bitmap.width {
                let color = bitmap.pixel(bx, by);
                if color.a == 0 {
                    continue;
                }
                self.blend_at(x + bx as i32, y + by as i32, color);
            }
        }
    }

    fn fill_text(&mut self, text: &str, x: f32, y: f32, style: TextStyle) {
        self.texts.push(TextRun {
            text: text.to_string(),
            x,
            y,
            style,
            alpha: self.alpha,
        });
    }
}
