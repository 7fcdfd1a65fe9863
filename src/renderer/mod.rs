//! 2D rendering module
//!
//! Palette-indexed sprites are rasterized once into a cache and blitted onto
//! a `Canvas`; the scene renderer draws one frame back to front.

pub mod canvas;
pub mod pixel;
pub mod scene;
pub mod sprite;

pub use canvas::{Canvas, Framebuffer, TextAlign, TextStyle};
pub use pixel::Rgba;
pub use scene::SceneRenderer;
pub use sprite::{Bitmap, Palette, PaletteId, Sprite, SpriteCache, SpriteKey};
