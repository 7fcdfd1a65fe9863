//! Moto Runner - a side-scrolling motorcycle runner
//!
//! Core modules:
//! - `sim`: Frame-stepped simulation (physics, spawning, collisions, day/night)
//! - `renderer`: Sprite cache and back-to-front scene drawing onto a `Canvas`
//! - `game`: Loop controller (waiting/playing/game-over, frame scheduling)
//! - `assets`: Built-in sprite sheet and palettes
//! - `platform`: Input mapping, orientation checks, browser bindings
//! - `persistence`: Key-value storage for high scores and settings
//! - `tuning`: Data-driven game balance

pub mod assets;
pub mod game;
pub mod highscores;
pub mod persistence;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use game::{FrameScheduler, GameLoop, HostEvents, ManualScheduler};
pub use highscores::HighScores;
pub use settings::Settings;
pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    /// Version label drawn in the corner of the screen
    pub const VERSION: &str = "v0.23";

    /// Package authors, for the startup banner
    pub const AUTHORS: &str = env!("CARGO_PKG_AUTHORS");

    /// Default drawing surface size (pixels)
    pub const VIEWPORT_WIDTH: f32 = 1000.0;
    pub const VIEWPORT_HEIGHT: f32 = 400.0;

    /// Road line sits this far above the bottom edge
    pub const ROAD_OFFSET: f32 = 80.0;
    /// Player's resting y sits this far above the bottom edge
    pub const PLAYER_GROUND_OFFSET: f32 = 140.0;
    /// Player's fixed horizontal position
    pub const PLAYER_X: f32 = 50.0;

    /// Every sprite cell becomes a SPRITE_SCALE x SPRITE_SCALE block
    pub const SPRITE_SCALE: u32 = 3;

    /// Frames per second the per-frame tuning values assume
    pub const FRAMES_PER_SECOND: u64 = 60;
}

/// Surface dimensions plus the two horizontal reference lines derived from them
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: consts::VIEWPORT_WIDTH,
            height: consts::VIEWPORT_HEIGHT,
        }
    }
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Y of the road line (vehicles stand on it)
    #[inline]
    pub fn road_y(&self) -> f32 {
        self.height - consts::ROAD_OFFSET
    }

    /// Resting y of the motorcycle's top edge
    #[inline]
    pub fn player_ground_y(&self) -> f32 {
        self.height - consts::PLAYER_GROUND_OFFSET
    }
}

/// Elapsed play time in whole-frame seconds
#[inline]
pub fn play_seconds(frame_count: u64) -> f32 {
    frame_count as f32 / consts::FRAMES_PER_SECOND as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_package_metadata() {
        assert_eq!(consts::AUTHORS, "Moto Runner contributors");
        assert!(consts::VERSION.starts_with('v'));
    }
}
