//! Collision detection
//!
//! Axis-aligned boxes only. Rideable vehicles get a two-phase check: a
//! falling player whose hitbox bottom lands inside a band around the roof
//! starts riding instead of crashing.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::state::{GameEvent, GameState, Motion};

/// Axis-aligned rectangle (top-left origin)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Open-interval overlap on the x axis
    #[inline]
    pub fn overlaps_x(&self, other: &Rect) -> bool {
        self.x < other.right() && self.right() > other.x
    }
}

/// True iff the rectangles overlap on both axes. Touching edges do not count.
pub fn check_aabb_collision(a: &Rect, b: &Rect) -> bool {
    a.x < b.right() && a.right() > b.x && a.y < b.bottom() && a.bottom() > b.y
}

/// Player hitbox relative to the sprite's top-left corner
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hitbox {
    pub offset: Vec2,
    pub width: f32,
    pub height: f32,
}

impl Hitbox {
    /// Shrink a sprite rectangle by `ratio`, placed at `offset`
    pub fn from_sprite(dims: (f32, f32), ratio: f32, offset: Vec2) -> Self {
        Self {
            offset,
            width: dims.0 * ratio,
            height: dims.1 * ratio,
        }
    }

    /// World-space rectangle for a sprite drawn at `pos`
    pub fn at(&self, pos: Vec2) -> Rect {
        Rect::new(pos.x + self.offset.x, pos.y + self.offset.y, self.width, self.height)
    }
}

/// Whether a hitbox bottom sits inside the landing band of a roof at `top`
pub fn lands_on_top(hitbox: &Rect, roof: &Rect, band_above: f32, band_below: f32) -> bool {
    let bottom = hitbox.bottom();
    hitbox.overlaps_x(roof) && bottom <= roof.y + band_below && bottom >= roof.y - band_above
}

/// Run the per-frame collision pass. Returns true if the player crashed.
///
/// Obstacles are visited in spawn order; the first crash wins.
pub fn resolve_collisions(state: &mut GameState) -> bool {
    let hitbox = state.player_hitbox();
    let band_above = state.tuning.ride_band_above;
    let band_below = state.tuning.ride_band_below;

    for i in 0..state.obstacles.len() {
        let obstacle = &state.obstacles[i];
        let rect = obstacle.rect();

        if obstacle.kind.is_rideable() {
            let falling = state.player.is_jumping() && state.player.vel_y > 0.0;
            if falling && lands_on_top(&hitbox, &rect, band_above, band_below) {
                let vehicle = obstacle.id;
                state.player.motion = Motion::Riding { vehicle };
                state.player.vel_y = 0.0;
                state.events.push(GameEvent::RideStarted { vehicle });
                log::debug!("Riding vehicle {}", vehicle);
                continue;
            }
        }

        if !state.player.is_riding() && check_aabb_collision(&hitbox, &rect) {
            return true;
        }
    }

    state
        .flying
        .iter()
        .any(|bird| check_aabb_collision(&hitbox, &bird.rect()))
}
