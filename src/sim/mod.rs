//! Frame-stepped simulation
//!
//! All gameplay logic lives here:
//! - One `tick` per animation frame, all values per frame
//! - Randomness only through `RandomSource`
//! - Stable iteration order (spawn order)
//! - No rendering or platform dependencies

pub mod collision;
pub mod rng;
pub mod sky;
pub mod spawner;
pub mod state;
pub mod tick;

pub use collision::{Hitbox, Rect, check_aabb_collision, resolve_collisions};
pub use rng::{RandomSource, ScriptedRng, SeededRng};
pub use state::{
    Billboard, BonusMessage, FlyingObstacle, GameEvent, GamePhase, GameState, GroundObstacle,
    Motion, Particle, Player, SkyCycle, SpawnTimers, SpriteMetrics, Star, VehicleKind,
};
pub use tick::{TickInput, perform_jump, tick};
