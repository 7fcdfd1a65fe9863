//! Game state and core simulation types
//!
//! Everything one run needs lives in `GameState`; `tick` mutates it and the
//! scene renderer only reads it.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::{Hitbox, Rect};
use crate::Viewport;
use crate::assets::{BILLBOARD_MESSAGES, SpriteAssets, SpriteName};
use crate::consts::{PLAYER_X, SPRITE_SCALE};
use crate::renderer::Rgba;
use crate::tuning::Tuning;

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Before the first start, or paused (orientation lost, game hidden)
    Waiting,
    /// Active gameplay
    Playing,
    /// Run ended by a crash
    GameOver,
}

/// Vertical motion state of the motorcycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Motion {
    /// Resting on the road
    Grounded,
    /// Jumping or falling
    Airborne,
    /// Standing on a rideable vehicle (by entity id)
    Riding { vehicle: u32 },
}

/// The player's motorcycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    /// Top-left corner; x never changes
    pub pos: Vec2,
    pub vel_y: f32,
    pub motion: Motion,
    pub is_ducking: bool,
    /// Resting y on the road
    pub ground_y: f32,
    /// Frames left of the post-landing squash pose
    pub landing_frames: u32,
}

impl Player {
    pub fn new(ground_y: f32) -> Self {
        Self {
            pos: Vec2::new(PLAYER_X, ground_y),
            vel_y: 0.0,
            motion: Motion::Grounded,
            is_ducking: false,
            ground_y,
            landing_frames: 0,
        }
    }

    #[inline]
    pub fn is_jumping(&self) -> bool {
        self.motion == Motion::Airborne
    }

    #[inline]
    pub fn is_riding(&self) -> bool {
        matches!(self.motion, Motion::Riding { .. })
    }

    /// Id of the vehicle being ridden, if any
    pub fn riding_vehicle(&self) -> Option<u32> {
        match self.motion {
            Motion::Riding { vehicle } => Some(vehicle),
            _ => None,
        }
    }

    /// Physical height for the current pose
    pub fn height(&self, tuning: &Tuning) -> f32 {
        if self.is_ducking {
            tuning.duck_height
        } else {
            tuning.normal_height
        }
    }

    /// Whether the duck sprite is shown (ducking or squashing after a landing)
    pub fn shows_duck_pose(&self) -> bool {
        self.is_ducking || self.landing_frames > 0
    }
}

/// Ground vehicle kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VehicleKind {
    Car,
    Truck,
    Van,
    Bus,
    SemiTruck,
}

impl VehicleKind {
    pub const ALL: [VehicleKind; 5] = [
        VehicleKind::Car,
        VehicleKind::Truck,
        VehicleKind::Van,
        VehicleKind::Bus,
        VehicleKind::SemiTruck,
    ];

    /// Kinds that can never be ridden (also the convoy followers)
    pub const ORDINARY: [VehicleKind; 3] = [VehicleKind::Car, VehicleKind::Truck, VehicleKind::Van];

    /// Buses and semis can be landed on
    pub fn is_rideable(self) -> bool {
        matches!(self, VehicleKind::Bus | VehicleKind::SemiTruck)
    }

    pub fn sprite(self) -> SpriteName {
        match self {
            VehicleKind::Car => SpriteName::Car,
            VehicleKind::Truck => SpriteName::Truck,
            VehicleKind::Van => SpriteName::Van,
            VehicleKind::Bus => SpriteName::Bus,
            VehicleKind::SemiTruck => SpriteName::SemiTruck,
        }
    }

    /// Points for letting this vehicle pass off-screen
    pub fn points(self, tuning: &Tuning) -> u64 {
        if self.is_rideable() {
            tuning.rideable_vehicle_points
        } else {
            tuning.vehicle_points
        }
    }
}

/// A vehicle driving toward the player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroundObstacle {
    pub id: u32,
    pub pos: Vec2,
    pub width: f32,
    pub height: f32,
    pub kind: VehicleKind,
    /// Vehicles face the player, so this stays false
    pub flip_h: bool,
    /// Index into the vehicle paint table
    pub paint: u8,
}

impl GroundObstacle {
    /// Trailing (right) edge
    #[inline]
    pub fn right(&self) -> f32 {
        self.pos.x + self.width
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.pos.x, self.pos.y, self.width, self.height)
    }
}

/// A bird
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlyingObstacle {
    pub id: u32,
    pub pos: Vec2,
    pub width: f32,
    pub height: f32,
    /// 0 = wings up, 1 = wings down
    pub wing_frame: u8,
}

impl FlyingObstacle {
    #[inline]
    pub fn right(&self) -> f32 {
        self.pos.x + self.width
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.pos.x, self.pos.y, self.width, self.height)
    }
}

/// Roadside scenery with a short message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Billboard {
    pub id: u32,
    pub pos: Vec2,
    pub width: f32,
    pub height: f32,
    /// Index into `BILLBOARD_MESSAGES`
    pub message: usize,
}

impl Billboard {
    pub fn lines(&self) -> &'static [&'static str] {
        BILLBOARD_MESSAGES
            .get(self.message)
            .copied()
            .unwrap_or(&[])
    }
}

/// Dust kicked up by the rear wheel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub life: u32,
    pub max_life: u32,
    pub size: f32,
    pub color: Rgba,
}

impl Particle {
    /// Integrate one frame; returns false once expired
    pub fn update(&mut self, gravity: f32) -> bool {
        self.pos += self.vel;
        self.vel.y += gravity;
        self.life = self.life.saturating_sub(1);
        self.life > 0
    }

    pub fn alpha(&self) -> f32 {
        if self.max_life == 0 {
            return 0.0;
        }
        self.life as f32 / self.max_life as f32
    }
}

/// Floating score notice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BonusMessage {
    pub text: String,
    pub pos: Vec2,
    pub start_y: f32,
    pub vel_y: f32,
    pub max_rise: f32,
    pub duration: u32,
    pub max_duration: u32,
}

impl BonusMessage {
    pub fn new(text: impl Into<String>, pos: Vec2, tuning: &Tuning) -> Self {
        Self {
            text: text.into(),
            pos,
            start_y: pos.y,
            vel_y: tuning.bonus_message_speed,
            max_rise: tuning.bonus_message_rise,
            duration: tuning.bonus_message_duration,
            max_duration: tuning.bonus_message_duration,
        }
    }

    /// Drift up (bounded) and age one frame; returns false once expired
    pub fn update(&mut self) -> bool {
        if self.start_y - self.pos.y < self.max_rise {
            self.pos.y += self.vel_y;
        }
        self.duration = self.duration.saturating_sub(1);
        self.duration > 0
    }

    /// Fades in over the first 5% and out over the last 47.5%
    pub fn alpha(&self) -> f32 {
        let max = self.max_duration as f32;
        let elapsed = max - self.duration as f32;
        let fade_in = max * 0.05;
        let fade_out = max * 0.475;
        if elapsed < fade_in {
            elapsed / fade_in
        } else if (self.duration as f32) < fade_out {
            self.duration as f32 / fade_out
        } else {
            1.0
        }
    }
}

/// Night-sky star
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Star {
    pub pos: Vec2,
    pub size: f32,
    pub speed: f32,
    pub opacity: f32,
}

/// Day/night cycle state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkyCycle {
    /// Sun (day) or moon (night) x position
    pub sun_x: f32,
    pub is_night: bool,
    /// A flip happened and its bonus waits for the crossfade to finish
    pub pending_bonus: bool,
    /// 0 = day colors, 1 = night colors
    pub crossfade: f32,
    /// Flips so far this run
    pub flips: u32,
}

impl SkyCycle {
    pub fn new(viewport: &Viewport, tuning: &Tuning) -> Self {
        Self {
            sun_x: viewport.width - tuning.sun_margin,
            is_night: false,
            pending_bonus: false,
            crossfade: 0.0,
            flips: 0,
        }
    }

    /// Crossfade value the sky is heading toward
    pub fn target(&self) -> f32 {
        if self.is_night { 1.0 } else { 0.0 }
    }
}

/// Convoy tail position when no convoy is active
pub const NO_CONVOY: f32 = -1000.0;

/// Frame numbers at which the next spawn of each class is due
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpawnTimers {
    pub next_ground: u64,
    pub next_flying: u64,
    pub next_billboard: u64,
    /// Trailing edge of the most recent convoy; scrolls with ground traffic
    pub convoy_tail_x: f32,
}

impl SpawnTimers {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            next_ground: tuning.first_ground_spawn(),
            next_flying: tuning.first_flying_spawn(),
            next_billboard: tuning.billboard_interval,
            convoy_tail_x: NO_CONVOY,
        }
    }
}

/// Pixel sizes the simulation needs from the sprite sheet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpriteMetrics {
    pub motorcycle: (f32, f32),
    pub motorcycle_duck: (f32, f32),
    /// Indexed like `VehicleKind::ALL`
    pub vehicles: [(f32, f32); 5],
    pub bird: (f32, f32),
    pub billboard: (f32, f32),
    pub normal_hitbox: Hitbox,
    pub duck_hitbox: Hitbox,
}

impl SpriteMetrics {
    pub fn from_assets(assets: &dyn SpriteAssets, tuning: &Tuning) -> Self {
        let dims = |name| assets.dimensions(name, SPRITE_SCALE);
        let motorcycle = dims(SpriteName::Motorcycle);
        let motorcycle_duck = dims(SpriteName::MotorcycleDuck);
        Self {
            motorcycle,
            motorcycle_duck,
            vehicles: VehicleKind::ALL.map(|kind| dims(kind.sprite())),
            bird: dims(SpriteName::BirdUp),
            billboard: dims(SpriteName::Billboard),
            normal_hitbox: Hitbox::from_sprite(motorcycle, tuning.hitbox_ratio, Vec2::new(1.0, 4.0)),
            duck_hitbox: Hitbox::from_sprite(
                motorcycle_duck,
                tuning.hitbox_ratio,
                Vec2::new(1.0, 3.0),
            ),
        }
    }

    pub fn vehicle(&self, kind: VehicleKind) -> (f32, f32) {
        self.vehicles[kind as usize]
    }
}

/// Notable things that happened during a tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// Run ended with this score
    Crashed { score: u64 },
    /// Sky flipped
    DayNightFlip { night: bool },
    /// Day/night bonus credited
    BonusAwarded { points: u64 },
    /// Started riding a vehicle
    RideStarted { vehicle: u32 },
    /// Convoy of `followers` vehicles spawned behind a large vehicle
    ConvoySpawned { followers: u32 },
}

/// Complete state of one run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub viewport: Viewport,
    pub tuning: Tuning,
    pub metrics: SpriteMetrics,
    pub phase: GamePhase,
    pub score: u64,
    /// Frames simulated this run
    pub frame_count: u64,
    pub game_speed: f32,
    pub player: Player,
    /// Ordered by spawn
    pub obstacles: Vec<GroundObstacle>,
    pub flying: Vec<FlyingObstacle>,
    pub billboards: Vec<Billboard>,
    pub particles: Vec<Particle>,
    pub bonus_messages: Vec<BonusMessage>,
    pub stars: Vec<Star>,
    pub sky: SkyCycle,
    pub spawn: SpawnTimers,
    /// Events from the most recent tick
    #[serde(skip)]
    pub events: Vec<GameEvent>,
    next_id: u32,
}

impl GameState {
    pub fn new(viewport: Viewport, tuning: Tuning, assets: &dyn SpriteAssets) -> Self {
        let metrics = SpriteMetrics::from_assets(assets, &tuning);
        Self {
            player: Player::new(viewport.player_ground_y()),
            game_speed: tuning.initial_speed,
            sky: SkyCycle::new(&viewport, &tuning),
            spawn: SpawnTimers::new(&tuning),
            viewport,
            tuning,
            metrics,
            phase: GamePhase::Waiting,
            score: 0,
            frame_count: 0,
            obstacles: Vec::new(),
            flying: Vec::new(),
            billboards: Vec::new(),
            particles: Vec::new(),
            bonus_messages: Vec::new(),
            stars: Vec::new(),
            events: Vec::new(),
            next_id: 1,
        }
    }

    /// Fresh run state; keeps viewport, tuning and metrics
    pub fn reset(&mut self) {
        self.score = 0;
        self.frame_count = 0;
        self.game_speed = self.tuning.initial_speed;
        self.player = Player::new(self.viewport.player_ground_y());
        self.obstacles.clear();
        self.flying.clear();
        self.billboards.clear();
        self.particles.clear();
        self.bonus_messages.clear();
        self.stars.clear();
        self.sky = SkyCycle::new(&self.viewport, &self.tuning);
        self.spawn = SpawnTimers::new(&self.tuning);
        self.events.clear();
        self.next_id = 1;
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Current player hitbox in world space
    pub fn player_hitbox(&self) -> Rect {
        let hitbox = if self.player.is_ducking {
            &self.metrics.duck_hitbox
        } else {
            &self.metrics.normal_hitbox
        };
        hitbox.at(self.player.pos)
    }

    pub fn vehicle(&self, id: u32) -> Option<&GroundObstacle> {
        self.obstacles.iter().find(|o| o.id == id)
    }

    pub fn is_playing(&self) -> bool {
        self.phase == GamePhase::Playing
    }
}
