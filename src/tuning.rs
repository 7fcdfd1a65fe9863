//! Data-driven game balance
//!
//! Every value is expressed per frame at 60 Hz. Defaults reproduce the
//! shipped game; a JSON override can replace any subset of fields.

use serde::{Deserialize, Serialize};

use crate::renderer::Rgba;

/// Spawn interval bounds for one obstacle class
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IntervalBounds {
    /// Lower bound before difficulty scaling (frames)
    pub min: f32,
    /// Upper bound before difficulty scaling (frames)
    pub max: f32,
    /// The lower bound never drops below this
    pub min_cap: f32,
    /// The upper bound always stays at least this far above the lower bound
    pub min_spacing: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Speed & difficulty ===
    pub initial_speed: f32,
    pub speed_increment: f32,
    /// Frames between speed increases; also the length of one "speed epoch"
    pub speed_increase_interval: u64,
    /// Speed increments halve once play time reaches this (seconds)
    pub speed_slowdown_after_secs: f32,

    // === Scoring ===
    pub survival_points_interval: u64,
    pub vehicle_points: u64,
    pub rideable_vehicle_points: u64,
    pub flying_obstacle_points: u64,
    pub rideable_vehicle_min_score: u64,
    pub flying_obstacle_min_score: u64,
    pub day_night_bonus: u64,
    /// Award the day/night bonus on the very first flip of a run
    pub bonus_on_first_flip: bool,

    // === Ground vehicles ===
    pub ground_interval: IntervalBounds,
    pub interval_decrease_rate: f32,
    pub obstacle_retry_delay: f32,
    pub vehicle_speed_multiplier: f32,
    pub convoy_spacing: f32,
    pub semi_convoy_after_secs: f32,
    pub bus_convoy_after_secs: f32,
    pub large_convoy_after_secs: f32,

    // === Flying obstacles ===
    pub flying_interval: IntervalBounds,
    pub flying_speed_multiplier: f32,
    pub wing_flap_interval: u64,
    pub flying_heights: Vec<f32>,
    pub safe_distance: f32,
    /// Extra spacing demanded from the tail of an active convoy
    pub convoy_extra_distance: f32,

    // === Billboards ===
    pub billboard_interval: u64,
    pub billboard_speed_multiplier: f32,
    pub billboard_lift: f32,

    // === Player physics ===
    pub gravity: f32,
    pub fast_fall_gravity: f32,
    pub jump_power: f32,
    pub normal_height: f32,
    pub duck_height: f32,
    pub ride_clearance: f32,
    pub landing_animation_frames: u32,
    pub hitbox_ratio: f32,
    /// Tolerance above a rideable roof that still counts as landing
    pub ride_band_above: f32,
    /// Tolerance below a rideable roof that still counts as landing
    pub ride_band_below: f32,

    // === Particles & messages ===
    pub particle_spawn_interval: u64,
    pub particle_life: u32,
    pub particle_gravity: f32,
    /// Dust tint; particles fade through global alpha
    pub particle_color: Rgba,
    pub bonus_message_duration: u32,
    pub bonus_message_rise: f32,
    pub bonus_message_speed: f32,

    // === Sky ===
    pub sky_transition_speed: f32,
    pub sun_speed: f32,
    /// The sky object starts this far from the right edge and flips once
    /// its x drops to this value
    pub sun_margin: f32,
    pub star_count: usize,
    pub star_size: (f32, f32),
    pub star_speed: (f32, f32),
    pub star_opacity: (f32, f32),
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            initial_speed: 6.0,
            speed_increment: 0.5,
            speed_increase_interval: 300,
            speed_slowdown_after_secs: 30.0,

            survival_points_interval: 5,
            vehicle_points: 50,
            rideable_vehicle_points: 100,
            flying_obstacle_points: 75,
            rideable_vehicle_min_score: 300,
            flying_obstacle_min_score: 100,
            day_night_bonus: 500,
            bonus_on_first_flip: true,

            ground_interval: IntervalBounds {
                min: 60.0,
                max: 120.0,
                min_cap: 40.0,
                min_spacing: 30.0,
            },
            interval_decrease_rate: 0.5,
            obstacle_retry_delay: 20.0,
            vehicle_speed_multiplier: 1.3,
            convoy_spacing: 30.0,
            semi_convoy_after_secs: 15.0,
            bus_convoy_after_secs: 30.0,
            large_convoy_after_secs: 60.0,

            flying_interval: IntervalBounds {
                min: 100.0,
                max: 200.0,
                min_cap: 60.0,
                min_spacing: 50.0,
            },
            flying_speed_multiplier: 1.2,
            wing_flap_interval: 10,
            // Mix of high (jump over) and low (duck under) birds
            flying_heights: vec![-140.0, -120.0, -100.0, -60.0, -40.0],
            safe_distance: 300.0,
            convoy_extra_distance: 200.0,

            billboard_interval: 900,
            billboard_speed_multiplier: 0.7,
            billboard_lift: 20.0,

            gravity: 0.8,
            fast_fall_gravity: 2.5,
            jump_power: -15.0,
            normal_height: 60.0,
            duck_height: 40.0,
            ride_clearance: 1.0,
            landing_animation_frames: 8,
            hitbox_ratio: 0.7,
            ride_band_above: 5.0,
            ride_band_below: 10.0,

            particle_spawn_interval: 5,
            particle_life: 20,
            particle_gravity: 0.1,
            particle_color: Rgba::rgb(194, 178, 128),
            bonus_message_duration: 300,
            bonus_message_rise: 40.0,
            bonus_message_speed: -0.3,

            sky_transition_speed: 0.01,
            sun_speed: 0.5,
            sun_margin: 100.0,
            star_count: 50,
            star_size: (0.5, 2.0),
            star_speed: (0.05, 0.15),
            star_opacity: (0.5, 1.0),
        }
    }
}

impl Tuning {
    /// Parse a tuning override, keeping defaults for missing fields.
    ///
    /// Malformed JSON falls back to the defaults entirely.
    pub fn from_json(json: &str) -> Self {
        match serde_json::from_str::<Tuning>(json) {
            Ok(tuning) => tuning,
            Err(e) => {
                log::warn!("Ignoring malformed tuning override: {}", e);
                Self::default()
            }
        }
    }

    /// First frame at which the first ground vehicle may appear
    pub fn first_ground_spawn(&self) -> u64 {
        frames_from(self.ground_interval.max)
    }

    /// Flying obstacles start one score-gate later than their own interval
    pub fn first_flying_spawn(&self) -> u64 {
        frames_from(self.flying_interval.max) + self.flying_obstacle_min_score
    }
}

/// Whole frames covering a fractional delay
///
/// A timer due at frame 119.4 first fires on frame 120, so fractions round up.
pub fn frames_from(delay: f32) -> u64 {
    delay.max(0.0).ceil() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_override_keeps_defaults() {
        let tuning = Tuning::from_json(r#"{ "initial_speed": 8.0, "star_count": 10 }"#);
        assert_eq!(tuning.initial_speed, 8.0);
        assert_eq!(tuning.star_count, 10);
        assert_eq!(tuning.vehicle_points, 50);
        assert_eq!(tuning.ground_interval.min_cap, 40.0);
    }

    #[test]
    fn test_malformed_override_falls_back() {
        let tuning = Tuning::from_json("{ not json");
        assert_eq!(tuning, Tuning::default());
    }

    #[test]
    fn test_first_spawn_offsets() {
        let tuning = Tuning::default();
        assert_eq!(tuning.first_ground_spawn(), 120);
        assert_eq!(tuning.first_flying_spawn(), 300);
    }

    #[test]
    fn test_frames_from_rounds_up() {
        assert_eq!(frames_from(20.0), 20);
        assert_eq!(frames_from(59.01), 60);
        assert_eq!(frames_from(-3.0), 0);
        // Late-run frame numbers stay exact where an f32 would not
        let late = 16_777_217u64;
        assert_eq!(late + frames_from(1.0), 16_777_218);
    }

    #[test]
    fn test_particle_color_override() {
        let tuning = Tuning::from_json(r#"{ "particle_color": { "r": 10, "g": 20, "b": 30, "a": 255 } }"#);
        assert_eq!(tuning.particle_color, Rgba::rgb(10, 20, 30));
        assert_eq!(Tuning::default().particle_color, Rgba::rgb(194, 178, 128));
    }
}
