//! Day/night cycle
//!
//! The sun (or moon) drifts left; when it reaches the left margin the sky
//! flips and the object jumps back to the right. Surviving a flip is worth a
//! bonus, credited once the color crossfade has fully settled.

use glam::Vec2;

use super::rng::RandomSource;
use super::state::{BonusMessage, GameEvent, GameState, Star};

/// Advance the sky one frame
pub fn advance_day_night(state: &mut GameState, rng: &mut dyn RandomSource) {
    let tuning = &state.tuning;
    state.sky.sun_x -= tuning.sun_speed;

    if state.sky.sun_x <= tuning.sun_margin {
        flip(state, rng);
    }

    let target = state.sky.target();
    let step = state.tuning.sky_transition_speed;
    let sky = &mut state.sky;
    if sky.crossfade < target {
        sky.crossfade = (sky.crossfade + step).min(target);
    } else if sky.crossfade > target {
        sky.crossfade = (sky.crossfade - step).max(target);
    }

    if state.sky.pending_bonus && state.sky.crossfade == target {
        award_bonus(state);
    }

    update_stars(state);
}

fn flip(state: &mut GameState, rng: &mut dyn RandomSource) {
    let sky = &mut state.sky;
    sky.is_night = !sky.is_night;
    sky.sun_x = state.viewport.width - state.tuning.sun_margin;
    sky.flips += 1;
    let night = sky.is_night;

    if night {
        state.stars = generate_stars(state, rng);
    }

    let earns_bonus = state.sky.flips > 1 || state.tuning.bonus_on_first_flip;
    if earns_bonus && state.score > 0 {
        state.sky.pending_bonus = true;
    }
    state.events.push(GameEvent::DayNightFlip { night });
    log::debug!(
        "Sky flipped to {} at frame {}",
        if night { "night" } else { "day" },
        state.frame_count
    );
}

fn award_bonus(state: &mut GameState) {
    let points = state.tuning.day_night_bonus;
    state.score += points;
    let pos = Vec2::new(state.viewport.width / 2.0, state.viewport.road_y() / 3.0);
    let message = BonusMessage::new(format!("Bonus +{}", points), pos, &state.tuning);
    state.bonus_messages.push(message);
    state.sky.pending_bonus = false;
    state.events.push(GameEvent::BonusAwarded { points });
    log::info!("Day/night bonus +{} (score {})", points, state.score);
}

/// A fresh star field above the horizon
pub fn generate_stars(state: &GameState, rng: &mut dyn RandomSource) -> Vec<Star> {
    let tuning = &state.tuning;
    let max_y = state.viewport.road_y() - 100.0;
    (0..tuning.star_count)
        .map(|_| Star {
            pos: Vec2::new(
                rng.next_f32() * state.viewport.width,
                rng.next_f32() * max_y,
            ),
            size: rng.range(tuning.star_size.0, tuning.star_size.1),
            speed: rng.range(tuning.star_speed.0, tuning.star_speed.1),
            opacity: rng.range(tuning.star_opacity.0, tuning.star_opacity.1),
        })
        .collect()
}

/// Drift stars left, wrapping past the left edge (night only)
pub fn update_stars(state: &mut GameState) {
    if !state.sky.is_night {
        return;
    }
    let wrap_x = state.viewport.width + 10.0;
    for star in &mut state.stars {
        star.pos.x -= star.speed;
        if star.pos.x < -10.0 {
            star.pos.x = wrap_x;
        }
    }
}
