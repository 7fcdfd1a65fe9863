//! Procedural obstacle, convoy and billboard spawning
//!
//! Ground and flying obstacles each run on their own randomized timer whose
//! bounds shrink as the run goes on. A spawn is deferred when the other class
//! has something too close to the right edge, so a bird never arrives right on
//! top of a vehicle.

use glam::Vec2;

use super::rng::RandomSource;
use super::state::{
    Billboard, FlyingObstacle, GameEvent, GameState, GroundObstacle, VehicleKind,
};
use crate::assets::{BILLBOARD_MESSAGES, VEHICLE_COLORS};
use crate::play_seconds;
use crate::tuning::{IntervalBounds, Tuning, frames_from};

/// Interval bounds after difficulty scaling at `frame_count`
///
/// The lower bound shrinks by the decrease rate every speed epoch down to its
/// cap; the upper bound shrinks too but never closes to within `min_spacing`
/// of the lower one.
pub fn adjusted_bounds(frame_count: u64, bounds: &IntervalBounds, tuning: &Tuning) -> (f32, f32) {
    let epochs = (frame_count / tuning.speed_increase_interval.max(1)) as f32;
    let decrease = epochs * tuning.interval_decrease_rate;
    let min = bounds.min_cap.max(bounds.min - decrease);
    let max = (min + bounds.min_spacing).max(bounds.max - decrease);
    (min, max)
}

/// Frames until the next spawn, uniform in the adjusted bounds
pub fn spawn_interval(
    frame_count: u64,
    bounds: &IntervalBounds,
    tuning: &Tuning,
    rng: &mut dyn RandomSource,
) -> u64 {
    let (min, max) = adjusted_bounds(frame_count, bounds, tuning);
    frames_from(rng.range(min, max))
}

/// Whether the opposite class is still too close to the spawn edge
///
/// `last_right` is the trailing edge of that class's most recent obstacle;
/// with no live obstacles nothing is too close.
pub fn is_too_close(
    last_right: Option<f32>,
    convoy_tail_x: f32,
    spawn_x: f32,
    tuning: &Tuning,
) -> bool {
    let Some(last_right) = last_right else {
        return false;
    };
    spawn_x - last_right < tuning.safe_distance
        || spawn_x - convoy_tail_x < tuning.safe_distance + tuning.convoy_extra_distance
}

/// Run every spawn timer that is due this frame
pub fn spawn(state: &mut GameState, rng: &mut dyn RandomSource) {
    let frame = state.frame_count;
    let retry = frames_from(state.tuning.obstacle_retry_delay);

    if frame >= state.spawn.next_ground {
        let last_bird = state.flying.last().map(|b| b.right());
        if is_too_close(last_bird, state.spawn.convoy_tail_x, state.viewport.width, &state.tuning) {
            state.spawn.next_ground = frame + retry;
        } else {
            spawn_ground(state, rng);
            let interval = spawn_interval(
                state.frame_count,
                &state.tuning.ground_interval,
                &state.tuning,
                rng,
            );
            state.spawn.next_ground = frame + interval;
        }
    }

    if state.score > state.tuning.flying_obstacle_min_score && frame >= state.spawn.next_flying {
        let last_vehicle = state.obstacles.last().map(|o| o.right());
        if is_too_close(last_vehicle, state.spawn.convoy_tail_x, state.viewport.width, &state.tuning) {
            state.spawn.next_flying = frame + retry;
        } else {
            spawn_flying(state, rng);
            let interval = spawn_interval(
                state.frame_count,
                &state.tuning.flying_interval,
                &state.tuning,
                rng,
            );
            state.spawn.next_flying = frame + interval;
        }
    }

    if state.frame_count >= state.spawn.next_billboard {
        spawn_billboard(state, rng);
        state.spawn.next_billboard = state.frame_count + state.tuning.billboard_interval;
    }
}

fn random_paint(rng: &mut dyn RandomSource) -> u8 {
    rng.index(VEHICLE_COLORS.len()) as u8
}

fn push_vehicle(state: &mut GameState, kind: VehicleKind, x: f32, paint: u8) -> f32 {
    let (width, height) = state.metrics.vehicle(kind);
    let id = state.next_entity_id();
    state.obstacles.push(GroundObstacle {
        id,
        pos: Vec2::new(x, state.viewport.road_y() - height),
        width,
        height,
        kind,
        flip_h: false,
        paint,
    });
    x + width
}

fn spawn_ground(state: &mut GameState, rng: &mut dyn RandomSource) {
    let kinds: &[VehicleKind] = if state.score >= state.tuning.rideable_vehicle_min_score {
        &VehicleKind::ALL
    } else {
        &VehicleKind::ORDINARY
    };
    let kind = kinds[rng.index(kinds.len())];
    let paint = random_paint(rng);
    let lead_end = push_vehicle(state, kind, state.viewport.width, paint);
    log::debug!("Spawned {:?} at frame {}", kind, state.frame_count);

    let secs = play_seconds(state.frame_count);
    let tuning = &state.tuning;
    let pulls_convoy = match kind {
        VehicleKind::SemiTruck => secs >= tuning.semi_convoy_after_secs,
        VehicleKind::Bus => secs >= tuning.bus_convoy_after_secs,
        _ => false,
    };
    if pulls_convoy {
        let max_followers = if secs >= tuning.large_convoy_after_secs { 3 } else { 2 };
        spawn_convoy(state, lead_end, max_followers, rng);
    }
}

/// Queue 1..=`max_followers` small vehicles behind a lead vehicle ending at `lead_end`
fn spawn_convoy(state: &mut GameState, lead_end: f32, max_followers: u32, rng: &mut dyn RandomSource) {
    let followers = rng.int_inclusive(1, max_followers);
    let mut end = lead_end;
    for _ in 0..followers {
        let kind = VehicleKind::ORDINARY[rng.index(VehicleKind::ORDINARY.len())];
        let paint = random_paint(rng);
        end = push_vehicle(state, kind, end + state.tuning.convoy_spacing, paint);
    }
    state.spawn.convoy_tail_x = end;
    state.events.push(GameEvent::ConvoySpawned { followers });
    log::debug!("Convoy of {} behind lead, tail at {:.0}", followers, end);
}

fn spawn_flying(state: &mut GameState, rng: &mut dyn RandomSource) {
    let heights = &state.tuning.flying_heights;
    if heights.is_empty() {
        return;
    }
    let offset = heights[rng.index(heights.len())];
    let (width, height) = state.metrics.bird;
    let id = state.next_entity_id();
    state.flying.push(FlyingObstacle {
        id,
        pos: Vec2::new(state.viewport.width, state.viewport.road_y() + offset),
        width,
        height,
        wing_frame: 0,
    });
}

fn spawn_billboard(state: &mut GameState, rng: &mut dyn RandomSource) {
    let (width, height) = state.metrics.billboard;
    let message = rng.index(BILLBOARD_MESSAGES.len());
    let id = state.next_entity_id();
    state.billboards.push(Billboard {
        id,
        pos: Vec2::new(
            state.viewport.width,
            state.viewport.road_y() - height - state.tuning.billboard_lift,
        ),
        width,
        height,
        message,
    });
}
