//! Per-frame simulation step
//!
//! One call advances a playing run by exactly one frame. The order of the
//! sub-steps matters: scoring and speed first, then the player, then the
//! world, and collisions last so they see final positions.

use glam::Vec2;

use super::collision::resolve_collisions;
use super::rng::RandomSource;
use super::sky::advance_day_night;
use super::spawner;
use super::state::{GameEvent, GamePhase, GameState, Motion, NO_CONVOY, Particle};
use crate::play_seconds;

/// Input commands for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Jump was pressed since the last tick (one-shot)
    pub jump: bool,
    /// Duck is held (level-triggered)
    pub duck_held: bool,
}

/// Advance the game state by one frame
pub fn tick(state: &mut GameState, input: &TickInput, rng: &mut dyn RandomSource) {
    if state.phase != GamePhase::Playing {
        return;
    }
    state.events.clear();

    state.frame_count += 1;

    advance_day_night(state, rng);

    if state.frame_count % state.tuning.survival_points_interval.max(1) == 0 {
        state.score += 1;
    }

    if state.frame_count % state.tuning.speed_increase_interval.max(1) == 0 {
        let increment = if play_seconds(state.frame_count) >= state.tuning.speed_slowdown_after_secs {
            state.tuning.speed_increment * 0.5
        } else {
            state.tuning.speed_increment
        };
        state.game_speed += increment;
    }

    if input.jump {
        perform_jump(state);
    }
    update_player(state, input.duck_held);

    move_obstacles(state);
    spawner::spawn(state, rng);
    spawn_dust(state, rng);

    let gravity = state.tuning.particle_gravity;
    state.particles.retain_mut(|p| p.update(gravity));
    state.bonus_messages.retain_mut(|m| m.update());

    if resolve_collisions(state) {
        state.phase = GamePhase::GameOver;
        state.events.push(GameEvent::Crashed { score: state.score });
        log::info!(
            "Crashed at frame {} with score {}",
            state.frame_count,
            state.score
        );
    }
}

/// Start a jump if grounded or riding and not ducking
pub fn perform_jump(state: &mut GameState) {
    let player = &mut state.player;
    if player.is_jumping() || player.is_ducking {
        return;
    }
    player.vel_y = state.tuning.jump_power;
    player.motion = Motion::Airborne;
}

fn update_player(state: &mut GameState, duck_held: bool) {
    if let Motion::Riding { vehicle } = state.player.motion {
        let roof = state
            .vehicle(vehicle)
            .filter(|v| v.right() >= state.player.pos.x)
            .map(|v| v.pos.y);
        match roof {
            Some(roof_y) => {
                let height = state.player.height(&state.tuning);
                state.player.pos.y = roof_y - height - state.tuning.ride_clearance;
            }
            None => {
                // Vehicle scrolled out from under us
                state.player.motion = Motion::Airborne;
                state.player.vel_y = 0.0;
            }
        }
    }

    let tuning = &state.tuning;
    let player = &mut state.player;

    if !player.is_riding() && !player.is_jumping() {
        if duck_held {
            player.is_ducking = true;
            player.pos.y = player.ground_y + (tuning.normal_height - tuning.duck_height);
        } else {
            player.is_ducking = false;
            player.pos.y = player.ground_y;
        }
    }

    if player.is_jumping() {
        player.vel_y += if duck_held {
            tuning.fast_fall_gravity
        } else {
            tuning.gravity
        };
        player.pos.y += player.vel_y;

        if player.pos.y >= player.ground_y {
            player.pos.y = player.ground_y;
            player.vel_y = 0.0;
            player.motion = Motion::Grounded;
            player.landing_frames = tuning.landing_animation_frames;
        }
    }

    player.landing_frames = player.landing_frames.saturating_sub(1);
}

/// Scroll everything left and cull what left the screen, awarding points
fn move_obstacles(state: &mut GameState) {
    let tuning = &state.tuning;
    let vehicle_speed = state.game_speed * tuning.vehicle_speed_multiplier;
    let mut earned = 0;

    for obstacle in &mut state.obstacles {
        obstacle.pos.x -= vehicle_speed;
    }
    state.obstacles.retain(|o| {
        if o.right() < 0.0 {
            earned += o.kind.points(tuning);
            false
        } else {
            true
        }
    });
    if state.spawn.convoy_tail_x > NO_CONVOY {
        state.spawn.convoy_tail_x = (state.spawn.convoy_tail_x - vehicle_speed).max(NO_CONVOY);
    }

    let bird_speed = state.game_speed * tuning.flying_speed_multiplier;
    let wing_frame = ((state.frame_count / tuning.wing_flap_interval.max(1)) % 2) as u8;
    for bird in &mut state.flying {
        bird.pos.x -= bird_speed;
        bird.wing_frame = wing_frame;
    }
    state.flying.retain(|b| {
        if b.right() < 0.0 {
            earned += tuning.flying_obstacle_points;
            false
        } else {
            true
        }
    });

    let billboard_speed = state.game_speed * tuning.billboard_speed_multiplier;
    for board in &mut state.billboards {
        board.pos.x -= billboard_speed;
    }
    state.billboards.retain(|b| b.pos.x + b.width >= 0.0);

    state.score += earned;
}

fn spawn_dust(state: &mut GameState, rng: &mut dyn RandomSource) {
    let interval = state.tuning.particle_spawn_interval.max(1);
    if state.frame_count % interval != 0 || state.player.motion != Motion::Grounded {
        return;
    }
    let vel = Vec2::new(-2.0 - rng.next_f32() * 2.0, -1.0 - rng.next_f32() * 2.0);
    state.particles.push(Particle {
        pos: Vec2::new(state.player.pos.x + 10.0, state.viewport.road_y() + 5.0),
        vel,
        life: state.tuning.particle_life,
        max_life: state.tuning.particle_life,
        size: 2.0,
        color: state.tuning.particle_color,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Viewport;
    use crate::assets::BuiltinSprites;
    use crate::sim::rng::{ScriptedRng, SeededRng};
    use crate::sim::state::{Billboard, FlyingObstacle, GroundObstacle, VehicleKind};
    use crate::tuning::Tuning;

    fn playing_state() -> GameState {
        let mut state = GameState::new(Viewport::default(), Tuning::default(), &BuiltinSprites::new());
        state.phase = GamePhase::Playing;
        state
    }

    /// Playing state with spawning pushed out of reach
    fn quiet_state() -> GameState {
        let mut state = playing_state();
        state.spawn.next_ground = u64::MAX;
        state.spawn.next_flying = u64::MAX;
        state.spawn.next_billboard = u64::MAX;
        state
    }

    fn vehicle(state: &mut GameState, kind: VehicleKind, x: f32) -> GroundObstacle {
        let (width, height) = state.metrics.vehicle(kind);
        GroundObstacle {
            id: state.next_entity_id(),
            pos: Vec2::new(x, state.viewport.road_y() - height),
            width,
            height,
            kind,
            flip_h: false,
            paint: 0,
        }
    }

    #[test]
    fn test_tick_ignored_unless_playing() {
        let mut state = quiet_state();
        let mut rng = ScriptedRng::constant(0.5);
        state.phase = GamePhase::Waiting;
        tick(&mut state, &TickInput::default(), &mut rng);
        assert_eq!(state.frame_count, 0);
        state.phase = GamePhase::GameOver;
        tick(&mut state, &TickInput::default(), &mut rng);
        assert_eq!(state.frame_count, 0);
    }

    #[test]
    fn test_frame_count_and_speed_monotonic() {
        let mut state = playing_state();
        let mut rng = SeededRng::new(7);
        let mut last_speed = state.game_speed;
        for i in 0..3000 {
            if !state.is_playing() {
                break;
            }
            let input = TickInput {
                jump: i % 45 == 0,
                ..Default::default()
            };
            let before = state.frame_count;
            tick(&mut state, &input, &mut rng);
            assert_eq!(state.frame_count, before + 1);
            assert!(state.game_speed >= last_speed);
            last_speed = state.game_speed;
        }
    }

    #[test]
    fn test_survival_points() {
        let mut state = quiet_state();
        let mut rng = ScriptedRng::constant(0.5);
        for _ in 0..4 {
            tick(&mut state, &TickInput::default(), &mut rng);
        }
        assert_eq!(state.score, 0);
        tick(&mut state, &TickInput::default(), &mut rng);
        assert_eq!(state.score, 1);
    }

    #[test]
    fn test_speed_increment_halves_after_thirty_seconds() {
        let mut state = quiet_state();
        let mut rng = ScriptedRng::constant(0.5);
        state.frame_count = 1499;
        tick(&mut state, &TickInput::default(), &mut rng);
        assert_eq!(state.game_speed, 6.5);
        state.frame_count = 1799;
        tick(&mut state, &TickInput::default(), &mut rng);
        assert_eq!(state.game_speed, 6.75);
    }

    #[test]
    fn test_cull_awards_points_once() {
        let cases = [
            (VehicleKind::Car, 50),
            (VehicleKind::Van, 50),
            (VehicleKind::Bus, 100),
            (VehicleKind::SemiTruck, 100),
        ];
        for (kind, points) in cases {
            let mut state = quiet_state();
            let mut rng = ScriptedRng::constant(0.5);
            let mut obstacle = vehicle(&mut state, kind, 0.0);
            obstacle.pos.x = -obstacle.width + 1.0;
            state.obstacles.push(obstacle);
            tick(&mut state, &TickInput::default(), &mut rng);
            assert!(state.obstacles.is_empty());
            assert_eq!(state.score, points);
            tick(&mut state, &TickInput::default(), &mut rng);
            assert_eq!(state.score, points);
        }
    }

    #[test]
    fn test_bird_and_billboard_culling() {
        let mut state = quiet_state();
        let mut rng = ScriptedRng::constant(0.5);
        state.flying.push(FlyingObstacle {
            id: 1,
            pos: Vec2::new(-29.0, 100.0),
            width: 30.0,
            height: 15.0,
            wing_frame: 0,
        });
        state.billboards.push(Billboard {
            id: 2,
            pos: Vec2::new(-119.0, 100.0),
            width: 120.0,
            height: 90.0,
            message: 0,
        });
        tick(&mut state, &TickInput::default(), &mut rng);
        assert!(state.flying.is_empty());
        assert!(state.billboards.is_empty());
        assert_eq!(state.score, 75);
    }

    #[test]
    fn test_jump_and_land() {
        let mut state = quiet_state();
        let mut rng = ScriptedRng::constant(0.5);
        let jump = TickInput {
            jump: true,
            ..Default::default()
        };
        tick(&mut state, &jump, &mut rng);
        assert!(state.player.is_jumping());
        assert!((state.player.vel_y - -14.2).abs() < 1e-4);

        for _ in 0..60 {
            tick(&mut state, &TickInput::default(), &mut rng);
            if !state.player.is_jumping() {
                break;
            }
        }
        assert_eq!(state.player.motion, Motion::Grounded);
        assert_eq!(state.player.pos.y, state.player.ground_y);
        assert!(state.player.landing_frames > 0);
        assert!(state.player.shows_duck_pose());
    }

    #[test]
    fn test_duck_blocks_jump() {
        let mut state = quiet_state();
        let mut rng = ScriptedRng::constant(0.5);
        let duck = TickInput {
            duck_held: true,
            ..Default::default()
        };
        tick(&mut state, &duck, &mut rng);
        assert!(state.player.is_ducking);
        assert_eq!(state.player.pos.y, 280.0);

        let both = TickInput {
            jump: true,
            duck_held: true,
            ..Default::default()
        };
        tick(&mut state, &both, &mut rng);
        assert!(!state.player.is_jumping());

        tick(&mut state, &TickInput::default(), &mut rng);
        assert!(!state.player.is_ducking);
        assert_eq!(state.player.pos.y, 260.0);
    }

    /// Place the player so that after this frame's gravity step its hitbox
    /// bottom sits 2px below the roof of `roof_y`
    fn drop_onto(state: &mut GameState, roof_y: f32) {
        let hitbox = state.metrics.normal_hitbox;
        let y_after = roof_y + 2.0 - hitbox.offset.y - hitbox.height;
        state.player.motion = Motion::Airborne;
        state.player.vel_y = 2.2;
        state.player.pos.y = y_after - (2.2 + state.tuning.gravity);
    }

    #[test]
    fn test_landing_on_rideable_starts_ride() {
        let mut state = quiet_state();
        let mut rng = ScriptedRng::constant(0.5);
        let bus = vehicle(&mut state, VehicleKind::Bus, 40.0);
        let bus_id = bus.id;
        let roof = bus.pos.y;
        state.obstacles.push(bus);
        drop_onto(&mut state, roof);

        tick(&mut state, &TickInput::default(), &mut rng);
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.player.motion, Motion::Riding { vehicle: bus_id });
        assert_eq!(state.player.vel_y, 0.0);
        assert!(state.events.contains(&GameEvent::RideStarted { vehicle: bus_id }));

        // Riding pins the player to the roof
        tick(&mut state, &TickInput::default(), &mut rng);
        assert_eq!(state.player.pos.y, roof - 60.0 - 1.0);
        assert_eq!(state.phase, GamePhase::Playing);
    }

    #[test]
    fn test_same_landing_on_ordinary_vehicle_crashes() {
        let mut state = quiet_state();
        let mut rng = ScriptedRng::constant(0.5);
        let bus = vehicle(&mut state, VehicleKind::Bus, 40.0);
        let car = GroundObstacle {
            kind: VehicleKind::Car,
            ..bus
        };
        let roof = car.pos.y;
        state.obstacles.push(car);
        drop_onto(&mut state, roof);

        tick(&mut state, &TickInput::default(), &mut rng);
        assert_eq!(state.phase, GamePhase::GameOver);
        assert!(matches!(state.events.last(), Some(GameEvent::Crashed { .. })));
    }

    #[test]
    fn test_falls_off_when_vehicle_passes() {
        let mut state = quiet_state();
        let mut rng = ScriptedRng::constant(0.5);
        let mut bus = vehicle(&mut state, VehicleKind::Bus, 0.0);
        bus.pos.x = 50.0 - bus.width - 1.0;
        let bus_id = bus.id;
        state.obstacles.push(bus);
        state.player.motion = Motion::Riding { vehicle: bus_id };
        state.player.pos.y = 200.0;

        tick(&mut state, &TickInput::default(), &mut rng);
        assert!(state.player.is_jumping());
        // Free fall starts from rest
        assert!((state.player.vel_y - 0.8).abs() < 1e-4);
    }

    #[test]
    fn test_jump_off_vehicle_clears_ride() {
        let mut state = quiet_state();
        let mut rng = ScriptedRng::constant(0.5);
        state.player.motion = Motion::Riding { vehicle: 999 };
        state.player.pos.y = 200.0;
        let jump = TickInput {
            jump: true,
            ..Default::default()
        };
        tick(&mut state, &jump, &mut rng);
        assert!(state.player.is_jumping());
        assert!(state.player.vel_y < 0.0);
    }

    #[test]
    fn test_dust_only_on_ground() {
        let mut state = quiet_state();
        let mut rng = ScriptedRng::constant(0.5);
        for _ in 0..5 {
            tick(&mut state, &TickInput::default(), &mut rng);
        }
        assert_eq!(state.particles.len(), 1);
        let p = &state.particles[0];
        assert_eq!(p.vel.x, -3.0);
        // Spawned at x + 10 and aged once in the same frame
        assert!((p.pos.x - 57.0).abs() < 1e-4);
        assert_eq!(p.life, 19);
        assert_eq!(p.color, state.tuning.particle_color);

        let mut state = quiet_state();
        state.player.motion = Motion::Airborne;
        state.player.vel_y = -15.0;
        state.frame_count = 4;
        tick(&mut state, &TickInput::default(), &mut rng);
        assert!(state.particles.is_empty());
    }

    #[test]
    fn test_convoy_tail_scrolls() {
        let mut state = quiet_state();
        let mut rng = ScriptedRng::constant(0.5);
        state.spawn.convoy_tail_x = 1200.0;
        tick(&mut state, &TickInput::default(), &mut rng);
        assert!((state.spawn.convoy_tail_x - (1200.0 - 6.0 * 1.3)).abs() < 1e-3);

        state.spawn.convoy_tail_x = NO_CONVOY + 1.0;
        tick(&mut state, &TickInput::default(), &mut rng);
        assert_eq!(state.spawn.convoy_tail_x, NO_CONVOY);
        // Parked once cleared
        tick(&mut state, &TickInput::default(), &mut rng);
        assert_eq!(state.spawn.convoy_tail_x, NO_CONVOY);
    }

    #[test]
    fn test_reset_matches_fresh_state() {
        let mut state = playing_state();
        let mut rng = SeededRng::new(3);
        for i in 0..600 {
            let input = TickInput {
                jump: i % 45 == 0,
                ..Default::default()
            };
            tick(&mut state, &input, &mut rng);
        }
        state.reset();
        state.phase = GamePhase::Playing;

        let fresh = playing_state();
        let a = serde_json::to_value(&state).ok();
        let b = serde_json::to_value(&fresh).ok();
        assert!(a.is_some());
        assert_eq!(a, b);
    }
}
