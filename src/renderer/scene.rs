//! Scene renderer
//!
//! Draws one frame from a read-only `GameState`, back to front: sky, stars,
//! sun or moon, billboards, road, dust, motorcycle, obstacles, bonus
//! messages, HUD.

use glam::Vec2;

use super::canvas::{Canvas, TextAlign, TextStyle};
use super::pixel::{Rgba, colors};
use super::sprite::{Palette, SpriteCache};
use crate::assets::{BILLBOARD_POST_ROWS, SpriteAssets, SpriteName};
use crate::consts::{SPRITE_SCALE, VERSION};
use crate::highscores::HighScores;
use crate::settings::Settings;
use crate::sim::state::{GamePhase, GameState};

const SUN_Y: f32 = 60.0;
const SUN_RADIUS: f32 = 30.0;
const MOON_CRESCENT_OFFSET: f32 = 12.0;
/// Glow ring radii as multiples of the sun radius, matching `SUN_GLOW`
const SUN_GLOW_RADII: [f32; 3] = [1.3, 1.65, 2.0];

const ROAD_WIDTH: f32 = 40.0;
const DASH_SPACING: f32 = 40.0;
const DASH_LENGTH: f32 = 20.0;
const CENTER_LINE_WIDTH: f32 = 3.0;

/// Billboard frame thickness (pixels)
const BILLBOARD_PADDING: f32 = 6.0;
const BILLBOARD_LINE_GAP: f32 = 12.0;
const BILLBOARD_THREE_LINE_GAP: f32 = 18.0;

/// Draws game frames through a sprite cache
pub struct SceneRenderer {
    assets: Box<dyn SpriteAssets>,
    cache: SpriteCache,
    /// One palette per vehicle paint job
    vehicle_palettes: Vec<Palette>,
}

impl SceneRenderer {
    pub fn new(assets: Box<dyn SpriteAssets>) -> Self {
        let vehicle_palettes = (0..assets.vehicle_colors().len())
            .map(|i| assets.palette_variant(i as u8))
            .collect();
        Self {
            assets,
            cache: SpriteCache::new(),
            vehicle_palettes,
        }
    }

    pub fn assets(&self) -> &dyn SpriteAssets {
        self.assets.as_ref()
    }

    pub fn cache(&self) -> &SpriteCache {
        &self.cache
    }

    /// Draw a complete frame
    pub fn draw(
        &mut self,
        state: &GameState,
        high_scores: &HighScores,
        settings: &Settings,
        canvas: &mut dyn Canvas,
    ) {
        canvas.clear();
        canvas.set_global_alpha(1.0);

        let road_y = state.viewport.road_y();
        let sky = colors::SKY_DAY.lerp(colors::SKY_NIGHT, state.sky.crossfade);
        canvas.fill_rect(0.0, 0.0, state.viewport.width, road_y, sky);

        if state.phase == GamePhase::Waiting {
            self.draw_waiting(state, canvas);
            return;
        }

        self.draw_stars(state, canvas);
        self.draw_sky_object(state, sky, canvas);
        self.draw_billboards(state, canvas);
        self.draw_ground(state, canvas);
        if settings.dust_particles {
            self.draw_particles(state, canvas);
        }
        self.draw_motorcycle(state, canvas);
        self.draw_obstacles(state, canvas);
        self.draw_bonus_messages(state, canvas);
        self.draw_hud(state, high_scores, settings, canvas);
        if state.phase == GamePhase::GameOver {
            self.draw_game_over(state, high_scores, canvas);
        }
        if settings.show_hitboxes {
            self.draw_hitboxes(state, canvas);
        }
    }

    fn text_color(state: &GameState) -> Rgba {
        colors::TEXT_DAY.lerp(colors::TEXT_NIGHT, state.sky.crossfade)
    }

    fn draw_sprite(&mut self, canvas: &mut dyn Canvas, name: SpriteName, pos: Vec2) {
        let sprite = self.assets.sprite(name);
        let palette = self.assets.default_palette();
        self.cache
            .draw(canvas, sprite, pos.x, pos.y, SPRITE_SCALE, false, palette);
    }

    fn draw_waiting(&mut self, state: &GameState, canvas: &mut dyn Canvas) {
        let cx = state.viewport.width / 2.0;
        let cy = state.viewport.height / 2.0;
        canvas.fill_text(
            "Press SPACE to Start",
            cx,
            cy - 50.0,
            TextStyle::new(32.0, colors::TEXT_DAY).bold(),
        );
        canvas.fill_text(VERSION, cx, cy - 10.0, TextStyle::new(12.0, colors::TEXT_DAY));
        self.draw_ground(state, canvas);
        self.draw_motorcycle(state, canvas);
    }

    fn draw_stars(&self, state: &GameState, canvas: &mut dyn Canvas) {
        if !state.sky.is_night {
            return;
        }
        for star in &state.stars {
            canvas.fill_circle(
                star.pos.x,
                star.pos.y,
                star.size,
                colors::STAR.with_alpha(star.opacity),
            );
        }
    }

    fn draw_sky_object(&self, state: &GameState, sky: Rgba, canvas: &mut dyn Canvas) {
        let x = state.sky.sun_x;
        if state.sky.is_night {
            canvas.fill_circle(x, SUN_Y, SUN_RADIUS, colors::MOON);
            // Sky-colored disc bites the crescent out
            canvas.fill_circle(x + MOON_CRESCENT_OFFSET, SUN_Y, SUN_RADIUS, sky);
        } else {
            for (stop, scale) in colors::SUN_GLOW[..3].iter().rev().zip(SUN_GLOW_RADII.iter().rev()) {
                canvas.fill_circle(x, SUN_Y, SUN_RADIUS * scale, *stop);
            }
            canvas.fill_circle(x, SUN_Y, SUN_RADIUS, colors::SUN_CORE);
        }
    }

    fn draw_billboards(&mut self, state: &GameState, canvas: &mut dyn Canvas) {
        let post_height = (BILLBOARD_POST_ROWS as u32 * SPRITE_SCALE) as f32;
        let style = TextStyle::new(23.0, colors::BILLBOARD_TEXT).bold().middle();

        for board in &state.billboards {
            self.draw_sprite(canvas, SpriteName::Billboard, board.pos);
            canvas.fill_rect(
                board.pos.x + BILLBOARD_PADDING,
                board.pos.y + BILLBOARD_PADDING,
                board.width - BILLBOARD_PADDING * 2.0,
                board.height - BILLBOARD_PADDING * 2.0 - post_height,
                colors::BILLBOARD_PANEL,
            );

            let cx = board.pos.x + board.width / 2.0;
            let cy = board.pos.y + (board.height - post_height) / 2.0;
            let lines = board.lines();
            let offsets: &[f32] = match lines.len() {
                1 => &[0.0],
                2 => &[-BILLBOARD_LINE_GAP, BILLBOARD_LINE_GAP],
                _ => &[-BILLBOARD_THREE_LINE_GAP, 0.0, BILLBOARD_THREE_LINE_GAP],
            };
            for (line, dy) in lines.iter().zip(offsets) {
                canvas.fill_text(line, cx, cy + dy, style);
            }
        }
    }

    fn draw_ground(&self, state: &GameState, canvas: &mut dyn Canvas) {
        let road_y = state.viewport.road_y();
        let width = state.viewport.width;
        canvas.fill_rect(0.0, road_y - ROAD_WIDTH / 2.0, width, ROAD_WIDTH, colors::ROAD);

        let offset = (state.frame_count as f32 * state.game_speed) % DASH_SPACING;
        let mut x = -offset;
        while x < width {
            canvas.fill_rect(
                x,
                road_y - CENTER_LINE_WIDTH / 2.0,
                DASH_LENGTH,
                CENTER_LINE_WIDTH,
                colors::CENTER_LINE,
            );
            x += DASH_SPACING;
        }
    }

    fn draw_particles(&self, state: &GameState, canvas: &mut dyn Canvas) {
        for p in &state.particles {
            canvas.set_global_alpha(p.alpha());
            canvas.fill_rect(p.pos.x, p.pos.y, p.size, p.size, p.color);
        }
        canvas.set_global_alpha(1.0);
    }

    fn draw_motorcycle(&mut self, state: &GameState, canvas: &mut dyn Canvas) {
        let player = &state.player;
        let mut pos = player.pos;
        let name = if player.shows_duck_pose() {
            SpriteName::MotorcycleDuck
        } else {
            SpriteName::Motorcycle
        };
        if player.landing_frames > 0 && !player.is_ducking {
            // Keep the wheels on the road while squashed
            pos.y += state.metrics.motorcycle.1 - state.metrics.motorcycle_duck.1;
        }
        self.draw_sprite(canvas, name, pos);
    }

    fn draw_obstacles(&mut self, state: &GameState, canvas: &mut dyn Canvas) {
        for vehicle in &state.obstacles {
            let sprite = self.assets.sprite(vehicle.kind.sprite());
            let palette = self
                .vehicle_palettes
                .get(vehicle.paint as usize)
                .unwrap_or_else(|| self.assets.default_palette());
            self.cache.draw(
                canvas,
                sprite,
                vehicle.pos.x,
                vehicle.pos.y,
                SPRITE_SCALE,
                vehicle.flip_h,
                palette,
            );
        }

        for bird in &state.flying {
            let name = if bird.wing_frame == 0 {
                SpriteName::BirdUp
            } else {
                SpriteName::BirdDown
            };
            self.draw_sprite(canvas, name, bird.pos);
        }
    }

    fn draw_bonus_messages(&self, state: &GameState, canvas: &mut dyn Canvas) {
        let style = TextStyle::new(48.0, Self::text_color(state)).bold().middle();
        for message in &state.bonus_messages {
            canvas.set_global_alpha(message.alpha());
            canvas.fill_text(&message.text, message.pos.x, message.pos.y, style);
        }
        canvas.set_global_alpha(1.0);
    }

    fn draw_hud(
        &self,
        state: &GameState,
        high_scores: &HighScores,
        settings: &Settings,
        canvas: &mut dyn Canvas,
    ) {
        let color = Self::text_color(state);
        let cx = state.viewport.width / 2.0;
        canvas.fill_text(
            &format!("Score: {}", state.score),
            cx,
            30.0,
            TextStyle::new(18.0, color).bold(),
        );
        let small = TextStyle::new(12.0, color);
        canvas.fill_text(&format!("Best Today: {}", high_scores.daily), cx, 46.0, small);
        canvas.fill_text(&format!("Best Ever: {}", high_scores.all_time), cx, 62.0, small);

        if settings.show_speed {
            canvas.fill_text(
                &format!("Speed: {:.1}", state.game_speed),
                20.0,
                30.0,
                TextStyle::new(18.0, color).bold().align(TextAlign::Left),
            );
        }
        if settings.show_version {
            canvas.fill_text(
                VERSION,
                state.viewport.width - 10.0,
                state.viewport.height - 10.0,
                TextStyle::new(14.0, color).align(TextAlign::Right),
            );
        }
    }

    fn draw_game_over(&self, state: &GameState, high_scores: &HighScores, canvas: &mut dyn Canvas) {
        let color = Self::text_color(state);
        let cx = state.viewport.width / 2.0;
        let cy = state.viewport.height / 2.0;
        canvas.fill_text("GAME OVER", cx, cy - 60.0, TextStyle::new(32.0, color).bold());
        canvas.fill_text(
            &format!("Score: {}", state.score),
            cx,
            cy - 30.0,
            TextStyle::new(18.0, color).bold(),
        );
        let small = TextStyle::new(14.0, color);
        canvas.fill_text(&format!("Best Today: {}", high_scores.daily), cx, cy - 10.0, small);
        canvas.fill_text(&format!("Best Ever: {}", high_scores.all_time), cx, cy + 8.0, small);
        canvas.fill_text("Press SPACE to Restart", cx, cy + 34.0, small);
    }

    fn draw_hitboxes(&self, state: &GameState, canvas: &mut dyn Canvas) {
        let hitbox = state.player_hitbox();
        canvas.stroke_rect(
            hitbox.x,
            hitbox.y,
            hitbox.width,
            hitbox.height,
            2.0,
            colors::HITBOX_PLAYER,
        );
        let rects = state
            .obstacles
            .iter()
            .map(|o| o.rect())
            .chain(state.flying.iter().map(|b| b.rect()));
        for rect in rects {
            canvas.stroke_rect(rect.x, rect.y, rect.width, rect.height, 2.0, colors::HITBOX_OBSTACLE);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Viewport;
    use crate::assets::BuiltinSprites;
    use crate::renderer::canvas::Framebuffer;
    use crate::sim::state::{BonusMessage, GroundObstacle, Particle, VehicleKind};
    use crate::tuning::Tuning;

    fn setup() -> (SceneRenderer, GameState, Framebuffer) {
        let renderer = SceneRenderer::new(Box::new(BuiltinSprites::new()));
        let state = GameState::new(Viewport::default(), Tuning::default(), renderer.assets());
        (renderer, state, Framebuffer::new(1000, 400))
    }

    fn car(state: &mut GameState, x: f32, paint: u8) -> GroundObstacle {
        let (width, height) = state.metrics.vehicle(VehicleKind::Car);
        GroundObstacle {
            id: state.next_entity_id(),
            pos: Vec2::new(x, state.viewport.road_y() - height),
            width,
            height,
            kind: VehicleKind::Car,
            flip_h: false,
            paint,
        }
    }

    #[test]
    fn test_waiting_screen() {
        let (mut renderer, state, mut fb) = setup();
        renderer.draw(&state, &HighScores::default(), &Settings::default(), &mut fb);
        assert!(fb.has_text("Press SPACE to Start"));
        assert!(fb.has_text(VERSION));
        assert!(!fb.has_text("Score:"));
        assert_eq!(fb.pixel(500, 10), colors::SKY_DAY);
        assert_eq!(fb.bitmap_draws(), 1);
    }

    #[test]
    fn test_playing_hud() {
        let (mut renderer, mut state, mut fb) = setup();
        state.phase = GamePhase::Playing;
        state.score = 42;
        let scores = HighScores {
            all_time: 900,
            daily: 300,
            last_played: String::new(),
        };
        renderer.draw(&state, &scores, &Settings::default(), &mut fb);
        assert!(fb.has_text("Score: 42"));
        assert!(fb.has_text("Best Today: 300"));
        assert!(fb.has_text("Best Ever: 900"));
        assert!(!fb.has_text("Speed:"));
        assert!(!fb.has_text("GAME OVER"));

        renderer.draw(&state, &scores, &Settings::debug(), &mut fb);
        assert!(fb.has_text("Speed: 6.0"));
    }

    #[test]
    fn test_particles_use_their_own_color() {
        let (mut renderer, mut state, mut fb) = setup();
        state.phase = GamePhase::Playing;
        let tint = Rgba::rgb(10, 200, 30);
        state.particles.push(Particle {
            pos: Vec2::new(500.0, 310.0),
            vel: Vec2::ZERO,
            life: 20,
            max_life: 20,
            size: 2.0,
            color: tint,
        });
        renderer.draw(&state, &HighScores::default(), &Settings::default(), &mut fb);
        assert_eq!(fb.pixel(500, 310), tint);
        assert_eq!(fb.pixel(501, 311), tint);

        let settings = Settings {
            dust_particles: false,
            ..Settings::default()
        };
        renderer.draw(&state, &HighScores::default(), &settings, &mut fb);
        assert_ne!(fb.pixel(500, 310), tint);
    }

    #[test]
    fn test_night_sky_color() {
        let (mut renderer, mut state, mut fb) = setup();
        state.phase = GamePhase::Playing;
        state.sky.is_night = true;
        state.sky.crossfade = 1.0;
        renderer.draw(&state, &HighScores::default(), &Settings::default(), &mut fb);
        assert_eq!(fb.pixel(500, 200), colors::SKY_NIGHT);
        let score = fb.texts().iter().find(|t| t.text.starts_with("Score"));
        assert_eq!(score.map(|t| t.style.color), Some(colors::TEXT_NIGHT));
    }

    #[test]
    fn test_vehicle_paints_cached_separately() {
        let (mut renderer, mut state, mut fb) = setup();
        state.phase = GamePhase::Playing;
        let red = car(&mut state, 300.0, 0);
        let blue = car(&mut state, 600.0, 1);
        state.obstacles.push(red);
        state.obstacles.push(blue);

        renderer.draw(&state, &HighScores::default(), &Settings::default(), &mut fb);
        let after_first = renderer.cache().rasterized_count();
        // Motorcycle plus two car paints
        assert_eq!(after_first, 3);

        renderer.draw(&state, &HighScores::default(), &Settings::default(), &mut fb);
        assert_eq!(renderer.cache().rasterized_count(), after_first);
    }

    #[test]
    fn test_bonus_message_drawn_with_fade() {
        let (mut renderer, mut state, mut fb) = setup();
        state.phase = GamePhase::Playing;
        let mut message = BonusMessage::new("Bonus +500", Vec2::new(500.0, 100.0), &state.tuning);
        message.update();
        state.bonus_messages.push(message);
        renderer.draw(&state, &HighScores::default(), &Settings::default(), &mut fb);
        let run = fb.texts().iter().find(|t| t.text == "Bonus +500");
        assert!(run.is_some_and(|t| t.alpha > 0.0 && t.alpha < 1.0));
    }

    #[test]
    fn test_game_over_panel() {
        let (mut renderer, mut state, mut fb) = setup();
        state.phase = GamePhase::GameOver;
        state.score = 77;
        renderer.draw(&state, &HighScores::default(), &Settings::default(), &mut fb);
        assert!(fb.has_text("GAME OVER"));
        assert!(fb.has_text("Press SPACE to Restart"));
    }

    #[test]
    fn test_hitbox_overlay() {
        let (mut renderer, mut state, mut fb) = setup();
        state.phase = GamePhase::Playing;
        renderer.draw(&state, &HighScores::default(), &Settings::debug(), &mut fb);
        let hitbox = state.player_hitbox();
        let px = fb.pixel(hitbox.x.round() as u32, (hitbox.y + hitbox.height / 2.0) as u32);
        assert!(px.r > px.g);
    }
}
