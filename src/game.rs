//! Game loop controller
//!
//! Owns the simulation state and its collaborators and drives the
//! Waiting -> Playing -> GameOver lifecycle. Frames come from a
//! `FrameScheduler`; each scheduled frame runs one simulation step, draws,
//! and re-schedules itself while the run is still playing.

use crate::Viewport;
use crate::assets::SpriteAssets;
use crate::highscores::HighScores;
use crate::persistence::KeyValueStore;
use crate::platform::{KeyAction, START_KEY, TouchZone, key_action, touch_zone};
use crate::renderer::{Canvas, SceneRenderer};
use crate::settings::Settings;
use crate::sim::{GamePhase, GameState, SeededRng, TickInput, tick};
use crate::tuning::Tuning;

/// Handle of a requested frame
pub type FrameHandle = u64;

/// Source of frame callbacks (`requestAnimationFrame` on the web)
pub trait FrameScheduler {
    /// Ask for one callback; the host later calls `GameLoop::on_frame` with
    /// the returned handle
    fn request_frame(&mut self) -> FrameHandle;
    fn cancel_frame(&mut self, handle: FrameHandle);
}

/// Scheduler that only queues handles; the owner pumps them explicitly
#[derive(Debug, Clone, Default)]
pub struct ManualScheduler {
    next_handle: FrameHandle,
    pending: Vec<FrameHandle>,
    cancelled: u64,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handles requested and not yet taken or cancelled
    pub fn pending(&self) -> &[FrameHandle] {
        &self.pending
    }

    /// Pop the oldest pending handle
    pub fn take_next(&mut self) -> Option<FrameHandle> {
        if self.pending.is_empty() {
            None
        } else {
            Some(self.pending.remove(0))
        }
    }

    /// Number of cancellations that hit a pending handle
    pub fn cancelled(&self) -> u64 {
        self.cancelled
    }
}

impl FrameScheduler for ManualScheduler {
    fn request_frame(&mut self) -> FrameHandle {
        self.next_handle += 1;
        self.pending.push(self.next_handle);
        self.next_handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        let before = self.pending.len();
        self.pending.retain(|&h| h != handle);
        if self.pending.len() != before {
            self.cancelled += 1;
        }
    }
}

/// Notifications for the embedding page
pub trait HostEvents {
    fn game_started(&mut self) {}
    fn game_ended(&mut self, _final_score: u64) {}
}

/// Host that ignores every notification
#[derive(Debug, Clone, Copy, Default)]
pub struct NullHost;

impl HostEvents for NullHost {}

/// Raw input, already stripped of DOM types
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    KeyDown { code: String, repeat: bool },
    KeyUp { code: String },
    /// `y` relative to the canvas top, `height` its on-screen height
    TouchStart { y: f32, height: f32 },
    TouchEnd,
}

/// Construction parameters for a `GameLoop`
#[derive(Debug, Clone, Default)]
pub struct GameConfig {
    pub viewport: Viewport,
    pub tuning: Tuning,
    pub seed: u64,
    /// Calendar date the daily high score belongs to
    pub today: String,
}

/// Frame-driven lifecycle around one `GameState`
pub struct GameLoop<S: FrameScheduler, H: HostEvents> {
    state: GameState,
    renderer: SceneRenderer,
    rng: SeededRng,
    scheduler: S,
    host: H,
    store: Box<dyn KeyValueStore>,
    high_scores: HighScores,
    settings: Settings,
    input: TickInput,
    duck_key: bool,
    duck_touch: bool,
    orientation_ok: bool,
    /// The one frame callback allowed to run; anything else is stale
    pending_frame: Option<FrameHandle>,
    runs: u64,
}

impl<S: FrameScheduler, H: HostEvents> GameLoop<S, H> {
    pub fn new(
        config: GameConfig,
        assets: Box<dyn SpriteAssets>,
        mut store: Box<dyn KeyValueStore>,
        scheduler: S,
        host: H,
    ) -> Self {
        let state = GameState::new(config.viewport, config.tuning, assets.as_ref());
        let high_scores = HighScores::load(store.as_mut(), &config.today);
        let settings = Settings::load(store.as_ref());
        log::info!(
            "Game ready: {}x{}, seed {}",
            config.viewport.width,
            config.viewport.height,
            config.seed
        );

        Self {
            state,
            renderer: SceneRenderer::new(assets),
            rng: SeededRng::new(config.seed),
            scheduler,
            host,
            store,
            high_scores,
            settings,
            input: TickInput::default(),
            duck_key: false,
            duck_touch: false,
            orientation_ok: true,
            pending_frame: None,
            runs: 0,
        }
    }

    /// Enter `Playing` from `Waiting`
    ///
    /// A fresh state starts a new run; a paused one resumes. From `GameOver`
    /// this restarts. Returns false when the orientation refuses the start or
    /// the game is already playing.
    pub fn start(&mut self) -> bool {
        match self.state.phase {
            GamePhase::Playing => false,
            GamePhase::GameOver => self.restart(),
            GamePhase::Waiting => {
                if !self.orientation_ok {
                    log::info!("Start refused: rotate the device to landscape");
                    return false;
                }
                if self.state.frame_count == 0 {
                    self.runs += 1;
                    log::info!("Run {} started", self.runs);
                } else {
                    log::info!("Run {} resumed at frame {}", self.runs, self.state.frame_count);
                }
                self.enter_playing();
                true
            }
        }
    }

    /// Full reset, then play
    pub fn restart(&mut self) -> bool {
        if !self.orientation_ok {
            log::info!("Restart refused: rotate the device to landscape");
            return false;
        }
        self.halt();
        self.state.reset();
        self.runs += 1;
        log::info!("Run {} started (restart)", self.runs);
        self.enter_playing();
        true
    }

    fn enter_playing(&mut self) {
        self.state.phase = GamePhase::Playing;
        self.host.game_started();
        self.schedule();
    }

    fn schedule(&mut self) {
        if self.pending_frame.is_none() {
            self.pending_frame = Some(self.scheduler.request_frame());
        }
    }

    /// Frame callback: one simulation step, one draw, re-schedule
    ///
    /// Returns false (and does nothing) for a stale or cancelled handle.
    pub fn on_frame(&mut self, handle: FrameHandle, canvas: &mut dyn Canvas) -> bool {
        if self.pending_frame != Some(handle) {
            log::debug!("Ignoring stale frame {}", handle);
            return false;
        }
        self.pending_frame = None;
        if !self.state.is_playing() {
            return false;
        }

        tick(&mut self.state, &self.input, &mut self.rng);
        self.input.jump = false;

        if self.state.phase == GamePhase::GameOver {
            self.finish_run();
        }
        self.render(canvas);

        if self.state.is_playing() {
            self.schedule();
        }
        true
    }

    fn finish_run(&mut self) {
        let score = self.state.score;
        let records = self
            .high_scores
            .record(score, self.store.as_mut());
        log::info!(
            "Game over at frame {} with score {} (new daily: {}, new all-time: {})",
            self.state.frame_count,
            score,
            records.daily,
            records.all_time
        );
        self.host.game_ended(score);
    }

    /// Draw the current state
    pub fn render(&mut self, canvas: &mut dyn Canvas) {
        self.renderer
            .draw(&self.state, &self.high_scores, &self.settings, canvas);
    }

    /// Apply one input event; returns true when the event maps to a game
    /// action (the host should suppress its default behavior)
    pub fn handle_input(&mut self, event: &InputEvent) -> bool {
        let handled = match event {
            InputEvent::KeyDown { code, repeat } => match key_action(code) {
                Some(KeyAction::Jump) => {
                    if !*repeat {
                        self.jump_or_start(code == START_KEY);
                    }
                    true
                }
                Some(KeyAction::Duck) => {
                    self.duck_key = true;
                    true
                }
                None => false,
            },
            InputEvent::KeyUp { code } => match key_action(code) {
                Some(KeyAction::Duck) => {
                    self.duck_key = false;
                    true
                }
                Some(KeyAction::Jump) => true,
                None => false,
            },
            InputEvent::TouchStart { y, height } => {
                if self.state.is_playing() {
                    match touch_zone(*y, *height) {
                        TouchZone::Jump => self.input.jump = true,
                        TouchZone::Duck => self.duck_touch = true,
                    }
                } else {
                    self.jump_or_start(true);
                }
                true
            }
            InputEvent::TouchEnd => {
                self.duck_touch = false;
                true
            }
        };
        self.input.duck_held = self.duck_key || self.duck_touch;
        handled
    }

    /// Only the start key and taps begin a run; other jump keys wait for one
    fn jump_or_start(&mut self, can_start: bool) {
        match self.state.phase {
            GamePhase::Playing => self.input.jump = true,
            GamePhase::Waiting | GamePhase::GameOver => {
                if can_start {
                    self.start();
                }
            }
        }
    }

    /// Orientation changed; losing landscape mid-run pauses to `Waiting`
    pub fn set_orientation(&mut self, landscape: bool) {
        if self.orientation_ok == landscape {
            return;
        }
        self.orientation_ok = landscape;
        log::info!(
            "Orientation {}",
            if landscape { "ok" } else { "invalid (portrait)" }
        );
        if !landscape {
            self.pause();
        }
    }

    /// Pause a running game back to `Waiting` (host hid the game)
    pub fn pause(&mut self) {
        if self.state.is_playing() {
            self.state.phase = GamePhase::Waiting;
            self.halt();
            log::info!("Run {} paused at frame {}", self.runs, self.state.frame_count);
        }
    }

    /// Cancel the scheduled frame; a late callback for it becomes a no-op
    pub fn halt(&mut self) {
        if let Some(handle) = self.pending_frame.take() {
            self.scheduler.cancel_frame(handle);
        }
    }

    /// Replace the preferences and persist them
    pub fn set_settings(&mut self, settings: Settings) {
        if let Err(e) = settings.save(self.store.as_mut()) {
            log::warn!("Could not save settings: {}", e);
        }
        self.settings = settings;
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    pub fn phase(&self) -> GamePhase {
        self.state.phase
    }

    pub fn score(&self) -> u64 {
        self.state.score
    }

    pub fn high_scores(&self) -> &HighScores {
        &self.high_scores
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn input(&self) -> &TickInput {
        &self.input
    }

    pub fn is_orientation_ok(&self) -> bool {
        self.orientation_ok
    }

    /// Handle of the frame currently allowed to run
    pub fn pending_frame(&self) -> Option<FrameHandle> {
        self.pending_frame
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn store(&self) -> &dyn KeyValueStore {
        self.store.as_ref()
    }

    pub fn renderer(&self) -> &SceneRenderer {
        &self.renderer
    }
}

impl<H: HostEvents> GameLoop<ManualScheduler, H> {
    /// Run the oldest queued frame, if any
    pub fn pump(&mut self, canvas: &mut dyn Canvas) -> bool {
        match self.scheduler.take_next() {
            Some(handle) => self.on_frame(handle, canvas),
            None => false,
        }
    }
}
