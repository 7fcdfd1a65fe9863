//! Moto Runner entry point
//!
//! On the web this wires the game loop to the page's canvas, input and
//! animation frames. Natively a built-in pilot plays a seeded run headless
//! by pressing the same keys a player would.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{HtmlCanvasElement, KeyboardEvent, TouchEvent};

    use moto_runner::assets::BuiltinSprites;
    use moto_runner::game::{FrameHandle, GameConfig, GameLoop, InputEvent};
    use moto_runner::platform::web::{DomHost, LocalStorageStore, RafScheduler, WebCanvas, orientation_info};
    use moto_runner::platform::{self, is_landscape};
    use moto_runner::{Viewport, consts};

    const CANVAS_ID: &str = "motorcycle-runner-canvas";

    /// Game loop plus the surface it draws on
    struct WebGame {
        game: GameLoop<RafScheduler, DomHost>,
        canvas: WebCanvas,
    }

    impl WebGame {
        fn render(&mut self) {
            self.game.render(&mut self.canvas);
        }

        fn check_orientation(&mut self) {
            self.game.set_orientation(is_landscape(&orientation_info()));
            self.render();
        }
    }

    thread_local! {
        static GAME: RefCell<Option<Rc<RefCell<WebGame>>>> = const { RefCell::new(None) };
    }

    fn current() -> Option<Rc<RefCell<WebGame>>> {
        GAME.with(|g| g.borrow().clone())
    }

    pub fn run() -> Result<(), JsValue> {
        if current().is_some() {
            log::info!("Moto Runner already initialized");
            return Ok(());
        }

        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;
        let element: HtmlCanvasElement = document
            .get_element_by_id(CANVAS_ID)
            .ok_or("no canvas")?
            .dyn_into()?;

        let width = element.width() as f32;
        let height = element.height() as f32;
        let config = GameConfig {
            viewport: Viewport::new(width, height),
            seed: js_sys::Date::now() as u64,
            today: platform::today(),
            ..GameConfig::default()
        };

        let scheduler = RafScheduler::new();
        let target = scheduler.target();
        let game = GameLoop::new(
            config,
            Box::new(BuiltinSprites::new()),
            Box::new(LocalStorageStore::new()),
            scheduler,
            DomHost,
        );
        let web_game = Rc::new(RefCell::new(WebGame {
            game,
            canvas: WebCanvas::new(element.clone())?,
        }));

        // Frames hold a weak handle so a dropped game simply stops
        {
            let weak = Rc::downgrade(&web_game);
            *target.borrow_mut() = Some(Rc::new(move |handle: FrameHandle| {
                if let Some(web_game) = weak.upgrade() {
                    let mut g = web_game.borrow_mut();
                    let WebGame { game, canvas } = &mut *g;
                    game.on_frame(handle, canvas);
                }
            }));
        }

        setup_input_handlers(&element, web_game.clone())?;
        setup_page_handlers(web_game.clone())?;

        web_game.borrow_mut().check_orientation();
        GAME.with(|g| *g.borrow_mut() = Some(web_game));

        log::info!("Moto Runner {} ready", consts::VERSION);
        Ok(())
    }

    fn setup_input_handlers(
        canvas: &HtmlCanvasElement,
        web_game: Rc<RefCell<WebGame>>,
    ) -> Result<(), JsValue> {
        let window = web_sys::window().ok_or("no window")?;

        // Keyboard
        {
            let web_game = web_game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let input = InputEvent::KeyDown {
                    code: event.code(),
                    repeat: event.repeat(),
                };
                if web_game.borrow_mut().game.handle_input(&input) {
                    event.prevent_default();
                }
            });
            window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }
        {
            let web_game = web_game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let input = InputEvent::KeyUp { code: event.code() };
                if web_game.borrow_mut().game.handle_input(&input) {
                    event.prevent_default();
                }
            });
            window.add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        // Touch start: upper half jumps, lower half ducks
        {
            let web_game = web_game.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                if let Some(touch) = event.touches().get(0) {
                    let rect = canvas_clone.get_bounding_client_rect();
                    let input = InputEvent::TouchStart {
                        y: (touch.client_y() as f64 - rect.top()) as f32,
                        height: rect.height() as f32,
                    };
                    web_game.borrow_mut().game.handle_input(&input);
                }
            });
            canvas.add_event_listener_with_callback("touchstart", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        // Touch end releases the duck
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                web_game.borrow_mut().game.handle_input(&InputEvent::TouchEnd);
            });
            canvas.add_event_listener_with_callback("touchend", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        Ok(())
    }

    fn setup_page_handlers(web_game: Rc<RefCell<WebGame>>) -> Result<(), JsValue> {
        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;

        // Rotation and resize can both flip landscape/portrait
        for event_name in ["orientationchange", "resize"] {
            let web_game = web_game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                web_game.borrow_mut().check_orientation();
            });
            window.add_event_listener_with_callback(event_name, closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        // Tab hidden
        {
            let document_clone = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                if document_clone.visibility_state() == web_sys::VisibilityState::Hidden {
                    let mut g = web_game.borrow_mut();
                    g.game.pause();
                    g.render();
                }
            });
            document
                .add_event_listener_with_callback("visibilitychange", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        Ok(())
    }

    /// Host shows the overlay: redraw whatever phase we are in
    pub fn show() {
        if let Some(web_game) = current() {
            web_game.borrow_mut().check_orientation();
        }
    }

    /// Host hides the overlay: stop scheduling frames
    pub fn hide() {
        if let Some(web_game) = current() {
            let mut g = web_game.borrow_mut();
            g.game.pause();
            g.game.halt();
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);
    log::info!("Moto Runner starting...");

    if let Err(e) = wasm_game::run() {
        log::error!("Moto Runner failed to start: {:?}", e);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(js_name = showGame)]
pub fn show_game() {
    wasm_game::show();
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(js_name = hideGame)]
pub fn hide_game() {
    wasm_game::hide();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
mod demo {
    //! Attract-mode pilot for the headless run

    use glam::Vec2;
    use moto_runner::game::InputEvent;
    use moto_runner::sim::GameState;

    /// Frames of warning wanted before a vehicle reaches the player
    const JUMP_LEAD_FRAMES: f32 = 10.0;
    /// Frames of warning wanted before a bird reaches the player
    const DUCK_LEAD_FRAMES: f32 = 14.0;

    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    pub struct Decision {
        pub jump: bool,
        pub duck: bool,
    }

    /// Pick jump or duck by looking at what is about to arrive
    pub fn decide(state: &GameState) -> Decision {
        let mut decision = Decision::default();
        let player = &state.player;
        let stand = state.metrics.normal_hitbox.at(Vec2::new(player.pos.x, player.ground_y));
        let duck_y = player.ground_y + state.tuning.normal_height - state.tuning.duck_height;
        let duck = state.metrics.duck_hitbox.at(Vec2::new(player.pos.x, duck_y));

        let vehicle_reach = state.game_speed * state.tuning.vehicle_speed_multiplier * JUMP_LEAD_FRAMES;
        let vehicle_ahead = state.obstacles.iter().any(|o| {
            let gap = o.pos.x - stand.right();
            o.right() > stand.x && gap < vehicle_reach && Some(o.id) != player.riding_vehicle()
        });

        let bird_reach = state.game_speed * state.tuning.flying_speed_multiplier * DUCK_LEAD_FRAMES;
        let mut duck_for_bird = false;
        let mut jump_for_bird = false;
        for bird in &state.flying {
            let gap = bird.pos.x - stand.right();
            if bird.right() <= stand.x || gap >= bird_reach {
                continue;
            }
            let rect = bird.rect();
            let hits_standing = rect.y < stand.bottom() && rect.bottom() > stand.y;
            let hits_ducking = rect.y < duck.bottom() && rect.bottom() > duck.y;
            if hits_standing && !hits_ducking {
                duck_for_bird = true;
            } else if hits_ducking {
                jump_for_bird = true;
            }
        }

        if duck_for_bird && !player.is_jumping() && !player.is_riding() {
            decision.duck = true;
        } else if vehicle_ahead || jump_for_bird {
            decision.jump = !player.is_jumping();
        }
        decision
    }

    /// Turns decisions into key presses, tracking the held duck key
    #[derive(Debug, Default)]
    pub struct Pilot {
        ducking: bool,
    }

    impl Pilot {
        /// Key events for this frame; nothing outside a run, so it never restarts one
        pub fn events(&mut self, state: &GameState) -> Vec<InputEvent> {
            let mut events = Vec::new();
            if !state.is_playing() {
                return events;
            }
            let decision = decide(state);
            if decision.duck != self.ducking {
                self.ducking = decision.duck;
                events.push(if decision.duck {
                    InputEvent::KeyDown {
                        code: "ArrowDown".into(),
                        repeat: false,
                    }
                } else {
                    InputEvent::KeyUp {
                        code: "ArrowDown".into(),
                    }
                });
            }
            if decision.jump {
                events.push(InputEvent::KeyDown {
                    code: "Space".into(),
                    repeat: false,
                });
            }
            events
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use moto_runner::Viewport;
        use moto_runner::assets::BuiltinSprites;
        use moto_runner::game::{GameConfig, GameLoop, ManualScheduler, NullHost};
        use moto_runner::persistence::MemoryStore;
        use moto_runner::renderer::Framebuffer;
        use moto_runner::sim::{FlyingObstacle, GamePhase, GroundObstacle, VehicleKind};
        use moto_runner::tuning::Tuning;

        fn playing_state() -> GameState {
            let mut state = GameState::new(Viewport::default(), Tuning::default(), &BuiltinSprites::new());
            state.phase = GamePhase::Playing;
            state
        }

        fn low_bird(state: &mut GameState, x: f32) {
            let (width, height) = state.metrics.bird;
            let id = state.next_entity_id();
            let y = state.viewport.road_y() - 60.0;
            state.flying.push(FlyingObstacle {
                id,
                pos: Vec2::new(x, y),
                width,
                height,
                wing_frame: 0,
            });
        }

        #[test]
        fn test_jumps_for_close_vehicle() {
            let mut state = playing_state();
            let (width, height) = state.metrics.vehicle(VehicleKind::Car);
            let id = state.next_entity_id();
            let y = state.viewport.road_y() - height;
            state.obstacles.push(GroundObstacle {
                id,
                pos: Vec2::new(120.0, y),
                width,
                height,
                kind: VehicleKind::Car,
                flip_h: false,
                paint: 0,
            });
            assert_eq!(decide(&state), Decision { jump: true, duck: false });
        }

        #[test]
        fn test_ducks_under_low_bird() {
            let mut state = playing_state();
            low_bird(&mut state, 110.0);
            assert_eq!(decide(&state), Decision { jump: false, duck: true });
        }

        #[test]
        fn test_duck_key_pressed_once_then_released() {
            let mut state = playing_state();
            let mut pilot = Pilot::default();
            low_bird(&mut state, 110.0);
            let events = pilot.events(&state);
            assert!(matches!(events.as_slice(), [InputEvent::KeyDown { code, .. }] if code == "ArrowDown"));
            // Still ducking: no repeat press
            assert!(pilot.events(&state).is_empty());

            state.flying.clear();
            let events = pilot.events(&state);
            assert!(matches!(events.as_slice(), [InputEvent::KeyUp { code }] if code == "ArrowDown"));
        }

        #[test]
        fn test_silent_outside_a_run() {
            let mut state = playing_state();
            low_bird(&mut state, 110.0);
            state.phase = GamePhase::GameOver;
            assert!(Pilot::default().events(&state).is_empty());
        }

        #[test]
        fn test_pilot_survives_a_while() {
            let config = GameConfig {
                seed: 1,
                ..GameConfig::default()
            };
            let mut game = GameLoop::new(
                config,
                Box::new(BuiltinSprites::new()),
                Box::new(MemoryStore::new()),
                ManualScheduler::new(),
                NullHost,
            );
            let mut fb = Framebuffer::new(1000, 400);
            let mut pilot = Pilot::default();
            game.start();
            for _ in 0..600 {
                for event in pilot.events(game.state()) {
                    game.handle_input(&event);
                }
                if !game.pump(&mut fb) {
                    break;
                }
            }
            assert!(game.state().frame_count >= 300);
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use moto_runner::assets::BuiltinSprites;
    use moto_runner::game::{GameConfig, GameLoop, ManualScheduler, NullHost};
    use moto_runner::persistence::JsonFileStore;
    use moto_runner::renderer::{Canvas, Framebuffer};
    use moto_runner::sim::GameEvent;
    use moto_runner::{consts, platform};

    env_logger::init();
    log::info!(
        "Moto Runner {} (native) by {} starting...",
        consts::VERSION,
        consts::AUTHORS
    );

    // moto-runner [seed] [max_frames]
    let mut args = std::env::args().skip(1);
    let seed = args.next().and_then(|s| s.parse().ok()).unwrap_or(1);
    let max_frames: u64 = args.next().and_then(|s| s.parse().ok()).unwrap_or(60 * 120);

    let store_path = std::env::temp_dir().join("moto-runner-scores.json");
    let config = GameConfig {
        seed,
        today: platform::today(),
        ..GameConfig::default()
    };
    let mut game = GameLoop::new(
        config,
        Box::new(BuiltinSprites::new()),
        Box::new(JsonFileStore::open(&store_path)),
        ManualScheduler::new(),
        NullHost,
    );
    let mut canvas = Framebuffer::new(
        game.state().viewport.width as u32,
        game.state().viewport.height as u32,
    );

    let mut pilot = demo::Pilot::default();
    game.start();
    let mut flips = 0;
    let mut bonuses = 0;
    let mut convoys = 0;
    while game.state().frame_count < max_frames {
        for event in pilot.events(game.state()) {
            game.handle_input(&event);
        }
        if !game.pump(&mut canvas) {
            break;
        }
        for event in &game.state().events {
            match event {
                GameEvent::DayNightFlip { .. } => flips += 1,
                GameEvent::BonusAwarded { .. } => bonuses += 1,
                GameEvent::ConvoySpawned { .. } => convoys += 1,
                _ => {}
            }
        }
    }
    game.halt();

    let (width, height) = canvas.size();
    log::info!(
        "Run finished in {:?} after {} frames ({:.1}s): score {}, speed {:.2}",
        game.phase(),
        game.state().frame_count,
        moto_runner::play_seconds(game.state().frame_count),
        game.score(),
        game.state().game_speed
    );
    log::info!(
        "{} day/night flips, {} bonuses, {} convoys, {} sprites cached, last frame {}x{}",
        flips,
        bonuses,
        convoys,
        game.renderer().cache().len(),
        width,
        height
    );
    log::info!(
        "High scores: today {}, ever {} ({})",
        game.high_scores().daily,
        game.high_scores().all_time,
        store_path.display()
    );
}
