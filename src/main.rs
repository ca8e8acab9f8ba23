//! Key Dash entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{CanvasRenderingContext2d, Document, HtmlCanvasElement, KeyboardEvent};

    use key_dash::consts::*;
    use key_dash::persistence::LocalStorage;
    use key_dash::platform;
    use key_dash::scoring::HttpScoreSink;
    use key_dash::sim::{EntityKind, EventKind, GameEvent, GamePhase, tier_for_level};
    use key_dash::Game;

    /// Browser-side wrapper holding the game and its canvas
    struct App {
        game: Game,
        ctx: CanvasRenderingContext2d,
        document: Document,
        last_time: f64,
        // FPS tracking
        frame_times: [f64; 60],
        frame_index: usize,
        fps: u32,
    }

    impl App {
        fn update(&mut self, dt: f32, time: f64) {
            self.game.update(dt);

            // Track frame times for FPS
            self.frame_times[self.frame_index] = time;
            self.frame_index = (self.frame_index + 1) % 60;
            let oldest_time = self.frame_times[self.frame_index];
            if oldest_time > 0.0 {
                let elapsed = time - oldest_time;
                if elapsed > 0.0 {
                    self.fps = (60000.0 / elapsed).round() as u32;
                }
            }
        }

        /// Draw the play field
        fn render(&self) {
            let ctx = &self.ctx;
            ctx.set_fill_style_str("#10131c");
            ctx.fill_rect(0.0, 0.0, FIELD_WIDTH as f64, FIELD_HEIGHT as f64);

            for entity in &self.game.world.entities {
                let size = entity.kind.size();
                let color = match entity.kind {
                    EntityKind::Obstacle => "#e5484d",
                    EntityKind::Coin => "#f5d90a",
                };
                ctx.set_fill_style_str(color);
                ctx.fill_rect(
                    entity.pos.x as f64,
                    entity.pos.y as f64,
                    size.x as f64,
                    size.y as f64,
                );
            }

            let avatar = &self.game.world.avatar;
            ctx.set_fill_style_str("#4cc38a");
            ctx.fill_rect(
                avatar.pos.x as f64,
                avatar.pos.y as f64,
                avatar.size.x as f64,
                avatar.size.y as f64,
            );
        }

        /// Per-frame HUD bits not driven by game events
        fn update_hud(&self) {
            if let Some(el) = self.document.get_element_by_id("hud-fps") {
                if self.game.settings.show_fps {
                    let _ = el.set_attribute("class", "hud-item");
                    el.set_text_content(Some(&format!("{} FPS", self.fps)));
                } else {
                    let _ = el.set_attribute("class", "hud-item hidden");
                }
            }
        }
    }

    fn set_text(document: &Document, id: &str, text: &str) {
        if let Some(el) = document.get_element_by_id(id) {
            el.set_text_content(Some(text));
        }
    }

    fn set_visible(document: &Document, id: &str, visible: bool) {
        if let Some(el) = document.get_element_by_id(id) {
            let _ = el.set_attribute("class", if visible { "" } else { "hidden" });
        }
    }

    /// HUD reacts to state events; it never touches the game
    fn subscribe_hud(game: &mut Game, document: &Document) {
        let doc = document.clone();
        let best_doc = document.clone();
        let best = Rc::new(RefCell::new(game.state.best_score()));
        let best_seen = Rc::clone(&best);
        game.state.subscribe(EventKind::ScoreChanged, move |event| {
            if let GameEvent::ScoreChanged { score } = event {
                set_text(&doc, "hud-score", &score.to_string());
                let mut best = best_seen.borrow_mut();
                if *score > *best {
                    *best = *score;
                    set_text(&best_doc, "hud-best", &score.to_string());
                }
            }
        });

        let doc = document.clone();
        game.state.subscribe(EventKind::LevelChanged, move |event| {
            if let GameEvent::LevelChanged { level } = event {
                let tier = tier_for_level(*level);
                set_text(&doc, "hud-level", &format!("{} ({})", level, tier.difficulty.as_str()));
            }
        });

        let doc = document.clone();
        game.state.subscribe(EventKind::Paused, move |_| set_visible(&doc, "pause-menu", true));
        let doc = document.clone();
        game.state.subscribe(EventKind::Resumed, move |_| set_visible(&doc, "pause-menu", false));

        let doc = document.clone();
        game.state.subscribe(EventKind::GameOver, move |event| {
            if let GameEvent::GameOver { score, best_score } = event {
                set_visible(&doc, "pause-menu", false);
                set_visible(&doc, "game-over", true);
                set_text(&doc, "final-score", &score.to_string());
                set_text(&doc, "final-best", &best_score.to_string());
                *best.borrow_mut() = *best_score;
            }
        });
    }

    /// Reset HUD text for a fresh run
    fn reset_hud(game: &Game, document: &Document) {
        set_text(document, "hud-score", "0");
        set_text(document, "hud-best", &game.state.best_score().to_string());
        let tier = tier_for_level(game.state.level());
        set_text(
            document,
            "hud-level",
            &format!("{} ({})", game.state.level(), tier.difficulty.as_str()),
        );
        set_visible(document, "game-over", false);
        set_visible(document, "pause-menu", false);
    }

    pub fn run() -> Result<(), JsValue> {
        platform::init_logging();
        log::info!("Key Dash starting...");

        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;

        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .ok_or("no canvas")?
            .dyn_into()?;
        canvas.set_width(FIELD_WIDTH as u32);
        canvas.set_height(FIELD_HEIGHT as u32);
        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")?
            .ok_or("no 2d context")?
            .dyn_into()?;

        let seed = platform::clock_seed();
        let mut game = Game::new(LocalStorage, seed);
        let sink = HttpScoreSink::new(game.settings.scores_url());
        game = game.with_sink(sink);
        subscribe_hud(&mut game, &document);
        reset_hud(&game, &document);

        let app = Rc::new(RefCell::new(App {
            game,
            ctx,
            document: document.clone(),
            last_time: 0.0,
            frame_times: [0.0; 60],
            frame_index: 0,
            fps: 0,
        }));

        setup_input_handlers(app.clone())?;
        setup_restart_button(app.clone());
        setup_auto_pause(app.clone())?;

        request_animation_frame(app);
        log::info!("Key Dash running!");
        Ok(())
    }

    fn setup_input_handlers(app: Rc<RefCell<App>>) -> Result<(), JsValue> {
        let window = web_sys::window().ok_or("no window")?;

        // Key down
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let mut a = app.borrow_mut();
                let code = event.code();
                if code == "KeyI" && !event.repeat() {
                    a.game.toggle_autopilot();
                    return;
                }
                if a.game.input.key_down(&code, event.repeat()) {
                    event.prevent_default();
                }
            });
            window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        // Key up
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                app.borrow_mut().game.input.key_up(&event.code());
            });
            window.add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        Ok(())
    }

    fn request_animation_frame(app: Rc<RefCell<App>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(app, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(app: Rc<RefCell<App>>, time: f64) {
        {
            let mut a = app.borrow_mut();

            let dt = if a.last_time > 0.0 {
                ((time - a.last_time) / 1000.0) as f32
            } else {
                SIM_DT
            };
            a.last_time = time;

            let runs_before = a.game.runs();
            a.update(dt, time);
            if a.game.runs() != runs_before {
                reset_hud(&a.game, &a.document);
            }
            a.render();
            a.update_hud();
        }

        request_animation_frame(app);
    }

    fn setup_restart_button(app: Rc<RefCell<App>>) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };

        if let Some(btn) = document.get_element_by_id("restart-btn") {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                let mut a = app.borrow_mut();
                let seed = platform::clock_seed();
                a.game.restart(seed);
                reset_hud(&a.game, &a.document);
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_auto_pause(app: Rc<RefCell<App>>) -> Result<(), JsValue> {
        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;

        // Visibility change (tab switch, minimize)
        {
            let app = app.clone();
            let document_clone = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                if document_clone.visibility_state() == web_sys::VisibilityState::Hidden {
                    let mut a = app.borrow_mut();
                    a.game.input.release_all();
                    if a.game.state.phase() == GamePhase::Running {
                        a.game.input.request_pause();
                        log::info!("Auto-paused (tab hidden)");
                    }
                }
            });
            document.add_event_listener_with_callback(
                "visibilitychange",
                closure.as_ref().unchecked_ref(),
            )?;
            closure.forget();
        }

        // Window blur (click outside)
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let mut a = app.borrow_mut();
                a.game.input.release_all();
                if a.game.state.phase() == GamePhase::Running {
                    a.game.input.request_pause();
                    log::info!("Auto-paused (window blur)");
                }
            });
            window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        Ok(())
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() -> Result<(), JsValue> {
    wasm_game::run()
}

/// Headless run: the autopilot plays one game and the result is logged
#[cfg(not(target_arch = "wasm32"))]
#[derive(clap::Parser, Debug)]
#[command(author, version, about = "Play one autopilot run of Key Dash", long_about = None)]
struct Args {
    /// RNG seed (defaults to the clock, so runs differ)
    seed: Option<u64>,
    /// Directory holding settings, best score and leaderboard
    #[arg(long, env = "KEY_DASH_DATA_DIR", default_value = ".key-dash")]
    data_dir: std::path::PathBuf,
    /// Simulated time limit for the run
    #[arg(long, default_value_t = 600)]
    max_seconds: u32,
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use clap::Parser;
    use key_dash::persistence::FileStore;
    use key_dash::scoring::HttpScoreSink;
    use key_dash::sim::{EventKind, GameEvent};
    use key_dash::{Game, platform};

    const FRAME_DT: f32 = 1.0 / 60.0;

    let args = Args::parse();
    platform::init_logging();
    log::info!("Key Dash (native) starting...");

    let seed = args.seed.unwrap_or_else(platform::clock_seed);
    let store = FileStore::new(args.data_dir.clone());
    let mut game = Game::new(store, seed);
    let sink = HttpScoreSink::new(game.settings.scores_url());
    game = game.with_sink(sink);
    game.input.idle_mode = true;

    game.state.subscribe(EventKind::LevelChanged, |event| {
        if let GameEvent::LevelChanged { level } = event {
            log::info!("Reached level {}", level);
        }
    });

    let frames = args.max_seconds.saturating_mul(60);
    for _ in 0..frames {
        game.update(FRAME_DT);
        if game.state.is_ended() {
            break;
        }
    }

    if !game.state.is_ended() {
        log::info!("Time limit reached");
    }
    log::info!(
        "Seed {}: score {} at level {} (best {}, data in {})",
        seed,
        game.state.score(),
        game.state.level(),
        game.state.best_score(),
        args.data_dir.display()
    );
    for (i, entry) in game.leaderboard.entries.iter().enumerate() {
        log::info!("#{:<2} {:>6}  L{}  {}", i + 1, entry.score, entry.level, entry.player_name);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
