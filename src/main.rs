//! Disco Dash entry point
//!
//! Handles platform-specific initialization. On the web the session is
//! driven by requestAnimationFrame and DOM clicks; natively a scripted
//! demo session runs headless.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;

    use rand_pcg::Pcg32;

    use disco_dash::highscores::HighScores;
    use disco_dash::settings::Settings;
    use disco_dash::sim::{GameMode, Session, SimEvent};

    /// Game instance holding all state
    struct Game {
        session: Session,
        rng: Pcg32,
        high_scores: HighScores,
        settings: Settings,
        last_time: f64,
        /// Sub-millisecond remainder carried between frames
        carry_ms: f64,
    }

    impl Game {
        fn new(seed: u64) -> Self {
            use rand::SeedableRng;
            Self {
                session: Session::new(GameMode::Normal),
                rng: Pcg32::seed_from_u64(seed),
                high_scores: HighScores::load(),
                settings: Settings::load(),
                last_time: 0.0,
                carry_ms: 0.0,
            }
        }

        fn start(&mut self, mode: GameMode) {
            self.session = Session::new(mode);
            self.session.start(&mut self.rng);
            self.carry_ms = 0.0;
        }

        /// Advance simulated time by the wall-clock delta
        fn update(&mut self, time: f64) {
            let dt = if self.last_time > 0.0 {
                (time - self.last_time).clamp(0.0, 250.0)
            } else {
                0.0
            };
            self.last_time = time;

            self.carry_ms += dt;
            let whole = self.carry_ms as u64;
            self.carry_ms -= whole as f64;

            if whole == 0 {
                return;
            }
            for event in self.session.advance(whole, &mut self.rng) {
                self.handle_event(event);
            }
        }

        fn handle_event(&mut self, event: SimEvent) {
            match event {
                SimEvent::SessionEnded(summary) => {
                    log::info!(
                        "Session over: {} points, best streak {}",
                        summary.score,
                        summary.max_streak
                    );
                    use disco_dash::highscores::HighScoreEntry;
                    self.high_scores.add_entry(HighScoreEntry {
                        name: "Player".to_string(),
                        score: summary.score,
                        mode: summary.mode,
                        streak: summary.max_streak,
                        timestamp: js_sys::Date::now(),
                    });
                    self.high_scores.save();
                }
                SimEvent::GoldenAppeared => log::info!("Golden dancer!"),
                _ => {}
            }
        }

        /// Update HUD elements in DOM
        fn update_hud(&self) {
            let window = web_sys::window().unwrap();
            let document = window.document().unwrap();
            let state = self.session.state();

            if let Some(el) = document.get_element_by_id("hud-score") {
                el.set_text_content(Some(&state.score.to_string()));
            }
            if let Some(el) = document.get_element_by_id("hud-lives") {
                el.set_text_content(Some(&state.lives.to_string()));
            }
            if let Some(el) = document.get_element_by_id("hud-streak") {
                el.set_text_content(Some(&state.streak.to_string()));
            }
            if let Some(el) = document.get_element_by_id("hud-theme") {
                el.set_text_content(Some(state.theme.display_name()));
            }
            if let Some(el) = document.get_element_by_id("game-over") {
                let class = if state.active { "hidden" } else { "" };
                let _ = el.set_attribute("class", class);
            }
        }
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Disco Dash starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        let seed = js_sys::Date::now() as u64;
        let game = Rc::new(RefCell::new(Game::new(seed)));
        game.borrow_mut().start(GameMode::Normal);

        // Respect reduced-motion preference on the stage element
        if !game.borrow().settings.effective_effects() {
            if let Some(el) = document.get_element_by_id("stage") {
                let _ = el.set_attribute("class", "no-effects");
            }
        }

        log::info!("Session started with seed: {}", seed);

        setup_click_handlers(&document, game.clone());
        request_animation_frame(game);

        log::info!("Disco Dash running!");
    }

    fn setup_click_handlers(document: &web_sys::Document, game: Rc<RefCell<Game>>) {
        // Dancer click = catch
        if let Some(el) = document.get_element_by_id("dancer") {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                let mut g = game.borrow_mut();
                let g = &mut *g;
                if let Some(outcome) = g.session.catch_dancer(&mut g.rng) {
                    if let Some(theme) = outcome.theme_unlocked {
                        log::info!("Theme unlocked: {}", theme.display_name());
                    }
                    for a in &outcome.achievements {
                        log::info!("Achievement: {}", a.label());
                    }
                }
            });
            let _ = el.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Antagonist click = penalty
        if let Some(el) = document.get_element_by_id("antagonist") {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                let mut g = game.borrow_mut();
                let g = &mut *g;
                g.session.catch_antagonist(&mut g.rng);
            });
            let _ = el.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Background click = miss
        if let Some(el) = document.get_element_by_id("stage") {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                game.borrow_mut().session.miss();
            });
            let _ = el.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        {
            let mut g = game.borrow_mut();
            g.update(time);
            g.update_hud();
        }
        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    use disco_dash::sim::{GameMode, Session, SimEvent};

    env_logger::init();
    log::info!("Disco Dash (native) starting...");

    // Headless demo: a scripted player with a fixed seed, so two runs print
    // identical transcripts.
    let mut rng = Pcg32::seed_from_u64(42);
    let mut session = Session::new(GameMode::Normal);
    session.start(&mut rng);

    let mut ended = None;
    'demo: for round in 0..30u32 {
        // Catch, wander for a bit, miss every fifth round
        if round % 5 == 4 {
            session.miss();
        } else if let Some(outcome) = session.catch_dancer(&mut rng) {
            log::info!("Catch! +{} (score {})", outcome.points, session.state().score);
            for a in &outcome.achievements {
                log::info!("Achievement: {}", a.label());
            }
        }

        for event in session.advance(2_500, &mut rng) {
            match event {
                SimEvent::SessionEnded(summary) => {
                    ended = Some(summary);
                    break 'demo;
                }
                SimEvent::GoldenAppeared => log::info!("Golden dancer appeared"),
                SimEvent::LevelAdvanced(level) => log::info!("Level {}", level),
                _ => {}
            }
        }
    }

    let summary = ended.unwrap_or_else(|| session.summary());
    println!(
        "Demo session: {} points, best streak {} ({})",
        summary.score,
        summary.max_streak,
        summary.mode.as_str()
    );
}
