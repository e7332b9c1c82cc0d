//! Catch the Fugitive entry point
//!
//! Builds the page, wires input and runs the animation-frame loop in the
//! browser. Natively it plays a headless round with a simulated player.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, HtmlElement, KeyboardEvent, MouseEvent};

    use catch_the_fugitive::platform::web::{DomField, DomTarget, set_styles};
    use catch_the_fugitive::sim::{GameEvent, Session, SessionPhase};
    use catch_the_fugitive::{GameMode, SettingsStore};

    /// Game instance holding all state
    struct Game {
        session: Session,
        score_text: HtmlElement,
        time_text: HtmlElement,
        game_over: HtmlElement,
        final_score: HtmlElement,
    }

    impl Game {
        fn start(&mut self, settings: &SettingsStore) {
            self.session.start(settings.get(), now());
            set_styles(&self.game_over, &[("display", "none")]);
            self.update_hud();
        }

        fn click(&mut self) {
            if let Some(score) = self.session.click(now()) {
                log::debug!("Hit! score {}", score);
                self.update_hud();
            }
        }

        fn update(&mut self, time: f64) {
            for event in self.session.tick(time) {
                match event {
                    GameEvent::Countdown { .. } | GameEvent::Hit { .. } => {}
                    GameEvent::Expired => log::debug!("Fugitive escaped"),
                    GameEvent::GameOver { score } => {
                        self.final_score.set_text_content(Some(&score.to_string()));
                        set_styles(&self.game_over, &[("display", "flex")]);
                    }
                }
            }
            self.update_hud();
        }

        /// Update HUD elements in DOM
        fn update_hud(&self) {
            self.score_text
                .set_text_content(Some(&self.session.score().to_string()));
            let time = match self.session.time_left() {
                Some(secs) => secs.to_string(),
                None => "∞".to_string(),
            };
            self.time_text.set_text_content(Some(&time));
        }
    }

    fn now() -> f64 {
        web_sys::window()
            .and_then(|w| w.performance())
            .map(|p| p.now())
            .unwrap_or(0.0)
    }

    fn create(document: &Document, tag: &str, id: &str) -> HtmlElement {
        let el: HtmlElement = document
            .create_element(tag)
            .expect("create element")
            .dyn_into()
            .expect("not an HtmlElement");
        if !id.is_empty() {
            el.set_id(id);
        }
        el
    }

    fn stat_item(document: &Document, parent: &HtmlElement, label: &str, id: &str, value: &str) -> HtmlElement {
        let container = create(document, "div", &format!("{}-container", id));
        let label_el = create(document, "label", "");
        label_el.set_text_content(Some(label));
        let value_el = create(document, "span", id);
        value_el.set_text_content(Some(value));
        let _ = container.append_child(&label_el);
        let _ = container.append_child(&value_el);
        let _ = parent.append_child(&container);
        value_el
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Catch the Fugitive starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");
        let body = document.body().expect("no body");

        let settings = Rc::new(RefCell::new(SettingsStore::browser()));

        // Page layout
        let app = create(&document, "div", "app");
        let title = create(&document, "h1", "");
        title.set_text_content(Some("Catch the Fugitive"));
        let description = create(&document, "p", "");
        description.set_text_content(Some("Catch the fugitive before time runs out!"));
        let stats = create(&document, "div", "stats-container");
        let score_text = stat_item(&document, &stats, "Score:", "score", "0");
        let time_text = stat_item(&document, &stats, "Time:", "time", "");
        let container = create(&document, "div", "target-container");
        let target_el = create(&document, "div", "target");
        let _ = container.append_child(&target_el);

        // Overlay, shown only after a timed round ends
        let game_over = create(&document, "div", "game-over");
        set_styles(
            &game_over,
            &[
                ("display", "none"),
                ("position", "fixed"),
                ("inset", "0"),
                ("flex-direction", "column"),
                ("align-items", "center"),
                ("justify-content", "center"),
                ("background", "rgba(0, 0, 0, 0.75)"),
                ("color", "#fff"),
            ],
        );
        let over_title = create(&document, "h1", "");
        over_title.set_text_content(Some("Time's up!"));
        let over_label = create(&document, "h3", "");
        over_label.set_text_content(Some("Your score:"));
        let final_score = create(&document, "h3", "final-score");
        let restart_btn = create(&document, "button", "restart-btn");
        restart_btn.set_text_content(Some("Restart"));
        for child in [&over_title, &over_label, &final_score, &restart_btn] {
            let _ = game_over.append_child(child);
        }

        for child in [&title, &description, &stats, &container, &game_over] {
            let _ = app.append_child(child);
        }
        set_styles(&app, &[("text-align", "center"), ("font-family", "sans-serif")]);
        let _ = body.append_child(&app);

        let seed = js_sys::Date::now() as u64;
        let session = Session::with_host(
            Box::new(DomField::new(container.clone())),
            Box::new(DomTarget::new(target_el.clone())),
            settings.borrow().get(),
            seed,
        );
        let game = Rc::new(RefCell::new(Game {
            session,
            score_text,
            time_text,
            game_over,
            final_score,
        }));

        log::info!("Game initialized with seed: {}", seed);

        // Live settings changes
        {
            let game = game.clone();
            let _ = settings
                .borrow_mut()
                .subscribe(move |s| game.borrow_mut().session.apply_settings(s));
        }

        setup_target_click(&target_el, game.clone());
        setup_restart_button(&restart_btn, game.clone(), settings.clone());
        setup_keyboard(game.clone(), settings.clone());

        game.borrow_mut().start(&settings.borrow());
        request_animation_frame(game);

        log::info!("Catch the Fugitive running!");
    }

    fn setup_target_click(target: &HtmlElement, game: Rc<RefCell<Game>>) {
        let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
            event.prevent_default();
            game.borrow_mut().click();
        });
        let _ = target.add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_restart_button(
        btn: &HtmlElement,
        game: Rc<RefCell<Game>>,
        settings: Rc<RefCell<SettingsStore>>,
    ) {
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
            game.borrow_mut().start(&settings.borrow());
            log::info!("Game restarted");
        });
        let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_keyboard(game: Rc<RefCell<Game>>, settings: Rc<RefCell<SettingsStore>>) {
        let window = web_sys::window().unwrap();
        let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
            let key = event.key();
            let mode = match key.as_str() {
                "1" => Some(GameMode::Classic),
                "2" => Some(GameMode::Infinite),
                "3" => Some(GameMode::Hardcore),
                "4" => Some(GameMode::Custom),
                _ => None,
            };
            if let Some(mode) = mode {
                settings.borrow_mut().update(|s| s.game_mode = mode);
                game.borrow_mut().start(&settings.borrow());
                log::info!("Mode: {}", mode.as_str());
                return;
            }
            match key.as_str() {
                "Enter" | "r" | "R" => {
                    if game.borrow().session.phase() != SessionPhase::Playing {
                        game.borrow_mut().start(&settings.borrow());
                    }
                }
                "Escape" => game.borrow_mut().session.end(),
                _ => {}
            }
        });
        let _ = window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
        closure.forget();
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
        game.borrow_mut().update(time);
        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Catch the Fugitive (native) starting...");
    log::info!("Native mode is headless - run with `trunk serve` for the web version");

    for mode in catch_the_fugitive::GameMode::ALL {
        headless_round(mode);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Play one round at 60 fps with a simulated player of uneven reaction time
#[cfg(not(target_arch = "wasm32"))]
fn headless_round(mode: catch_the_fugitive::GameMode) {
    use catch_the_fugitive::GameSettings;
    use catch_the_fugitive::platform::{FixedField, NullView};
    use catch_the_fugitive::sim::{GameEvent, Session, SessionPhase};
    use glam::Vec2;
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg32;

    const FRAME_MS: f64 = 1000.0 / 60.0;
    // Untimed modes stop after this long
    const MAX_ROUND_MS: f64 = 60_000.0;

    let settings = GameSettings {
        game_mode: mode,
        ..GameSettings::default()
    };
    let mut session = Session::with_host(
        Box::new(FixedField::new(800.0, 600.0)),
        Box::new(NullView),
        &settings,
        0x5eed,
    );
    let mut player = Pcg32::seed_from_u64(0xface);

    let mut now = 0.0;
    session.start(&settings, now);
    let mut click_at = now + player.random_range(250.0..900.0);

    while session.phase() == SessionPhase::Playing && now < MAX_ROUND_MS {
        now += FRAME_MS;
        if now >= click_at {
            let aim = session.target().position() + Vec2::splat(session.target().size() / 2.0);
            session.click_at(aim, now);
            click_at = now + player.random_range(250.0..900.0);
        }
        for event in session.tick(now) {
            match event {
                GameEvent::Expired => click_at = now + player.random_range(250.0..900.0),
                GameEvent::GameOver { score } => log::info!("Round over at {:.0} ms: {}", now, score),
                _ => {}
            }
        }
    }
    if session.phase() == SessionPhase::Playing {
        session.end();
    }

    println!(
        "{:>8}: score {:>3}, misses {:>3}, best streak {:>3}, accuracy {:.0}%",
        mode.as_str(),
        session.score(),
        session.misses(),
        session.best_streak(),
        session.accuracy() * 100.0
    );
}
