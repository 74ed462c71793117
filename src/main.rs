//! Red Swarm entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{HtmlCanvasElement, KeyboardEvent, MouseEvent};

    use glam::Vec2;
    use red_swarm::highscores::BestTimes;
    use red_swarm::renderer::CanvasRenderer;
    use red_swarm::settings::Settings;
    use red_swarm::sim::{tick, GameEvent, GamePhase, TickInput, World};

    /// Game instance holding all state
    struct Game {
        world: World,
        renderer: Option<CanvasRenderer>,
        input: TickInput,
        last_time: f64,
        best_times: BestTimes,
        /// This browser session only; same rules, never persisted
        session_times: BestTimes,
        settings: Settings,
        // FPS tracking
        frame_times: [f64; 60],
        frame_index: usize,
        fps: u32,
    }

    impl Game {
        fn new(seed: u64, width: f32, height: f32) -> Self {
            Self {
                world: World::new(seed, width, height),
                renderer: None,
                input: TickInput::default(),
                last_time: 0.0,
                best_times: BestTimes::load(),
                session_times: BestTimes::new(),
                settings: Settings::load(),
                frame_times: [0.0; 60],
                frame_index: 0,
                fps: 0,
            }
        }

        /// Run one simulation step and drain its events
        fn update(&mut self, dt_ms: f32, time: f64) {
            tick(&mut self.world, &self.input, dt_ms);

            // Clear one-shot inputs after processing
            self.input.pause = false;
            self.input.restart = false;
            self.input.weapon_select = None;

            let events: Vec<GameEvent> = self.world.events.drain(..).collect();
            for event in events {
                match event {
                    GameEvent::RunEnded { seconds } => {
                        let level = self.world.level.level;
                        let now = js_sys::Date::now();
                        self.session_times.record(seconds, level, now);
                        if let Some(rank) = self.best_times.record(seconds, level, now) {
                            log::info!("new best time: {seconds:.1}s (rank {rank})");
                        }
                        self.best_times.save();
                    }
                }
            }

            // Track frame times for FPS
            self.frame_times[self.frame_index] = time;
            self.frame_index = (self.frame_index + 1) % 60;
            let oldest_time = self.frame_times[self.frame_index];
            if oldest_time > 0.0 {
                let elapsed = time - oldest_time;
                if elapsed > 0.0 {
                    self.fps = (60_000.0 / elapsed).round() as u32;
                }
            }
        }

        fn render(&self) {
            if let Some(ref renderer) = self.renderer {
                renderer.render(&self.world, &self.settings);
            }
        }

        /// Hint line for the current game situation
        fn context_hint(&self) -> &'static str {
            match self.world.phase {
                GamePhase::GameOver => "press R to restart",
                GamePhase::Paused => "press Esc to resume",
                GamePhase::Running => {
                    if !self.world.weapons_unlocked {
                        "survive 30s to unlock weapons"
                    } else if self.world.loadout.equipped_weapon().is_none() {
                        "press 1-4 to buy a weapon"
                    } else {
                        "hold Space or click to fire"
                    }
                }
            }
        }

        /// Update HUD elements in DOM
        fn update_hud(&self) {
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };

            if let Some(el) = document.query_selector("#hud-time .hud-value").ok().flatten() {
                el.set_text_content(Some(&format!("{:.1}s", self.world.score_seconds())));
            }
            if let Some(el) = document.query_selector("#hud-level .hud-value").ok().flatten() {
                el.set_text_content(Some(&self.world.level.level.to_string()));
            }
            if let Some(el) = document
                .query_selector("#hud-credits .hud-value")
                .ok()
                .flatten()
            {
                el.set_text_content(Some(&self.world.player.credits.to_string()));
            }
            if let Some(el) = document.get_element_by_id("hud-hp-fill") {
                let pct = (self.world.player.health_fraction() * 100.0).round();
                let _ = el.set_attribute("style", &format!("width: {pct}%"));
            }
            if let Some(el) = document
                .query_selector("#hud-weapon .hud-value")
                .ok()
                .flatten()
            {
                let name = if !self.world.weapons_unlocked {
                    "locked"
                } else {
                    self.world
                        .loadout
                        .equipped_weapon()
                        .map(|w| w.name)
                        .unwrap_or("none")
                };
                el.set_text_content(Some(name));
            }
            if let Some(el) = document.query_selector("#hud-fps .hud-value").ok().flatten() {
                if self.settings.show_fps {
                    el.set_text_content(Some(&self.fps.to_string()));
                }
            }
            if let Some(el) = document.query_selector("#hud-best .hud-value").ok().flatten() {
                let best = self.best_times.best().unwrap_or(0.0);
                el.set_text_content(Some(&format!("{best:.1}s")));
            }
            if let Some(el) = document.get_element_by_id("hud-hints") {
                let class = if self.settings.show_hints {
                    "hud-hints"
                } else {
                    "hud-hints hidden"
                };
                let _ = el.set_attribute("class", class);
                el.set_text_content(Some(self.context_hint()));
            }

            // Game over panel with the leaderboard
            if let Some(el) = document.get_element_by_id("game-over") {
                if self.world.phase == GamePhase::GameOver {
                    let _ = el.set_attribute("class", "");
                    if let Some(time_el) = document.get_element_by_id("final-time") {
                        time_el
                            .set_text_content(Some(&format!("{:.1}s", self.world.score_seconds())));
                    }
                    if let Some(el) = document.get_element_by_id("session-best") {
                        let best = self.session_times.best().unwrap_or(0.0);
                        el.set_text_content(Some(&format!("{best:.1}s")));
                    }
                    if let Some(list) = document.get_element_by_id("best-times") {
                        if self.best_times.is_empty() {
                            list.set_inner_html("<li>no runs recorded yet</li>");
                        } else {
                            let rows: Vec<String> = self
                                .best_times
                                .entries
                                .iter()
                                .enumerate()
                                .map(|(i, e)| {
                                    format!(
                                        "<li>#{} {:.1}s (level {})</li>",
                                        i + 1,
                                        e.seconds,
                                        e.level
                                    )
                                })
                                .collect();
                            list.set_inner_html(&rows.join(""));
                        }
                    }
                } else {
                    let _ = el.set_attribute("class", "hidden");
                }
            }
        }
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        if console_log::init_with_level(log::Level::Info).is_err() {
            web_sys::console::warn_1(&"logger already initialized".into());
        }

        log::info!("Red Swarm starting...");

        let window = match web_sys::window() {
            Some(w) => w,
            None => return,
        };
        let document = match window.document() {
            Some(d) => d,
            None => return,
        };

        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let canvas: HtmlCanvasElement = match document
            .get_element_by_id("canvas")
            .and_then(|el| el.dyn_into().ok())
        {
            Some(c) => c,
            None => {
                log::error!("no #canvas element");
                return;
            }
        };

        let (width, height) = size_canvas(&window, &canvas);

        let seed = js_sys::Date::now() as u64;
        let game = Rc::new(RefCell::new(Game::new(seed, width, height)));
        log::info!("Game initialized with seed: {seed}");

        match CanvasRenderer::new(&canvas) {
            Ok(renderer) => game.borrow_mut().renderer = Some(renderer),
            Err(e) => {
                log::error!("renderer init failed: {e:?}");
                return;
            }
        }

        setup_input_handlers(&canvas, game.clone());
        setup_resize_handler(canvas.clone(), game.clone());

        request_animation_frame(game);

        log::info!("Red Swarm running!");
    }

    /// Match the backing store to CSS size times device pixel ratio
    fn size_canvas(window: &web_sys::Window, canvas: &HtmlCanvasElement) -> (f32, f32) {
        let dpr = window.device_pixel_ratio();
        let width = (canvas.client_width() as f64 * dpr) as u32;
        let height = (canvas.client_height() as f64 * dpr) as u32;
        canvas.set_width(width);
        canvas.set_height(height);
        (width as f32, height as f32)
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        let window = match web_sys::window() {
            Some(w) => w,
            None => return,
        };
        let dpr = window.device_pixel_ratio() as f32;

        // Keyboard: held directions plus one-shot edges
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let mut g = game.borrow_mut();
                let handled = match event.key().as_str() {
                    "ArrowUp" | "w" | "W" => {
                        g.input.up = true;
                        true
                    }
                    "ArrowDown" | "s" | "S" => {
                        g.input.down = true;
                        true
                    }
                    "ArrowLeft" | "a" | "A" => {
                        g.input.left = true;
                        true
                    }
                    "ArrowRight" | "d" | "D" => {
                        g.input.right = true;
                        true
                    }
                    " " => {
                        g.input.fire = true;
                        true
                    }
                    "Escape" | "p" | "P" => {
                        g.input.pause = true;
                        true
                    }
                    "r" | "R" | "Enter" => {
                        g.input.restart = true;
                        true
                    }
                    key @ ("1" | "2" | "3" | "4") => {
                        g.input.weapon_select = key.bytes().next().map(|b| b - b'0');
                        true
                    }
                    _ => false,
                };
                if handled {
                    event.prevent_default();
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let mut g = game.borrow_mut();
                match event.key().as_str() {
                    "ArrowUp" | "w" | "W" => g.input.up = false,
                    "ArrowDown" | "s" | "S" => g.input.down = false,
                    "ArrowLeft" | "a" | "A" => g.input.left = false,
                    "ArrowRight" | "d" | "D" => g.input.right = false,
                    " " => g.input.fire = false,
                    _ => {}
                }
            });
            let _ =
                window.add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Pointer aim in canvas pixel coordinates
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let mut g = game.borrow_mut();
                g.input.aim = Some(Vec2::new(
                    event.offset_x() as f32 * dpr,
                    event.offset_y() as f32 * dpr,
                ));
            });
            let _ = canvas
                .add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                game.borrow_mut().input.fire = true;
            });
            let _ = canvas
                .add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                game.borrow_mut().input.fire = false;
            });
            let _ = canvas
                .add_event_listener_with_callback("mouseup", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_resize_handler(canvas: HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        let window = match web_sys::window() {
            Some(w) => w,
            None => return,
        };
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            if let Some(window) = web_sys::window() {
                let (width, height) = size_canvas(&window, &canvas);
                let mut g = game.borrow_mut();
                g.world.resize(width, height);
                if let Some(ref mut renderer) = g.renderer {
                    renderer.resize(width, height);
                }
            }
        });
        let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        {
            let mut g = game.borrow_mut();

            // Delta in ms; the sim clamps internally
            let dt_ms = if g.last_time > 0.0 {
                (time - g.last_time) as f32
            } else {
                16.0
            };
            g.last_time = time;

            g.update(dt_ms, time);
            g.render();
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
    use std::time::{SystemTime, UNIX_EPOCH};

    use red_swarm::highscores::BestTimes;
    use red_swarm::sim::{tick, GameEvent, GamePhase, TickInput, World};

    env_logger::init();
    log::info!("Red Swarm (native) starting headless demo run...");

    let seed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(1);
    let mut best_times = BestTimes::load();
    let mut world = World::new(seed, 1280.0, 720.0);

    // Scripted input: circle the field and hold fire. The run ends when the
    // swarm catches up, which exercises the full level/combat loop.
    const DT_MS: f32 = 16.0;
    let mut input = TickInput {
        fire: true,
        ..Default::default()
    };
    let mut frame = 0u64;
    while world.phase != GamePhase::GameOver && world.score_ms < 180_000.0 {
        let leg = (frame / 90) % 4;
        input.up = leg == 0;
        input.right = leg == 1;
        input.down = leg == 2;
        input.left = leg == 3;
        tick(&mut world, &input, DT_MS);
        frame += 1;
    }

    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as f64)
        .unwrap_or(0.0);
    for event in world.events.drain(..) {
        match event {
            GameEvent::RunEnded { seconds } => {
                log::info!("demo run ended: {seconds:.1}s, level {}", world.level.level);
                if let Some(rank) = best_times.record(seconds, world.level.level, timestamp) {
                    log::info!("recorded as rank {rank}");
                }
            }
        }
    }
    best_times.save();

    println!("survived {:.1}s (level {})", world.score_seconds(), world.level.level);
    for (i, entry) in best_times.entries.iter().enumerate() {
        println!("  #{} {:.1}s (level {})", i + 1, entry.seconds, entry.level);
    }
}
