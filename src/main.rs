//! Retro Breaker headless demo
//!
//! Runs an autoplaying session through the same host lifecycle a browser
//! embed uses, logs progress and prints the final snapshot as JSON.
//!
//! Usage: retro-breaker [--tuning FILE] [--seed N] [--seconds N] [--high-score FILE]
//!                      [--quality low|medium|high]

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use std::process::ExitCode;

    use glam::Vec2;
    use retro_breaker::driver::{FrameId, Listener, ListenerId};
    use retro_breaker::persistence::{HighScoreStore, JsonFileStore, default_store};
    use retro_breaker::renderer::palette::Hsla;
    use retro_breaker::renderer::{Fill, Glow, Rect, RenderHints, Surface, TextStyle, draw_frame};
    use retro_breaker::sim::GamePhase;
    use retro_breaker::{
        Arcade, GameError, InputEvent, Platform, QualityPreset, Session, Settings, Snapshot, Tuning,
        field_size_for_container,
    };

    /// Platform with no real event sources; just hands out ids
    #[derive(Default)]
    struct HeadlessPlatform {
        next_id: u32,
        live_listeners: usize,
        pending_frame: Option<FrameId>,
    }

    impl Platform for HeadlessPlatform {
        fn add_listener(&mut self, listener: Listener) -> Result<ListenerId, GameError> {
            self.next_id += 1;
            self.live_listeners += 1;
            log::debug!("Registered {listener:?} listener");
            Ok(ListenerId(self.next_id))
        }

        fn remove_listener(&mut self, _id: ListenerId) {
            self.live_listeners = self.live_listeners.saturating_sub(1);
        }

        fn request_frame(&mut self) -> FrameId {
            self.next_id += 1;
            let id = FrameId(self.next_id);
            self.pending_frame = Some(id);
            id
        }

        fn cancel_frame(&mut self, id: FrameId) {
            if self.pending_frame == Some(id) {
                self.pending_frame = None;
            }
        }
    }

    /// Counts draw calls instead of drawing
    #[derive(Default)]
    struct CountingSurface {
        calls: usize,
    }

    impl Surface for CountingSurface {
        fn clear(&mut self, _width: f32, _height: f32) {
            self.calls = 0;
        }
        fn set_offset(&mut self, _offset: Vec2) {}
        fn fill_rect(&mut self, _rect: Rect, _radius: f32, _fill: &Fill, _glow: Option<Glow>) {
            self.calls += 1;
        }
        fn fill_circle(&mut self, _center: Vec2, _radius: f32, _fill: &Fill, _glow: Option<Glow>) {
            self.calls += 1;
        }
        fn text(&mut self, _text: &str, _pos: Vec2, _style: &TextStyle) {
            self.calls += 1;
        }
        fn line(&mut self, _from: Vec2, _to: Vec2, _width: f32, _color: Hsla) {
            self.calls += 1;
        }
    }

    struct Options {
        tuning: Option<String>,
        seed: u64,
        seconds: u32,
        high_score: Option<String>,
        quality: QualityPreset,
    }

    fn parse_args() -> Result<Options, String> {
        let mut opts = Options {
            tuning: None,
            seed: 0x5EED,
            seconds: 120,
            high_score: None,
            quality: QualityPreset::default(),
        };
        let mut args = std::env::args().skip(1);
        while let Some(arg) = args.next() {
            let mut value = || args.next().ok_or_else(|| format!("{arg} needs a value"));
            match arg.as_str() {
                "--tuning" => opts.tuning = Some(value()?),
                "--high-score" => opts.high_score = Some(value()?),
                "--seed" => opts.seed = value()?.parse().map_err(|e| format!("--seed: {e}"))?,
                "--seconds" => opts.seconds = value()?.parse().map_err(|e| format!("--seconds: {e}"))?,
                "--quality" => opts.quality = value()?.parse()?,
                other => return Err(format!("unknown argument {other}")),
            }
        }
        Ok(opts)
    }

    /// Steer toward the lowest descending ball and press the action button
    /// whenever the game is waiting for it
    fn autoplay(snap: &Snapshot) -> Vec<InputEvent> {
        let mut events = Vec::new();
        match snap.phase {
            GamePhase::Ready | GamePhase::LevelClear => events.push(InputEvent::Click),
            GamePhase::Playing if snap.ball_waiting => events.push(InputEvent::KeyDown(" ".into())),
            _ => {}
        }

        let target = snap
            .balls
            .iter()
            .filter(|b| !b.waiting)
            .max_by(|a, b| a.pos.y.total_cmp(&b.pos.y))
            .map(|b| b.pos.x);
        if let Some(x) = target {
            events.push(InputEvent::PointerMove {
                client_x: x,
                rect_left: 0.0,
                rect_width: snap.width,
            });
        }
        events
    }

    fn run(opts: Options) -> Result<Snapshot, GameError> {
        let tuning = match &opts.tuning {
            Some(path) => Tuning::load(path)?,
            None => Tuning::default(),
        };
        let store: Box<dyn HighScoreStore> = match &opts.high_score {
            Some(path) => Box::new(JsonFileStore::new(path)),
            None => default_store(),
        };

        let (width, height) = field_size_for_container(832.0);
        let session = Session::new(opts.seed, tuning, width, height, store)?
            .with_settings(Settings::with_quality(opts.quality));
        let mut arcade = Arcade::open(HeadlessPlatform::default(), session)?;

        let mut surface = CountingSurface::default();
        let hints = RenderHints::default();
        let frames = opts.seconds * 60;
        let mut last = None;

        for frame in 0..frames {
            let now = frame as f64 * 1000.0 / 60.0;
            let Some(snap) = arcade.on_frame(now) else {
                break;
            };
            draw_frame(&snap, &mut surface, &hints);

            if snap.phase.is_terminal() {
                log::info!("Run ended in {:?} after {} frames", snap.phase, frame);
                last = Some(snap);
                break;
            }
            for event in autoplay(&snap) {
                arcade.handle(&event);
            }
            if frame % 600 == 0 {
                log::info!(
                    "t={:>4}s level {} score {} lives {} bricks {} ({} draw calls)",
                    frame / 60,
                    snap.level,
                    snap.score,
                    snap.lives,
                    snap.bricks.len(),
                    surface.calls
                );
            }
            last = Some(snap);
        }

        arcade.close();
        log::debug!(
            "Listeners left after close: {}",
            arcade.platform().live_listeners
        );
        Ok(last.unwrap_or_else(|| arcade.session().snapshot()))
    }

    pub fn main() -> ExitCode {
        env_logger::init();

        let opts = match parse_args() {
            Ok(opts) => opts,
            Err(msg) => {
                eprintln!("{msg}");
                eprintln!(
                    "usage: retro-breaker [--tuning FILE] [--seed N] [--seconds N] [--high-score FILE] [--quality low|medium|high]"
                );
                return ExitCode::from(2);
            }
        };

        match run(opts) {
            Ok(snap) => {
                match snap.to_json() {
                    Ok(json) => println!("{json}"),
                    Err(err) => log::error!("Failed to serialize snapshot: {err}"),
                }
                ExitCode::SUCCESS
            }
            Err(err) => {
                log::error!("{err}");
                ExitCode::FAILURE
            }
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> std::process::ExitCode {
    headless::main()
}

/// Browser start hook: logging and panic reporting. The host page drives the
/// game itself through the library API.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn wasm_main() {
    console_error_panic_hook::set_once();
    if let Err(err) = console_log::init_with_level(log::Level::Info) {
        web_sys::console::warn_1(&format!("Logger already set: {err}").into());
    }
    log::info!("Retro Breaker loaded");
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // Entry point is wasm_main
}
