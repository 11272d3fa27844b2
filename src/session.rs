//! Session state machine
//!
//! A `Session` owns the simulation and everything around it: the command
//! queue, held keys, pending resize and level-reset work, and the high score.
//! Hosts push commands at any time; they take effect at the start of the
//! next `step`.

use crate::config::Tuning;
use crate::error::GameError;
use crate::input::{Command, CommandQueue};
use crate::persistence::HighScoreStore;
use crate::settings::Settings;
use crate::sim::{GameEvent, GamePhase, GameState, TickInput, tick};
use crate::snapshot::Snapshot;

pub struct Session {
    state: GameState,
    commands: CommandQueue,
    held: TickInput,
    pending_resize: Option<(f32, f32)>,
    needs_level_reset: bool,
    /// None when the store could not be read; no writes are attempted then
    high_score: Option<u64>,
    record_announced: bool,
    store: Box<dyn HighScoreStore>,
    settings: Settings,
}

impl Session {
    /// Create a session in `Ready` for a `width`×`height` field.
    ///
    /// `tuning` is validated first. The stored high score is read once here.
    pub fn new(
        seed: u64,
        tuning: Tuning,
        width: f32,
        height: f32,
        store: Box<dyn HighScoreStore>,
    ) -> Result<Self, GameError> {
        tuning.validate()?;
        let high_score = match store.get_high_score() {
            Ok(score) => Some(score),
            Err(err) => {
                log::warn!("High score unavailable, not tracking it this session: {err}");
                None
            }
        };

        let mut session = Self {
            state: GameState::new(seed, tuning, width, height),
            commands: CommandQueue::new(),
            held: TickInput::default(),
            pending_resize: None,
            needs_level_reset: false,
            high_score,
            record_announced: false,
            store,
            settings: Settings::default(),
        };
        session.apply_settings();
        Ok(session)
    }

    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.set_settings(settings);
        self
    }

    pub fn set_settings(&mut self, settings: Settings) {
        self.settings = settings;
        self.apply_settings();
    }

    fn apply_settings(&mut self) {
        self.state.max_particles = self.settings.max_particles();
        self.state.trail_length = self.settings.trail_length(self.state.tuning.trail_length);
    }

    pub fn push(&mut self, cmd: Command) {
        self.commands.push(cmd);
    }

    pub fn start(&mut self) {
        self.push(Command::Start);
    }

    pub fn retry(&mut self) {
        self.push(Command::Retry);
    }

    pub fn next_level(&mut self) {
        self.push(Command::NextLevel);
    }

    pub fn toggle_pause(&mut self) {
        self.push(Command::TogglePause);
    }

    pub fn primary_action(&mut self) {
        self.push(Command::PrimaryAction);
    }

    /// Centre the paddle on field x `x`
    pub fn set_paddle_target(&mut self, x: f32) {
        self.push(Command::SetPaddleTarget(x));
    }

    pub fn move_left(&mut self, active: bool) {
        self.push(Command::MoveLeft(active));
    }

    pub fn move_right(&mut self, active: bool) {
        self.push(Command::MoveRight(active));
    }

    /// Record a new field size; only the latest one before a step is applied
    pub fn on_resize(&mut self, width: f32, height: f32) {
        self.pending_resize = Some((width, height));
    }

    /// Run one fixed step: drain commands, apply pending resize and level
    /// reset, simulate if playing, then update the high score.
    pub fn step(&mut self) -> Vec<GameEvent> {
        let commands: Vec<Command> = self.commands.drain().collect();
        for cmd in commands {
            self.apply(cmd);
        }

        if let Some((width, height)) = self.pending_resize.take() {
            self.state.resize(width, height);
        }
        if std::mem::take(&mut self.needs_level_reset) {
            self.state.reset_level();
        }

        let events = tick(&mut self.state, &self.held);
        self.state.decay_shake();
        self.update_high_score();
        events
    }

    /// Run `steps` steps and collect their events
    pub fn advance(&mut self, steps: u32) -> Vec<GameEvent> {
        let mut events = Vec::new();
        for _ in 0..steps {
            events.extend(self.step());
        }
        events
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot::capture(&self.state, self.high_score, &self.settings)
    }

    fn apply(&mut self, cmd: Command) {
        match cmd {
            Command::SetPaddleTarget(x) => {
                let width = self.state.paddle.width;
                self.state.paddle.target_x = self.state.config.clamp_paddle_x(x - width / 2.0, width);
            }
            Command::MoveLeft(active) => self.held.move_left = active,
            Command::MoveRight(active) => self.held.move_right = active,
            Command::PrimaryAction => match self.state.phase {
                GamePhase::Ready => self.begin_run(),
                GamePhase::LevelClear => self.advance_level(),
                GamePhase::Playing => {
                    if self.state.launch_waiting() {
                        log::trace!("Ball launched");
                    }
                }
                GamePhase::Paused | GamePhase::GameOver | GamePhase::Win => {}
            },
            Command::TogglePause => match self.state.phase {
                GamePhase::Playing => {
                    self.state.phase = GamePhase::Paused;
                    log::debug!("Paused");
                }
                GamePhase::Paused => {
                    self.state.phase = GamePhase::Playing;
                    log::debug!("Resumed");
                }
                _ => {}
            },
            Command::Start => {
                if self.state.phase == GamePhase::Ready || self.state.phase.is_terminal() {
                    self.begin_run();
                } else {
                    log::debug!("Ignoring start in {:?}", self.state.phase);
                }
            }
            Command::Retry => {
                if self.state.phase.is_terminal() {
                    self.state.reset_run();
                    self.state.phase = GamePhase::Ready;
                    self.needs_level_reset = true;
                    self.record_announced = false;
                    log::info!("Retry: back to the title screen");
                } else {
                    log::debug!("Ignoring retry in {:?}", self.state.phase);
                }
            }
            Command::NextLevel => {
                if self.state.phase == GamePhase::LevelClear {
                    self.advance_level();
                } else {
                    log::debug!("Ignoring next level in {:?}", self.state.phase);
                }
            }
        }
    }

    fn begin_run(&mut self) {
        self.state.reset_run();
        self.state.phase = GamePhase::Playing;
        self.needs_level_reset = true;
        self.record_announced = false;
        log::info!("Run started");
    }

    fn advance_level(&mut self) {
        self.state.level += 1;
        self.state.phase = GamePhase::Playing;
        self.needs_level_reset = true;
    }

    fn update_high_score(&mut self) {
        let Some(best) = self.high_score else {
            return;
        };
        let score = self.state.score;
        if score <= best {
            return;
        }
        self.high_score = Some(score);
        if !self.record_announced {
            log::info!("New high score (previous best {best})");
            self.record_announced = true;
        }
        if let Err(err) = self.store.set_high_score(score) {
            log::warn!("Failed to save high score: {err}");
        }
    }

    pub fn phase(&self) -> GamePhase {
        self.state.phase
    }

    pub fn score(&self) -> u64 {
        self.state.score
    }

    pub fn lives(&self) -> u8 {
        self.state.lives
    }

    pub fn level(&self) -> u32 {
        self.state.level
    }

    pub fn high_score(&self) -> Option<u64> {
        self.high_score
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn field_width(&self) -> f32 {
        self.state.config.width
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Direct access for tools and tests that stage positions
    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;
    use glam::Vec2;

    fn session() -> Session {
        Session::new(11, Tuning::default(), 800.0, 600.0, Box::new(MemoryStore::new())).unwrap()
    }

    fn playing() -> Session {
        let mut s = session();
        s.start();
        s.step();
        s
    }

    #[test]
    fn test_start_enters_playing_with_waiting_ball() {
        let s = playing();
        assert_eq!(s.phase(), GamePhase::Playing);
        assert!(s.state().ball_waiting());
        assert_eq!(s.score(), 0);
        assert_eq!(s.lives(), 3);
    }

    #[test]
    fn test_commands_wait_for_next_step() {
        let mut s = session();
        s.start();
        assert_eq!(s.phase(), GamePhase::Ready);
        s.step();
        assert_eq!(s.phase(), GamePhase::Playing);
    }

    #[test]
    fn test_primary_action_launches() {
        let mut s = playing();
        s.primary_action();
        s.step();
        assert!(!s.state().ball_waiting());
    }

    #[test]
    fn test_pause_freezes_simulation() {
        let mut s = playing();
        s.primary_action();
        s.step();
        s.toggle_pause();
        s.step();
        assert_eq!(s.phase(), GamePhase::Paused);
        let pos = s.state().balls[0].pos;
        s.advance(30);
        assert_eq!(s.state().balls[0].pos, pos);

        // Primary action does nothing while paused
        s.primary_action();
        s.step();
        assert_eq!(s.phase(), GamePhase::Paused);

        s.toggle_pause();
        s.step();
        assert_eq!(s.phase(), GamePhase::Playing);
        assert_ne!(s.state().balls[0].pos, pos);
    }

    #[test]
    fn test_pointer_target_centres_and_clamps() {
        let mut s = playing();
        s.set_paddle_target(400.0);
        s.step();
        assert_eq!(s.state().paddle.target_x, 340.0);
        s.set_paddle_target(5000.0);
        s.step();
        assert_eq!(s.state().paddle.target_x, 680.0);
        s.set_paddle_target(-50.0);
        s.step();
        assert_eq!(s.state().paddle.target_x, 0.0);
    }

    #[test]
    fn test_resize_is_coalesced() {
        let mut s = playing();
        s.on_resize(300.0, 225.0);
        s.on_resize(600.0, 450.0);
        s.step();
        assert_eq!(s.field_width(), 600.0);
        assert_eq!(s.level(), 1);
    }

    #[test]
    fn test_retry_only_from_terminal() {
        let mut s = playing();
        s.retry();
        s.step();
        assert_eq!(s.phase(), GamePhase::Playing);

        s.state_mut().phase = GamePhase::GameOver;
        s.state_mut().score = 300;
        s.retry();
        s.step();
        assert_eq!(s.phase(), GamePhase::Ready);
        assert_eq!(s.score(), 0);
        assert_eq!(s.lives(), 3);
    }

    #[test]
    fn test_next_level_keeps_score() {
        let mut s = playing();
        s.state_mut().score = 250;
        s.state_mut().phase = GamePhase::LevelClear;
        s.next_level();
        s.step();
        assert_eq!(s.phase(), GamePhase::Playing);
        assert_eq!(s.level(), 2);
        assert_eq!(s.score(), 250);
        assert_eq!(s.state().config.rows, 6);
    }

    #[test]
    fn test_high_score_written_when_beaten() {
        let mut s = Session::new(1, Tuning::default(), 800.0, 600.0, Box::new(MemoryStore::with_score(5))).unwrap();
        s.start();
        s.step();
        s.primary_action();
        s.step();
        let brick = s.state().bricks.get(4, 0).unwrap().clone();
        let ball = &mut s.state_mut().balls[0];
        ball.pos = Vec2::new(brick.center().x, brick.max().y + 8.0);
        ball.vel = Vec2::new(0.0, -3.0);
        s.step();
        assert_eq!(s.score(), 10);
        assert_eq!(s.high_score(), Some(10));
    }

    #[test]
    fn test_unreadable_store_hides_high_score() {
        let mut s = Session::new(1, Tuning::default(), 800.0, 600.0, Box::new(MemoryStore::unavailable())).unwrap();
        s.start();
        s.step();
        s.state_mut().score = 999;
        s.step();
        assert_eq!(s.high_score(), None);
        assert_eq!(s.snapshot().high_score, None);
    }

    #[test]
    fn test_invalid_tuning_is_rejected() {
        let tuning = Tuning {
            powerup_chance: 1.5,
            ..Tuning::default()
        };
        let result = Session::new(1, tuning, 800.0, 600.0, Box::new(MemoryStore::new()));
        assert!(matches!(
            result,
            Err(GameError::InvalidTuning {
                field: "powerup_chance",
                ..
            })
        ));
    }

    #[test]
    fn test_settings_cap_particles() {
        let s = session().with_settings(Settings {
            particles: false,
            ..Settings::default()
        });
        assert_eq!(s.state().max_particles, 0);
    }
}
