//! Game state and core simulation types
//!
//! Everything the step function mutates lives in `GameState`. Hosts never
//! touch it directly; they go through `Session` and read `Snapshot`s.

use std::collections::VecDeque;

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::bricks::BrickGrid;
use super::particles::Particle;
use super::powerup::{ActiveEffects, PowerUp, PowerUpKind};
use super::scoring::ComboTracker;
use crate::config::{FieldConfig, Tuning};

const SHAKE_DECAY: f32 = 0.9;
const SHAKE_CUTOFF: f32 = 0.5;

/// Current phase of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Title screen, waiting for a start command
    Ready,
    /// Active gameplay
    Playing,
    /// Gameplay suspended by the player
    Paused,
    /// Every brick on the current level is gone
    LevelClear,
    /// Lives exhausted
    GameOver,
    /// Final level cleared
    Win,
}

impl GamePhase {
    /// Phases that end a run; only retry or start leave them
    pub fn is_terminal(self) -> bool {
        matches!(self, GamePhase::GameOver | GamePhase::Win)
    }
}

/// Ball state - riding the paddle or free-moving
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BallState {
    /// Sitting on the paddle until launched
    Waiting,
    Free,
}

/// A ball entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ball {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub state: BallState,
    /// Recent positions, oldest first
    pub trail: VecDeque<Vec2>,
}

impl Ball {
    /// A ball waiting on top of the paddle
    pub fn waiting(paddle: &Paddle, radius: f32) -> Self {
        let mut ball = Self {
            pos: Vec2::ZERO,
            vel: Vec2::ZERO,
            radius,
            state: BallState::Waiting,
            trail: VecDeque::new(),
        };
        ball.follow(paddle);
        ball
    }

    pub fn is_waiting(&self) -> bool {
        self.state == BallState::Waiting
    }

    /// Keep a waiting ball centred just above the paddle
    pub fn follow(&mut self, paddle: &Paddle) {
        self.pos = Vec2::new(paddle.center_x(), paddle.y - self.radius - 2.0);
    }

    /// Record current position to trail (call each step before moving)
    pub fn record_trail(&mut self, max_len: usize) {
        if max_len == 0 {
            self.trail.clear();
            return;
        }
        self.trail.push_back(self.pos);
        while self.trail.len() > max_len {
            self.trail.pop_front();
        }
    }

    /// Launch diagonally upward; `to_right` picks the horizontal sign
    pub fn launch(&mut self, speed: f32, to_right: bool) {
        if self.is_waiting() {
            self.vel = Vec2::new(if to_right { speed } else { -speed }, -speed);
            self.state = BallState::Free;
        }
    }

    /// Axis-aligned bounding box as (min, max)
    pub fn bounds(&self) -> (Vec2, Vec2) {
        let r = Vec2::splat(self.radius);
        (self.pos - r, self.pos + r)
    }
}

/// The player's paddle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paddle {
    /// Left edge
    pub x: f32,
    /// Where the paddle's left edge is heading
    pub target_x: f32,
    /// Top edge
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Paddle {
    /// A paddle centred horizontally for the given config
    pub fn centered(config: &FieldConfig) -> Self {
        let x = config.width / 2.0 - config.paddle_width / 2.0;
        Self {
            x,
            target_x: x,
            y: config.paddle_y,
            width: config.paddle_width,
            height: config.paddle_height,
        }
    }

    pub fn center_x(&self) -> f32 {
        self.x + self.width / 2.0
    }

    /// Ease toward the target by `smoothing` of the remaining gap
    pub fn approach(&mut self, smoothing: f32) {
        self.x += (self.target_x - self.x) * smoothing;
    }

    /// Clamp both position and target into the field
    pub fn clamp(&mut self, config: &FieldConfig) {
        self.x = config.clamp_paddle_x(self.x, self.width);
        self.target_x = config.clamp_paddle_x(self.target_x, self.width);
    }
}

/// Something notable that happened during a step
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    BrickHit { row: u32, col: u32 },
    BrickDestroyed { row: u32, col: u32, points: u64, combo: u32 },
    PaddleBounce,
    PowerUpSpawned(PowerUpKind),
    PowerUpCaught(PowerUpKind),
    BallLost { lives_left: u8 },
    LevelCleared { level: u32 },
    GameOver { score: u64 },
    Won { score: u64 },
}

/// Complete simulation state
#[derive(Debug, Clone)]
pub struct GameState {
    pub tuning: Tuning,
    pub config: FieldConfig,
    pub rng: Pcg32,
    pub phase: GamePhase,
    pub score: u64,
    pub lives: u8,
    pub level: u32,
    pub combo: ComboTracker,
    pub paddle: Paddle,
    pub balls: Vec<Ball>,
    pub bricks: BrickGrid,
    pub powerups: Vec<PowerUp>,
    pub particles: Vec<Particle>,
    pub effects: ActiveEffects,
    /// Screen shake intensity in field pixels (render-only)
    pub shake: f32,
    /// PLAYING steps simulated so far
    pub time_ticks: u64,
    /// Live particle cap (from settings)
    pub max_particles: usize,
    /// Trail points kept per ball (from settings)
    pub trail_length: usize,
}

impl GameState {
    /// Create a fresh level-1 state in the Ready phase.
    ///
    /// `tuning` is expected to have passed [`Tuning::validate`]; `Session::new`
    /// checks it.
    pub fn new(seed: u64, tuning: Tuning, width: f32, height: f32) -> Self {
        let config = FieldConfig::resolve(width, height, 1, &tuning);
        let mut rng = Pcg32::seed_from_u64(seed);
        let bricks = BrickGrid::generate(1, &config, &tuning, &mut rng);
        let paddle = Paddle::centered(&config);
        let ball = Ball::waiting(&paddle, config.ball_radius);
        let trail_length = tuning.trail_length;

        Self {
            lives: tuning.start_lives,
            tuning,
            config,
            rng,
            phase: GamePhase::Ready,
            score: 0,
            level: 1,
            combo: ComboTracker::default(),
            paddle,
            balls: vec![ball],
            bricks,
            powerups: Vec::new(),
            particles: Vec::new(),
            effects: ActiveEffects::default(),
            shake: 0.0,
            time_ticks: 0,
            max_particles: usize::MAX,
            trail_length,
        }
    }

    /// Reset score, lives, level and combo for a new run
    pub fn reset_run(&mut self) {
        self.score = 0;
        self.lives = self.tuning.start_lives;
        self.level = 1;
        self.combo.reset();
    }

    /// Rebuild the level: fresh bricks, one waiting ball, no pickups or effects.
    ///
    /// Score, lives and combo are left alone.
    pub fn reset_level(&mut self) {
        self.config = FieldConfig::resolve(
            self.config.width,
            self.config.height,
            self.level,
            &self.tuning,
        );
        self.bricks = BrickGrid::generate(self.level, &self.config, &self.tuning, &mut self.rng);
        self.powerups.clear();
        self.particles.clear();
        self.effects = ActiveEffects::default();
        self.shake = 0.0;

        self.paddle.y = self.config.paddle_y;
        self.paddle.width = self.config.paddle_width;
        self.paddle.height = self.config.paddle_height;
        self.paddle.clamp(&self.config);
        self.respawn_ball();

        log::info!(
            "Level {} ready: {}x{} bricks, ball speed {:.2}",
            self.level,
            self.config.rows,
            self.config.cols,
            self.config.ball_speed
        );
    }

    /// Replace all balls with a single waiting one
    pub fn respawn_ball(&mut self) {
        self.balls.clear();
        self.balls.push(Ball::waiting(&self.paddle, self.config.ball_radius));
    }

    pub fn ball_waiting(&self) -> bool {
        self.balls.iter().any(Ball::is_waiting)
    }

    /// Launch every waiting ball in a random horizontal direction
    pub fn launch_waiting(&mut self) -> bool {
        use rand::Rng;

        let speed = self.config.ball_speed;
        let mut launched = false;
        for ball in self.balls.iter_mut().filter(|b| b.is_waiting()) {
            let to_right = self.rng.random_bool(0.5);
            ball.launch(speed, to_right);
            launched = true;
        }
        launched
    }

    /// Adapt to a new field size without restarting.
    ///
    /// Every position, velocity and size is rescaled proportionally; bricks
    /// are re-laid out with their hit points intact.
    pub fn resize(&mut self, width: f32, height: f32) {
        let old = self.config;
        let new = FieldConfig::resolve(width, height, self.level, &self.tuning);
        if new == old {
            return;
        }
        let sx = new.width / old.width;
        let sy = new.height / old.height;
        let sv = new.scale / old.scale;
        let rescale = |p: Vec2| Vec2::new(p.x * sx, p.y * sy);

        self.paddle.x *= sx;
        self.paddle.target_x *= sx;
        self.paddle.y = new.paddle_y;
        self.paddle.height = new.paddle_height;
        self.paddle.width = if self.effects.wide_ticks > 0 {
            new.paddle_width * self.tuning.wide_factor
        } else {
            new.paddle_width
        };
        self.paddle.clamp(&new);

        for ball in &mut self.balls {
            ball.pos = rescale(ball.pos);
            ball.vel *= sv;
            ball.radius = new.ball_radius;
            for p in ball.trail.iter_mut() {
                *p = rescale(*p);
            }
            if ball.is_waiting() {
                ball.follow(&self.paddle);
            }
        }
        for pu in &mut self.powerups {
            pu.pos = rescale(pu.pos);
            pu.vy = new.powerup_fall_speed;
        }
        for p in &mut self.particles {
            p.pos = rescale(p.pos);
            p.vel *= sv;
            p.size *= sv;
        }
        self.shake *= sv;

        if !self.bricks.relayout(&new) {
            log::warn!(
                "Brick grid shape changed on resize ({}x{} -> {}x{}), regenerating",
                old.rows,
                old.cols,
                new.rows,
                new.cols
            );
            self.bricks = BrickGrid::generate(self.level, &new, &self.tuning, &mut self.rng);
        }

        log::debug!(
            "Resized field {}x{} -> {}x{} (scale {:.3})",
            old.width,
            old.height,
            new.width,
            new.height,
            new.scale
        );
        self.config = new;
    }

    /// Ease the screen shake toward rest; runs once per step in every phase
    pub fn decay_shake(&mut self) {
        self.shake *= SHAKE_DECAY;
        if self.shake < SHAKE_CUTOFF {
            self.shake = 0.0;
        }
    }

    /// Award points for a destroyed brick and return them
    pub fn award_brick(&mut self) -> u64 {
        let points = self
            .combo
            .register_destruction(self.tuning.combo_window, self.tuning.base_points, self.level);
        self.score += points;
        points
    }
}
