//! Falling power-ups and their timed effects

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::state::GameState;
use crate::config::Tuning;
use crate::consts::{MAX_BALLS, MAX_LIVES};

/// Power-up types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PowerUpKind {
    /// Paddle ×1.5 for a while
    WidePaddle,
    /// Clone up to two free balls
    MultiBall,
    /// Balls move at ×0.6 for a while
    SlowBall,
    ExtraLife,
}

impl PowerUpKind {
    pub const ALL: [PowerUpKind; 4] = [
        PowerUpKind::WidePaddle,
        PowerUpKind::MultiBall,
        PowerUpKind::SlowBall,
        PowerUpKind::ExtraLife,
    ];

    /// Uniformly pick a kind
    pub fn random<R: Rng>(rng: &mut R) -> Self {
        Self::ALL[rng.random_range(0..Self::ALL.len())]
    }

    /// Apply this power-up's effect to the game
    pub fn apply(self, state: &mut GameState) {
        match self {
            PowerUpKind::WidePaddle => {
                // Re-catching restarts the timer, it never stacks
                state.effects.wide_ticks = state.tuning.wide_duration;
            }
            PowerUpKind::MultiBall => spawn_extra_balls(state),
            PowerUpKind::SlowBall => {
                state.effects.slow_ticks = state.tuning.slow_duration;
            }
            PowerUpKind::ExtraLife => {
                state.lives = (state.lives + 1).min(MAX_LIVES);
            }
        }
    }
}

/// Duplicate the first two free balls with some horizontal jitter, never
/// exceeding the ball cap
fn spawn_extra_balls(state: &mut GameState) {
    let room = MAX_BALLS.saturating_sub(state.balls.len());
    if room == 0 {
        log::debug!("MultiBall ignored: already at {} balls", state.balls.len());
        return;
    }

    let jitter = state.tuning.multiball_jitter * state.config.scale;
    let clones: Vec<_> = state
        .balls
        .iter()
        .filter(|b| !b.is_waiting())
        .take(2.min(room))
        .cloned()
        .collect();

    for mut ball in clones {
        ball.vel.x += (state.rng.random::<f32>() - 0.5) * jitter;
        ball.trail.clear();
        state.balls.push(ball);
    }
}

/// A falling pickup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerUp {
    pub pos: Vec2,
    /// Fall speed per step
    pub vy: f32,
    pub kind: PowerUpKind,
}

/// Remaining duration of the timed effects, in PLAYING steps
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveEffects {
    pub wide_ticks: u32,
    pub slow_ticks: u32,
}

/// Multipliers in force for the current step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectScales {
    pub paddle_width: f32,
    pub ball_speed: f32,
}

impl ActiveEffects {
    /// Consume one step of each active effect and return what applies now
    pub fn advance(&mut self, tuning: &Tuning) -> EffectScales {
        let paddle_width = if self.wide_ticks > 0 {
            self.wide_ticks -= 1;
            tuning.wide_factor
        } else {
            1.0
        };
        let ball_speed = if self.slow_ticks > 0 {
            self.slow_ticks -= 1;
            tuning.slow_factor
        } else {
            1.0
        };
        EffectScales {
            paddle_width,
            ball_speed,
        }
    }
}
