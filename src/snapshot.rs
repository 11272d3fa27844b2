//! Read-only per-frame view of the game
//!
//! Published to the renderer (and any UI layer) at frame boundaries. It owns
//! its data so the consumer can keep it around while the next step runs.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::settings::Settings;
use crate::sim::{GamePhase, GameState, PowerUpKind, Tint};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaddleView {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BallView {
    pub pos: Vec2,
    pub radius: f32,
    pub waiting: bool,
    /// Oldest first
    pub trail: Vec<Vec2>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrickView {
    pub pos: Vec2,
    pub size: Vec2,
    pub color: u8,
    pub hp: u8,
    pub max_hp: u8,
    pub has_powerup: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerUpView {
    pub pos: Vec2,
    pub radius: f32,
    pub kind: PowerUpKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticleView {
    pub pos: Vec2,
    pub size: f32,
    /// Remaining life in (0, 1], drives opacity
    pub life: f32,
    pub tint: Tint,
}

/// Everything needed to draw one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub width: f32,
    pub height: f32,
    pub scale: f32,
    pub phase: GamePhase,
    pub score: u64,
    /// None when the store could not be read
    pub high_score: Option<u64>,
    pub lives: u8,
    pub level: u32,
    pub combo: u32,
    pub combo_timer: u32,
    pub ball_waiting: bool,
    /// Frame offset magnitude; zero when shake is disabled
    pub shake: f32,
    pub paddle: PaddleView,
    pub balls: Vec<BallView>,
    /// Alive bricks only
    pub bricks: Vec<BrickView>,
    pub powerups: Vec<PowerUpView>,
    pub particles: Vec<ParticleView>,
}

impl Snapshot {
    pub fn capture(state: &GameState, high_score: Option<u64>, settings: &Settings) -> Self {
        let config = &state.config;
        Self {
            width: config.width,
            height: config.height,
            scale: config.scale,
            phase: state.phase,
            score: state.score,
            high_score,
            lives: state.lives,
            level: state.level,
            combo: state.combo.count,
            combo_timer: state.combo.timer,
            ball_waiting: state.ball_waiting(),
            shake: if settings.shake_enabled() {
                state.shake
            } else {
                0.0
            },
            paddle: PaddleView {
                x: state.paddle.x,
                y: state.paddle.y,
                width: state.paddle.width,
                height: state.paddle.height,
            },
            balls: state
                .balls
                .iter()
                .map(|b| BallView {
                    pos: b.pos,
                    radius: b.radius,
                    waiting: b.is_waiting(),
                    trail: b.trail.iter().copied().collect(),
                })
                .collect(),
            bricks: state
                .bricks
                .alive()
                .map(|b| BrickView {
                    pos: b.pos,
                    size: b.size,
                    color: b.color,
                    hp: b.hp,
                    max_hp: b.max_hp,
                    has_powerup: b.has_powerup,
                })
                .collect(),
            powerups: state
                .powerups
                .iter()
                .map(|p| PowerUpView {
                    pos: p.pos,
                    radius: config.powerup_radius,
                    kind: p.kind,
                })
                .collect(),
            particles: state
                .particles
                .iter()
                .map(|p| ParticleView {
                    pos: p.pos,
                    size: p.size,
                    life: p.life,
                    tint: p.color,
                })
                .collect(),
        }
    }

    /// Serialize for hosts that consume frames as JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Tuning;

    #[test]
    fn test_capture_lists_alive_bricks_only() {
        let mut state = GameState::new(1, Tuning::default(), 800.0, 600.0);
        let total = state.bricks.remaining_count();
        state.bricks.get_mut(0, 0).unwrap().hit();
        let snap = Snapshot::capture(&state, Some(50), &Settings::default());
        assert_eq!(snap.bricks.len(), total - 1);
        assert_eq!(snap.phase, GamePhase::Ready);
        assert!(snap.ball_waiting);
        assert_eq!(snap.high_score, Some(50));
    }

    #[test]
    fn test_shake_hidden_when_disabled() {
        let mut state = GameState::new(1, Tuning::default(), 800.0, 600.0);
        state.shake = 4.0;
        let off = Settings {
            screen_shake: false,
            ..Settings::default()
        };
        assert_eq!(Snapshot::capture(&state, None, &off).shake, 0.0);
        assert_eq!(Snapshot::capture(&state, None, &Settings::default()).shake, 4.0);
    }

    #[test]
    fn test_json_has_phase() {
        let state = GameState::new(1, Tuning::default(), 800.0, 600.0);
        let json = Snapshot::capture(&state, None, &Settings::default())
            .to_json()
            .unwrap();
        assert!(json.contains("\"phase\":\"Ready\""));
        assert!(json.contains("\"high_score\":null"));
    }
}
