//! Data-driven tuning and the per-level field configuration
//!
//! `Tuning` holds every authored constant (in reference-width pixels and
//! per-step units). `FieldConfig` is what the simulation actually reads: the
//! tuning scaled to the current field size and level.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::GameError;

/// Authored gameplay constants, expressed against `reference_width`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub reference_width: f32,

    // Paddle
    pub paddle_width: f32,
    pub paddle_height: f32,
    /// Distance from the field bottom to the paddle's top edge
    pub paddle_bottom_offset: f32,
    /// Fraction of the remaining gap to the target covered each step
    pub paddle_smoothing: f32,
    /// Target movement per step while a direction key is held
    pub paddle_key_speed: f32,
    /// Total deflection range of a paddle bounce (radians)
    pub paddle_angle_span: f32,

    // Ball
    pub ball_radius: f32,
    pub ball_base_speed: f32,
    pub ball_speed_per_level: f32,
    pub trail_length: usize,

    // Bricks
    pub base_rows: u32,
    pub max_extra_rows: u32,
    pub target_cell_width: f32,
    pub brick_height: f32,
    pub brick_padding: f32,
    pub brick_offset_top: f32,
    pub brick_offset_left: f32,
    /// Rows (from the top) whose hit points scale with level
    pub tough_rows: u32,
    pub max_brick_hp: u8,
    pub powerup_chance: f64,

    // Session
    pub start_lives: u8,
    pub combo_window: u32,
    pub base_points: u64,
    /// Clearing this level wins the game (None = endless)
    pub final_level: Option<u32>,

    // Power-ups
    pub powerup_fall_speed: f32,
    pub powerup_radius: f32,
    pub wide_duration: u32,
    pub wide_factor: f32,
    pub slow_duration: u32,
    pub slow_factor: f32,
    pub multiball_jitter: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            reference_width: REFERENCE_WIDTH,

            paddle_width: 120.0,
            paddle_height: 16.0,
            paddle_bottom_offset: 50.0,
            paddle_smoothing: 0.15,
            paddle_key_speed: 12.0,
            paddle_angle_span: std::f32::consts::PI * 0.7,

            ball_radius: 10.0,
            ball_base_speed: 3.0,
            ball_speed_per_level: 0.3,
            trail_length: 8,

            base_rows: 5,
            max_extra_rows: 3,
            target_cell_width: 80.0,
            brick_height: 24.0,
            brick_padding: 8.0,
            brick_offset_top: 80.0,
            brick_offset_left: 20.0,
            tough_rows: 2,
            max_brick_hp: 3,
            powerup_chance: 0.15,

            start_lives: 3,
            combo_window: 60,
            base_points: 10,
            final_level: None,

            powerup_fall_speed: 3.0,
            powerup_radius: 15.0,
            wide_duration: 600,
            wide_factor: 1.5,
            slow_duration: 300,
            slow_factor: 0.6,
            multiball_jitter: 3.0,
        }
    }
}

impl Tuning {
    /// Parse tuning from JSON; missing fields keep their defaults
    pub fn from_json_str(json: &str) -> Result<Self, GameError> {
        let tuning: Tuning = serde_json::from_str(json).map_err(|e| GameError::InvalidTuning {
            field: "<document>",
            reason: e.to_string(),
        })?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Load tuning from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, GameError> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let tuning = Self::from_json_str(&json)?;
        log::info!("Loaded tuning from {}", path.as_ref().display());
        Ok(tuning)
    }

    /// Reject values the resolver cannot work with
    pub fn validate(&self) -> Result<(), GameError> {
        fn positive(field: &'static str, v: f32) -> Result<(), GameError> {
            if v.is_finite() && v > 0.0 {
                Ok(())
            } else {
                Err(GameError::InvalidTuning {
                    field,
                    reason: format!("must be positive, got {v}"),
                })
            }
        }

        positive("reference_width", self.reference_width)?;
        positive("paddle_width", self.paddle_width)?;
        positive("paddle_height", self.paddle_height)?;
        positive("ball_radius", self.ball_radius)?;
        positive("ball_base_speed", self.ball_base_speed)?;
        positive("target_cell_width", self.target_cell_width)?;
        positive("brick_height", self.brick_height)?;
        positive("powerup_radius", self.powerup_radius)?;

        if !(0.0..=1.0).contains(&self.powerup_chance) {
            return Err(GameError::InvalidTuning {
                field: "powerup_chance",
                reason: format!("must be within [0, 1], got {}", self.powerup_chance),
            });
        }
        if !(0.0..=1.0).contains(&self.paddle_smoothing) {
            return Err(GameError::InvalidTuning {
                field: "paddle_smoothing",
                reason: format!("must be within [0, 1], got {}", self.paddle_smoothing),
            });
        }
        if self.base_rows == 0 {
            return Err(GameError::InvalidTuning {
                field: "base_rows",
                reason: "at least one row is required".into(),
            });
        }
        if self.max_brick_hp == 0 {
            return Err(GameError::InvalidTuning {
                field: "max_brick_hp",
                reason: "bricks need at least one hit point".into(),
            });
        }
        if self.start_lives == 0 || self.start_lives > MAX_LIVES {
            return Err(GameError::InvalidTuning {
                field: "start_lives",
                reason: format!("must be within 1..={MAX_LIVES}"),
            });
        }
        Ok(())
    }
}

/// Constants derived from the field size and level.
///
/// Pure function of `(width, height, level, tuning)`; rebuilt on every level
/// change and resize.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldConfig {
    pub width: f32,
    pub height: f32,
    pub level: u32,
    /// `width / reference_width`
    pub scale: f32,
    pub paddle_width: f32,
    pub paddle_height: f32,
    pub paddle_y: f32,
    pub ball_radius: f32,
    pub ball_speed: f32,
    pub rows: u32,
    pub cols: u32,
    pub brick_width: f32,
    pub brick_height: f32,
    pub brick_padding: f32,
    pub brick_offset_top: f32,
    pub brick_offset_left: f32,
    pub powerup_radius: f32,
    pub powerup_fall_speed: f32,
}

impl FieldConfig {
    pub fn resolve(width: f32, height: f32, level: u32, tuning: &Tuning) -> Self {
        let width = sanitize(width, MIN_FIELD_WIDTH);
        let height = sanitize(height, MIN_FIELD_HEIGHT);
        let level = level.max(1);
        let scale = width / tuning.reference_width;

        let rows = tuning.base_rows + (level - 1).min(tuning.max_extra_rows);

        // Epsilon keeps exact multiples (800 / 80) from flooring to 9
        let cell = tuning.target_cell_width * scale;
        let cols = ((width / cell + 1e-4).floor() as u32).max(1);

        let brick_padding = tuning.brick_padding * scale;
        let brick_offset_left = tuning.brick_offset_left * scale;
        let brick_width = ((width - 2.0 * brick_offset_left) / cols as f32 - brick_padding)
            .max(1.0);

        Self {
            width,
            height,
            level,
            scale,
            paddle_width: tuning.paddle_width * scale,
            paddle_height: tuning.paddle_height * scale,
            paddle_y: height - tuning.paddle_bottom_offset * scale,
            ball_radius: tuning.ball_radius * scale,
            ball_speed: (tuning.ball_base_speed + level as f32 * tuning.ball_speed_per_level)
                * scale,
            rows,
            cols,
            brick_width,
            brick_height: tuning.brick_height * scale,
            brick_padding,
            brick_offset_top: tuning.brick_offset_top * scale,
            brick_offset_left,
            powerup_radius: tuning.powerup_radius * scale,
            powerup_fall_speed: tuning.powerup_fall_speed * scale,
        }
    }

    /// Top-left corner of the brick cell at `(row, col)`
    pub fn brick_origin(&self, row: u32, col: u32) -> (f32, f32) {
        (
            col as f32 * (self.brick_width + self.brick_padding) + self.brick_offset_left,
            row as f32 * (self.brick_height + self.brick_padding) + self.brick_offset_top,
        )
    }

    /// Keep a paddle's left edge inside the field
    pub fn clamp_paddle_x(&self, x: f32, paddle_width: f32) -> f32 {
        x.clamp(0.0, (self.width - paddle_width).max(0.0))
    }
}

fn sanitize(v: f32, min: f32) -> f32 {
    if v.is_finite() { v.max(min) } else { min }
}

/// Play-field size for a host container of the given width.
///
/// The field is at most `REFERENCE_WIDTH` wide, inset 32 px, at 4:3.
pub fn field_size_for_container(container_width: f32) -> (f32, f32) {
    let width = sanitize((container_width - 32.0).min(REFERENCE_WIDTH), MIN_FIELD_WIDTH);
    (width, width * FIELD_HEIGHT_RATIO)
}
