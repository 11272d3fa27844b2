//! Presentation settings
//!
//! Host-supplied; never persisted. None of these change gameplay outcomes,
//! only how many cosmetic particles and trail points are kept and whether
//! the frame shakes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// How much cosmetic detail to simulate and draw
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum QualityPreset {
    Low,
    Medium,
    #[default]
    High,
}

impl QualityPreset {
    pub const ALL: [QualityPreset; 3] = [QualityPreset::Low, QualityPreset::Medium, QualityPreset::High];

    pub fn name(self) -> &'static str {
        match self {
            QualityPreset::Low => "low",
            QualityPreset::Medium => "medium",
            QualityPreset::High => "high",
        }
    }

    /// (live particle cap, fraction of the full trail kept)
    fn budget(self) -> (usize, f32) {
        match self {
            QualityPreset::Low => (60, 0.25),
            QualityPreset::Medium => (200, 0.6),
            QualityPreset::High => (600, 1.0),
        }
    }

    pub fn max_particles(self) -> usize {
        self.budget().0
    }

    pub fn trail_fraction(self) -> f32 {
        self.budget().1
    }
}

impl fmt::Display for QualityPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for QualityPreset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|p| p.name() == lower || (lower == "med" && *p == QualityPreset::Medium))
            .ok_or_else(|| format!("unknown quality preset '{s}' (expected low, medium or high)"))
    }
}

/// Presentation preferences
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub quality: QualityPreset,
    /// Offset the frame by the shake intensity
    pub screen_shake: bool,
    pub trails: bool,
    pub particles: bool,
    /// Overrides `screen_shake`
    pub reduced_motion: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            quality: QualityPreset::default(),
            screen_shake: true,
            trails: true,
            particles: true,
            reduced_motion: false,
        }
    }
}

impl Settings {
    pub fn with_quality(quality: QualityPreset) -> Self {
        Self {
            quality,
            ..Self::default()
        }
    }

    pub fn shake_enabled(&self) -> bool {
        self.screen_shake && !self.reduced_motion
    }

    /// Live particle cap; zero when particles are off
    pub fn max_particles(&self) -> usize {
        if self.particles {
            self.quality.max_particles()
        } else {
            0
        }
    }

    /// Trail points to keep per ball, given the tuned full length
    pub fn trail_length(&self, full: usize) -> usize {
        if !self.trails {
            return 0;
        }
        ((full as f32 * self.quality.trail_fraction()).round() as usize).max(1)
    }
}
