//! Colour palette
//!
//! Everything is expressed in HSL so the site's theme tokens map over
//! directly.

use serde::{Deserialize, Serialize};

use crate::consts::BRICK_COLOR_COUNT;
use crate::sim::{PowerUpKind, Tint};

/// HSL colour with alpha. `h` in degrees, `s`/`l` in percent, `a` in 0..=1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hsla {
    pub h: f32,
    pub s: f32,
    pub l: f32,
    pub a: f32,
}

impl Hsla {
    pub const fn hsl(h: f32, s: f32, l: f32) -> Self {
        Self { h, s, l, a: 1.0 }
    }

    pub const fn hsla(h: f32, s: f32, l: f32, a: f32) -> Self {
        Self { h, s, l, a }
    }

    pub fn with_alpha(self, a: f32) -> Self {
        Self {
            a: a.clamp(0.0, 1.0),
            ..self
        }
    }

    pub fn with_lightness(self, l: f32) -> Self {
        Self {
            l: l.clamp(0.0, 100.0),
            ..self
        }
    }

    /// Same hue, `by` percentage points darker
    pub fn darker(self, by: f32) -> Self {
        self.with_lightness(self.l - by)
    }

    /// CSS colour string, e.g. `hsla(320, 70%, 80%, 1)`
    pub fn to_css(&self) -> String {
        format!("hsla({}, {}%, {}%, {})", self.h, self.s, self.l, self.a)
    }

    /// Linear RGBA in 0..=1 for backends that want floats
    pub fn to_rgba(&self) -> [f32; 4] {
        let s = self.s / 100.0;
        let l = self.l / 100.0;
        let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
        let hp = (self.h.rem_euclid(360.0)) / 60.0;
        let x = c * (1.0 - (hp % 2.0 - 1.0).abs());
        let (r, g, b) = match hp as u32 {
            0 => (c, x, 0.0),
            1 => (x, c, 0.0),
            2 => (0.0, c, x),
            3 => (0.0, x, c),
            4 => (x, 0.0, c),
            _ => (c, 0.0, x),
        };
        let m = l - c / 2.0;
        [r + m, g + m, b + m, self.a]
    }
}

// Theme tokens
pub const ACCENT: Hsla = Hsla::hsl(320.0, 70.0, 80.0);
pub const SECONDARY: Hsla = Hsla::hsl(280.0, 60.0, 75.0);
pub const PRIMARY: Hsla = Hsla::hsl(190.0, 70.0, 75.0);
pub const FOREGROUND: Hsla = Hsla::hsl(190.0, 70.0, 85.0);
pub const DESTRUCTIVE: Hsla = Hsla::hsl(0.0, 70.0, 70.0);
pub const BACKGROUND_TOP: Hsla = Hsla::hsl(230.0, 30.0, 12.0);
pub const BACKGROUND_BOTTOM: Hsla = Hsla::hsl(230.0, 30.0, 18.0);
pub const GRID_LINE: Hsla = Hsla::hsla(190.0, 70.0, 75.0, 0.1);
pub const OVERLAY: Hsla = Hsla::hsla(0.0, 0.0, 0.0, 0.7);
pub const HIGHLIGHT: Hsla = Hsla::hsla(0.0, 0.0, 100.0, 0.3);
pub const PADDLE_HIGHLIGHT: Hsla = Hsla::hsla(180.0, 100.0, 90.0, 0.5);
pub const CRACK: Hsla = Hsla::hsla(0.0, 0.0, 0.0, 0.5);
pub const WHITE: Hsla = Hsla::hsl(0.0, 0.0, 100.0);

/// Brick colour categories, indexed by `row % 8`
pub const BRICK_COLORS: [Hsla; BRICK_COLOR_COUNT as usize] = [
    Hsla::hsl(320.0, 70.0, 80.0),
    Hsla::hsl(280.0, 60.0, 75.0),
    Hsla::hsl(190.0, 70.0, 75.0),
    Hsla::hsl(320.0, 70.0, 70.0),
    Hsla::hsl(280.0, 60.0, 65.0),
    Hsla::hsl(190.0, 70.0, 65.0),
    Hsla::hsl(0.0, 70.0, 70.0),
    Hsla::hsl(200.0, 50.0, 70.0),
];

pub fn brick_color(category: u8) -> Hsla {
    BRICK_COLORS[category as usize % BRICK_COLORS.len()]
}

pub fn tint_color(tint: Tint) -> Hsla {
    match tint {
        Tint::Brick(category) => brick_color(category),
        Tint::Paddle => PRIMARY,
        Tint::PowerUp => ACCENT,
    }
}

/// Disc colour and glyph for a falling power-up
pub fn powerup_style(kind: PowerUpKind) -> (Hsla, &'static str) {
    match kind {
        PowerUpKind::WidePaddle => (PRIMARY, "⬌"),
        PowerUpKind::MultiBall => (ACCENT, "×3"),
        PowerUpKind::SlowBall => (SECONDARY, "▼"),
        PowerUpKind::ExtraLife => (DESTRUCTIVE, "♥"),
    }
}
