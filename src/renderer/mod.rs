//! Backend-agnostic rendering
//!
//! The game never talks to a concrete drawing API. A host implements
//! `Surface` (canvas 2D, a GPU batcher, a test recorder) and calls
//! `draw_frame` with the latest snapshot.

pub mod palette;

use glam::Vec2;

use crate::sim::GamePhase;
use crate::snapshot::{BallView, BrickView, PaddleView, Snapshot};
use palette::Hsla;

/// How a shape is filled
#[derive(Debug, Clone, PartialEq)]
pub enum Fill {
    Solid(Hsla),
    /// Gradient between two points with (offset, colour) stops
    Linear {
        from: Vec2,
        to: Vec2,
        stops: Vec<(f32, Hsla)>,
    },
    /// Gradient from an inner circle (radius 0) to an outer circle
    Radial {
        inner: Vec2,
        outer: Vec2,
        radius: f32,
        stops: Vec<(f32, Hsla)>,
    },
}

/// Soft shadow drawn around a shape
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Glow {
    pub color: Hsla,
    pub blur: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Font {
    /// Pixel display face for HUD and titles
    Display,
    /// Plain sans for hints and glyphs
    Body,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub size: f32,
    pub color: Hsla,
    pub align: Align,
    pub font: Font,
}

/// Axis-aligned rectangle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub pos: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            pos: Vec2::new(x, y),
            size: Vec2::new(w, h),
        }
    }
}

/// Drawing primitives a host provides
pub trait Surface {
    /// Start a new frame of the given size
    fn clear(&mut self, width: f32, height: f32);
    /// Translate everything drawn until the next `clear`
    fn set_offset(&mut self, offset: Vec2);
    fn fill_rect(&mut self, rect: Rect, corner_radius: f32, fill: &Fill, glow: Option<Glow>);
    fn fill_circle(&mut self, center: Vec2, radius: f32, fill: &Fill, glow: Option<Glow>);
    fn text(&mut self, text: &str, pos: Vec2, style: &TextStyle);
    /// Thin stroke; surfaces without line support may ignore it
    fn line(&mut self, _from: Vec2, _to: Vec2, _width: f32, _color: Hsla) {}
}

/// Per-host presentation details that are not part of the game state
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RenderHints {
    /// Touch device; changes the prompt wording
    pub touch: bool,
    /// Random unit jitter in [-0.5, 0.5]² for this frame's shake
    pub shake_jitter: Vec2,
}

/// Draw one complete frame
pub fn draw_frame<S: Surface + ?Sized>(snap: &Snapshot, surface: &mut S, hints: &RenderHints) {
    let s = snap.scale;
    surface.clear(snap.width, snap.height);
    draw_background(snap, surface);

    if snap.shake > 0.0 {
        surface.set_offset(hints.shake_jitter * snap.shake);
    }

    for brick in &snap.bricks {
        draw_brick(brick, s, surface);
    }
    for p in &snap.particles {
        let color = palette::tint_color(p.tint).with_alpha(p.life);
        surface.fill_circle(p.pos, p.size * p.life, &Fill::Solid(color), None);
    }
    for pu in &snap.powerups {
        let (color, glyph) = palette::powerup_style(pu.kind);
        surface.fill_circle(
            pu.pos,
            pu.radius,
            &Fill::Solid(color),
            Some(Glow { color, blur: 10.0 * s }),
        );
        surface.text(
            glyph,
            pu.pos,
            &TextStyle {
                size: 12.0 * s,
                color: palette::WHITE,
                align: Align::Center,
                font: Font::Body,
            },
        );
    }
    for ball in &snap.balls {
        draw_ball(ball, s, surface);
    }
    draw_paddle(&snap.paddle, s, surface);
    draw_hud(snap, surface, hints);

    match snap.phase {
        GamePhase::Ready => draw_ready(snap, surface, hints),
        GamePhase::Paused => draw_paused(snap, surface),
        GamePhase::LevelClear => draw_level_clear(snap, surface, hints),
        GamePhase::GameOver => draw_game_over(snap, surface, "GAME OVER", palette::DESTRUCTIVE),
        GamePhase::Win => draw_game_over(snap, surface, "YOU WIN!", palette::ACCENT),
        GamePhase::Playing => {}
    }
}

fn draw_background<S: Surface + ?Sized>(snap: &Snapshot, surface: &mut S) {
    surface.fill_rect(
        Rect::new(0.0, 0.0, snap.width, snap.height),
        0.0,
        &Fill::Linear {
            from: Vec2::ZERO,
            to: Vec2::new(0.0, snap.height),
            stops: vec![(0.0, palette::BACKGROUND_TOP), (1.0, palette::BACKGROUND_BOTTOM)],
        },
        None,
    );

    let grid = (40.0 * snap.scale).max(1.0);
    let mut x = 0.0;
    while x < snap.width {
        surface.line(Vec2::new(x, 0.0), Vec2::new(x, snap.height), 1.0, palette::GRID_LINE);
        x += grid;
    }
    let mut y = 0.0;
    while y < snap.height {
        surface.line(Vec2::new(0.0, y), Vec2::new(snap.width, y), 1.0, palette::GRID_LINE);
        y += grid;
    }
}

fn draw_brick<S: Surface + ?Sized>(brick: &BrickView, s: f32, surface: &mut S) {
    let base = palette::brick_color(brick.color);
    surface.fill_rect(
        Rect { pos: brick.pos, size: brick.size },
        4.0 * s,
        &Fill::Linear {
            from: brick.pos,
            to: brick.pos + Vec2::new(0.0, brick.size.y),
            stops: vec![(0.0, base), (1.0, base.darker(15.0))],
        },
        None,
    );
    surface.fill_rect(
        Rect::new(
            brick.pos.x + 3.0 * s,
            brick.pos.y + 2.0 * s,
            brick.size.x - 6.0 * s,
            6.0 * s,
        ),
        2.0 * s,
        &Fill::Solid(palette::HIGHLIGHT),
        None,
    );

    // One crack per lost third of health, at fixed spots so they don't flicker
    if brick.hp < brick.max_hp && brick.max_hp > 0 {
        let lost = 1.0 - brick.hp as f32 / brick.max_hp as f32;
        let cracks = (lost * 3.0).ceil() as u32;
        for i in 0..cracks {
            let fx = 0.25 + 0.25 * i as f32;
            let start = brick.pos + Vec2::new(brick.size.x * fx, brick.size.y * 0.3);
            let lean = (if i % 2 == 0 { 6.0 } else { -6.0 }) * s;
            let end = Vec2::new(start.x + lean, brick.pos.y + brick.size.y * 0.7);
            surface.line(start, end, 2.0 * s, palette::CRACK);
        }
    }

    if brick.has_powerup {
        surface.fill_circle(
            brick.pos + brick.size * 0.5,
            4.0 * s,
            &Fill::Solid(palette::ACCENT.with_alpha(0.9)),
            None,
        );
    }
}

fn draw_ball<S: Surface + ?Sized>(ball: &BallView, s: f32, surface: &mut S) {
    let n = ball.trail.len() as f32;
    for (i, pos) in ball.trail.iter().enumerate() {
        let t = i as f32 / n;
        surface.fill_circle(
            *pos,
            ball.radius * (0.3 + t * 0.7),
            &Fill::Solid(palette::ACCENT.with_alpha(t * 0.5)),
            None,
        );
    }

    surface.fill_circle(
        ball.pos,
        ball.radius,
        &Fill::Radial {
            inner: ball.pos - Vec2::splat(ball.radius * 0.3),
            outer: ball.pos,
            radius: ball.radius,
            stops: vec![
                (0.0, palette::ACCENT.with_lightness(90.0)),
                (0.5, palette::ACCENT),
                (1.0, palette::ACCENT.with_lightness(65.0)),
            ],
        },
        Some(Glow {
            color: palette::ACCENT,
            blur: 15.0 * s,
        }),
    );
}

fn draw_paddle<S: Surface + ?Sized>(paddle: &PaddleView, s: f32, surface: &mut S) {
    let rect = Rect::new(paddle.x, paddle.y, paddle.width, paddle.height);
    surface.fill_rect(
        rect,
        8.0 * s,
        &Fill::Linear {
            from: rect.pos,
            to: rect.pos + Vec2::new(0.0, paddle.height),
            stops: vec![
                (0.0, palette::PRIMARY.with_lightness(85.0)),
                (0.5, palette::PRIMARY),
                (1.0, palette::PRIMARY.with_lightness(60.0)),
            ],
        },
        Some(Glow {
            color: palette::PRIMARY,
            blur: 20.0 * s,
        }),
    );
    surface.fill_rect(
        Rect::new(
            paddle.x + 4.0 * s,
            paddle.y + 2.0 * s,
            paddle.width - 8.0 * s,
            4.0 * s,
        ),
        2.0 * s,
        &Fill::Solid(palette::PADDLE_HIGHLIGHT),
        None,
    );
}

fn display(size: f32, color: Hsla, align: Align) -> TextStyle {
    TextStyle {
        size,
        color,
        align,
        font: Font::Display,
    }
}

fn draw_hud<S: Surface + ?Sized>(snap: &Snapshot, surface: &mut S, hints: &RenderHints) {
    let s = snap.scale;
    let w = snap.width;
    let size = (16.0 * s).max(14.0);

    surface.text(
        &format!("SCORE: {}", snap.score),
        Vec2::new(15.0 * s, 30.0 * s),
        &display(size, palette::ACCENT, Align::Left),
    );
    if let Some(best) = snap.high_score {
        surface.text(
            &format!("HI: {}", best.max(snap.score)),
            Vec2::new(w / 2.0, 30.0 * s),
            &display(size, palette::SECONDARY, Align::Center),
        );
    }
    surface.text(
        &format!("LV {}", snap.level),
        Vec2::new(w - 15.0 * s, 30.0 * s),
        &display(size, palette::PRIMARY, Align::Right),
    );
    surface.text(
        &"♥ ".repeat(snap.lives as usize),
        Vec2::new(15.0 * s, 55.0 * s),
        &display(size, palette::DESTRUCTIVE, Align::Left),
    );

    if snap.combo > 1 {
        let alpha = (snap.combo_timer as f32 / 30.0).min(1.0);
        surface.text(
            &format!("{}x COMBO!", snap.combo),
            Vec2::new(w / 2.0, snap.height / 2.0),
            &display((24.0 * s).max(20.0), palette::ACCENT.with_alpha(alpha), Align::Center),
        );
    }

    if snap.ball_waiting && snap.phase == GamePhase::Playing {
        let prompt = if hints.touch {
            "TAP TO LAUNCH"
        } else {
            "CLICK OR SPACE TO LAUNCH"
        };
        surface.text(
            prompt,
            Vec2::new(w / 2.0, snap.height - 20.0 * s),
            &display((12.0 * s).max(10.0), palette::FOREGROUND, Align::Center),
        );
    }
}

fn overlay<S: Surface + ?Sized>(snap: &Snapshot, surface: &mut S) {
    surface.fill_rect(
        Rect::new(0.0, 0.0, snap.width, snap.height),
        0.0,
        &Fill::Solid(palette::OVERLAY),
        None,
    );
}

fn draw_ready<S: Surface + ?Sized>(snap: &Snapshot, surface: &mut S, hints: &RenderHints) {
    let s = snap.scale;
    let c = Vec2::new(snap.width / 2.0, snap.height / 2.0);
    overlay(snap, surface);
    surface.text(
        "BRICK BREAKER",
        c - Vec2::new(0.0, 60.0 * s),
        &display((32.0 * s).max(24.0), palette::ACCENT, Align::Center),
    );
    surface.text(
        &format!("LEVEL {}", snap.level),
        c - Vec2::new(0.0, 20.0 * s),
        &display((16.0 * s).max(14.0), palette::PRIMARY, Align::Center),
    );
    let (prompt, help) = if hints.touch {
        ("TAP TO START", "Swipe to move the paddle")
    } else {
        ("CLICK OR PRESS SPACE", "Arrow keys or mouse to move")
    };
    surface.text(
        prompt,
        c + Vec2::new(0.0, 30.0 * s),
        &display((14.0 * s).max(12.0), palette::SECONDARY, Align::Center),
    );
    surface.text(
        help,
        c + Vec2::new(0.0, 60.0 * s),
        &TextStyle {
            size: (12.0 * s).max(10.0),
            color: palette::FOREGROUND,
            align: Align::Center,
            font: Font::Body,
        },
    );
}

fn draw_paused<S: Surface + ?Sized>(snap: &Snapshot, surface: &mut S) {
    let s = snap.scale;
    let c = Vec2::new(snap.width / 2.0, snap.height / 2.0);
    overlay(snap, surface);
    surface.text(
        "PAUSED",
        c,
        &display((32.0 * s).max(24.0), palette::ACCENT, Align::Center),
    );
    surface.text(
        "PRESS ESC TO RESUME",
        c + Vec2::new(0.0, 40.0 * s),
        &display((14.0 * s).max(12.0), palette::PRIMARY, Align::Center),
    );
}

fn draw_level_clear<S: Surface + ?Sized>(snap: &Snapshot, surface: &mut S, hints: &RenderHints) {
    let s = snap.scale;
    let c = Vec2::new(snap.width / 2.0, snap.height / 2.0);
    overlay(snap, surface);
    surface.text(
        "LEVEL CLEAR!",
        c - Vec2::new(0.0, 40.0 * s),
        &display((32.0 * s).max(24.0), palette::PRIMARY, Align::Center),
    );
    surface.text(
        &format!("SCORE: {}", snap.score),
        c + Vec2::new(0.0, 10.0 * s),
        &display((20.0 * s).max(16.0), palette::ACCENT, Align::Center),
    );
    let prompt = if hints.touch {
        "TAP FOR NEXT LEVEL"
    } else {
        "CLICK FOR NEXT LEVEL"
    };
    surface.text(
        prompt,
        c + Vec2::new(0.0, 60.0 * s),
        &display((14.0 * s).max(12.0), palette::SECONDARY, Align::Center),
    );
}

fn draw_game_over<S: Surface + ?Sized>(snap: &Snapshot, surface: &mut S, title: &str, color: Hsla) {
    let s = snap.scale;
    let c = Vec2::new(snap.width / 2.0, snap.height / 2.0);
    overlay(snap, surface);
    surface.text(
        title,
        c - Vec2::new(0.0, 40.0 * s),
        &display((32.0 * s).max(24.0), color, Align::Center),
    );
    surface.text(
        &format!("SCORE: {}", snap.score),
        c + Vec2::new(0.0, 10.0 * s),
        &display((20.0 * s).max(16.0), palette::ACCENT, Align::Center),
    );
    let record = snap
        .high_score
        .is_some_and(|best| snap.score > 0 && snap.score >= best);
    if record {
        surface.text(
            "NEW HIGH SCORE!",
            c + Vec2::new(0.0, 40.0 * s),
            &display((14.0 * s).max(12.0), palette::SECONDARY, Align::Center),
        );
    }
    surface.text(
        "RETRY TO PLAY AGAIN",
        c + Vec2::new(0.0, 70.0 * s),
        &display((12.0 * s).max(10.0), palette::FOREGROUND, Align::Center),
    );
}
