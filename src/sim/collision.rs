//! Collision detection and response for axis-aligned geometry
//!
//! Balls are circles but are tested with their bounding boxes against
//! walls, the paddle and bricks. Detection is discrete (one overlap test per
//! step); a fast ball can clip a brick corner without registering a hit.

use glam::Vec2;

use super::bricks::Brick;
use super::state::{Ball, Paddle};

/// Gap left between a ball and a brick face after resolution
pub const SEPARATION: f32 = 0.01;

/// Result of a ball/rectangle overlap test
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionResult {
    /// Unit axis pointing from the rectangle toward the ball
    pub normal: Vec2,
    /// How far the ball must move along `normal` to stop overlapping
    pub penetration: f32,
}

/// Bounce a ball off the left, right and top walls.
///
/// The bottom is open; falling out is handled as ball loss.
pub fn ball_wall_collision(ball: &mut Ball, field_width: f32) -> bool {
    let mut hit = false;
    if ball.pos.x + ball.radius > field_width {
        ball.pos.x = field_width - ball.radius;
        ball.vel.x = -ball.vel.x.abs();
        hit = true;
    }
    if ball.pos.x - ball.radius < 0.0 {
        ball.pos.x = ball.radius;
        ball.vel.x = ball.vel.x.abs();
        hit = true;
    }
    if ball.pos.y - ball.radius < 0.0 {
        ball.pos.y = ball.radius;
        ball.vel.y = ball.vel.y.abs();
        hit = true;
    }
    hit
}

/// Bounce a descending ball off the paddle's top edge.
///
/// The outgoing angle depends only on where the ball struck: the centre
/// sends it straight up, the edges up to `angle_span / 2` either side.
/// Speed is preserved.
pub fn ball_paddle_collision(ball: &mut Ball, paddle: &Paddle, angle_span: f32) -> bool {
    let touching = ball.vel.y > 0.0
        && ball.pos.y + ball.radius > paddle.y
        && ball.pos.y - ball.radius < paddle.y + paddle.height
        && ball.pos.x > paddle.x
        && ball.pos.x < paddle.x + paddle.width;
    if !touching {
        return false;
    }

    let hit_pos = (ball.pos.x - paddle.x) / paddle.width;
    let angle = (hit_pos - 0.5) * angle_span;
    let speed = ball.vel.length();
    ball.vel = Vec2::new(angle.sin() * speed, -(angle.cos() * speed).abs());
    ball.pos.y = paddle.y - ball.radius;
    true
}

/// Overlap test between a ball's bounding box and a brick.
///
/// Picks the axis with the smaller penetration so corner hits reflect the
/// way the ball actually entered.
pub fn ball_brick_overlap(ball: &Ball, brick: &Brick) -> Option<CollisionResult> {
    let (ball_min, ball_max) = ball.bounds();
    let brick_max = brick.max();
    let overlapping = ball_max.x > brick.pos.x
        && ball_min.x < brick_max.x
        && ball_max.y > brick.pos.y
        && ball_min.y < brick_max.y;
    if !overlapping {
        return None;
    }

    let overlap_left = ball_max.x - brick.pos.x;
    let overlap_right = brick_max.x - ball_min.x;
    let overlap_top = ball_max.y - brick.pos.y;
    let overlap_bottom = brick_max.y - ball_min.y;

    let min_x = overlap_left.min(overlap_right);
    let min_y = overlap_top.min(overlap_bottom);

    let result = if min_x < min_y {
        if overlap_left < overlap_right {
            CollisionResult { normal: Vec2::NEG_X, penetration: overlap_left }
        } else {
            CollisionResult { normal: Vec2::X, penetration: overlap_right }
        }
    } else if overlap_top < overlap_bottom {
        CollisionResult { normal: Vec2::NEG_Y, penetration: overlap_top }
    } else {
        CollisionResult { normal: Vec2::Y, penetration: overlap_bottom }
    };
    Some(result)
}

/// Push the ball out of the brick and reflect the velocity component on
/// the collision axis so it leaves the brick.
pub fn resolve_brick_collision(ball: &mut Ball, result: &CollisionResult) {
    ball.pos += result.normal * (result.penetration + SEPARATION);
    if ball.vel.dot(result.normal) < 0.0 {
        ball.vel = reflect_velocity(ball.vel, result.normal);
    }
}

/// Whether a falling power-up disc touches the paddle
pub fn powerup_paddle_overlap(pos: Vec2, radius: f32, paddle: &Paddle) -> bool {
    pos.y + radius > paddle.y
        && pos.y - radius < paddle.y + paddle.height
        && pos.x > paddle.x
        && pos.x < paddle.x + paddle.width
}

/// Reflect velocity off a surface
///
/// Standard reflection: v' = v - 2(v·n)n
#[inline]
pub fn reflect_velocity(velocity: Vec2, normal: Vec2) -> Vec2 {
    velocity - 2.0 * velocity.dot(normal) * normal
}
