//! Fixed timestep simulation tick
//!
//! One call advances a PLAYING game by exactly one step. All velocities,
//! timers and decay rates in the simulation are expressed per step.

use glam::Vec2;

use super::collision::{
    ball_brick_overlap, ball_paddle_collision, ball_wall_collision, powerup_paddle_overlap,
    resolve_brick_collision,
};
use super::particles::{self, Tint};
use super::powerup::{PowerUp, PowerUpKind};
use super::state::{GameEvent, GamePhase, GameState};

/// Particles per burst
const DESTROY_BURST: usize = 15;
const HIT_BURST: usize = 5;
const BOUNCE_BURST: usize = 5;
const CATCH_BURST: usize = 10;

/// Screen shake kicks (reference pixels)
const DESTROY_SHAKE: f32 = 5.0;
const HIT_SHAKE: f32 = 2.0;

/// Held direction keys for a single tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickInput {
    pub move_left: bool,
    pub move_right: bool,
}

/// Advance the game state by one step.
///
/// Does nothing outside `Playing`. Returns what happened, in order.
pub fn tick(state: &mut GameState, input: &TickInput) -> Vec<GameEvent> {
    let mut events = Vec::new();
    if state.phase != GamePhase::Playing {
        return events;
    }
    state.time_ticks += 1;

    update_paddle(state, input);
    let scales = state.effects.advance(&state.tuning);
    state.paddle.width = state.config.paddle_width * scales.paddle_width;
    state.paddle.clamp(&state.config);

    update_balls(state, scales.ball_speed, &mut events);
    handle_ball_loss(state, &mut events);
    if state.phase != GamePhase::Playing {
        // Game over: nothing else may touch lives, score or bricks this step
        particles::update(&mut state.particles, state.config.scale);
        return events;
    }
    update_powerups(state, &mut events);
    state.combo.tick();
    resolve_brick_hits(state, &mut events);
    particles::update(&mut state.particles, state.config.scale);

    if state.phase == GamePhase::Playing && state.bricks.remaining_count() == 0 {
        finish_level(state, &mut events);
    }

    events
}

fn update_paddle(state: &mut GameState, input: &TickInput) {
    let config = state.config;
    state.paddle.approach(state.tuning.paddle_smoothing);

    let key_step = state.tuning.paddle_key_speed * config.scale;
    if input.move_right {
        state.paddle.target_x += key_step;
    }
    if input.move_left {
        state.paddle.target_x -= key_step;
    }
    state.paddle.clamp(&config);
}

fn update_balls(state: &mut GameState, speed_scale: f32, events: &mut Vec<GameEvent>) {
    let config = state.config;
    let angle_span = state.tuning.paddle_angle_span;
    let trail_length = state.trail_length;
    let mut bounces = Vec::new();

    for ball in state.balls.iter_mut() {
        if ball.is_waiting() {
            ball.follow(&state.paddle);
            continue;
        }

        ball.record_trail(trail_length);
        ball.pos += ball.vel * speed_scale;

        ball_wall_collision(ball, config.width);
        if ball_paddle_collision(ball, &state.paddle, angle_span) {
            bounces.push(ball.pos);
        }
    }

    for pos in bounces {
        particles::emit(
            &mut state.particles,
            &mut state.rng,
            pos,
            Tint::Paddle,
            BOUNCE_BURST,
            config.scale,
            state.max_particles,
        );
        events.push(GameEvent::PaddleBounce);
    }
}

/// Drop balls that fell out of the field; losing the last one costs a life
fn handle_ball_loss(state: &mut GameState, events: &mut Vec<GameEvent>) {
    let height = state.config.height;
    let before = state.balls.len();
    state.balls.retain(|b| b.pos.y - b.radius <= height);
    if before == 0 || !state.balls.is_empty() {
        return;
    }

    state.lives = state.lives.saturating_sub(1);
    state.combo.reset();
    events.push(GameEvent::BallLost {
        lives_left: state.lives,
    });

    if state.lives == 0 {
        state.phase = GamePhase::GameOver;
        events.push(GameEvent::GameOver { score: state.score });
        log::info!("Game over at level {} with score {}", state.level, state.score);
    } else {
        state.respawn_ball();
        log::debug!("Ball lost, {} lives left", state.lives);
    }
}

fn update_powerups(state: &mut GameState, events: &mut Vec<GameEvent>) {
    let radius = state.config.powerup_radius;
    let height = state.config.height;
    let mut caught = Vec::new();

    state.powerups.retain_mut(|pu| {
        pu.pos.y += pu.vy;
        if powerup_paddle_overlap(pu.pos, radius, &state.paddle) {
            caught.push((pu.kind, pu.pos));
            return false;
        }
        pu.pos.y <= height
    });

    for (kind, pos) in caught {
        kind.apply(state);
        particles::emit(
            &mut state.particles,
            &mut state.rng,
            pos,
            Tint::PowerUp,
            CATCH_BURST,
            state.config.scale,
            state.max_particles,
        );
        events.push(GameEvent::PowerUpCaught(kind));
        log::debug!("Caught {:?}", kind);
    }
}

/// Resolve at most one brick per ball (first overlap in row-major order)
fn resolve_brick_hits(state: &mut GameState, events: &mut Vec<GameEvent>) {
    let scale = state.config.scale;

    for i in 0..state.balls.len() {
        if state.balls[i].is_waiting() {
            continue;
        }
        let hit = state.bricks.alive().find_map(|brick| {
            ball_brick_overlap(&state.balls[i], brick).map(|r| (brick.row, brick.col, r))
        });
        let Some((row, col, result)) = hit else {
            continue;
        };

        let ball = &mut state.balls[i];
        resolve_brick_collision(ball, &result);
        let ball_pos = ball.pos;

        let Some(brick) = state.bricks.get_mut(row, col) else {
            continue;
        };
        let destroyed = brick.hit();
        let (center, color, has_powerup) = (brick.center(), brick.color, brick.has_powerup);
        debug_assert!(
            ball_brick_overlap(&state.balls[i], brick).is_none(),
            "ball still overlaps brick ({row}, {col}) after resolution"
        );

        if destroyed {
            particles::emit(
                &mut state.particles,
                &mut state.rng,
                center,
                Tint::Brick(color),
                DESTROY_BURST,
                scale,
                state.max_particles,
            );
            if has_powerup {
                spawn_powerup(state, center, events);
            }
            let points = state.award_brick();
            state.shake = DESTROY_SHAKE * scale;
            events.push(GameEvent::BrickDestroyed {
                row,
                col,
                points,
                combo: state.combo.count,
            });
        } else {
            particles::emit(
                &mut state.particles,
                &mut state.rng,
                ball_pos,
                Tint::Brick(color),
                HIT_BURST,
                scale,
                state.max_particles,
            );
            state.shake = HIT_SHAKE * scale;
            events.push(GameEvent::BrickHit { row, col });
        }
    }
}

fn spawn_powerup(state: &mut GameState, pos: Vec2, events: &mut Vec<GameEvent>) {
    let kind = PowerUpKind::random(&mut state.rng);
    state.powerups.push(PowerUp {
        pos,
        vy: state.config.powerup_fall_speed,
        kind,
    });
    events.push(GameEvent::PowerUpSpawned(kind));
}

fn finish_level(state: &mut GameState, events: &mut Vec<GameEvent>) {
    events.push(GameEvent::LevelCleared { level: state.level });
    let won = state.tuning.final_level.is_some_and(|last| state.level >= last);
    if won {
        state.phase = GamePhase::Win;
        events.push(GameEvent::Won { score: state.score });
        log::info!("All {} levels cleared! Final score {}", state.level, state.score);
    } else {
        state.phase = GamePhase::LevelClear;
        log::info!("Level {} cleared, score {}", state.level, state.score);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Tuning;
    use crate::sim::state::BallState;

    fn playing(seed: u64) -> GameState {
        let mut state = GameState::new(seed, Tuning::default(), 800.0, 600.0);
        state.phase = GamePhase::Playing;
        state
    }

    #[test]
    fn test_tick_noop_outside_playing() {
        let mut state = GameState::new(1, Tuning::default(), 800.0, 600.0);
        let before = state.paddle.x;
        state.paddle.target_x = 0.0;
        assert!(tick(&mut state, &TickInput::default()).is_empty());
        assert_eq!(state.paddle.x, before);
        assert_eq!(state.time_ticks, 0);
    }

    #[test]
    fn test_waiting_ball_follows_paddle() {
        let mut state = playing(1);
        state.paddle.target_x = 0.0;
        for _ in 0..200 {
            tick(&mut state, &TickInput::default());
        }
        assert!(state.paddle.x < 1.0);
        let ball = &state.balls[0];
        assert_eq!(ball.state, BallState::Waiting);
        assert!((ball.pos.x - state.paddle.center_x()).abs() < 1e-3);
    }

    #[test]
    fn test_keys_move_target_and_clamp() {
        let mut state = playing(1);
        let input = TickInput {
            move_right: true,
            ..Default::default()
        };
        for _ in 0..500 {
            tick(&mut state, &input);
        }
        let max_x = state.config.width - state.paddle.width;
        assert!(state.paddle.target_x <= max_x);
        assert!(state.paddle.x <= max_x);
        assert!(state.paddle.x > max_x - 1.0);
    }

    #[test]
    fn test_ball_moves_and_records_trail() {
        let mut state = playing(1);
        state.launch_waiting();
        let start = state.balls[0].pos;
        for _ in 0..10 {
            tick(&mut state, &TickInput::default());
        }
        assert!(state.balls[0].pos.y < start.y);
        assert_eq!(state.balls[0].trail.len(), 8);
    }

    #[test]
    fn test_slow_effect_scales_displacement() {
        let mut state = playing(1);
        state.launch_waiting();
        state.balls[0].pos = Vec2::new(400.0, 400.0);
        state.balls[0].vel = Vec2::new(0.0, -5.0);
        state.effects.slow_ticks = 10;
        tick(&mut state, &TickInput::default());
        assert!((state.balls[0].pos.y - 397.0).abs() < 1e-4);
        assert_eq!(state.balls[0].vel, Vec2::new(0.0, -5.0));
    }

    #[test]
    fn test_brick_destruction_scores_and_emits() {
        let mut state = playing(1);
        state.launch_waiting();
        let brick = state.bricks.get(4, 3).unwrap().clone();
        state.balls[0].pos = Vec2::new(brick.center().x, brick.max().y + 8.0);
        state.balls[0].vel = Vec2::new(0.0, -3.0);

        let events = tick(&mut state, &TickInput::default());

        assert!(events.iter().any(|e| matches!(
            e,
            GameEvent::BrickDestroyed { row: 4, col: 3, points: 10, combo: 1 }
        )));
        assert_eq!(state.score, 10);
        assert!(!state.bricks.get(4, 3).unwrap().alive);
        assert!(state.balls[0].vel.y > 0.0);
        assert!(state.particles.len() >= DESTROY_BURST);
        assert!(state.shake > 0.0);
    }

    #[test]
    fn test_only_first_brick_per_ball() {
        let mut state = playing(1);
        state.launch_waiting();
        // Straddle the gap between two bricks in the bottom row
        let left = state.bricks.get(4, 3).unwrap().clone();
        let gap_x = left.max().x + state.config.brick_padding / 2.0;
        state.balls[0].pos = Vec2::new(gap_x, left.max().y + 8.0);
        state.balls[0].vel = Vec2::new(0.0, -3.0);

        let events = tick(&mut state, &TickInput::default());
        let destroyed = events
            .iter()
            .filter(|e| matches!(e, GameEvent::BrickDestroyed { .. }))
            .count();
        assert_eq!(destroyed, 1);
    }

    #[test]
    fn test_losing_last_ball_respawns() {
        let mut state = playing(1);
        state.launch_waiting();
        state.combo.count = 3;
        state.combo.timer = 40;
        state.balls[0].pos = Vec2::new(400.0, 605.0);
        state.balls[0].vel = Vec2::new(0.0, 10.0);

        let events = tick(&mut state, &TickInput::default());

        assert!(events.contains(&GameEvent::BallLost { lives_left: 2 }));
        assert_eq!(state.lives, 2);
        assert_eq!(state.combo.count, 0);
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.balls.len(), 1);
        assert!(state.ball_waiting());
    }

    #[test]
    fn test_losing_one_of_many_balls_is_free() {
        let mut state = playing(1);
        state.launch_waiting();
        let mut extra = state.balls[0].clone();
        extra.pos = Vec2::new(400.0, 300.0);
        state.balls.push(extra);
        state.balls[0].pos = Vec2::new(400.0, 605.0);
        state.balls[0].vel = Vec2::new(0.0, 10.0);

        tick(&mut state, &TickInput::default());
        assert_eq!(state.lives, 3);
        assert_eq!(state.balls.len(), 1);
    }

    #[test]
    fn test_last_life_is_game_over() {
        let mut state = playing(1);
        state.launch_waiting();
        state.lives = 1;
        state.balls[0].pos = Vec2::new(400.0, 605.0);
        state.balls[0].vel = Vec2::new(0.0, 10.0);

        let events = tick(&mut state, &TickInput::default());
        assert_eq!(state.phase, GamePhase::GameOver);
        assert_eq!(state.lives, 0);
        assert!(events.contains(&GameEvent::GameOver { score: 0 }));
    }

    #[test]
    fn test_extra_life_in_the_losing_step_is_not_applied() {
        let mut state = playing(1);
        state.launch_waiting();
        state.lives = 1;
        state.balls[0].pos = Vec2::new(30.0, 612.0);
        state.balls[0].vel = Vec2::new(0.0, 5.0);
        state.powerups.push(PowerUp {
            pos: Vec2::new(state.paddle.center_x(), state.paddle.y - 6.0),
            vy: 3.0,
            kind: PowerUpKind::ExtraLife,
        });

        let events = tick(&mut state, &TickInput::default());
        assert_eq!(state.phase, GamePhase::GameOver);
        assert_eq!(state.lives, 0);
        assert!(!events.contains(&GameEvent::PowerUpCaught(PowerUpKind::ExtraLife)));
    }

    #[test]
    fn test_powerup_falls_and_is_caught() {
        let mut state = playing(1);
        let target = Vec2::new(state.paddle.center_x(), state.paddle.y - 40.0);
        state.powerups.push(PowerUp {
            pos: target,
            vy: state.config.powerup_fall_speed,
            kind: PowerUpKind::SlowBall,
        });
        let mut caught = false;
        for _ in 0..20 {
            let events = tick(&mut state, &TickInput::default());
            if events.contains(&GameEvent::PowerUpCaught(PowerUpKind::SlowBall)) {
                caught = true;
                break;
            }
        }
        assert!(caught);
        assert!(state.powerups.is_empty());
        assert_eq!(state.effects.slow_ticks, 300);
    }

    #[test]
    fn test_missed_powerup_discarded() {
        let mut state = playing(1);
        state.powerups.push(PowerUp {
            pos: Vec2::new(10.0, 590.0),
            vy: 3.0,
            kind: PowerUpKind::ExtraLife,
        });
        for _ in 0..5 {
            tick(&mut state, &TickInput::default());
        }
        assert!(state.powerups.is_empty());
        assert_eq!(state.lives, 3);
    }

    #[test]
    fn test_clearing_last_brick_enters_level_clear() {
        let mut state = playing(1);
        state.launch_waiting();
        let targets: Vec<(u32, u32)> = state.bricks.alive().map(|b| (b.row, b.col)).collect();
        for (row, col) in targets.iter().skip(1) {
            state.bricks.get_mut(*row, *col).unwrap().hit();
        }
        let (row, col) = targets[0];
        let brick = state.bricks.get(row, col).unwrap().clone();
        state.balls[0].pos = Vec2::new(brick.center().x, brick.max().y + 8.0);
        state.balls[0].vel = Vec2::new(0.0, -3.0);

        let events = tick(&mut state, &TickInput::default());
        assert_eq!(state.bricks.remaining_count(), 0);
        assert_eq!(state.phase, GamePhase::LevelClear);
        assert!(events.contains(&GameEvent::LevelCleared { level: 1 }));
    }

    #[test]
    fn test_final_level_wins() {
        let tuning = Tuning {
            final_level: Some(1),
            ..Tuning::default()
        };
        let mut state = GameState::new(1, tuning, 800.0, 600.0);
        state.phase = GamePhase::Playing;
        let all: Vec<(u32, u32)> = state.bricks.iter().map(|b| (b.row, b.col)).collect();
        for (row, col) in all {
            state.bricks.get_mut(row, col).unwrap().hit();
        }
        tick(&mut state, &TickInput::default());
        assert_eq!(state.phase, GamePhase::Win);
    }

    #[test]
    fn test_determinism() {
        let mut a = playing(99999);
        let mut b = playing(99999);
        a.launch_waiting();
        b.launch_waiting();
        for i in 0..600 {
            let input = TickInput {
                move_left: i % 90 < 30,
                move_right: i % 90 > 60,
            };
            tick(&mut a, &input);
            tick(&mut b, &input);
        }
        assert_eq!(a.score, b.score);
        assert_eq!(a.balls.len(), b.balls.len());
        assert_eq!(a.bricks.remaining_count(), b.bricks.remaining_count());
        assert_eq!(a.paddle.x, b.paddle.x);
    }
}
