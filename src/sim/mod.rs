//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (row-major bricks, insertion-order balls)
//! - No rendering or platform dependencies

pub mod bricks;
pub mod collision;
pub mod particles;
pub mod powerup;
pub mod scoring;
pub mod state;
pub mod tick;

pub use bricks::{Brick, BrickGrid};
pub use collision::{CollisionResult, ball_brick_overlap, resolve_brick_collision};
pub use particles::{Particle, Tint};
pub use powerup::{ActiveEffects, PowerUp, PowerUpKind};
pub use scoring::ComboTracker;
pub use state::{Ball, BallState, GameEvent, GamePhase, GameState, Paddle};
pub use tick::{TickInput, tick};
