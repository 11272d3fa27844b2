//! Retro Breaker - an embeddable brick-breaker arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (physics, collisions, scoring, power-ups)
//! - `config`: Data-driven tuning and the per-level field configuration
//! - `session`: Game state machine, command queue and high-score tracking
//! - `driver`: Fixed-step frame clock and host lifecycle
//! - `renderer`: Backend-agnostic drawing of frame snapshots
//! - `persistence`: High-score storage port
//! - `input`: Host input events and the commands they map to
//! - `snapshot`: Read-only view of a frame for renderers and hosts
//! - `settings`: Visual quality presets and effect toggles

pub mod config;
pub mod driver;
pub mod error;
pub mod input;
pub mod persistence;
pub mod renderer;
pub mod session;
pub mod settings;
pub mod sim;
pub mod snapshot;

pub use config::{FieldConfig, Tuning, field_size_for_container};
pub use driver::{Arcade, FrameClock, Platform};
pub use error::GameError;
pub use input::{Command, InputEvent};
pub use persistence::{HighScoreStore, MemoryStore, default_store};
pub use session::Session;
pub use settings::{QualityPreset, Settings};
pub use snapshot::Snapshot;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (one step per 60 Hz display refresh)
    pub const SIM_DT: f64 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 4;

    /// Field width all size/speed constants are authored against
    pub const REFERENCE_WIDTH: f32 = 800.0;
    /// Play-field height as a fraction of its width (4:3)
    pub const FIELD_HEIGHT_RATIO: f32 = 0.75;

    /// Degenerate dimensions are clamped to these before deriving constants
    pub const MIN_FIELD_WIDTH: f32 = 160.0;
    pub const MIN_FIELD_HEIGHT: f32 = 120.0;

    /// Hard cap on simultaneously active balls
    pub const MAX_BALLS: usize = 5;
    /// Hard cap on lives
    pub const MAX_LIVES: u8 = 5;
    /// Number of brick colour categories (assigned by row)
    pub const BRICK_COLOR_COUNT: u8 = 8;
}
