//! Destructible brick field
//!
//! Bricks are stored row-major; iteration order is stable for the lifetime of
//! a level so collision resolution is deterministic.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::{FieldConfig, Tuning};
use crate::consts::BRICK_COLOR_COUNT;

/// A brick entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Brick {
    pub row: u32,
    pub col: u32,
    /// Top-left corner
    pub pos: Vec2,
    pub size: Vec2,
    pub hp: u8,
    pub max_hp: u8,
    /// Colour category, `row % BRICK_COLOR_COUNT`
    pub color: u8,
    pub has_powerup: bool,
    pub alive: bool,
}

impl Brick {
    pub fn center(&self) -> Vec2 {
        self.pos + self.size * 0.5
    }

    pub fn max(&self) -> Vec2 {
        self.pos + self.size
    }

    /// Remove one hit point; returns true if that destroyed the brick
    pub fn hit(&mut self) -> bool {
        if !self.alive {
            return false;
        }
        self.hp = self.hp.saturating_sub(1);
        if self.hp == 0 {
            self.alive = false;
        }
        !self.alive
    }

    /// Health as a fraction of max (for crack rendering)
    pub fn health(&self) -> f32 {
        if self.max_hp == 0 {
            0.0
        } else {
            self.hp as f32 / self.max_hp as f32
        }
    }
}

/// The brick field for one level
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BrickGrid {
    rows: u32,
    cols: u32,
    bricks: Vec<Brick>,
}

impl BrickGrid {
    /// Lay out a full grid for `level`.
    ///
    /// The first `tough_rows` rows get `min(level, max_brick_hp)` hit points,
    /// all others one. Each brick independently rolls the power-up flag.
    pub fn generate<R: Rng>(level: u32, config: &FieldConfig, tuning: &Tuning, rng: &mut R) -> Self {
        let tough_hp = level.clamp(1, tuning.max_brick_hp as u32) as u8;
        let mut bricks = Vec::with_capacity((config.rows * config.cols) as usize);

        for row in 0..config.rows {
            for col in 0..config.cols {
                let (x, y) = config.brick_origin(row, col);
                let hp = if row < tuning.tough_rows { tough_hp } else { 1 };
                bricks.push(Brick {
                    row,
                    col,
                    pos: Vec2::new(x, y),
                    size: Vec2::new(config.brick_width, config.brick_height),
                    hp,
                    max_hp: hp,
                    color: (row % BRICK_COLOR_COUNT as u32) as u8,
                    has_powerup: rng.random_bool(tuning.powerup_chance),
                    alive: true,
                });
            }
        }

        log::debug!(
            "Generated {} bricks for level {} ({} power-up bearing)",
            bricks.len(),
            level,
            bricks.iter().filter(|b| b.has_powerup).count()
        );

        Self {
            rows: config.rows,
            cols: config.cols,
            bricks,
        }
    }

    /// Move every brick onto the cell layout of `config`, keeping state.
    ///
    /// Returns false (and changes nothing) if the grid shape differs.
    pub fn relayout(&mut self, config: &FieldConfig) -> bool {
        if config.rows != self.rows || config.cols != self.cols {
            return false;
        }
        for brick in &mut self.bricks {
            let (x, y) = config.brick_origin(brick.row, brick.col);
            brick.pos = Vec2::new(x, y);
            brick.size = Vec2::new(config.brick_width, config.brick_height);
        }
        true
    }

    /// Number of bricks still standing
    pub fn remaining_count(&self) -> usize {
        self.bricks.iter().filter(|b| b.alive).count()
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    pub fn cols(&self) -> u32 {
        self.cols
    }

    pub fn get(&self, row: u32, col: u32) -> Option<&Brick> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        self.bricks.get((row * self.cols + col) as usize)
    }

    pub fn get_mut(&mut self, row: u32, col: u32) -> Option<&mut Brick> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        self.bricks.get_mut((row * self.cols + col) as usize)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Brick> {
        self.bricks.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Brick> {
        self.bricks.iter_mut()
    }

    pub fn alive(&self) -> impl Iterator<Item = &Brick> {
        self.bricks.iter().filter(|b| b.alive)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn level_grid(level: u32) -> (BrickGrid, FieldConfig) {
        let tuning = Tuning::default();
        let config = FieldConfig::resolve(800.0, 600.0, level, &tuning);
        let mut rng = Pcg32::seed_from_u64(42);
        (BrickGrid::generate(level, &config, &tuning, &mut rng), config)
    }

    #[test]
    fn test_level_one_all_single_hit() {
        let (grid, config) = level_grid(1);
        assert_eq!(grid.rows(), 5);
        assert_eq!(grid.cols(), config.cols);
        assert_eq!(grid.remaining_count(), (5 * config.cols) as usize);
        assert!(grid.iter().all(|b| b.hp == 1 && b.max_hp == 1));
    }

    #[test]
    fn test_tough_rows_scale_with_level() {
        let (grid, _) = level_grid(2);
        for brick in grid.iter() {
            let expected = if brick.row < 2 { 2 } else { 1 };
            assert_eq!(brick.hp, expected);
        }
        let (grid, _) = level_grid(9);
        assert!(grid.iter().filter(|b| b.row < 2).all(|b| b.hp == 3));
    }

    #[test]
    fn test_layout_positions() {
        let (grid, config) = level_grid(1);
        let first = grid.get(0, 0).unwrap();
        assert_eq!(first.pos, Vec2::new(20.0, 80.0));
        let next = grid.get(0, 1).unwrap();
        assert!((next.pos.x - (20.0 + config.brick_width + 8.0)).abs() < 1e-4);
        let below = grid.get(1, 0).unwrap();
        assert!((below.pos.y - (80.0 + 24.0 + 8.0)).abs() < 1e-4);
        // Last column stays inside the field
        let last = grid.get(0, config.cols - 1).unwrap();
        assert!(last.max().x <= config.width);
    }

    #[test]
    fn test_hit_deactivates_at_zero() {
        let (mut grid, _) = level_grid(3);
        let brick = grid.get_mut(0, 0).unwrap();
        assert_eq!(brick.hp, 3);
        assert!(!brick.hit());
        assert!(!brick.hit());
        assert!(brick.alive);
        assert!(brick.hit());
        assert!(!brick.alive);
        assert_eq!(brick.hp, 0);
        assert!(!brick.hit());
        assert_eq!(brick.hp, 0);
    }

    #[test]
    fn test_remaining_count_tracks_destruction() {
        let (mut grid, _) = level_grid(1);
        let total = grid.remaining_count();
        grid.get_mut(2, 3).unwrap().hit();
        assert_eq!(grid.remaining_count(), total - 1);
    }

    #[test]
    fn test_relayout_preserves_state() {
        let (mut grid, _) = level_grid(2);
        grid.get_mut(0, 0).unwrap().hit();
        let small = FieldConfig::resolve(400.0, 300.0, 2, &Tuning::default());
        assert!(grid.relayout(&small));
        let brick = grid.get(0, 0).unwrap();
        assert_eq!(brick.hp, 1);
        assert_eq!(brick.pos, Vec2::new(10.0, 40.0));

        let other_level = FieldConfig::resolve(400.0, 300.0, 3, &Tuning::default());
        assert!(!grid.relayout(&other_level));
    }

    #[test]
    fn test_colors_cycle_by_row() {
        let (grid, _) = level_grid(4);
        for brick in grid.iter() {
            assert_eq!(brick.color as u32, brick.row % 8);
        }
    }
}
