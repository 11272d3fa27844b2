//! Combo multiplier

use serde::{Deserialize, Serialize};

/// Consecutive-destruction counter with a decaying window.
///
/// Each destruction bumps the count and re-arms the timer; the timer runs
/// down once per PLAYING step and the count silently drops to zero when it
/// expires.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComboTracker {
    pub count: u32,
    /// Steps left before the combo expires
    pub timer: u32,
}

impl ComboTracker {
    /// Register a destroyed brick and return the points it is worth
    /// (`base × combo × level`)
    pub fn register_destruction(&mut self, window: u32, base_points: u64, level: u32) -> u64 {
        self.count += 1;
        self.timer = window;
        base_points * self.count as u64 * level as u64
    }

    /// Advance one step; returns true if the combo just expired
    pub fn tick(&mut self) -> bool {
        if self.timer == 0 {
            return false;
        }
        self.timer -= 1;
        if self.timer == 0 {
            self.count = 0;
            return true;
        }
        false
    }

    pub fn reset(&mut self) {
        self.count = 0;
        self.timer = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_three_consecutive_destructions() {
        let mut combo = ComboTracker::default();
        let total: u64 = (0..3).map(|_| combo.register_destruction(60, 10, 1)).sum();
        assert_eq!(total, 60);
        assert_eq!(combo.count, 3);
    }

    #[test]
    fn test_level_multiplies_points() {
        let mut combo = ComboTracker::default();
        assert_eq!(combo.register_destruction(60, 10, 4), 40);
        assert_eq!(combo.register_destruction(60, 10, 4), 80);
    }

    #[test]
    fn test_expires_after_exactly_window_steps() {
        let mut combo = ComboTracker::default();
        combo.register_destruction(60, 10, 1);
        for _ in 0..59 {
            assert!(!combo.tick());
            assert_eq!(combo.count, 1);
        }
        assert!(combo.tick());
        assert_eq!(combo.count, 0);
        assert!(!combo.tick());
    }

    #[test]
    fn test_destruction_rearms_window() {
        let mut combo = ComboTracker::default();
        combo.register_destruction(60, 10, 1);
        for _ in 0..30 {
            combo.tick();
        }
        combo.register_destruction(60, 10, 1);
        assert_eq!(combo.timer, 60);
        assert_eq!(combo.count, 2);
    }
}
