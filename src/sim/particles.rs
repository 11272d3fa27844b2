//! Cosmetic particle bursts
//!
//! Particles never affect gameplay; they only need to look right.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Colour source for a particle, resolved to a real colour by the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tint {
    /// Brick colour category
    Brick(u8),
    Paddle,
    PowerUp,
}

/// A particle for visual effects
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    /// 1 when spawned, removed at 0
    pub life: f32,
    pub color: Tint,
    pub size: f32,
}

/// Life lost per step (~50 steps lifetime)
pub const LIFE_DECAY: f32 = 0.02;
/// Downward acceleration per step, before scaling
pub const GRAVITY: f32 = 0.1;

/// Radial burst of `count` particles at evenly spaced angles with jitter.
///
/// Oldest particles are dropped to stay within `cap`.
pub fn emit<R: Rng>(
    particles: &mut Vec<Particle>,
    rng: &mut R,
    origin: Vec2,
    color: Tint,
    count: usize,
    scale: f32,
    cap: usize,
) {
    if cap == 0 {
        return;
    }
    for i in 0..count {
        let angle = std::f32::consts::TAU * i as f32 / count as f32 + rng.random::<f32>() * 0.5;
        let speed = 2.0 + rng.random::<f32>() * 4.0;
        particles.push(Particle {
            pos: origin,
            vel: Vec2::new(angle.cos(), angle.sin()) * speed * scale,
            life: 1.0,
            color,
            size: (3.0 + rng.random::<f32>() * 4.0) * scale,
        });
    }
    if particles.len() > cap {
        let excess = particles.len() - cap;
        particles.drain(..excess);
    }
}

/// Advance every particle one step and drop the dead ones
pub fn update(particles: &mut Vec<Particle>, scale: f32) {
    for p in particles.iter_mut() {
        p.pos += p.vel;
        p.vel.y += GRAVITY * scale;
        p.life -= LIFE_DECAY;
    }
    particles.retain(|p| p.life > 0.0);
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_emit_radiates_from_origin() {
        let mut rng = Pcg32::seed_from_u64(5);
        let mut particles = Vec::new();
        emit(&mut particles, &mut rng, Vec2::new(10.0, 10.0), Tint::Paddle, 12, 1.0, 256);
        assert_eq!(particles.len(), 12);
        for p in &particles {
            assert_eq!(p.pos, Vec2::new(10.0, 10.0));
            assert_eq!(p.life, 1.0);
            let speed = p.vel.length();
            assert!((1.99..=6.01).contains(&speed));
        }
    }

    #[test]
    fn test_particles_decay_and_die() {
        let mut rng = Pcg32::seed_from_u64(5);
        let mut particles = Vec::new();
        emit(&mut particles, &mut rng, Vec2::ZERO, Tint::Brick(2), 5, 1.0, 256);
        let vy_before = particles[0].vel.y;
        update(&mut particles, 1.0);
        assert!((particles[0].life - 0.98).abs() < 1e-6);
        assert!(particles[0].vel.y > vy_before);
        for _ in 0..60 {
            update(&mut particles, 1.0);
        }
        assert!(particles.is_empty());
    }

    #[test]
    fn test_cap_drops_oldest() {
        let mut rng = Pcg32::seed_from_u64(5);
        let mut particles = Vec::new();
        emit(&mut particles, &mut rng, Vec2::ZERO, Tint::Paddle, 8, 1.0, 10);
        emit(&mut particles, &mut rng, Vec2::ONE, Tint::PowerUp, 8, 1.0, 10);
        assert_eq!(particles.len(), 10);
        assert_eq!(particles.last().map(|p| p.color), Some(Tint::PowerUp));
        assert_eq!(particles.iter().filter(|p| p.color == Tint::Paddle).count(), 2);

        emit(&mut particles, &mut rng, Vec2::ONE, Tint::PowerUp, 8, 1.0, 0);
        assert_eq!(particles.len(), 10);
    }
}
