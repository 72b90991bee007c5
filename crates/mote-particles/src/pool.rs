//! LIFO freelist of retired particles

use crate::particle::Particle;

/// Recycles particle allocations between emitters.
///
/// Particles move in and out by value, so one can never be pooled and
/// active at the same time.
pub struct ParticlePool {
    free: Vec<Particle>,
    constructed: usize,
    reuse: bool,
}

impl Default for ParticlePool {
    fn default() -> Self {
        Self::new(true)
    }
}

impl ParticlePool {
    pub fn new(reuse: bool) -> Self {
        Self {
            free: Vec::new(),
            constructed: 0,
            reuse,
        }
    }

    /// Take the most recently released particle, or build one when the pool
    /// is empty.
    pub fn acquire(&mut self) -> Particle {
        if let Some(particle) = self.free.pop() {
            return particle;
        }
        self.constructed += 1;
        Particle::neutral()
    }

    /// Reset and keep a retired particle. Dropped instead when reuse is off.
    pub fn release(&mut self, mut particle: Particle) {
        if !self.reuse {
            self.constructed = self.constructed.saturating_sub(1);
            return;
        }
        particle.reset();
        self.free.push(particle);
    }

    /// Number of particles waiting for reuse
    pub fn available(&self) -> usize {
        self.free.len()
    }

    /// Particles alive in memory (pooled + active)
    pub fn constructed(&self) -> usize {
        self.constructed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mote_core::{ParticleId, Vec2};

    #[test]
    fn constructs_only_when_empty() {
        let mut pool = ParticlePool::new(true);
        let a = pool.acquire();
        let b = pool.acquire();
        assert_eq!(pool.constructed(), 2);

        pool.release(a);
        pool.release(b);
        assert_eq!(pool.available(), 2);

        let _c = pool.acquire();
        assert_eq!(pool.constructed(), 2);
        assert_eq!(pool.available(), 1);
    }

    #[test]
    fn lifo_order_and_reset() {
        let mut pool = ParticlePool::new(true);
        let mut first = pool.acquire();
        first.position = Vec2::new(1.0, 1.0);
        first.id = ParticleId::new();
        first.emitter = Some(0);
        let mut second = pool.acquire();
        second.size = 9.0;

        pool.release(first);
        pool.release(second);

        let top = pool.acquire();
        // `second` went in last; reset wipes its size
        assert_eq!(top.size, 0.0);
        let next = pool.acquire();
        assert_eq!(next.position, Vec2::ZERO);
        assert!(next.emitter.is_none());
        assert_eq!(next.id, ParticleId::NONE);
    }

    #[test]
    fn pooled_plus_active_equals_constructed() {
        let mut pool = ParticlePool::new(true);
        let mut active: Vec<Particle> = (0..10).map(|_| pool.acquire()).collect();
        for _ in 0..4 {
            if let Some(p) = active.pop() {
                pool.release(p);
            }
        }
        assert_eq!(pool.available() + active.len(), pool.constructed());
        active.push(pool.acquire());
        assert_eq!(pool.available() + active.len(), pool.constructed());
    }

    #[test]
    fn reuse_disabled_drops_particles() {
        let mut pool = ParticlePool::new(false);
        let p = pool.acquire();
        pool.release(p);
        assert_eq!(pool.available(), 0);
        assert_eq!(pool.constructed(), 0);
    }
}
