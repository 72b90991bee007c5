//! Seeded 2D noise used by noise-path motion

use ::noise::{NoiseFn, OpenSimplex, Perlin};
use serde::{Deserialize, Serialize};

/// Which gradient noise a path samples
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoiseGenerator {
    #[default]
    Perlin,
    Simplex,
}

/// Both generators built once from the same seed, so a path can switch
/// generator without reseeding.
pub struct NoiseSource {
    perlin: Perlin,
    simplex: OpenSimplex,
}

impl NoiseSource {
    pub fn new(seed: u32) -> Self {
        Self {
            perlin: Perlin::new(seed),
            simplex: OpenSimplex::new(seed),
        }
    }

    /// Scalar noise at `(x, y)`, roughly in [-1, 1]
    pub fn sample(&self, generator: NoiseGenerator, x: f32, y: f32) -> f32 {
        let point = [x as f64, y as f64];
        let value = match generator {
            NoiseGenerator::Perlin => self.perlin.get(point),
            NoiseGenerator::Simplex => self.simplex.get(point),
        };
        value as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_field() {
        let a = NoiseSource::new(42);
        let b = NoiseSource::new(42);
        for i in 0..10 {
            let x = i as f32 * 0.37;
            let y = i as f32 * 0.11;
            assert_eq!(
                a.sample(NoiseGenerator::Perlin, x, y),
                b.sample(NoiseGenerator::Perlin, x, y)
            );
            assert_eq!(
                a.sample(NoiseGenerator::Simplex, x, y),
                b.sample(NoiseGenerator::Simplex, x, y)
            );
        }
    }

    #[test]
    fn values_are_bounded() {
        let source = NoiseSource::new(9);
        for i in 0..100 {
            let x = i as f32 * 0.173;
            let y = i as f32 * 0.291;
            for generator in [NoiseGenerator::Perlin, NoiseGenerator::Simplex] {
                let v = source.sample(generator, x, y);
                assert!(v.is_finite());
                assert!((-1.5..=1.5).contains(&v));
            }
        }
    }
}
