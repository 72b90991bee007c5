//! Mote Particles - 2D particle simulation
//!
//! Provides pooled per-emitter particle simulation with:
//! - Scheduled emission with caps, expiry windows and replay
//! - Direct, noise-field and predefined-path motion with boundary rules
//! - Lifetime aging and fade-out
//! - Proximity links, pointer links, repulsion and bubble pops
//! - Responsive TOML configuration with colour themes

pub mod boundary;
pub mod config;
pub mod curves;
pub mod decay;
pub mod draw;
pub mod emitter;
pub mod interaction;
pub mod motion;
pub mod noise;
pub mod particle;
pub mod pool;
pub mod proximity;
pub mod rand;
pub mod rotation;
pub mod scheduler;
pub mod simulation;

use mote_core::{Canvas, Result};
use mote_runtime::{DrawSurface, RuntimeSystem};
use std::path::Path;

pub use config::{ParticleKind, ParticleTemplate, SystemConfig};
pub use emitter::{EmitterConfig, EmitterState, EmitterStatus};
pub use particle::{EmitterKey, Particle};
pub use pool::ParticlePool;
pub use scheduler::EmitterScheduler;
pub use simulation::{FrameStats, Simulation};

/// Load and validate a configuration file for a viewport `viewport_width` px wide
pub fn load_config<P: AsRef<Path>>(path: P, viewport_width: f32) -> Result<SystemConfig> {
    SystemConfig::load(path, viewport_width)
}

/// The particle system, ticked by a host frame loop through `RuntimeSystem`
pub struct ParticleSystem {
    simulation: Simulation,
    last_stats: Option<FrameStats>,
}

impl ParticleSystem {
    pub fn new(config: SystemConfig, canvas: Canvas) -> Self {
        Self {
            simulation: Simulation::new(config, canvas),
            last_stats: None,
        }
    }

    pub fn simulation(&self) -> &Simulation {
        &self.simulation
    }

    pub fn simulation_mut(&mut self) -> &mut Simulation {
        &mut self.simulation
    }

    /// Stats from the most recent executed frame
    pub fn last_stats(&self) -> Option<FrameStats> {
        self.last_stats
    }
}

impl RuntimeSystem for ParticleSystem {
    fn initialize(&mut self, now: f64) -> Result<()> {
        self.simulation.start(now);
        Ok(())
    }

    fn update(&mut self, surface: &mut dyn DrawSurface, now: f64) -> Result<bool> {
        let stats = self.simulation.tick(now, surface);
        if stats.is_some() {
            self.last_stats = stats;
        }
        Ok(stats.is_some())
    }

    fn shutdown(&mut self) -> Result<()> {
        self.simulation.teardown();
        Ok(())
    }

    fn name(&self) -> &str {
        "particles"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mote_runtime::RecordingSurface;

    #[test]
    fn runs_as_runtime_system() {
        let config = SystemConfig::from_toml_str(
            r##"
seed = 1
[particles]
total_quantity = 10
color = "#ffffff"
size = { min = 1.0, max = 2.0 }
movement = { speed = { min = 0.5, max = 1.0 } }
"##,
            800.0,
        )
        .unwrap();
        let mut system = ParticleSystem::new(config, Canvas::new(800.0, 600.0));
        let mut surface = RecordingSurface::new();
        assert_eq!(system.name(), "particles");

        system.initialize(0.0).unwrap();
        assert!(system.update(&mut surface, 0.0).unwrap());
        assert_eq!(system.last_stats().map(|s| s.active), Some(10));

        system.shutdown().unwrap();
        assert!(!system.update(&mut surface, 0.1).unwrap());
        assert_eq!(system.simulation().scheduler().active_count(), 0);
    }
}
