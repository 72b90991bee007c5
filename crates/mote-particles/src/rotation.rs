//! Oscillating rotation animation

use crate::config::{non_negative, ValueRange};
use crate::rand::ParticleRng;
use mote_core::Result;
use serde::{Deserialize, Serialize};

/// Seconds between direction re-rolls in random mode
pub const REROLL_INTERVAL: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RotationDirection {
    #[default]
    Clockwise,
    Counterclockwise,
    Random,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RotationAnimation {
    #[serde(default)]
    pub direction: RotationDirection,
    /// Degrees per tick
    pub speed: ValueRange,
}

/// Rotation bounds in degrees, with an optional per-tick animation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RotationConfig {
    #[serde(default)]
    pub min_angle: f32,
    #[serde(default = "default_max_angle")]
    pub max_angle: f32,
    #[serde(default)]
    pub animation: Option<RotationAnimation>,
}

fn default_max_angle() -> f32 {
    360.0
}

impl RotationConfig {
    pub(crate) fn validate(&self, path: &str) -> Result<()> {
        ValueRange::new(self.min_angle, self.max_angle).validate(&format!("{path}.angle"))?;
        if let Some(animation) = &self.animation {
            animation.speed.validate(&format!("{path}.animation.speed"))?;
            non_negative(&format!("{path}.animation.speed.min"), animation.speed.min)?;
        }
        Ok(())
    }
}

/// Per-particle rotation state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotationState {
    /// Degrees in [0, 360)
    pub angle: f32,
    pub clockwise: bool,
    /// Re-roll the direction periodically
    pub random: bool,
    /// Wall-clock time of the last re-roll
    pub last_reroll: f64,
}

impl Default for RotationState {
    fn default() -> Self {
        Self {
            angle: 0.0,
            clockwise: true,
            random: false,
            last_reroll: 0.0,
        }
    }
}

impl RotationState {
    /// Initial state for a freshly spawned particle
    pub fn spawn(config: &RotationConfig, rng: &mut ParticleRng, now: f64) -> Self {
        let angle = rng.range(config.min_angle, config.max_angle);
        let direction = config.animation.map(|a| a.direction).unwrap_or_default();
        let (clockwise, random) = match direction {
            RotationDirection::Clockwise => (true, false),
            RotationDirection::Counterclockwise => (false, false),
            RotationDirection::Random => (rng.coin(), true),
        };
        Self {
            angle: angle.rem_euclid(360.0),
            clockwise,
            random,
            last_reroll: now,
        }
    }

    /// Advance one tick. `now` is wall-clock seconds.
    pub fn step(&mut self, config: &RotationConfig, rng: &mut ParticleRng, now: f64) {
        let Some(animation) = &config.animation else {
            return;
        };
        let speed = animation.speed.sample(rng);

        if self.random && now - self.last_reroll > REROLL_INTERVAL {
            self.clockwise = rng.coin();
            self.last_reroll = now;
        }

        if self.clockwise {
            self.angle += speed;
            if self.angle > config.max_angle {
                self.angle = config.max_angle;
                self.clockwise = false;
            }
        } else {
            self.angle -= speed;
            if self.angle < config.min_angle {
                self.angle = config.min_angle;
                self.clockwise = true;
            }
        }

        self.angle = self.angle.rem_euclid(360.0);
    }
}
