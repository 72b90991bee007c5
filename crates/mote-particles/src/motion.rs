//! Per-tick displacement: direct vectors, noise paths and predefined paths

use crate::boundary::{self, BoundaryBehavior, BoundaryConfig, BoundaryOutcome};
use crate::config::{non_negative, ValueRange};
use crate::noise::{NoiseGenerator, NoiseSource};
use crate::particle::Particle;
use crate::rand::ParticleRng;
use mote_core::{Canvas, Result, Vec2};
use serde::{Deserialize, Serialize};
use std::f32::consts::{FRAC_PI_2, FRAC_PI_4, PI, TAU};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveDirection {
    Up,
    Down,
    Left,
    Right,
    UpLeft,
    UpRight,
    DownLeft,
    DownRight,
    None,
    #[default]
    Random,
}

impl MoveDirection {
    /// Heading in radians (screen space, +y down); random picks a fresh angle
    pub fn angle(self, rng: &mut ParticleRng) -> Option<f32> {
        match self {
            MoveDirection::Up => Some(-FRAC_PI_2),
            MoveDirection::Down => Some(FRAC_PI_2),
            MoveDirection::Left => Some(PI),
            MoveDirection::Right => Some(0.0),
            MoveDirection::UpLeft => Some(-3.0 * FRAC_PI_4),
            MoveDirection::UpRight => Some(-FRAC_PI_4),
            MoveDirection::DownLeft => Some(3.0 * FRAC_PI_4),
            MoveDirection::DownRight => Some(FRAC_PI_4),
            MoveDirection::None => None,
            MoveDirection::Random => Some(rng.angle()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GravityConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub acceleration: f32,
    /// Pull upwards instead of down
    #[serde(default)]
    pub inverse: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PredefinedShape {
    Circle,
    Triangle,
    Square,
    Polygon,
    Sine,
    #[serde(other)]
    Other,
}

/// Path-following movement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PathConfig {
    Noise {
        #[serde(default)]
        generator: NoiseGenerator,
        scale: f32,
        speed: f32,
    },
    Predefined {
        shape: PredefinedShape,
        #[serde(default)]
        radius: f32,
        /// Radians per frame
        #[serde(default)]
        increment: f32,
        /// Orbit centre in px; the canvas centre when absent
        #[serde(default)]
        center: Option<Vec2>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovementConfig {
    #[serde(default)]
    pub direction: MoveDirection,
    /// Pixels per tick
    pub speed: ValueRange,
    #[serde(default)]
    pub gravity: GravityConfig,
    /// Target multiplier the velocity eases towards
    #[serde(default)]
    pub velocity_factor: Option<f32>,
    #[serde(default)]
    pub default_boundary_behavior: Option<BoundaryBehavior>,
    #[serde(default)]
    pub boundary: Option<BoundaryConfig>,
    #[serde(default)]
    pub path: Option<PathConfig>,
}

impl MovementConfig {
    pub(crate) fn validate(&self, path: &str) -> Result<()> {
        self.speed.validate(&format!("{path}.speed"))?;
        non_negative(&format!("{path}.speed.min"), self.speed.min)?;
        if let Some(PathConfig::Predefined { radius, .. }) = &self.path {
            non_negative(&format!("{path}.path.radius"), *radius)?;
        }
        Ok(())
    }

    /// Spawn velocity: a heading from `direction` and one speed sample
    pub fn initial_velocity(&self, rng: &mut ParticleRng) -> Vec2 {
        match self.direction.angle(rng) {
            Some(angle) => {
                let speed = self.speed.sample(rng);
                Vec2::from_angle(angle) * speed
            }
            None => Vec2::ZERO,
        }
    }
}

/// Frame-wide inputs to the motion step
pub struct MotionContext<'a> {
    pub canvas: Canvas,
    pub frame_count: u64,
    pub noise: &'a NoiseSource,
}

/// Move `particle` one tick according to `movement`. Returns the boundary
/// outcome for direct motion (already applied to the velocity); path modes
/// never consult the boundary.
pub fn step(particle: &mut Particle, movement: &MovementConfig, ctx: &MotionContext) -> BoundaryOutcome {
    match &movement.path {
        Some(PathConfig::Noise {
            generator,
            scale,
            speed,
        }) => {
            let p = particle.position;
            let nx = ctx.noise.sample(*generator, p.x * scale, p.y * scale);
            let ny = ctx.noise.sample(*generator, p.y * scale, p.x * scale);
            particle.position.x += (nx * TAU).cos() * speed;
            particle.position.y += (ny * TAU).sin() * speed;
            BoundaryOutcome::NONE
        }
        Some(PathConfig::Predefined {
            shape: PredefinedShape::Circle,
            radius,
            increment,
            center,
        }) => {
            let center = center.unwrap_or_else(|| ctx.canvas.center());
            let angle = increment * ctx.frame_count as f32;
            particle.position = center + Vec2::from_angle(angle) * *radius;
            BoundaryOutcome::NONE
        }
        // Other predefined shapes have no trajectory yet
        Some(PathConfig::Predefined { .. }) | None => direct(particle, movement, ctx.canvas),
    }
}

fn direct(particle: &mut Particle, movement: &MovementConfig, canvas: Canvas) -> BoundaryOutcome {
    particle.position += particle.velocity;
    let outcome = boundary::resolve(
        particle.position,
        particle.velocity,
        canvas,
        movement.boundary.as_ref(),
        movement.default_boundary_behavior,
    );
    outcome.apply(&mut particle.velocity);
    outcome
}
