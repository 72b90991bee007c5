//! Particle state and its life cycle

use crate::rotation::RotationState;
use mote_core::{Color, ParticleId, Vec2};

/// Index of an emitter inside the scheduler
pub type EmitterKey = usize;

/// Life template copied from the emitter at spawn (seconds)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LifeSpan {
    pub duration: f32,
    /// Length of the fade-out window at the end of the life
    pub fade: f32,
}

impl LifeSpan {
    /// Age at which fading starts
    pub fn fade_start(&self) -> f32 {
        (self.duration - self.fade).max(0.0)
    }

    /// Fade progress in [0, 1] for `age`, or None before the window opens
    pub fn fade_progress(&self, age: f32) -> Option<f32> {
        let start = self.fade_start();
        if age <= start {
            return None;
        }
        let window = self.duration - start;
        if window <= 0.0 {
            return Some(1.0);
        }
        Some(((age - start) / window).clamp(0.0, 1.0))
    }
}

/// One simulated particle.
///
/// Active particles live in exactly one emitter group; retired ones sit in
/// the pool with no emitter and neutral state. Opacity and age have guarded
/// setters; everything else is plain data.
#[derive(Debug, Clone)]
pub struct Particle {
    pub id: ParticleId,
    pub emitter: Option<EmitterKey>,
    pub position: Vec2,
    pub velocity: Vec2,
    /// Radius in px
    pub size: f32,
    pub original_size: f32,
    pub line_width: f32,
    /// Canonical colour, chosen once at spawn
    pub color: Color,
    opacity: f32,
    base_opacity: f32,
    age: f32,
    pub rotation: RotationState,
    pub life: Option<LifeSpan>,
    /// Pass-through destroy already scheduled
    pub exiting: bool,
}

impl Particle {
    /// A particle with no identity or owner, as held by the pool
    pub fn neutral() -> Self {
        Self {
            id: ParticleId::NONE,
            emitter: None,
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            size: 0.0,
            original_size: 0.0,
            line_width: 1.0,
            color: Color::WHITE,
            opacity: 1.0,
            base_opacity: 1.0,
            age: 0.0,
            rotation: RotationState::default(),
            life: None,
            exiting: false,
        }
    }

    /// Return to neutral state, keeping the allocation
    pub fn reset(&mut self) {
        *self = Self::neutral();
    }

    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    /// Set opacity, clamped to [0, 1]
    pub fn set_opacity(&mut self, opacity: f32) {
        self.opacity = if opacity.is_nan() {
            0.0
        } else {
            opacity.clamp(0.0, 1.0)
        };
    }

    /// Opacity the particle spawned with
    pub fn base_opacity(&self) -> f32 {
        self.base_opacity
    }

    /// Set both the spawn opacity and the current opacity
    pub fn set_base_opacity(&mut self, opacity: f32) {
        self.set_opacity(opacity);
        self.base_opacity = self.opacity;
    }

    pub fn age(&self) -> f32 {
        self.age
    }

    /// Age by `dt` seconds. Negative or non-finite steps are ignored.
    pub fn advance_age(&mut self, dt: f32) {
        if dt.is_finite() && dt > 0.0 {
            self.age += dt;
        }
    }

    /// Whether the particle has outlived its life duration
    pub fn should_retire(&self) -> bool {
        self.life.is_some_and(|life| self.age >= life.duration)
    }

    /// Remaining seconds until `should_retire`, if mortal
    pub fn remaining_life(&self) -> Option<f32> {
        self.life.map(|life| (life.duration - self.age).max(0.0))
    }
}

impl Default for Particle {
    fn default() -> Self {
        Self::neutral()
    }
}
