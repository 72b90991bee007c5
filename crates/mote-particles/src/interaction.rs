//! Click responses: repulsion and bubble popping

use crate::curves::{ease_out_cubic, lerp_f32};
use crate::particle::Particle;
use crate::proximity::Link;
use mote_core::{Color, ParticleId, Vec2};
use std::f32::consts::TAU;

/// Repulsion reaches this much further than the configured distance
pub const REPULSE_REACH: f32 = 1.5;

pub const POP_SPOKES: usize = 6;
/// Seconds a pop burst stays on screen
pub const POP_DURATION: f64 = 0.5;
/// Spoke length at the start of a burst, in px
pub const POP_OFFSET: f32 = 10.0;
pub const POP_LINE_WIDTH: f32 = 2.0;

/// Velocity of magnitude `speed` pointing from `origin` to `position`
pub fn repulse_velocity(position: Vec2, origin: Vec2, speed: f32) -> Vec2 {
    let d = position - origin;
    Vec2::from_angle(d.y.atan2(d.x)) * speed
}

/// Indices of particles within repulsion reach of `click`
pub fn repulse_targets(particles: &[Particle], click: Vec2, distance: f32) -> Vec<usize> {
    let reach = distance * REPULSE_REACH;
    particles
        .iter()
        .enumerate()
        .filter(|(_, p)| p.position.distance(click) < reach)
        .map(|(i, _)| i)
        .collect()
}

/// Particles whose radius contains `click`
pub fn pop_targets(particles: &[Particle], click: Vec2) -> Vec<ParticleId> {
    particles
        .iter()
        .filter(|p| p.position.distance(click) < p.size)
        .map(|p| p.id)
        .collect()
}

/// Six spokes flying out of a popped bubble
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PopBurst {
    pub center: Vec2,
    pub radius: f32,
    pub color: Color,
    pub started: f64,
}

impl PopBurst {
    pub fn from_particle(particle: &Particle, now: f64) -> Self {
        Self {
            center: particle.position,
            radius: particle.size,
            color: particle.color,
            started: now,
        }
    }

    /// Linear progress in [0, 1]
    pub fn progress(&self, now: f64) -> f32 {
        ((now - self.started) / POP_DURATION).clamp(0.0, 1.0) as f32
    }

    pub fn is_finished(&self, now: f64) -> bool {
        now - self.started >= POP_DURATION
    }

    /// Spoke segments for this frame
    pub fn spokes(&self, now: f64) -> Vec<Link> {
        let t = self.progress(now);
        let reach = lerp_f32(POP_OFFSET, self.radius, ease_out_cubic(t));
        let tail = POP_OFFSET * (1.0 - t);
        let color = self.color.with_alpha(1.0 - t);

        (0..POP_SPOKES)
            .map(|i| {
                let dir = Vec2::from_angle(TAU / POP_SPOKES as f32 * i as f32);
                let from = self.center + dir * reach;
                Link {
                    from,
                    to: from + dir * tail,
                    color,
                    width: POP_LINE_WIDTH,
                }
            })
            .collect()
    }
}
