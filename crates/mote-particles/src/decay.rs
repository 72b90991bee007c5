//! Gravity, velocity damping and end-of-life fade

use crate::motion::MovementConfig;
use crate::particle::Particle;

/// Fraction of the gap to the damped velocity closed each tick
const DAMPING_RATE: f32 = 0.01;

/// Apply gravity and velocity damping for one tick
pub fn apply_forces(particle: &mut Particle, movement: &MovementConfig) {
    let gravity = &movement.gravity;
    if gravity.enabled {
        let sign = if gravity.inverse { -1.0 } else { 1.0 };
        particle.velocity.y += sign * gravity.acceleration;
    }

    if let Some(factor) = movement.velocity_factor {
        if factor != 0.0 && factor != 1.0 {
            let target = particle.velocity * factor;
            particle.velocity += (target - particle.velocity) * DAMPING_RATE;
        }
    }
}

/// Recompute opacity inside the fade window and rewrite the colour alpha.
/// Particles without a life (or before the window) are left alone.
pub fn apply_fade(particle: &mut Particle) {
    let Some(progress) = particle.life.and_then(|life| life.fade_progress(particle.age())) else {
        return;
    };
    let opacity = particle.base_opacity() * (1.0 - progress);
    particle.set_opacity(opacity);
    particle.color = particle.color.with_alpha(particle.opacity());
}
