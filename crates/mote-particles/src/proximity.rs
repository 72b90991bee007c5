//! Link effect between nearby particles and towards the pointer

use crate::config::{ColorSpec, ConnectConfig};
use crate::particle::Particle;
use crate::rand::ParticleRng;
use mote_core::{Color, ParticleId, Vec2};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Pointer links reach this much further than the configured radius
pub const CONNECT_REACH: f32 = 1.5;
/// Pointer links are drawn slightly wider than configured
pub const CONNECT_WIDTH_SCALE: f32 = 1.2;

fn default_one() -> f32 {
    1.0
}

/// `links` effect parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkConfig {
    #[serde(default)]
    pub color: Option<ColorSpec>,
    pub distance: f32,
    /// Draw at full opacity regardless of distance
    #[serde(default)]
    pub solid: bool,
    #[serde(default = "default_one")]
    pub opacity: f32,
    #[serde(default = "default_one")]
    pub width: f32,
}

/// One segment to stroke
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Link {
    pub from: Vec2,
    pub to: Vec2,
    pub color: Color,
    pub width: f32,
}

/// Unordered particle pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PairKey(ParticleId, ParticleId);

impl PairKey {
    pub fn new(a: ParticleId, b: ParticleId) -> Self {
        if a <= b {
            Self(a, b)
        } else {
            Self(b, a)
        }
    }

    pub fn involves(&self, id: ParticleId) -> bool {
        self.0 == id || self.1 == id
    }
}

/// Remembers the palette pick for each linked pair so links do not flicker.
/// Only pairs linked in the latest frame are kept.
#[derive(Default)]
pub struct LinkColorCache {
    colors: HashMap<PairKey, Color>,
    /// Pairs looked up since the last prune
    linked: HashSet<PairKey>,
}

impl LinkColorCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_pick(
        &mut self,
        a: ParticleId,
        b: ParticleId,
        spec: Option<&ColorSpec>,
        rng: &mut ParticleRng,
    ) -> Color {
        let key = PairKey::new(a, b);
        self.linked.insert(key);
        *self.colors.entry(key).or_insert_with(|| match spec {
            Some(spec) => spec.pick(rng).unwrap_or(Color::WHITE),
            None => Color::WHITE,
        })
    }

    /// Drop colours for pairs that were not linked since the last prune.
    /// Call once per frame after every link has been looked up.
    pub fn prune_unlinked(&mut self) {
        let linked = std::mem::take(&mut self.linked);
        self.colors.retain(|key, _| linked.contains(key));
    }

    /// Drop every pair involving `id`
    pub fn forget(&mut self, id: ParticleId) {
        self.colors.retain(|key, _| !key.involves(id));
        self.linked.retain(|key| !key.involves(id));
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn clear(&mut self) {
        self.colors.clear();
        self.linked.clear();
    }
}

/// Effect colour first, then the theme's link colour; white when neither
pub fn link_color_spec<'a>(
    effect: Option<&'a ColorSpec>,
    theme: Option<&'a ColorSpec>,
) -> Option<&'a ColorSpec> {
    effect.filter(|c| !c.is_empty()).or(theme)
}

/// Links between every pair of `particles` closer than `config.distance`
pub fn group_links(
    particles: &[Particle],
    config: &LinkConfig,
    color: Option<&ColorSpec>,
    cache: &mut LinkColorCache,
    rng: &mut ParticleRng,
) -> Vec<Link> {
    let mut links = Vec::new();
    let max_sq = config.distance * config.distance;
    if max_sq <= 0.0 {
        return links;
    }

    for (i, a) in particles.iter().enumerate() {
        for b in &particles[i + 1..] {
            let dist_sq = a.position.distance_squared(b.position);
            if dist_sq >= max_sq {
                continue;
            }
            let opacity = if config.solid {
                1.0
            } else {
                config.opacity * (1.0 - dist_sq.sqrt() / config.distance)
            };
            let base = cache.get_or_pick(a.id, b.id, color, rng);
            links.push(Link {
                from: a.position,
                to: b.position,
                color: base.with_alpha(opacity),
                width: config.width,
            });
        }
    }
    links
}

/// Hover-connect links: pairs within reach whose first particle is also
/// within reach of the pointer, plus optional segments to the pointer.
pub fn pointer_links(
    particles: &[Particle],
    connect: &ConnectConfig,
    pointer: Vec2,
    color: Option<&ColorSpec>,
    cache: &mut LinkColorCache,
    rng: &mut ParticleRng,
) -> Vec<Link> {
    let mut links = Vec::new();
    let reach = connect.radius * CONNECT_REACH;
    let reach_sq = reach * reach;
    if reach_sq <= 0.0 {
        return links;
    }

    let style = connect.links;
    let offset = style.offset;
    let target = Vec2::new(
        pointer.x + offset.right - offset.left,
        pointer.y + offset.bottom - offset.top,
    );
    let width = style.width * CONNECT_WIDTH_SCALE;
    let mut joined_pointer = vec![false; particles.len()];

    for (i, a) in particles.iter().enumerate() {
        if a.position.distance_squared(pointer) >= reach_sq {
            continue;
        }
        for b in &particles[i + 1..] {
            if a.position.distance_squared(b.position) >= reach_sq {
                continue;
            }
            let base = cache.get_or_pick(a.id, b.id, color, rng);
            let color = base.with_alpha(style.opacity);
            if style.link_to_pointer && !joined_pointer[i] {
                joined_pointer[i] = true;
                links.push(Link {
                    from: a.position,
                    to: target,
                    color,
                    width,
                });
            }
            links.push(Link {
                from: a.position,
                to: b.position,
                color,
                width,
            });
        }
    }
    links
}
