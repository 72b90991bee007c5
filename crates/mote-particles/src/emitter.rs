//! Emitter configuration (parsed from TOML) and runtime state

use crate::config::{non_negative, ParticleTemplate, SystemConfig};
use crate::particle::Particle;
use crate::rand::ParticleRng;
use mote_core::{Canvas, Result, Vec2};
use serde::{Deserialize, Serialize};

fn default_true() -> bool {
    true
}

/// Named spawn anchors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpawnAnchor {
    Fill,
    Center,
    TopCenter,
    BottomCenter,
    LeftCenter,
    RightCenter,
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

/// Where an emitter places new particles: a named anchor or a fixed point
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SpawnPosition {
    Anchor(SpawnAnchor),
    Point { x: f32, y: f32 },
}

impl Default for SpawnPosition {
    fn default() -> Self {
        SpawnPosition::Anchor(SpawnAnchor::Fill)
    }
}

/// Spawn region. Percent of the canvas for edge and corner anchors,
/// pixels for `center` and fixed points; ignored by `fill`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EmitterRegion {
    pub width: f32,
    pub height: f32,
}

impl Default for EmitterRegion {
    fn default() -> Self {
        Self {
            width: 100.0,
            height: 100.0,
        }
    }
}

/// One burst of `quantity` particles every `delay` seconds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EmissionRate {
    pub delay: f32,
    pub quantity: usize,
}

/// Life template copied onto each spawned particle (seconds)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LifeConfig {
    pub duration: f32,
    #[serde(default)]
    pub fade: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayState {
    #[default]
    Play,
    Pause,
    Stop,
}

/// How an emitter measures its active window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpiryClock {
    /// Wall-clock seconds since the first burst
    #[default]
    Elapsed,
    /// Particles spawned times the burst delay
    Spawned,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AnimationConfig {
    #[serde(default)]
    pub play_state: PlayState,
    /// Active window in seconds; unbounded when absent
    #[serde(default)]
    pub length: Option<f32>,
    #[serde(default)]
    pub replay: bool,
    #[serde(default)]
    pub expiry: ExpiryClock,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmitterConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub position: SpawnPosition,
    #[serde(default)]
    pub allow_interaction: bool,
    #[serde(default)]
    pub particles: ParticleTemplate,
    #[serde(default)]
    pub region: EmitterRegion,
    #[serde(default)]
    pub rate: Option<EmissionRate>,
    #[serde(default)]
    pub life: Option<LifeConfig>,
    #[serde(default)]
    pub animation: Option<AnimationConfig>,
}

impl EmitterConfig {
    /// The implicit full-canvas emitter built from the top-level template
    pub fn implicit(config: &SystemConfig, template: &ParticleTemplate, canvas: Canvas) -> Self {
        let allow_interaction = config.emitters.iter().any(|e| e.allow_interaction)
            || config.interactivity.any_event_enabled();
        Self {
            enabled: true,
            position: SpawnPosition::Anchor(SpawnAnchor::Fill),
            allow_interaction,
            particles: template.clone(),
            region: EmitterRegion {
                width: canvas.width,
                height: canvas.height,
            },
            rate: None,
            life: None,
            animation: None,
        }
    }

    pub fn play_state(&self) -> PlayState {
        self.animation.map(|a| a.play_state).unwrap_or_default()
    }

    pub fn replay(&self) -> bool {
        self.animation.is_some_and(|a| a.replay)
    }

    pub(crate) fn validate(&self, index: usize) -> Result<()> {
        let path = format!("emitters[{index}]");
        self.particles.validate(&format!("{path}.particles"))?;
        non_negative(&format!("{path}.region.width"), self.region.width)?;
        non_negative(&format!("{path}.region.height"), self.region.height)?;
        if let Some(rate) = &self.rate {
            non_negative(&format!("{path}.rate.delay"), rate.delay)?;
        }
        if let Some(life) = &self.life {
            non_negative(&format!("{path}.life.duration"), life.duration)?;
            non_negative(&format!("{path}.life.fade"), life.fade)?;
        }
        if let Some(length) = self.animation.and_then(|a| a.length) {
            non_negative(&format!("{path}.animation.length"), length)?;
        }
        Ok(())
    }
}

/// Sample a spawn point for `position` within `region`
pub fn spawn_point(
    position: SpawnPosition,
    region: EmitterRegion,
    canvas: Canvas,
    rng: &mut ParticleRng,
) -> Vec2 {
    let anchor = match position {
        SpawnPosition::Point { x, y } => {
            return Vec2::new(
                x - region.width / 2.0 + rng.next_f32() * region.width,
                y - region.height / 2.0 + rng.next_f32() * region.height,
            );
        }
        SpawnPosition::Anchor(anchor) => anchor,
    };

    match anchor {
        SpawnAnchor::Fill => Vec2::new(
            rng.next_f32() * canvas.width,
            rng.next_f32() * canvas.height,
        ),
        SpawnAnchor::Center => Vec2::new(
            (canvas.width - region.width) / 2.0 + rng.next_f32() * region.width,
            (canvas.height - region.height) / 2.0 + rng.next_f32() * region.height,
        ),
        _ => {
            let span_x = canvas.width * region.width / 100.0;
            let span_y = canvas.height * region.height / 100.0;
            let x = match anchor {
                SpawnAnchor::TopLeft | SpawnAnchor::BottomLeft | SpawnAnchor::LeftCenter => {
                    rng.next_f32() * span_x
                }
                SpawnAnchor::TopRight | SpawnAnchor::BottomRight | SpawnAnchor::RightCenter => {
                    canvas.width - span_x + rng.next_f32() * span_x
                }
                _ => (canvas.width - span_x) / 2.0 + rng.next_f32() * span_x,
            };
            let y = match anchor {
                SpawnAnchor::BottomLeft | SpawnAnchor::BottomRight | SpawnAnchor::BottomCenter => {
                    canvas.height - span_y + rng.next_f32() * span_y
                }
                SpawnAnchor::TopLeft | SpawnAnchor::TopRight | SpawnAnchor::TopCenter => {
                    rng.next_f32() * span_y
                }
                _ => (canvas.height - span_y) / 2.0 + rng.next_f32() * span_y,
            };
            Vec2::new(x, y)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmitterStatus {
    /// Not playing (paused or never started)
    Idle,
    Emitting,
    /// Waiting for the group to age out before clearing
    Resetting,
    Stopped,
    /// Hit a configuration error; never spawns again
    Faulted,
}

/// Runtime state for one emitter
pub struct EmitterState {
    pub config: EmitterConfig,
    /// Built from the top-level template rather than listed explicitly
    pub implicit: bool,
    /// Live particles in spawn order
    pub group: Vec<Particle>,
    /// Particles spawned since the last (re)start
    pub spawned: usize,
    /// Time of the first burst since the last (re)start
    pub started_at: Option<f64>,
    pub status: EmitterStatus,
}

impl EmitterState {
    pub fn new(config: EmitterConfig, implicit: bool) -> Self {
        Self {
            config,
            implicit,
            group: Vec::new(),
            spawned: 0,
            started_at: None,
            status: EmitterStatus::Idle,
        }
    }

    /// Population cap from the template
    pub fn cap(&self) -> Option<usize> {
        self.config.particles.total_quantity
    }

    pub fn at_cap(&self) -> bool {
        self.cap().is_some_and(|cap| self.group.len() >= cap)
    }

    /// How many of `wanted` fit under the cap
    pub fn room_for(&self, wanted: usize) -> usize {
        match self.cap() {
            Some(cap) => wanted.min(cap.saturating_sub(self.group.len())),
            None => wanted,
        }
    }

    /// Whether the animation window has run out
    pub fn is_expired(&self, now: f64) -> bool {
        let Some(animation) = self.config.animation else {
            return false;
        };
        let Some(length) = animation.length.filter(|l| *l > 0.0) else {
            return false;
        };
        match animation.expiry {
            ExpiryClock::Elapsed => self
                .started_at
                .is_some_and(|start| now - start >= length as f64),
            ExpiryClock::Spawned => {
                let delay = self.config.rate.map(|r| r.delay).unwrap_or(0.0);
                self.spawned as f32 * delay >= length
            }
        }
    }
}
