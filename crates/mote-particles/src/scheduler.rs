//! Emitter scheduling: timed bursts, population caps, expiry and replay
//!
//! The scheduler owns every emitter group plus the shared particle pool.
//! Deferred work goes through the caller's [`Timers`] queue, keyed by the
//! emitter so a fault or reset cancels exactly that emitter's pending work.

use crate::config::{ColorSpec, SystemConfig};
use crate::emitter::{spawn_point, EmitterConfig, EmitterState, EmitterStatus, PlayState};
use crate::particle::{EmitterKey, LifeSpan, Particle};
use crate::pool::ParticlePool;
use crate::rand::ParticleRng;
use crate::rotation::RotationState;
use mote_core::{Canvas, MoteError, ParticleId, Result, Vec2};
use mote_runtime::TaskQueue;

/// Whose lifetime a deferred task is tied to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskOwner {
    Emitter(EmitterKey),
    Particle(ParticleId),
}

/// Deferred work
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TimerTask {
    /// Next emission burst
    Emit,
    /// Check whether a resetting emitter's group has aged out
    ResetPoll,
    /// Remove a particle that passed through an edge
    GraceDestroy,
    /// Undo a pointer repulsion
    RestoreVelocity(Vec2),
}

pub type Timers = TaskQueue<TaskOwner, TimerTask>;

/// Inputs shared by every spawn in one call
pub struct SpawnContext<'a> {
    pub canvas: Canvas,
    pub now: f64,
    pub rng: &'a mut ParticleRng,
    /// Selected theme's particle colour
    pub theme_color: Option<&'a ColorSpec>,
}

pub struct EmitterScheduler {
    emitters: Vec<EmitterState>,
    pool: ParticlePool,
}

impl EmitterScheduler {
    pub fn new(emitters: Vec<EmitterState>, pool_reuse: bool) -> Self {
        Self {
            emitters,
            pool: ParticlePool::new(pool_reuse),
        }
    }

    /// Build the implicit emitter (when a top-level template exists)
    /// followed by every explicit emitter.
    pub fn from_config(config: &SystemConfig, canvas: Canvas) -> Self {
        let mut emitters = Vec::with_capacity(config.emitters.len() + 1);
        if let Some(template) = &config.particles {
            emitters.push(EmitterState::new(
                EmitterConfig::implicit(config, template, canvas),
                true,
            ));
        }
        emitters.extend(
            config
                .emitters
                .iter()
                .cloned()
                .map(|c| EmitterState::new(c, false)),
        );
        Self::new(emitters, config.pool_reuse)
    }

    pub fn emitters(&self) -> &[EmitterState] {
        &self.emitters
    }

    pub fn emitters_mut(&mut self) -> &mut [EmitterState] {
        &mut self.emitters
    }

    pub fn emitter(&self, key: EmitterKey) -> Option<&EmitterState> {
        self.emitters.get(key)
    }

    pub fn pool(&self) -> &ParticlePool {
        &self.pool
    }

    /// Live particles across all groups
    pub fn active_count(&self) -> usize {
        self.emitters.iter().map(|e| e.group.len()).sum()
    }

    pub fn find(&self, id: ParticleId) -> Option<&Particle> {
        self.emitters
            .iter()
            .flat_map(|e| e.group.iter())
            .find(|p| p.id == id)
    }

    pub fn find_mut(&mut self, id: ParticleId) -> Option<&mut Particle> {
        self.emitters
            .iter_mut()
            .flat_map(|e| e.group.iter_mut())
            .find(|p| p.id == id)
    }

    /// Kick off every emitter. The implicit emitter spawns its whole
    /// population once; playing emitters run their first burst now.
    pub fn start(&mut self, ctx: &mut SpawnContext, timers: &mut Timers) {
        for key in 0..self.emitters.len() {
            let state = &mut self.emitters[key];
            if !state.config.enabled {
                continue;
            }
            if state.implicit {
                let quantity = state.cap().unwrap_or(0);
                state.status = EmitterStatus::Emitting;
                if let Err(err) = self.spawn_into(key, quantity, ctx) {
                    self.fault(key, err, timers);
                }
                continue;
            }
            match state.config.play_state() {
                PlayState::Play => {
                    state.status = EmitterStatus::Emitting;
                    self.emission_tick(key, ctx, timers);
                }
                PlayState::Pause => state.status = EmitterStatus::Idle,
                PlayState::Stop => state.status = EmitterStatus::Stopped,
            }
        }
    }

    /// One scheduled burst. Returns ids of particles cleared by a reset.
    pub fn emission_tick(
        &mut self,
        key: EmitterKey,
        ctx: &mut SpawnContext,
        timers: &mut Timers,
    ) -> Vec<ParticleId> {
        let Some(state) = self.emitters.get_mut(key) else {
            return Vec::new();
        };
        if !state.config.enabled || state.status != EmitterStatus::Emitting {
            return Vec::new();
        }

        if state.is_expired(ctx.now) {
            return self.expire(key, ctx, timers);
        }

        let Some(rate) = state.config.rate else {
            let err = MoteError::InvalidConfig(format!("emitter {key} plays without a rate"));
            self.fault(key, err, timers);
            return Vec::new();
        };

        if state.started_at.is_none() {
            state.started_at = Some(ctx.now);
        }

        if !state.at_cap() {
            if let Err(err) = self.spawn_into(key, rate.quantity, ctx) {
                self.fault(key, err, timers);
                return Vec::new();
            }
        }

        if self.emitters[key].is_expired(ctx.now) {
            return self.expire(key, ctx, timers);
        }
        timers.schedule(
            ctx.now,
            rate.delay as f64,
            TaskOwner::Emitter(key),
            TimerTask::Emit,
        );
        Vec::new()
    }

    fn expire(&mut self, key: EmitterKey, ctx: &mut SpawnContext, timers: &mut Timers) -> Vec<ParticleId> {
        let state = &mut self.emitters[key];
        if state.config.replay() {
            log::debug!("emitter {key} expired, resetting");
            state.status = EmitterStatus::Resetting;
            timers.cancel_owner(&TaskOwner::Emitter(key));
            self.reset_poll(key, ctx, timers)
        } else {
            log::debug!("emitter {key} expired, stopping");
            state.status = EmitterStatus::Stopped;
            Vec::new()
        }
    }

    /// Clear the group once its oldest particle has lived out its life,
    /// retrying after the remaining life otherwise. Returns cleared ids.
    pub fn reset_poll(
        &mut self,
        key: EmitterKey,
        ctx: &mut SpawnContext,
        timers: &mut Timers,
    ) -> Vec<ParticleId> {
        let Some(state) = self.emitters.get_mut(key) else {
            return Vec::new();
        };
        if state.status != EmitterStatus::Resetting {
            return Vec::new();
        }

        if let Some(remaining) = state.group.first().and_then(|p| p.remaining_life()) {
            if remaining > 0.0 {
                timers.schedule(
                    ctx.now,
                    remaining as f64,
                    TaskOwner::Emitter(key),
                    TimerTask::ResetPoll,
                );
                return Vec::new();
            }
        }

        let cleared: Vec<Particle> = state.group.drain(..).collect();
        state.spawned = 0;
        state.started_at = None;
        let replay = state.config.replay();
        state.status = if replay {
            EmitterStatus::Emitting
        } else {
            EmitterStatus::Stopped
        };
        if replay {
            // Restart on the next drain so a zero-length window cannot spin
            timers.schedule(ctx.now, 0.0, TaskOwner::Emitter(key), TimerTask::Emit);
        }

        let ids = cleared.iter().map(|p| p.id).collect();
        for particle in cleared {
            self.pool.release(particle);
        }
        log::debug!("emitter {key} reset (replay: {replay})");
        ids
    }

    /// Spawn up to `count` particles into `key`, bounded by its cap.
    /// Returns how many were spawned.
    pub fn spawn_burst(&mut self, key: EmitterKey, count: usize, ctx: &mut SpawnContext) -> Result<usize> {
        if key >= self.emitters.len() {
            return Err(MoteError::EmitterNotFound(key));
        }
        self.spawn_into(key, count, ctx)
    }

    /// Build one particle from `key`'s template and return it to the pool
    /// straight away. Surfaces template errors without touching the group.
    pub fn trial_spawn(&mut self, key: EmitterKey, ctx: &mut SpawnContext) -> Result<()> {
        let state = self
            .emitters
            .get(key)
            .ok_or(MoteError::EmitterNotFound(key))?;
        let particle = build_particle(state, key, &mut self.pool, ctx)?;
        self.pool.release(particle);
        Ok(())
    }

    fn spawn_into(&mut self, key: EmitterKey, count: usize, ctx: &mut SpawnContext) -> Result<usize> {
        let state = &mut self.emitters[key];
        let count = state.room_for(count);
        for _ in 0..count {
            let particle = build_particle(state, key, &mut self.pool, ctx)?;
            state.group.push(particle);
            state.spawned += 1;
        }
        Ok(count)
    }

    /// Mark an emitter faulted and cancel its pending work
    pub fn fault(&mut self, key: EmitterKey, err: MoteError, timers: &mut Timers) {
        if let Some(state) = self.emitters.get_mut(key) {
            log::error!("emitter {key} faulted: {err}");
            state.status = EmitterStatus::Faulted;
            timers.cancel_owner(&TaskOwner::Emitter(key));
        }
    }

    /// Take a particle out of its group and pool it
    pub fn remove(&mut self, id: ParticleId) -> bool {
        for state in &mut self.emitters {
            if let Some(index) = state.group.iter().position(|p| p.id == id) {
                let particle = state.group.remove(index);
                self.pool.release(particle);
                return true;
            }
        }
        false
    }

    /// Return every live particle to the pool
    pub fn clear(&mut self) {
        for state in &mut self.emitters {
            for particle in state.group.drain(..) {
                self.pool.release(particle);
            }
        }
    }
}

/// Resolve the template and stamp a pooled (or new) particle
fn build_particle(
    state: &EmitterState,
    key: EmitterKey,
    pool: &mut ParticlePool,
    ctx: &mut SpawnContext,
) -> Result<Particle> {
    let template = &state.config.particles;
    let size = template.size.ok_or(MoteError::MissingTemplate {
        emitter: key,
        field: "size",
    })?;
    let movement = template
        .movement
        .as_ref()
        .ok_or(MoteError::MissingTemplate {
            emitter: key,
            field: "movement",
        })?;
    let color_spec = template
        .color
        .as_ref()
        .filter(|c| !c.is_empty())
        .or(ctx.theme_color)
        .ok_or(MoteError::MissingTemplate {
            emitter: key,
            field: "color",
        })?;
    let color = color_spec.pick(ctx.rng)?;

    let mut particle = pool.acquire();
    particle.id = ParticleId::new();
    particle.emitter = Some(key);
    particle.position = spawn_point(state.config.position, state.config.region, ctx.canvas, ctx.rng);
    particle.velocity = movement.initial_velocity(ctx.rng);
    particle.size = size.sample(ctx.rng);
    particle.original_size = particle.size;
    particle.line_width = size.line_width;
    particle.set_base_opacity(template.opacity);
    particle.color = color.with_alpha(color.a * particle.opacity());
    particle.rotation = template
        .rotation
        .map(|r| RotationState::spawn(&r, ctx.rng, ctx.now))
        .unwrap_or_default();
    particle.life = state.config.life.map(|l| LifeSpan {
        duration: l.duration,
        fade: l.fade,
    });
    Ok(particle)
}
