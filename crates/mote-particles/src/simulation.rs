//! The per-frame simulation loop
//!
//! Each executed frame runs, in order: due deferred tasks, the fps gate,
//! a surface clear, per-particle decay / motion / aging / fade / draw,
//! retirement, link effects, rotation, pop bursts, and finally the frame
//! counter. Links therefore always see this frame's positions.

use crate::boundary::{BoundaryFate, PASS_THROUGH_GRACE};
use crate::config::{ClickMode, ParticleKind, SystemConfig};
use crate::decay;
use crate::draw;
use crate::interaction::{pop_targets, repulse_targets, repulse_velocity, PopBurst};
use crate::motion::{self, MotionContext};
use crate::noise::NoiseSource;
use crate::particle::EmitterKey;
use crate::proximity::{group_links, link_color_spec, pointer_links, LinkColorCache};
use crate::rand::ParticleRng;
use crate::scheduler::{EmitterScheduler, SpawnContext, TaskOwner, TimerTask, Timers};
use mote_core::{Canvas, ParticleId, Result, Vec2};
use mote_runtime::{DrawSurface, FrameClock, PointerState};
use serde::Serialize;

/// Counters for one executed frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct FrameStats {
    pub frame: u64,
    pub delta: f64,
    pub active: usize,
    pub pooled: usize,
    pub links: usize,
    pub bursts: usize,
}

pub struct Simulation {
    config: SystemConfig,
    canvas: Canvas,
    scheduler: EmitterScheduler,
    link_colors: LinkColorCache,
    timers: Timers,
    clock: FrameClock,
    pointer: PointerState,
    rng: ParticleRng,
    noise: NoiseSource,
    bursts: Vec<PopBurst>,
    /// Last host timestamp seen, for work triggered outside a tick
    now: f64,
    started: bool,
    live: bool,
}

impl Simulation {
    pub fn new(config: SystemConfig, canvas: Canvas) -> Self {
        let mut rng = config
            .seed
            .map(ParticleRng::new)
            .unwrap_or_else(ParticleRng::from_time);
        let noise = NoiseSource::new(config.seed.unwrap_or_else(|| rng.next_u32()));
        let scheduler = EmitterScheduler::from_config(&config, canvas);
        let clock = FrameClock::with_fps_limit(config.fps_limit);
        Self {
            config,
            canvas,
            scheduler,
            link_colors: LinkColorCache::new(),
            timers: Timers::new(),
            clock,
            pointer: PointerState::new(),
            rng,
            noise,
            bursts: Vec::new(),
            now: 0.0,
            started: false,
            live: true,
        }
    }

    pub fn config(&self) -> &SystemConfig {
        &self.config
    }

    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    pub fn scheduler(&self) -> &EmitterScheduler {
        &self.scheduler
    }

    pub fn clock(&self) -> &FrameClock {
        &self.clock
    }

    pub fn pointer(&self) -> &PointerState {
        &self.pointer
    }

    pub fn link_colors(&self) -> &LinkColorCache {
        &self.link_colors
    }

    pub fn bursts(&self) -> &[PopBurst] {
        &self.bursts
    }

    pub fn pending_tasks(&self) -> usize {
        self.timers.len()
    }

    pub fn is_live(&self) -> bool {
        self.live
    }

    /// Initialize emitter groups and run the first bursts
    pub fn start(&mut self, now: f64) {
        if !self.live || self.started {
            return;
        }
        self.started = true;
        self.now = now;
        let mut ctx = SpawnContext {
            canvas: self.canvas,
            now,
            rng: &mut self.rng,
            theme_color: self.config.theme_particle_color(),
        };
        self.scheduler.start(&mut ctx, &mut self.timers);
        log::info!(
            "particle simulation started: {} emitter(s), {} particle(s)",
            self.scheduler.emitters().len(),
            self.scheduler.active_count()
        );
    }

    /// Run one host callback. Returns stats when a frame was executed,
    /// None when skipped by the fps ceiling or after teardown.
    pub fn tick(&mut self, now: f64, surface: &mut dyn DrawSurface) -> Option<FrameStats> {
        if !self.live {
            return None;
        }
        self.now = now;
        self.run_due_tasks(now);
        if !self.clock.tick_at(now) {
            return None;
        }
        let dt = self.clock.delta_time as f32;

        surface.clear_rect(Vec2::ZERO, self.canvas.width, self.canvas.height);

        let mut doomed: Vec<ParticleId> = Vec::new();
        let mut exiting: Vec<ParticleId> = Vec::new();
        let motion_ctx = MotionContext {
            canvas: self.canvas,
            frame_count: self.clock.frame_count,
            noise: &self.noise,
        };
        for state in self.scheduler.emitters_mut() {
            let template = &state.config.particles;
            for particle in state.group.iter_mut() {
                if let Some(movement) = &template.movement {
                    decay::apply_forces(particle, movement);
                    let outcome = motion::step(particle, movement, &motion_ctx);
                    match outcome.fate {
                        BoundaryFate::DestroyNow => doomed.push(particle.id),
                        BoundaryFate::DestroyLater if !particle.exiting => {
                            particle.exiting = true;
                            exiting.push(particle.id);
                        }
                        _ => {}
                    }
                }
                particle.advance_age(dt);
                decay::apply_fade(particle);
                draw::draw_particle(surface, particle, &template.kind);
                if particle.should_retire() {
                    doomed.push(particle.id);
                }
            }
        }

        for id in exiting {
            self.timers.schedule(
                now,
                PASS_THROUGH_GRACE,
                TaskOwner::Particle(id),
                TimerTask::GraceDestroy,
            );
        }
        for id in doomed {
            self.remove_particle(id);
        }

        let links = self.render_links(surface);
        self.animate_rotation(now);
        self.animate_bursts(surface, now);
        self.clock.advance_frame();

        Some(FrameStats {
            frame: self.clock.frame_count,
            delta: self.clock.delta_time,
            active: self.scheduler.active_count(),
            pooled: self.scheduler.pool().available(),
            links,
            bursts: self.bursts.len(),
        })
    }

    fn run_due_tasks(&mut self, now: f64) {
        for (owner, task) in self.timers.drain_due(now) {
            if !self.live {
                break;
            }
            match (owner, task) {
                (TaskOwner::Emitter(key), TimerTask::Emit) => {
                    let mut ctx = SpawnContext {
                        canvas: self.canvas,
                        now,
                        rng: &mut self.rng,
                        theme_color: self.config.theme_particle_color(),
                    };
                    let cleared = self.scheduler.emission_tick(key, &mut ctx, &mut self.timers);
                    self.forget_all(&cleared);
                }
                (TaskOwner::Emitter(key), TimerTask::ResetPoll) => {
                    let mut ctx = SpawnContext {
                        canvas: self.canvas,
                        now,
                        rng: &mut self.rng,
                        theme_color: self.config.theme_particle_color(),
                    };
                    let cleared = self.scheduler.reset_poll(key, &mut ctx, &mut self.timers);
                    self.forget_all(&cleared);
                }
                (TaskOwner::Particle(id), TimerTask::GraceDestroy) => {
                    self.remove_particle(id);
                }
                (TaskOwner::Particle(id), TimerTask::RestoreVelocity(velocity)) => {
                    if let Some(particle) = self.scheduler.find_mut(id) {
                        particle.velocity = velocity;
                    }
                }
                (owner, task) => log::warn!("ignoring {task:?} queued for {owner:?}"),
            }
        }
    }

    fn forget_all(&mut self, ids: &[ParticleId]) {
        for id in ids {
            self.link_colors.forget(*id);
            self.timers.cancel_owner(&TaskOwner::Particle(*id));
        }
    }

    fn render_links(&mut self, surface: &mut dyn DrawSurface) -> usize {
        let hover = self
            .config
            .interactivity
            .hover_connect()
            .filter(|_| self.pointer.over_surface);
        let theme_link = self.config.theme_link_color();
        let fallback = self.config.particles.as_ref().and_then(|t| t.links());

        let mut links = Vec::new();
        for state in self.scheduler.emitters() {
            let effect = state.config.particles.links();
            // Emitters that ignore the pointer keep their group links
            match hover.filter(|_| state.config.allow_interaction) {
                Some(connect) => {
                    let Some(link) = effect.or(fallback) else {
                        continue;
                    };
                    let spec = link_color_spec(link.color.as_ref(), theme_link);
                    links.extend(pointer_links(
                        &state.group,
                        connect,
                        self.pointer.position,
                        spec,
                        &mut self.link_colors,
                        &mut self.rng,
                    ));
                }
                None => {
                    let Some(link) = effect else {
                        continue;
                    };
                    let spec = link_color_spec(link.color.as_ref(), theme_link);
                    links.extend(group_links(
                        &state.group,
                        link,
                        spec,
                        &mut self.link_colors,
                        &mut self.rng,
                    ));
                }
            }
        }
        self.link_colors.prune_unlinked();
        draw::draw_links(surface, &links);
        links.len()
    }

    fn animate_rotation(&mut self, now: f64) {
        for state in self.scheduler.emitters_mut() {
            let Some(rotation) = state
                .config
                .particles
                .rotation
                .filter(|r| r.animation.is_some())
            else {
                continue;
            };
            for particle in state.group.iter_mut() {
                particle.rotation.step(&rotation, &mut self.rng, now);
            }
        }
    }

    fn animate_bursts(&mut self, surface: &mut dyn DrawSurface, now: f64) {
        self.bursts.retain(|b| !b.is_finished(now));
        for burst in &self.bursts {
            draw::draw_burst(surface, burst, now);
        }
    }

    /// Spawn up to `count` particles from `emitter` right now
    pub fn spawn_burst(&mut self, emitter: EmitterKey, count: usize) -> Result<usize> {
        if !self.live {
            return Ok(0);
        }
        let mut ctx = SpawnContext {
            canvas: self.canvas,
            now: self.now,
            rng: &mut self.rng,
            theme_color: self.config.theme_particle_color(),
        };
        self.scheduler.spawn_burst(emitter, count, &mut ctx)
    }

    /// Retire a particle to the pool, dropping its cached link colours and
    /// pending tasks. Unknown ids are ignored.
    pub fn remove_particle(&mut self, id: ParticleId) -> bool {
        if !self.live || !self.scheduler.remove(id) {
            return false;
        }
        self.link_colors.forget(id);
        self.timers.cancel_owner(&TaskOwner::Particle(id));
        true
    }

    /// Feed a pointer position in device pixels
    pub fn set_pointer(&mut self, x: f32, y: f32, over_surface: bool) {
        self.pointer.process_move(x, y, self.canvas);
        if !over_surface {
            self.pointer.process_over(false);
        }
    }

    pub fn pointer_left(&mut self) {
        self.pointer.process_over(false);
    }

    /// Apply the configured click response. Returns how many particles it
    /// touched.
    pub fn click(&mut self, x: f32, y: f32) -> usize {
        if !self.live {
            return 0;
        }
        let at = Vec2::new(x, y);
        match self.config.interactivity.click_mode() {
            Some(ClickMode::Repulse) => self.repulse(at),
            Some(ClickMode::PopBubble) => self.pop(at),
            None => 0,
        }
    }

    fn repulse(&mut self, at: Vec2) -> usize {
        let Some(repulse) = self.config.interactivity.repulse else {
            return 0;
        };
        let mut touched = 0;
        for state in self.scheduler.emitters_mut() {
            if !state.config.allow_interaction {
                continue;
            }
            for index in repulse_targets(&state.group, at, repulse.distance) {
                let particle = &mut state.group[index];
                let owner = TaskOwner::Particle(particle.id);
                // A restore still pending holds the pre-repulse velocity
                let original = self
                    .timers
                    .take_where(&owner, |t| matches!(t, TimerTask::RestoreVelocity(_)))
                    .into_iter()
                    .find_map(|t| match t {
                        TimerTask::RestoreVelocity(v) => Some(v),
                        _ => None,
                    })
                    .unwrap_or(particle.velocity);
                particle.velocity = repulse_velocity(particle.position, at, repulse.speed);
                self.timers.schedule(
                    self.now,
                    repulse.duration as f64,
                    owner,
                    TimerTask::RestoreVelocity(original),
                );
                touched += 1;
            }
        }
        touched
    }

    fn pop(&mut self, at: Vec2) -> usize {
        let mut popped = Vec::new();
        for state in self.scheduler.emitters() {
            let poppable = !matches!(
                state.config.particles.kind,
                ParticleKind::Bubble { can_pop: false }
            );
            if !state.config.allow_interaction || !poppable {
                continue;
            }
            for id in pop_targets(&state.group, at) {
                if let Some(particle) = state.group.iter().find(|p| p.id == id) {
                    popped.push((id, PopBurst::from_particle(particle, self.now)));
                }
            }
        }
        let count = popped.len();
        for (id, burst) in popped {
            self.bursts.push(burst);
            self.remove_particle(id);
        }
        count
    }

    /// Select the next colour theme. Cached link colours are dropped so
    /// links pick up the new palette.
    pub fn cycle_theme(&mut self) -> Option<String> {
        let name = self.config.cycle_theme().map(str::to_string);
        self.link_colors.clear();
        name
    }

    /// Stop everything. Pending tasks are discarded and later ticks,
    /// clicks and spawns do nothing.
    pub fn teardown(&mut self) {
        if !self.live {
            return;
        }
        self.live = false;
        self.timers.close();
        self.scheduler.clear();
        self.link_colors.clear();
        self.bursts.clear();
        log::info!(
            "particle simulation torn down after {} frame(s)",
            self.clock.frame_count
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emitter::EmitterStatus;
    use mote_runtime::{DrawCommand, RecordingSurface};

    const CANVAS: Canvas = Canvas::new(800.0, 600.0);

    fn simulation(doc: &str) -> Simulation {
        let config = SystemConfig::from_toml_str(doc, CANVAS.width).unwrap();
        Simulation::new(config, CANVAS)
    }

    fn place(sim: &mut Simulation, emitter: usize, positions: &[(f32, f32)]) {
        let group = &mut sim.scheduler.emitters_mut()[emitter].group;
        for (particle, (x, y)) in group.iter_mut().zip(positions) {
            particle.position = Vec2::new(*x, *y);
            particle.velocity = Vec2::ZERO;
        }
    }

    const DEFAULT_SCENE: &str = r##"
seed = 42

[particles]
total_quantity = 50
color = "#ffffff"
size = { min = 1.0, max = 3.0 }
movement = { direction = "random", speed = { min = 0.1, max = 0.3 }, default_boundary_behavior = "bounce" }
"##;

    #[test]
    fn default_scene_stays_on_canvas() {
        let mut sim = simulation(DEFAULT_SCENE);
        let mut surface = RecordingSurface::new();
        sim.start(0.0);
        for frame in 0..600 {
            let stats = sim.tick(frame as f64 / 60.0, &mut surface).unwrap();
            assert_eq!(stats.active, 50);
        }
        for particle in &sim.scheduler().emitters()[0].group {
            let p = particle.position;
            assert!(p.x >= -0.5 && p.x <= 800.5, "x = {}", p.x);
            assert!(p.y >= -0.5 && p.y <= 600.5, "y = {}", p.y);
            let speed = particle.velocity.length();
            assert!(speed >= 0.1 - 1e-4 && speed <= 0.3 + 1e-4);
        }
        assert_eq!(sim.clock().frame_count, 600);
    }

    #[test]
    fn frame_draws_after_clear() {
        let mut sim = simulation(DEFAULT_SCENE);
        let mut surface = RecordingSurface::new();
        sim.start(0.0);
        sim.tick(0.0, &mut surface);
        assert!(matches!(surface.commands[0], DrawCommand::Clear { .. }));
        let circles = surface
            .current_frame()
            .iter()
            .filter(|c| matches!(c, DrawCommand::Circle { .. }))
            .count();
        assert_eq!(circles, 50);
    }

    #[test]
    fn fps_limit_skips_without_counting() {
        let doc = format!("fps_limit = 30\n{DEFAULT_SCENE}");
        let mut sim = simulation(&doc);
        let mut surface = RecordingSurface::new();
        sim.start(0.0);
        assert!(sim.tick(0.0, &mut surface).is_some());
        assert!(sim.tick(0.01, &mut surface).is_none());
        assert_eq!(sim.clock().frame_count, 1);
        assert!(sim.tick(1.0 / 30.0, &mut surface).is_some());
        assert_eq!(sim.clock().frame_count, 2);
    }

    const LIFE_SCENE: &str = r##"
seed = 3

[[emitters]]
position = "center"
region = { width = 0.0, height = 0.0 }
rate = { delay = 1000.0, quantity = 1 }
life = { duration = 10.0, fade = 2.0 }

[emitters.particles]
total_quantity = 1
color = "#ff0000"
size = { min = 2.0, max = 2.0 }
movement = { direction = "none", speed = { min = 0.0, max = 0.0 } }
"##;

    #[test]
    fn fade_then_retire() {
        let mut sim = simulation(LIFE_SCENE);
        let mut surface = RecordingSurface::new();
        sim.start(0.0);
        sim.tick(0.0, &mut surface);

        let mut step = 0;
        let mut advance_to = |sim: &mut Simulation, until: u32| {
            while step < until {
                step += 1;
                sim.tick(step as f64 * 0.1, &mut surface);
            }
        };

        advance_to(&mut sim, 79);
        let p = &sim.scheduler().emitters()[0].group[0];
        assert!((p.age() - 7.9).abs() < 0.01);
        assert!((p.opacity() - 1.0).abs() < 0.01);

        advance_to(&mut sim, 90);
        let p = &sim.scheduler().emitters()[0].group[0];
        assert!((p.opacity() - 0.5).abs() < 0.01);
        assert!((p.color.a - 0.5).abs() < 0.01);
        let id = p.id;

        advance_to(&mut sim, 101);
        assert!(sim.scheduler().emitters()[0].group.is_empty());
        assert!(sim.scheduler().find(id).is_none());
        assert_eq!(sim.scheduler().pool().available(), 1);
    }

    const LINK_SCENE: &str = r##"
seed = 9

[particles]
total_quantity = 2
color = "#ffffff"
size = { min = 1.0, max = 1.0 }
movement = { direction = "none", speed = { min = 0.0, max = 0.0 } }

[[particles.effects]]
type = "links"
distance = 100.0
color = ["#ff0000", "#00ff00", "#0000ff"]
"##;

    #[test]
    fn links_follow_distance() {
        let mut sim = simulation(LINK_SCENE);
        let mut surface = RecordingSurface::new();
        sim.start(0.0);

        place(&mut sim, 0, &[(100.0, 100.0), (150.0, 100.0)]);
        let stats = sim.tick(0.0, &mut surface).unwrap();
        assert_eq!(stats.links, 1);
        assert_eq!(surface.lines().count(), 1);

        assert_eq!(sim.link_colors().len(), 1);

        place(&mut sim, 0, &[(100.0, 100.0), (250.0, 100.0)]);
        let stats = sim.tick(0.1, &mut surface).unwrap();
        assert_eq!(stats.links, 0);
        // The unlinked pair's colour is not kept around
        assert!(sim.link_colors().is_empty());
    }

    #[test]
    fn link_colour_is_stable_across_frames() {
        let mut sim = simulation(LINK_SCENE);
        let mut surface = RecordingSurface::new();
        sim.start(0.0);
        place(&mut sim, 0, &[(100.0, 100.0), (120.0, 100.0)]);

        let mut seen = None;
        for frame in 0..30 {
            sim.tick(frame as f64 * 0.1, &mut surface);
            let rgb = surface
                .lines()
                .map(|c| match c {
                    DrawCommand::Line { color, .. } => color.to_rgb8(),
                    _ => unreachable!(),
                })
                .next()
                .unwrap();
            assert_eq!(*seen.get_or_insert(rgb), rgb);
        }
        assert_eq!(sim.link_colors().len(), 1);

        let id = sim.scheduler().emitters()[0].group[0].id;
        assert!(sim.remove_particle(id));
        assert!(sim.link_colors().is_empty());
    }

    #[test]
    fn hover_connect_uses_pointer() {
        let doc = format!(
            "{LINK_SCENE}\n[interactivity]\non_hover = {{ enabled = true, mode = \"connect\" }}\nconnect = {{ radius = 100.0, links = {{ link_to_pointer = true }} }}\n"
        );
        let mut sim = simulation(&doc);
        let mut surface = RecordingSurface::new();
        sim.start(0.0);
        assert!(sim.scheduler().emitters()[0].config.allow_interaction);
        place(&mut sim, 0, &[(100.0, 100.0), (200.0, 100.0)]);

        sim.set_pointer(110.0, 100.0, true);
        let stats = sim.tick(0.0, &mut surface).unwrap();
        // Pair link plus the segment to the pointer
        assert_eq!(stats.links, 2);

        sim.pointer_left();
        let stats = sim.tick(0.1, &mut surface).unwrap();
        // Group links only: 100 apart is not under the 100 px distance
        assert_eq!(stats.links, 0);
    }

    #[test]
    fn hover_keeps_group_links_of_non_interactive_emitters() {
        let doc = r##"
seed = 9

[interactivity]
on_hover = { enabled = true, mode = "connect" }
connect = { radius = 100.0, links = { link_to_pointer = true } }

[[emitters]]
allow_interaction = false
rate = { delay = 1000.0, quantity = 2 }

[emitters.particles]
total_quantity = 2
color = "#ffffff"
size = { min = 1.0, max = 1.0 }
movement = { direction = "none", speed = { min = 0.0, max = 0.0 } }

[[emitters.particles.effects]]
type = "links"
distance = 100.0
"##;
        let mut sim = simulation(doc);
        let mut surface = RecordingSurface::new();
        sim.start(0.0);
        place(&mut sim, 0, &[(100.0, 100.0), (150.0, 100.0)]);

        let stats = sim.tick(0.0, &mut surface).unwrap();
        assert_eq!(stats.links, 1);

        sim.set_pointer(120.0, 100.0, true);
        let stats = sim.tick(0.1, &mut surface).unwrap();
        assert_eq!(stats.links, 1);
    }

    #[test]
    fn pass_through_destroys_after_grace() {
        let doc = r##"
seed = 5

[particles]
total_quantity = 1
color = "#ffffff"
size = { min = 1.0, max = 1.0 }
movement = { direction = "left", speed = { min = 5.0, max = 5.0 } }
"##;
        let mut sim = simulation(doc);
        let mut surface = RecordingSurface::new();
        sim.start(0.0);
        {
            let p = &mut sim.scheduler.emitters_mut()[0].group[0];
            p.position = Vec2::new(2.0, 300.0);
        }
        sim.tick(0.0, &mut surface);
        let p = &sim.scheduler().emitters()[0].group[0];
        assert!(p.exiting);
        assert_eq!(sim.pending_tasks(), 1);

        // Still alive (and scheduled only once) inside the grace window
        sim.tick(1.0, &mut surface);
        assert_eq!(sim.scheduler().active_count(), 1);
        assert_eq!(sim.pending_tasks(), 1);

        sim.tick(2.0, &mut surface);
        assert_eq!(sim.scheduler().active_count(), 0);
        assert_eq!(sim.pending_tasks(), 0);
    }

    #[test]
    fn repulse_then_restore() {
        let doc = format!(
            "{LINK_SCENE}\n[interactivity]\non_click = {{ enabled = true, mode = \"repulse\" }}\nrepulse = {{ distance = 50.0, duration = 0.5, speed = 3.0 }}\n"
        );
        let mut sim = simulation(&doc);
        let mut surface = RecordingSurface::new();
        sim.start(0.0);
        place(&mut sim, 0, &[(100.0, 100.0), (500.0, 500.0)]);
        sim.tick(0.0, &mut surface);

        assert_eq!(sim.click(90.0, 100.0), 1);
        let v = sim.scheduler().emitters()[0].group[0].velocity;
        assert!((v.x - 3.0).abs() < 1e-4 && v.y.abs() < 1e-4);

        sim.tick(0.6, &mut surface);
        let v = sim.scheduler().emitters()[0].group[0].velocity;
        assert_eq!(v, Vec2::ZERO);
    }

    #[test]
    fn repeated_repulse_restores_pre_click_velocity() {
        let doc = format!(
            "{LINK_SCENE}\n[interactivity]\non_click = {{ enabled = true, mode = \"repulse\" }}\nrepulse = {{ distance = 50.0, duration = 0.5, speed = 3.0 }}\n"
        );
        let mut sim = simulation(&doc);
        let mut surface = RecordingSurface::new();
        sim.start(0.0);
        place(&mut sim, 0, &[(100.0, 100.0), (500.0, 500.0)]);
        sim.tick(0.0, &mut surface);

        assert_eq!(sim.click(90.0, 100.0), 1);
        sim.tick(0.1, &mut surface);
        // Second click lands while the first restore is still pending
        assert_eq!(sim.click(90.0, 100.0), 1);
        assert_eq!(sim.pending_tasks(), 1);

        // The first click's restore time has passed; the second one's has not
        sim.tick(0.55, &mut surface);
        let v = sim.scheduler().emitters()[0].group[0].velocity;
        assert!((v.x - 3.0).abs() < 1e-4 && v.y.abs() < 1e-4);

        sim.tick(0.7, &mut surface);
        let v = sim.scheduler().emitters()[0].group[0].velocity;
        assert_eq!(v, Vec2::ZERO);
        assert_eq!(sim.pending_tasks(), 0);
    }

    #[test]
    fn pop_leaves_a_burst() {
        let doc = r##"
seed = 5

[particles]
total_quantity = 2
color = "#3366ff"
size = { min = 20.0, max = 20.0 }
kind = { type = "bubble" }
movement = { direction = "none", speed = { min = 0.0, max = 0.0 } }

[interactivity]
on_click = { enabled = true, mode = "pop_bubble" }
"##;
        let mut sim = simulation(doc);
        let mut surface = RecordingSurface::new();
        sim.start(0.0);
        place(&mut sim, 0, &[(100.0, 100.0), (400.0, 400.0)]);
        sim.tick(0.0, &mut surface);
        let color = sim.scheduler().emitters()[0].group[0].color;

        assert_eq!(sim.click(105.0, 100.0), 1);
        assert_eq!(sim.scheduler().active_count(), 1);
        assert_eq!(sim.bursts().len(), 1);
        assert_eq!(sim.bursts()[0].color, color);

        let stats = sim.tick(0.1, &mut surface).unwrap();
        assert_eq!(stats.bursts, 1);
        let stats = sim.tick(0.7, &mut surface).unwrap();
        assert_eq!(stats.bursts, 0);
    }

    #[test]
    fn teardown_makes_everything_a_no_op() {
        let doc = r##"
[[emitters]]
rate = { delay = 0.5, quantity = 2 }
[emitters.particles]
color = "#fff"
size = { min = 1.0, max = 1.0 }
movement = { speed = { min = 0.0, max = 1.0 } }
"##;
        let mut sim = simulation(doc);
        let mut surface = RecordingSurface::new();
        sim.start(0.0);
        assert!(sim.pending_tasks() > 0);
        let id = sim.scheduler().emitters()[0].group[0].id;

        sim.teardown();
        assert!(!sim.is_live());
        assert_eq!(sim.pending_tasks(), 0);
        assert!(sim.tick(5.0, &mut surface).is_none());
        assert!(surface.commands.is_empty());
        assert_eq!(sim.click(0.0, 0.0), 0);
        assert_eq!(sim.spawn_burst(0, 3).unwrap(), 0);
        assert!(!sim.remove_particle(id));
        assert_eq!(sim.scheduler().active_count(), 0);
    }

    #[test]
    fn faulted_emitter_does_not_stop_others() {
        let doc = r##"
[[emitters]]
rate = { delay = 1.0, quantity = 1 }
[emitters.particles]
size = { min = 1.0, max = 1.0 }
movement = { speed = { min = 0.0, max = 1.0 } }

[[emitters]]
rate = { delay = 1.0, quantity = 1 }
[emitters.particles]
color = "#fff"
size = { min = 1.0, max = 1.0 }
movement = { speed = { min = 0.0, max = 1.0 } }
"##;
        let mut sim = simulation(doc);
        let mut surface = RecordingSurface::new();
        sim.start(0.0);
        for step in 0..=3 {
            sim.tick(step as f64, &mut surface);
        }
        let emitters = sim.scheduler().emitters();
        assert_eq!(emitters[0].status, EmitterStatus::Faulted);
        assert_eq!(emitters[1].status, EmitterStatus::Emitting);
        assert!(emitters[1].group.len() >= 3);
    }

    #[test]
    fn theme_cycle_resets_link_colours() {
        let doc = format!(
            "{LINK_SCENE}\n[[themes]]\nname = \"night\"\nselected = true\n\n[[themes]]\nname = \"day\"\n"
        );
        let mut sim = simulation(&doc);
        let mut surface = RecordingSurface::new();
        sim.start(0.0);
        place(&mut sim, 0, &[(100.0, 100.0), (120.0, 100.0)]);
        sim.tick(0.0, &mut surface);
        assert_eq!(sim.link_colors().len(), 1);
        assert_eq!(sim.cycle_theme().as_deref(), Some("day"));
        assert!(sim.link_colors().is_empty());
    }
}
