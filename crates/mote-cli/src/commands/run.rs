//! Headless run command

use anyhow::{Context, Result};
use mote_core::Canvas;
use mote_particles::{load_config, FrameStats, ParticleSystem};
use mote_runtime::{DrawCommand, RecordingSurface, RuntimeSystem};
use serde::Serialize;

pub struct RunArgs {
    pub config: String,
    pub width: f32,
    pub height: f32,
    pub frames: u64,
    pub fps: f64,
    pub seed: Option<u32>,
    pub format: String,
    pub dump_frame: bool,
}

#[derive(Serialize)]
struct EmitterSummary {
    index: usize,
    implicit: bool,
    status: String,
    active: usize,
    spawned: usize,
}

#[derive(Serialize)]
struct RunReport {
    config: String,
    canvas: Canvas,
    callbacks: u64,
    frames_executed: u64,
    simulated_seconds: f64,
    peak_active: usize,
    peak_links: usize,
    last: Option<FrameStats>,
    particles_constructed: usize,
    emitters: Vec<EmitterSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    last_frame: Option<Vec<DrawCommand>>,
}

pub fn run(args: RunArgs) -> Result<()> {
    let report = simulate(&args)?;

    if args.format == "json" {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report_text(&report);
    }

    Ok(())
}

/// Drive the system headlessly for `args.frames` host callbacks
fn simulate(args: &RunArgs) -> Result<RunReport> {
    if args.fps <= 0.0 || !args.fps.is_finite() {
        anyhow::bail!("--fps must be a positive number, got {}", args.fps);
    }

    let mut config = load_config(&args.config, args.width)
        .with_context(|| format!("Failed to load configuration '{}'", args.config))?;
    if args.seed.is_some() {
        config.seed = args.seed;
    }

    let canvas = Canvas::new(args.width, args.height);
    let mut system = ParticleSystem::new(config, canvas);
    system.initialize(0.0)?;

    let step = 1.0 / args.fps;
    log::info!(
        "simulating {} callback(s) at {} Hz on {}x{}",
        args.frames,
        args.fps,
        args.width,
        args.height
    );
    let mut executed = 0;
    let mut peak_active = 0;
    let mut peak_links = 0;
    let mut last_frame = RecordingSurface::new();

    for callback in 0..args.frames {
        let mut surface = RecordingSurface::new();
        let now = callback as f64 * step;
        if system.update(&mut surface, now)? {
            executed += 1;
            if let Some(stats) = system.last_stats() {
                peak_active = peak_active.max(stats.active);
                peak_links = peak_links.max(stats.links);
            }
            last_frame = surface;
        }
    }

    let simulation = system.simulation();
    let emitters = simulation
        .scheduler()
        .emitters()
        .iter()
        .enumerate()
        .map(|(index, state)| EmitterSummary {
            index,
            implicit: state.implicit,
            status: format!("{:?}", state.status).to_lowercase(),
            active: state.group.len(),
            spawned: state.spawned,
        })
        .collect();

    let report = RunReport {
        config: args.config.clone(),
        canvas,
        callbacks: args.frames,
        frames_executed: executed,
        simulated_seconds: simulation.clock().total_time,
        peak_active,
        peak_links,
        last: system.last_stats(),
        particles_constructed: simulation.scheduler().pool().constructed(),
        emitters,
        last_frame: args.dump_frame.then_some(last_frame.commands),
    };

    system.shutdown()?;
    Ok(report)
}

fn print_report_text(report: &RunReport) {
    println!(
        "Ran '{}' on a {}x{} canvas",
        report.config, report.canvas.width, report.canvas.height
    );
    println!(
        "  {} frame(s) executed of {} callback(s), {:.2}s simulated",
        report.frames_executed, report.callbacks, report.simulated_seconds
    );
    println!(
        "  Peak: {} particle(s), {} link(s); {} particle(s) constructed",
        report.peak_active, report.peak_links, report.particles_constructed
    );
    if let Some(last) = &report.last {
        println!(
            "  Last frame #{}: {} active, {} pooled, {} link(s), {} burst(s)",
            last.frame, last.active, last.pooled, last.links, last.bursts
        );
    }

    println!();
    println!("Emitters:");
    for emitter in &report.emitters {
        let label = if emitter.implicit {
            "particles".to_string()
        } else {
            format!("#{}", emitter.index)
        };
        println!(
            "  {:<10} {:<9} {} active, {} spawned",
            label, emitter.status, emitter.active, emitter.spawned
        );
    }
}
