//! Configuration validation command

use anyhow::Result;
use mote_core::Canvas;
use mote_particles::emitter::PlayState;
use mote_particles::rand::ParticleRng;
use mote_particles::scheduler::{EmitterScheduler, SpawnContext};
use mote_particles::SystemConfig;

pub struct ValidateArgs {
    pub config: String,
    pub viewport_width: f32,
    pub viewport_height: f32,
    pub format: String,
}

/// Outcome of checking one emitter
struct EmitterCheck {
    label: String,
    error: Option<String>,
}

pub fn run(args: ValidateArgs) -> Result<()> {
    let config = match SystemConfig::load(&args.config, args.viewport_width) {
        Ok(config) => config,
        Err(err) => {
            if args.format == "json" {
                let output = serde_json::json!({
                    "valid": false,
                    "config_error": err.to_string(),
                    "emitters": [],
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else {
                println!("Configuration error: {}", err);
            }
            std::process::exit(1);
        }
    };

    let checks = check_emitters(&config, Canvas::new(args.viewport_width, args.viewport_height));
    let valid = checks.iter().all(|c| c.error.is_none());

    if args.format == "json" {
        print_report_json(&config, &checks, valid)?;
    } else {
        print_report_text(&config, &checks);
    }

    if !valid {
        std::process::exit(1);
    }
    Ok(())
}

/// Build one particle from every enabled emitter so template errors that
/// would otherwise fault the emitter at runtime show up now.
fn check_emitters(config: &SystemConfig, canvas: Canvas) -> Vec<EmitterCheck> {
    let mut scheduler = EmitterScheduler::from_config(config, canvas);
    let mut rng = ParticleRng::new(config.seed.unwrap_or(1));
    let explicit_offset = usize::from(config.particles.is_some());
    let mut checks = Vec::new();

    for key in 0..scheduler.emitters().len() {
        let state = &scheduler.emitters()[key];
        let label = if state.implicit {
            "particles".to_string()
        } else {
            format!("emitters[{}]", key - explicit_offset)
        };
        if !state.config.enabled {
            continue;
        }
        let missing_rate = !state.implicit
            && state.config.play_state() == PlayState::Play
            && state.config.rate.is_none();

        let mut ctx = SpawnContext {
            canvas,
            now: 0.0,
            rng: &mut rng,
            theme_color: config.theme_particle_color(),
        };
        let error = match scheduler.trial_spawn(key, &mut ctx) {
            Err(err) => Some(err.to_string()),
            Ok(()) if missing_rate => Some("plays without a rate".to_string()),
            Ok(()) => None,
        };
        checks.push(EmitterCheck { label, error });
    }
    checks
}

fn print_report_text(config: &SystemConfig, checks: &[EmitterCheck]) {
    if let Some(theme) = config.selected_theme() {
        println!("Theme: {}", theme.name);
    }
    if checks.is_empty() {
        println!("No emitters configured.");
        return;
    }
    for check in checks {
        match &check.error {
            None => println!("  [OK   ] {}", check.label),
            Some(message) => println!("  [ERROR] {}: {}", check.label, message),
        }
    }
    let failed = checks.iter().filter(|c| c.error.is_some()).count();
    println!();
    if failed == 0 {
        println!("All {} emitter(s) passed.", checks.len());
    } else {
        println!("{} of {} emitter(s) failed.", failed, checks.len());
    }
}

fn print_report_json(config: &SystemConfig, checks: &[EmitterCheck], valid: bool) -> Result<()> {
    let emitters: Vec<serde_json::Value> = checks
        .iter()
        .map(|c| {
            serde_json::json!({
                "emitter": c.label,
                "ok": c.error.is_none(),
                "error": c.error,
            })
        })
        .collect();

    let output = serde_json::json!({
        "valid": valid,
        "theme": config.selected_theme().map(|t| t.name.as_str()),
        "emitters": emitters,
    });

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
