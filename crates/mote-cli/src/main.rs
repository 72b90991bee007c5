//! Mote CLI - Command-line interface for the Mote particle engine

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{init, run, validate};

#[derive(Parser)]
#[command(name = "mote")]
#[command(about = "Headless runner and tooling for Mote particle configurations", long_about = None)]
#[command(version)]
struct Cli {
    /// Raise log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a starter particle configuration
    Init {
        /// Output file path
        #[arg(default_value = "particles.toml")]
        path: String,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Run a configuration headlessly and report what happened
    Run {
        /// Path to configuration file
        config: String,

        /// Canvas width in device pixels (also used for breakpoints)
        #[arg(long, default_value = "800")]
        width: f32,

        /// Canvas height in device pixels
        #[arg(long, default_value = "600")]
        height: f32,

        /// Number of host callbacks to simulate
        #[arg(long, default_value = "300")]
        frames: u64,

        /// Host callback rate in Hz
        #[arg(long, default_value = "60")]
        fps: f64,

        /// Override the configuration's seed
        #[arg(long)]
        seed: Option<u32>,

        /// Output format (text or json)
        #[arg(long, default_value = "text", value_parser = parse_format)]
        format: String,

        /// Include the last executed frame's draw commands (json only)
        #[arg(long)]
        dump_frame: bool,
    },

    /// Validate a configuration and trial-spawn every emitter
    Validate {
        /// Path to configuration file
        config: String,

        /// Viewport width used to resolve responsive breakpoints
        #[arg(long, default_value = "1920")]
        viewport_width: f32,

        /// Viewport height for the trial canvas
        #[arg(long, default_value = "1080")]
        viewport_height: f32,

        /// Output format (text or json)
        #[arg(long, default_value = "text", value_parser = parse_format)]
        format: String,
    },
}

fn parse_format(s: &str) -> Result<String, String> {
    match s {
        "text" | "json" => Ok(s.to_string()),
        _ => Err(format!("unknown format '{}'; valid values: text, json", s)),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG still wins when set
    let default_filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    match cli.command {
        Commands::Init { path, force } => init::run(&path, force),
        Commands::Run {
            config,
            width,
            height,
            frames,
            fps,
            seed,
            format,
            dump_frame,
        } => run::run(run::RunArgs {
            config,
            width,
            height,
            frames,
            fps,
            seed,
            format,
            dump_frame,
        }),
        Commands::Validate {
            config,
            viewport_width,
            viewport_height,
            format,
        } => validate::run(validate::ValidateArgs {
            config,
            viewport_width,
            viewport_height,
            format,
        }),
    }
}
