//! Headless Tilewright runner.
//!
//! Loads a level configuration, plays it with a scripted player and prints a
//! summary of the run. Logging goes to stderr and is filtered with
//! `RUST_LOG` (default `info`).
//!
//! ```text
//! tilewright-sim --config level.json --turns 200 --seed 7
//! RUST_LOG=tilewright_core=debug tilewright-sim --format events
//! ```

mod player;
mod summary;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tilewright_core::{Level, LevelConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

use player::ScriptedPlayer;
use summary::RunSummary;

/// Play a Tilewright level with a scripted player
#[derive(Parser)]
#[command(name = "tilewright-sim")]
#[command(about = "Play a Tilewright level headlessly", long_about = None)]
#[command(version)]
struct Cli {
    /// Level configuration (JSON); built-in defaults when omitted
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Maximum number of turns to play
    #[arg(short, long, default_value_t = 100)]
    turns: u32,

    /// Overrides the seed from the configuration
    #[arg(short, long)]
    seed: Option<u64>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "summary")]
    format: OutputFormat,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    /// Pretty-printed run summary
    Summary,
    /// Every level event, one JSON object per line
    Events,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = load_config(cli.config.as_ref())?;
    if let Some(seed) = cli.seed {
        config.seed = seed;
    }

    let mut level = Level::new(config).context("failed to build level")?;
    let mut player = ScriptedPlayer::new();
    let mut summary = RunSummary::new(&level);
    let mut events = level.take_events();

    for _ in 0..cli.turns {
        if level.is_over() {
            break;
        }
        player.play_turn(&mut level)?;
        events.extend(level.take_events());
    }

    summary.record(&level, &events);
    info!(
        turns = summary.turns,
        outcome = ?summary.outcome,
        health = summary.health,
        "run finished"
    );

    match cli.format {
        OutputFormat::Summary => println!("{}", serde_json::to_string_pretty(&summary)?),
        OutputFormat::Events => {
            for event in &events {
                println!("{}", serde_json::to_string(event)?);
            }
        }
    }
    Ok(())
}

fn load_config(path: Option<&PathBuf>) -> Result<LevelConfig> {
    let Some(path) = path else {
        return Ok(LevelConfig::default());
    };
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read level config: {}", path.display()))?;
    LevelConfig::from_json_str(&json)
        .with_context(|| format!("invalid level config: {}", path.display()))
}
