//! clawcade - A deterministic claw-crane arcade simulation
//!
//! Headless driver: walks into the arcade, plays the crane from a scripted
//! input file, and prints a JSON run summary.

mod arcade;
mod config;
mod display;
mod fade;
mod headless;
mod level;
mod scripted_input;
mod shared;

use anyhow::{Context, Result};
use clap::Parser;
use config::ArcadeConfig;
use headless::HeadlessConfig;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about = "Run the claw-crane arcade headlessly", long_about = None)]
struct Args {
    /// Arcade configuration (TOML). Defaults to config/arcade.toml
    #[arg(long)]
    config: Option<PathBuf>,
    /// Scripted input file (JSON steps)
    #[arg(long)]
    script: Option<PathBuf>,
    /// Prize collection store; in-memory when omitted
    #[arg(long)]
    collection: Option<PathBuf>,
    /// Stop after this many ticks
    #[arg(long)]
    max_ticks: Option<u64>,
    /// Simulation ticks per second
    #[arg(long, default_value_t = 60)]
    tick_rate: u32,
    /// Write every simulation event to this JSONL file
    #[arg(long)]
    event_log: Option<PathBuf>,
    /// Stop once the scripted input has run out
    #[arg(long)]
    exit_when_script_finished: bool,
    /// Write the effective configuration to this path and exit
    #[arg(long)]
    write_config: Option<PathBuf>,
}

fn main() -> Result<()> {
    // Initialize tracing with WARN level by default (can be overridden via RUST_LOG env var)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    info!("Starting clawcade v{}", env!("CARGO_PKG_VERSION"));

    let args = Args::parse();
    let arcade = match &args.config {
        Some(path) => ArcadeConfig::load_from_path(path),
        None => ArcadeConfig::load(),
    };

    if let Some(path) = &args.write_config {
        arcade
            .save_to_path(path)
            .with_context(|| format!("failed to write config {}", path.display()))?;
        info!(path = %path.display(), "configuration written");
        return Ok(());
    }

    let summary = headless::run(HeadlessConfig {
        arcade,
        scripted_input: args.script,
        collection_path: args.collection,
        event_log: args.event_log,
        max_ticks: args.max_ticks,
        tick_rate: args.tick_rate,
        exit_when_script_finished: args.exit_when_script_finished,
    })?;
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
