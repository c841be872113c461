//! smeltery - headless multi-slot smelting appliance simulator
//!
//! Runs the appliance for a fixed number of ticks from a TOML run
//! configuration or a saved appliance file, and writes an event log, a run
//! report and an optional save.

mod config;
mod headless;

use anyhow::Result;
use clap::Parser;
use config::{RunConfig, DEFAULT_CONFIG_PATH};
use headless::HeadlessConfig;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Headless multi-slot smelting appliance simulator", long_about = None)]
struct Args {
    /// TOML run configuration
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,
    /// Override the configured tick count
    #[arg(long)]
    ticks: Option<u64>,
    /// Resume from a saved appliance file
    #[arg(long)]
    load: Option<PathBuf>,
    /// Save the final appliance to this file (overrides `save` in the config)
    #[arg(long)]
    save: Option<PathBuf>,
    /// Write a JSONL event log
    #[arg(long)]
    events: Option<PathBuf>,
    /// Write a JSON run report
    #[arg(long)]
    report: Option<PathBuf>,
    /// Write the effective run configuration as TOML and exit
    #[arg(long)]
    dump_config: Option<PathBuf>,
    /// Log filter (overrides RUST_LOG)
    #[arg(long)]
    log: Option<String>,
}

fn env_filter(level: Option<&str>) -> EnvFilter {
    // Initialize with WARN level by default (can be overridden via RUST_LOG or --log)
    match level {
        Some(level) => EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("warn")),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(args.log.as_deref()))
        .init();

    info!("Starting smeltery v{}", env!("CARGO_PKG_VERSION"));

    let mut run = RunConfig::load_from_path(Path::new(&args.config));
    if let Some(ticks) = args.ticks {
        run.ticks = ticks;
    }

    if let Some(path) = &args.dump_config {
        run.save_to_path(path)?;
        println!("Wrote run configuration to {}", path.display());
        return Ok(());
    }

    let outcome = headless::run(HeadlessConfig {
        run,
        load: args.load,
        save: args.save,
        events: args.events,
        report: args.report,
    })?;

    let counters = &outcome.report.counters;
    println!(
        "{}: {} ticks, {} smelted, {} fuel items burned, {} ticks lit",
        outcome.report.name, counters.ticks, counters.smelted, counters.fuel_consumed, counters.burning_ticks
    );
    let state = &outcome.state;
    for index in 0..state.slot_count() {
        let stack = state.get_slot(index);
        if !stack.is_empty() {
            println!("  slot {index:>2}: {stack}");
        }
    }
    println!(
        "  cook {:.0}%, {} fuel slot(s) burning, phase {}",
        state.fraction_of_cook_complete() * 100.0,
        state.number_of_burning_fuel_slots(),
        outcome.report.final_phase.as_deref().unwrap_or("?"),
    );

    Ok(())
}
