//! # Saga
//!
//! Command-line driver for the world simulation: advance time, print the
//! world context, reset the world, or dump one slice as JSON.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use saga_common::FastRandom;
use saga_engine::{SagaConfig, TimeDelta, WorldEngine, CONFIG_FILE};
use saga_sim::SubsystemKey;
use saga_world::FileStore;

/// Persistent world simulation
#[derive(Parser, Debug)]
#[command(name = "saga", version)]
#[command(about = "Advance and inspect a persistent simulated world")]
struct Args {
    /// Configuration file
    #[arg(long, default_value = CONFIG_FILE)]
    config: PathBuf,

    /// Random seed for deterministic runs (overrides the config file)
    #[arg(long)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Move time forward (or back, with negative values)
    Advance {
        /// Days to advance
        #[arg(long, short = 'd', default_value_t = 0, allow_hyphen_values = true)]
        days: i64,
        /// Hours to advance
        #[arg(long, short = 'H', default_value_t = 0, allow_hyphen_values = true)]
        hours: i64,
    },
    /// Print the world context
    Context,
    /// Discard the saved world and start over
    Reset,
    /// Print one slice of the world as JSON
    Show {
        /// Slice name (e.g. factions, economy, wars)
        slice: String,
    },
}

/// Main entry point.
fn main() -> Result<()> {
    let args = Args::parse();
    let config = SagaConfig::load_from(&args.config).with_seed(args.seed);
    config.validate()?;

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&config.log_filter))?)
        .init();

    info!("Saga {} using {}", env!("CARGO_PKG_VERSION"), config.save_dir.display());

    let rng = config.seed.map_or_else(FastRandom::new, FastRandom::with_seed);
    let store = FileStore::new(&config.save_dir);
    let mut engine = WorldEngine::from_config(store, &config, rng);

    match args.command {
        Command::Advance { days, hours } => {
            let report = engine.advance(TimeDelta::new(days, hours))?;
            for signal in &report.signals {
                println!("* {}", signal.headline());
            }
            println!("{}", engine.world_context());
        },
        Command::Context => println!("{}", engine.world_context()),
        Command::Reset => {
            engine.reset_state()?;
            println!("{}", engine.world_context());
        },
        Command::Show { slice } => {
            if SubsystemKey::from_key(&slice).is_none() && slice != "meta" {
                let known: Vec<&str> = SubsystemKey::ALL.iter().map(|k| k.key()).collect();
                bail!("unknown slice {slice:?}; expected one of: {}", known.join(", "));
            }
            let world = serde_json::to_value(engine.world())?;
            println!("{}", serde_json::to_string_pretty(&world[slice.as_str()])?);
        },
    }

    Ok(())
}
