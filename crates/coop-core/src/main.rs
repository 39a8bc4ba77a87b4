//! Cooperation Simulation Runner
//!
//! Runs a single configured simulation or the full parameter sweep and
//! appends run summaries and cooperation timeseries as JSON lines.

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

use coop_core::config::{Config, DEFAULT_TUNING_PATH};
use coop_core::experiment::{run_all, sweep_specs, RunSpec};
use coop_core::output::RecordWriter;
use coop_core::PayoffTable;

/// Command line arguments for the simulation
#[derive(Parser, Debug)]
#[command(name = "coop_sim")]
#[command(about = "Networked social dilemmas with local wealth redistribution")]
struct Args {
    /// Tuning file with run and sweep parameters
    #[arg(long, default_value = DEFAULT_TUNING_PATH)]
    config: PathBuf,

    /// Run the whole parameter grid from the [sweep] section
    #[arg(long)]
    sweep: bool,

    /// Random seed for the single run
    #[arg(long)]
    seed: Option<u64>,

    /// Iterations per run
    #[arg(long)]
    iterations: Option<u64>,

    /// Number of agents
    #[arg(long)]
    agents: Option<usize>,

    /// Directory for runs.jsonl and timeseries.jsonl
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    print_config: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let log_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .init();

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Could not load {}: {}", args.config.display(), e);
            return ExitCode::FAILURE;
        }
    };

    if args.print_config {
        return match config.to_toml() {
            Ok(text) => {
                println!("{}", text);
                ExitCode::SUCCESS
            }
            Err(e) => {
                tracing::error!("{}", e);
                ExitCode::FAILURE
            }
        };
    }

    let specs = if args.sweep {
        sweep_specs(&config)
    } else {
        vec![RunSpec::from_config(&config)]
    };

    if !args.sweep {
        match PayoffTable::build(config.payoff.family, config.payoff.temptation) {
            Ok(table) => tracing::info!("{} game:\n{}", config.payoff.family, table),
            Err(e) => {
                tracing::error!("{}", e);
                return ExitCode::FAILURE;
            }
        }
    }

    let mut writer =
        match RecordWriter::open(config.output.runs_path(), config.output.timeseries_path()) {
            Ok(writer) => writer,
            Err(e) => {
                tracing::error!("Could not open output files: {}", e);
                return ExitCode::FAILURE;
            }
        };

    match run_all(&specs, &mut writer) {
        Ok(count) => {
            tracing::info!(
                "Finished {} run(s); records in {}",
                count,
                config.output.dir.display()
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

/// Load the tuning file (defaults if it does not exist) and apply CLI overrides
fn load_config(args: &Args) -> Result<Config, coop_core::config::ConfigError> {
    let mut config = Config::load_or_default(&args.config)?;

    if let Some(seed) = args.seed {
        config.simulation.seed = seed;
    }
    if let Some(iterations) = args.iterations {
        config.simulation.iterations = iterations;
    }
    if let Some(agents) = args.agents {
        config.simulation.num_agents = agents;
    }
    if let Some(dir) = &args.output_dir {
        config.output.dir = dir.clone();
    }
    Ok(config)
}
