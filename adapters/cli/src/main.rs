#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that drives the spawn director headlessly.

mod host;
mod report;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use spawn_director_core::{DirectorConfig, Stage};
use spawn_director_system_rules::RuleRegistry;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use crate::host::{simulate, RunSettings};
use crate::report::Report;

/// Live enemies the headless host can hold at once.
const POOL_LIMIT: usize = 256;

#[derive(Debug, Parser)]
#[command(name = "spawn-director", version, about = "Headless spawn director runner")]
struct Cli {
    /// TOML file overriding the shipped tuning.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Emit director decisions at debug level.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Simulate one stage and print its spawn report.
    Simulate {
        /// Stage to run.
        #[arg(long, default_value_t = 1)]
        stage: u8,

        /// Simulated seconds.
        #[arg(long, default_value_t = 180.0)]
        seconds: f32,

        /// Fixed update rate.
        #[arg(long, default_value_t = 60)]
        hz: u32,

        /// Encounter seed replacing the configured one.
        #[arg(long)]
        seed: Option<u64>,

        /// Print every spawn record as a JSON line instead of the report.
        #[arg(long)]
        json: bool,
    },
    /// Print the registered rule set.
    Rules {
        /// Print the rules as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Simulate every stage and print one summary line per stage.
    Sweep {
        /// Simulated seconds per stage.
        #[arg(long, default_value_t = 180.0)]
        seconds: f32,

        /// Fixed update rate.
        #[arg(long, default_value_t = 60)]
        hz: u32,

        /// Encounter seed replacing the configured one.
        #[arg(long)]
        seed: Option<u64>,

        /// Print each stage report as JSON.
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = match &cli.config {
        Some(path) => DirectorConfig::from_path(path)
            .with_context(|| format!("failed to load director config from {}", path.display()))?,
        None => DirectorConfig::default(),
    };

    match cli.command {
        Commands::Simulate {
            stage,
            seconds,
            hz,
            seed,
            json,
        } => {
            if let Some(seed) = seed {
                config.seed = seed;
            }
            let stage = Stage::new(stage);
            let outcome = simulate(&config, settings(stage, seconds, hz));
            if json {
                for record in &outcome.records {
                    println!(
                        "{}",
                        serde_json::to_string(record).context("failed to encode spawn record")?
                    );
                }
            } else {
                let report = Report::new(&config, stage, seconds, &outcome);
                print!("{report}");
                warn_unmet_quotas(&report);
            }
        }
        Commands::Rules { json } => {
            let rules = RuleRegistry::standard(&config);
            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(rules.rules())
                        .context("failed to encode rule set")?
                );
            } else {
                print!("{rules}");
            }
        }
        Commands::Sweep {
            seconds,
            hz,
            seed,
            json,
        } => {
            if let Some(seed) = seed {
                config.seed = seed;
            }
            for stage in Stage::all() {
                let outcome = simulate(&config, settings(stage, seconds, hz));
                let report = Report::new(&config, stage, seconds, &outcome);
                if json {
                    println!(
                        "{}",
                        serde_json::to_string(&report).context("failed to encode stage report")?
                    );
                } else {
                    println!("{}", report.summary_line());
                }
                warn_unmet_quotas(&report);
            }
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn settings(stage: Stage, seconds: f32, hz: u32) -> RunSettings {
    RunSettings {
        stage,
        seconds,
        hz,
        pool_limit: POOL_LIMIT,
    }
}

fn warn_unmet_quotas(report: &Report) {
    if !report.quotas_met() {
        warn!(
            stage = report.stage.get(),
            "fixed-sequence quotas not met within the simulated time"
        );
    }
}
