//! Command-line driver for the fork/future demo scenarios.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use fork_demo::{run_scenario, Clock, Params, Scenario};
use runner::SchedulerConfig;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(author, version, about = "Exercise futures, timers and the fork scheduler")]
struct Args {
    /// Scenario to run
    #[arg(value_enum)]
    scenario: Scenario,

    /// Delay of the fast branch, in milliseconds
    #[arg(long, default_value_t = 50)]
    fast_ms: u64,

    /// Delay of the slow branch, in milliseconds
    #[arg(long, default_value_t = 80)]
    slow_ms: u64,

    /// Deadline used by the `deadline` scenario, in milliseconds
    #[arg(long, default_value_t = 60)]
    deadline_ms: u64,

    /// Events emitted per fork in the `fork` scenario
    #[arg(long, default_value_t = 3)]
    ticks: u64,

    /// Sleep on the wall clock instead of jumping between deadlines
    #[arg(long)]
    realtime: bool,

    /// JSON file with scheduler settings
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    init_tracing();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => SchedulerConfig::from_path(path)
            .with_context(|| format!("failed to load scheduler config {path:?}"))?,
        None => SchedulerConfig::labelled("fork-demo"),
    };
    let params = Params {
        fast: Duration::from_millis(args.fast_ms),
        slow: Duration::from_millis(args.slow_ms),
        deadline: Duration::from_millis(args.deadline_ms),
        ticks: args.ticks,
    };
    let clock = if args.realtime {
        Clock::Realtime
    } else {
        Clock::Virtual
    };

    let lines = run_scenario(args.scenario, &params, &config, clock)
        .with_context(|| format!("scenario {:?} failed", args.scenario))?;
    info!(lines = lines.len(), "scenario finished");
    for line in lines {
        println!("{line}");
    }
    Ok(())
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // Ignore error if already set (e.g., during tests).
    let _ = fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .try_init();
}
