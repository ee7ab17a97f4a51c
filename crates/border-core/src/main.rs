//! Border Sound Diffusion Simulation
//!
//! Agents living in Dutch and Belgian towns travel, talk and listen to the
//! radio; their pronunciation of a single sound drifts as variants spread
//! across the border.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use thiserror::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;

use border_core::config::{Config, Theory};
use border_core::error::{ConfigError, SetupError};
use border_core::output::ReportLogger;
use border_core::Simulation;
use border_events::RunHeader;

/// Command line arguments for the simulation
#[derive(Parser, Debug)]
#[command(name = "border_sim")]
#[command(about = "Agent-based simulation of sound change across a national border")]
struct Args {
    /// Random seed for reproducibility
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Number of ticks to simulate
    #[arg(long, default_value_t = 1000)]
    ticks: u64,

    /// TOML configuration file (defaults to ./border.toml if present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Experiment preset applied on top of the configuration
    #[arg(long, value_enum)]
    theory: Option<Theory>,

    /// Interval between reports (in ticks)
    #[arg(long, default_value_t = 10)]
    report_interval: u64,

    /// Write reports as JSONL to this file
    #[arg(long)]
    output: Option<PathBuf>,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    print_config: bool,
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Setup(#[from] SetupError),

    #[error("report output failed: {0}")]
    Output(#[from] std::io::Error),
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<(), CliError> {
    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::load_or_default(),
    };
    if let Some(theory) = args.theory {
        theory.apply(&mut config);
    }

    if args.print_config {
        print!("{}", config.to_toml()?);
        return Ok(());
    }

    info!(
        seed = args.seed,
        ticks = args.ticks,
        theory = args.theory.map(|t| t.name()),
        "Starting simulation"
    );
    let mut sim = Simulation::new(&config, args.seed)?;

    let mut logger = match &args.output {
        Some(path) => ReportLogger::new(path)?,
        None => ReportLogger::null(),
    };
    let mut header = RunHeader::new(
        args.seed,
        sim.agent_count() as u32,
        config.locales.len() as u32,
    );
    if let Some(theory) = args.theory {
        header = header.with_theory(theory.name());
    }
    info!(run_id = %header.run_id, "Run started");
    logger.log_header(header)?;
    logger.log_tick(sim.report())?;

    let interval = args.report_interval.max(1);
    for _ in 0..args.ticks {
        sim.step();
        if sim.current_tick() % interval == 0 {
            let report = sim.report();
            info!(
                tick = report.tick,
                home = report.counts.home,
                travelling = report.counts.travelling,
                visiting = report.counts.visiting,
                mean_sound = report.mean_sound,
                spread = report.country_spread(),
                "Report"
            );
            logger.log_tick(report)?;
        }
    }

    logger.flush()?;
    let report = sim.report();
    for (country, summary) in &report.countries {
        info!(
            country = %country,
            residents = summary.residents,
            mean_sound = summary.mean_sound,
            "Final country mean"
        );
    }
    info!(
        ticks = sim.current_tick(),
        records = logger.record_count(),
        "Simulation complete"
    );
    Ok(())
}
