//! Conso - consumption analytics dashboard
//!
//! # Usage
//!
//! ```bash
//! # Daily volume over the default window (last 31 days of data)
//! conso volume
//! conso --config conso.toml volume --granularity month --compare yoy
//!
//! # Breakdowns and leaderboards
//! conso breakdown job-type --rates --types 1,2
//! conso top --limit 5 --from 2024-01-01 --to 2024-03-31
//!
//! # Selector values and dataset overview
//! conso options organizations
//! conso summary
//! ```

mod cmd;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use conso_config::{Config, LogFormat};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Conso - consumption analytics dashboard
#[derive(Parser, Debug)]
#[command(name = "conso")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Path to configuration file (error if specified but not found)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error). Overrides config file.
    #[arg(short, long, global = true)]
    log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Event counts per day or month
    Volume(cmd::report::VolumeArgs),

    /// Event counts per category
    Breakdown(cmd::report::BreakdownArgs),

    /// Largest categories (organization leaderboard by default)
    Top(cmd::report::TopArgs),

    /// List selectable values
    Options(cmd::catalog::OptionsArgs),

    /// Dataset overview
    Summary(cmd::summary::SummaryArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref())?;
    let log_level = resolve_log_level(cli.log_level.as_deref(), &config);
    init_logging(&log_level, config.log.format)?;

    match cli.command {
        Command::Volume(args) => cmd::report::run_volume(args, &config),
        Command::Breakdown(args) => cmd::report::run_breakdown(args, &config),
        Command::Top(args) => cmd::report::run_top(args, &config),
        Command::Options(args) => cmd::catalog::run(args, &config),
        Command::Summary(args) => cmd::summary::run(args, &config),
    }
}

/// Load the config file, or defaults when none is given
fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("failed to load config from {}", path.display())),
        None => Ok(Config::default()),
    }
}

/// Resolve log level: CLI flag > config file > default "info"
fn resolve_log_level(cli_level: Option<&str>, config: &Config) -> String {
    match cli_level {
        Some(level) => level.to_string(),
        None => config.log.level.as_str().to_string(),
    }
}

/// Initialize the tracing subscriber for logging
///
/// Logs go to stderr; stdout carries the report.
fn init_logging(level: &str, format: LogFormat) -> Result<()> {
    let filter = EnvFilter::try_new(level)
        .or_else(|_| EnvFilter::try_new("info"))
        .map_err(|e| anyhow::anyhow!("invalid log level: {}", e))?;

    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Console => registry
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init(),
    }

    Ok(())
}
