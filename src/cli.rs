//! Command-line interface for datesort.
//!
//! This module handles:
//! - Argument parsing
//! - Loading (or creating) the configuration
//! - Opening the run log and purging expired log files
//! - Running the organizer over every configured pair

use crate::config::{Config, ConfigOrigin, DEFAULT_CONFIG_FILE};
use crate::logging::{self, RunLog};
use crate::runner::{self, RunSummary};
use clap::Parser;
use std::path::PathBuf;
use std::time::SystemTime;

/// Move files into dated folders based on the date in their names.
#[derive(Debug, Clone, Parser)]
#[command(name = "datesort", version, about)]
pub struct Cli {
    /// Path to the JSON configuration; created with defaults if missing.
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Directory for the daily log files.
    #[arg(long, default_value = "logs")]
    pub log_dir: PathBuf,

    /// Show what would be moved without creating folders or moving files.
    #[arg(long)]
    pub dry_run: bool,
}

/// Runs one complete sorting pass.
///
/// Only configuration and log setup failures are returned as errors; every
/// problem during processing is logged and reflected in the summary.
///
/// # Examples
///
/// ```no_run
/// use datesort::cli::{Cli, run_cli};
/// use clap::Parser;
///
/// let cli = Cli::parse_from(["datesort", "--config", "config.json"]);
/// match run_cli(&cli) {
///     Ok(summary) => println!("Moved {} files", summary.total_moved()),
///     Err(e) => eprintln!("Error: {}", e),
/// }
/// ```
pub fn run_cli(cli: &Cli) -> Result<RunSummary, String> {
    let (config, origin) = Config::load_or_create(&cli.config)
        .map_err(|e| format!("Error loading configuration: {}", e))?;

    let mut log = RunLog::open(&cli.log_dir)
        .map_err(|e| format!("Error creating log file: {}", e))?;

    log.info("Program started");
    if origin == ConfigOrigin::Created {
        log.info(format!(
            "Configuration not found, defaults written to {}",
            cli.config.display()
        ));
    }
    if cli.dry_run {
        log.info("[DRY RUN] No folders will be created and no files moved");
    }

    logging::purge_expired_logs(
        &cli.log_dir,
        SystemTime::now(),
        logging::log_retention(),
        &mut log,
    );

    let summary = runner::run(&config, cli.dry_run, &mut log);

    log.info("Program finished");
    Ok(summary)
}
