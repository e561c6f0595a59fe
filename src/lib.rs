//! datesort - move files into dated folders
//!
//! This library extracts a date from each file name using a positional
//! template, moves qualifying files from configured source directories into
//! `<target>/<day>-<month>-<year>/<source name>/` folders without ever
//! overwriting, and records every event in a timestamped run log.

pub mod cli;
pub mod config;
pub mod logging;
pub mod mover;
pub mod organizer;
pub mod output;
pub mod runner;
pub mod template;

pub use config::{Config, ConfigError, ConfigOrigin, DirectoryPair};
pub use logging::{LogSetupError, RunLog};
pub use mover::{MoveError, move_file};
pub use organizer::{DirectoryOrganizer, DirectoryReport, FileOutcome, OrganizeError};
pub use runner::{RunSummary, run};
pub use template::{ExtractedDate, TemplateError, extract_date};

pub use cli::{Cli, run_cli};
