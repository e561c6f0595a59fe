//! Timestamped run log.
//!
//! Every event becomes one line of the form
//! `DD-MM-YYYY HH:MM:SS: [LEVEL] message`. A run writes to a daily file
//! `<log_dir>/DD-MM-YYYY.log`, opened in append mode, and mirrors each line
//! to stdout with the level colored. Files older than the retention window
//! are purged at the start of a run.

use chrono::{DateTime, Local};
use colored::*;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

/// Log files older than this many days are deleted at the start of a run.
pub const LOG_RETENTION_DAYS: u64 = 5;

const TIMESTAMP_FORMAT: &str = "%d-%m-%Y %H:%M:%S";
const FILE_NAME_FORMAT: &str = "%d-%m-%Y.log";

/// Retention window as a duration.
pub fn log_retention() -> Duration {
    Duration::from_secs(LOG_RETENTION_DAYS * 24 * 60 * 60)
}

/// Severity of a log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Warn,
    Error,
}

impl Level {
    fn tag(&self) -> &'static str {
        match self {
            Level::Info => "[INFO]",
            Level::Warn => "[WARN]",
            Level::Error => "[ERROR]",
        }
    }
}

/// Errors that prevent the run log from being opened.
#[derive(Debug)]
pub enum LogSetupError {
    /// The log directory could not be created.
    CreateDir { path: PathBuf, source: io::Error },
    /// The daily log file could not be opened for appending.
    OpenFile { path: PathBuf, source: io::Error },
}

impl std::fmt::Display for LogSetupError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CreateDir { path, source } => {
                write!(
                    f,
                    "Failed to create log directory {}: {}",
                    path.display(),
                    source
                )
            }
            Self::OpenFile { path, source } => {
                write!(f, "Failed to open log file {}: {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for LogSetupError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::CreateDir { source, .. } | Self::OpenFile { source, .. } => Some(source),
        }
    }
}

/// Formats one log line without a trailing newline.
pub fn format_line(timestamp: DateTime<Local>, level: Level, message: &str) -> String {
    format!(
        "{}: {} {}",
        timestamp.format(TIMESTAMP_FORMAT),
        level.tag(),
        message
    )
}

/// Name of the log file for the given day.
pub fn log_file_name(timestamp: DateTime<Local>) -> String {
    timestamp.format(FILE_NAME_FORMAT).to_string()
}

/// Append-only sink for run events.
pub struct RunLog {
    file: Option<File>,
    file_path: Option<PathBuf>,
    console: bool,
    captured: Option<Vec<String>>,
    file_error_reported: bool,
}

impl RunLog {
    /// Opens today's log file in `log_dir` and mirrors lines to stdout.
    ///
    /// The directory is created if needed.
    pub fn open(log_dir: &Path) -> Result<Self, LogSetupError> {
        fs::create_dir_all(log_dir).map_err(|e| LogSetupError::CreateDir {
            path: log_dir.to_path_buf(),
            source: e,
        })?;

        let path = log_dir.join(log_file_name(Local::now()));
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| LogSetupError::OpenFile {
                path: path.clone(),
                source: e,
            })?;

        Ok(Self {
            file: Some(file),
            file_path: Some(path),
            console: true,
            captured: None,
            file_error_reported: false,
        })
    }

    /// A sink that only keeps lines in memory.
    pub fn capture() -> Self {
        Self {
            file: None,
            file_path: None,
            console: false,
            captured: Some(Vec::new()),
            file_error_reported: false,
        }
    }

    /// Path of the log file, if this sink writes to one.
    pub fn file_path(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }

    /// Lines kept by a capturing sink.
    pub fn lines(&self) -> &[String] {
        self.captured.as_deref().unwrap_or(&[])
    }

    pub fn info(&mut self, message: impl AsRef<str>) {
        self.write(Level::Info, message.as_ref());
    }

    pub fn warn(&mut self, message: impl AsRef<str>) {
        self.write(Level::Warn, message.as_ref());
    }

    pub fn error(&mut self, message: impl AsRef<str>) {
        self.write(Level::Error, message.as_ref());
    }

    /// Writes one line to every destination of this sink.
    pub fn write(&mut self, level: Level, message: &str) {
        let now = Local::now();
        let line = format_line(now, level, message);

        if let Some(file) = self.file.as_mut()
            && let Err(e) = writeln!(file, "{}", line)
            && !self.file_error_reported
        {
            eprintln!("Warning: Could not write to log file: {}", e);
            self.file_error_reported = true;
        }

        if self.console {
            let timestamp = now.format(TIMESTAMP_FORMAT).to_string();
            let tag = match level {
                Level::Info => level.tag().cyan(),
                Level::Warn => level.tag().yellow(),
                Level::Error => level.tag().red(),
            };
            println!("{}: {} {}", timestamp.dimmed(), tag, message);
        }

        if let Some(captured) = self.captured.as_mut() {
            captured.push(line);
        }
    }
}

/// Deletes files in `log_dir` last modified before `now - retention`.
///
/// Subdirectories are left alone. Failures on individual files are logged
/// and skipped. Returns the number of files deleted.
pub fn purge_expired_logs(
    log_dir: &Path,
    now: SystemTime,
    retention: Duration,
    log: &mut RunLog,
) -> usize {
    let entries = match fs::read_dir(log_dir) {
        Ok(entries) => entries,
        Err(e) => {
            log.error(format!(
                "Failed to read log directory {}: {}",
                log_dir.display(),
                e
            ));
            return 0;
        }
    };

    let cutoff = now.checked_sub(retention).unwrap_or(SystemTime::UNIX_EPOCH);
    let mut removed = 0;

    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                log.error(format!(
                    "Failed to read entry in log directory {}: {}",
                    log_dir.display(),
                    e
                ));
                continue;
            }
        };
        let path = entry.path();
        let name = entry.file_name().to_string_lossy().to_string();

        let modified = match entry.metadata().and_then(|m| {
            if m.is_dir() {
                Ok(None)
            } else {
                m.modified().map(Some)
            }
        }) {
            Ok(Some(modified)) => modified,
            Ok(None) => continue,
            Err(e) => {
                log.error(format!("Failed to read metadata of log file {}: {}", name, e));
                continue;
            }
        };

        if modified < cutoff {
            match fs::remove_file(&path) {
                Ok(()) => {
                    log.info(format!("Deleted old log file: {}", name));
                    removed += 1;
                }
                Err(e) => log.error(format!("Failed to delete old log file {}: {}", name, e)),
            }
        }
    }

    removed
}
