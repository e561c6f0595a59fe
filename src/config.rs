//! Run configuration.
//!
//! Configuration is stored as JSON. The preferred layout lists explicit
//! source/target pairs:
//!
//! ```json
//! {
//!   "directories": [
//!     { "source": "incoming/1", "target": "archive" },
//!     { "source": "incoming/2", "target": "archive" }
//!   ],
//!   "min_file_size": 26463150,
//!   "date_template": "??ГГГГ?ММ?ДД"
//! }
//! ```
//!
//! The older layout with parallel `source_dirs` / `target_dirs` arrays is
//! still read; both arrays must have the same length.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Default file name of the configuration, relative to the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "config.json";

/// Errors that can occur while loading or creating the configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// The configuration file could not be read or written.
    Io { path: PathBuf, source: io::Error },
    /// The file is not valid JSON or has the wrong shape.
    Invalid { path: PathBuf, reason: String },
    /// `source_dirs` and `target_dirs` differ in length.
    MismatchedDirectories { sources: usize, targets: usize },
    /// The default configuration could not be serialized.
    Serialize(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io { path, source } => {
                write!(f, "IO error on configuration {}: {}", path.display(), source)
            }
            ConfigError::Invalid { path, reason } => {
                write!(f, "Invalid configuration {}: {}", path.display(), reason)
            }
            ConfigError::MismatchedDirectories { sources, targets } => write!(
                f,
                "source_dirs has {} entries but target_dirs has {}",
                sources, targets
            ),
            ConfigError::Serialize(reason) => {
                write!(f, "Failed to serialize default configuration: {}", reason)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// One source directory and the base directory its files are sorted into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryPair {
    pub source: PathBuf,
    pub target: PathBuf,
}

impl DirectoryPair {
    pub fn new(source: impl Into<PathBuf>, target: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }
}

/// Resolved configuration for one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Config {
    /// Pairs processed in order.
    pub directories: Vec<DirectoryPair>,
    /// Files smaller than this many bytes are ignored.
    pub min_file_size: u64,
    /// Positional date template, see [`crate::template`].
    pub date_template: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            directories: vec![
                DirectoryPair::new("incoming/1", "archive"),
                DirectoryPair::new("incoming/2", "archive"),
            ],
            min_file_size: 26_463_150,
            date_template: "??ГГГГ?ММ?ДД".to_string(),
        }
    }
}

/// Where the configuration of a run came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigOrigin {
    /// Read from an existing file.
    Loaded,
    /// The file was missing and the defaults were written to it.
    Created,
}

/// On-disk layout, accepting both the paired and the parallel-list forms.
#[derive(Debug, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    directories: Vec<DirectoryPair>,
    #[serde(default)]
    source_dirs: Vec<PathBuf>,
    #[serde(default)]
    target_dirs: Vec<PathBuf>,
    min_file_size: u64,
    date_template: String,
}

impl ConfigFile {
    fn resolve(self) -> Result<Config, ConfigError> {
        if self.source_dirs.len() != self.target_dirs.len() {
            return Err(ConfigError::MismatchedDirectories {
                sources: self.source_dirs.len(),
                targets: self.target_dirs.len(),
            });
        }

        let mut directories = self.directories;
        directories.extend(
            self.source_dirs
                .into_iter()
                .zip(self.target_dirs)
                .map(|(source, target)| DirectoryPair { source, target }),
        );

        Ok(Config {
            directories,
            min_file_size: self.min_file_size,
            date_template: self.date_template,
        })
    }
}

impl Config {
    /// Parses a configuration from JSON text.
    pub fn from_json(content: &str, path: &Path) -> Result<Self, ConfigError> {
        let file: ConfigFile =
            serde_json::from_str(content).map_err(|e| ConfigError::Invalid {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        file.resolve()
    }

    /// Loads the configuration at `path`, writing the defaults there first
    /// if the file does not exist.
    ///
    /// A freshly created file is not read back; the defaults are returned
    /// directly.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` for malformed JSON,
    /// `ConfigError::MismatchedDirectories` for parallel lists of unequal
    /// length, and `ConfigError::Io` when the file cannot be read or created.
    pub fn load_or_create(path: &Path) -> Result<(Self, ConfigOrigin), ConfigError> {
        match fs::read_to_string(path) {
            Ok(content) => Ok((Self::from_json(&content, path)?, ConfigOrigin::Loaded)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                let config = Self::default();
                config.save(path)?;
                Ok((config, ConfigOrigin::Created))
            }
            Err(e) => Err(ConfigError::Io {
                path: path.to_path_buf(),
                source: e,
            }),
        }
    }

    /// Writes this configuration to `path` as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::Serialize(e.to_string()))?;
        fs::write(path, json).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })
    }
}
