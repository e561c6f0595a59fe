/// Sorting one source tree into dated folders.
///
/// The organizer walks a source directory, picks every non-directory entry at
/// least `min_file_size` bytes large, extracts a date from its name and moves
/// it to `<target>/<day>-<month>-<year>/<source dir name>/<file name>`.
///
/// Problems with a single file are recorded in the [`DirectoryReport`] and
/// the walk continues. Failing to create a destination folder or to read the
/// tree stops the walk for that source directory.
use crate::config::Config;
use crate::logging::RunLog;
use crate::mover::{self, MoveError};
use crate::template::{self, ExtractedDate, TemplateError};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Errors that abort the walk of a source directory.
#[derive(Debug)]
pub enum OrganizeError {
    /// A dated destination folder could not be created.
    CreateFolder {
        path: PathBuf,
        source: std::io::Error,
    },
    /// The source tree could not be read.
    Traversal {
        path: PathBuf,
        source: walkdir::Error,
    },
}

impl std::fmt::Display for OrganizeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CreateFolder { path, source } => {
                write!(f, "Failed to create folder {}: {}", path.display(), source)
            }
            Self::Traversal { path, source } => {
                write!(f, "Failed to read {}: {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for OrganizeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::CreateFolder { source, .. } => Some(source),
            Self::Traversal { source, .. } => Some(source),
        }
    }
}

/// Result type for organizing a directory.
pub type OrganizeResult<T> = Result<T, OrganizeError>;

/// What happened to one candidate file.
#[derive(Debug)]
pub enum FileOutcome {
    /// The file was moved.
    Moved { from: PathBuf, to: PathBuf },
    /// Dry run: the file would have been moved.
    Planned { from: PathBuf, to: PathBuf },
    /// No date could be extracted from the file name.
    Undated { path: PathBuf, error: TemplateError },
    /// The move failed and the source is still in place.
    Failed { path: PathBuf, error: MoveError },
    /// The copy succeeded but the source could not be removed.
    Duplicated { path: PathBuf, error: MoveError },
}

/// Everything that happened while organizing one source directory.
#[derive(Debug, Default)]
pub struct DirectoryReport {
    /// One entry per candidate file, in walk order.
    pub outcomes: Vec<FileOutcome>,
    /// Dated folders created during the walk.
    pub folders_created: usize,
    /// Files ignored for being smaller than the minimum size.
    pub below_min_size: usize,
}

impl DirectoryReport {
    pub fn moved(&self) -> usize {
        self.count(|o| matches!(o, FileOutcome::Moved { .. }))
    }

    pub fn planned(&self) -> usize {
        self.count(|o| matches!(o, FileOutcome::Planned { .. }))
    }

    pub fn undated(&self) -> usize {
        self.count(|o| matches!(o, FileOutcome::Undated { .. }))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, FileOutcome::Failed { .. }))
    }

    pub fn duplicated(&self) -> usize {
        self.count(|o| matches!(o, FileOutcome::Duplicated { .. }))
    }

    fn count(&self, predicate: impl Fn(&FileOutcome) -> bool) -> usize {
        self.outcomes.iter().filter(|o| predicate(o)).count()
    }
}

/// Computes `<target_base>/<day>-<month>-<year>/<name of source_dir>`.
///
/// The last segment is omitted when `source_dir` has no final name
/// component, e.g. `/`.
pub fn destination_folder(target_base: &Path, date: &ExtractedDate, source_dir: &Path) -> PathBuf {
    let dated = target_base.join(date.folder_name());
    match source_dir.file_name() {
        Some(name) => dated.join(name),
        None => dated,
    }
}

/// Sorts files of a source tree into dated folders.
pub struct DirectoryOrganizer {
    min_file_size: u64,
    date_template: String,
    dry_run: bool,
}

impl DirectoryOrganizer {
    pub fn new(min_file_size: u64, date_template: impl Into<String>) -> Self {
        Self {
            min_file_size,
            date_template: date_template.into(),
            dry_run: false,
        }
    }

    /// Builds an organizer from the size filter and template of `config`.
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.min_file_size, config.date_template.clone())
    }

    /// In a dry run no folders are created and no files are moved.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Walks `source_dir` and sorts every candidate file below `target_base`.
    ///
    /// # Errors
    ///
    /// Returns `OrganizeError::Traversal` if the tree cannot be read and
    /// `OrganizeError::CreateFolder` if a dated folder cannot be created.
    /// Files handled before the error stay where they were moved.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use datesort::logging::RunLog;
    /// use datesort::organizer::DirectoryOrganizer;
    /// use std::path::Path;
    ///
    /// let mut log = RunLog::capture();
    /// let organizer = DirectoryOrganizer::new(1024, "??ГГГГ?ММ?ДД");
    /// match organizer.organize(Path::new("/data/in/1"), Path::new("/data/out"), &mut log) {
    ///     Ok(report) => println!("Moved {} files", report.moved()),
    ///     Err(e) => eprintln!("Stopped: {}", e),
    /// }
    /// ```
    pub fn organize(
        &self,
        source_dir: &Path,
        target_base: &Path,
        log: &mut RunLog,
    ) -> OrganizeResult<DirectoryReport> {
        let mut report = DirectoryReport::default();
        let mut planned_folders = HashSet::new();

        for entry in WalkDir::new(source_dir) {
            let entry = entry.map_err(|e| OrganizeError::Traversal {
                path: e.path().unwrap_or(source_dir).to_path_buf(),
                source: e,
            })?;

            if entry.file_type().is_dir() {
                continue;
            }

            let metadata = entry.metadata().map_err(|e| OrganizeError::Traversal {
                path: entry.path().to_path_buf(),
                source: e,
            })?;
            if metadata.len() < self.min_file_size {
                report.below_min_size += 1;
                continue;
            }

            let outcome = self.process_file(
                entry.path(),
                source_dir,
                target_base,
                &mut report,
                &mut planned_folders,
                log,
            )?;
            report.outcomes.push(outcome);
        }

        Ok(report)
    }

    fn process_file(
        &self,
        path: &Path,
        source_dir: &Path,
        target_base: &Path,
        report: &mut DirectoryReport,
        planned_folders: &mut HashSet<PathBuf>,
        log: &mut RunLog,
    ) -> OrganizeResult<FileOutcome> {
        let file_name = path.file_name().unwrap_or_default();
        let name = file_name.to_string_lossy();

        let date = match template::extract_date(&name, &self.date_template) {
            Ok(date) => date,
            Err(error) => {
                log.error(format!("Failed to extract date from file {}: {}", name, error));
                return Ok(FileOutcome::Undated {
                    path: path.to_path_buf(),
                    error,
                });
            }
        };

        let folder = destination_folder(target_base, &date, source_dir);
        let destination = folder.join(file_name);

        if self.dry_run {
            if !folder.exists() && planned_folders.insert(folder.clone()) {
                log.info(format!("[DRY RUN] Would create folder: {}", folder.display()));
            }
            if let Err(error) = mover::ensure_vacant(&destination) {
                log.error(format!(
                    "[DRY RUN] Cannot move file {} to {}: {}",
                    path.display(),
                    destination.display(),
                    error
                ));
                return Ok(FileOutcome::Failed {
                    path: path.to_path_buf(),
                    error,
                });
            }
            log.info(format!(
                "[DRY RUN] Would move file {} to {}",
                path.display(),
                destination.display()
            ));
            return Ok(FileOutcome::Planned {
                from: path.to_path_buf(),
                to: destination,
            });
        }

        if !folder.exists() {
            if let Err(e) = fs::create_dir_all(&folder) {
                log.error(format!("Failed to create folder {}: {}", folder.display(), e));
                return Err(OrganizeError::CreateFolder {
                    path: folder,
                    source: e,
                });
            }
            report.folders_created += 1;
            log.info(format!("Created folder: {}", folder.display()));
        }

        match mover::move_file(path, &destination) {
            Ok(_) => {
                log.info(format!(
                    "File {} moved to {}",
                    path.display(),
                    destination.display()
                ));
                Ok(FileOutcome::Moved {
                    from: path.to_path_buf(),
                    to: destination,
                })
            }
            Err(error) if error.left_duplicate() => {
                log.warn(format!("File exists in both locations: {}", error));
                Ok(FileOutcome::Duplicated {
                    path: path.to_path_buf(),
                    error,
                })
            }
            Err(error) => {
                log.error(format!(
                    "Failed to move file {} to {}: {}",
                    path.display(),
                    destination.display(),
                    error
                ));
                Ok(FileOutcome::Failed {
                    path: path.to_path_buf(),
                    error,
                })
            }
        }
    }
}
