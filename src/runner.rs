//! Drives the organizer over every configured directory pair.

use crate::config::{Config, DirectoryPair};
use crate::logging::RunLog;
use crate::organizer::{DirectoryOrganizer, DirectoryReport, OrganizeError};

/// Result of one configured pair.
#[derive(Debug)]
pub struct DirectoryResult {
    pub pair: DirectoryPair,
    pub outcome: Result<DirectoryReport, OrganizeError>,
}

/// Results of a whole run, in configuration order.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub directories: Vec<DirectoryResult>,
    pub dry_run: bool,
}

impl RunSummary {
    /// Reports of the pairs that were walked to completion.
    pub fn reports(&self) -> impl Iterator<Item = &DirectoryReport> {
        self.directories.iter().filter_map(|d| d.outcome.as_ref().ok())
    }

    pub fn total_moved(&self) -> usize {
        self.reports().map(DirectoryReport::moved).sum()
    }

    pub fn total_planned(&self) -> usize {
        self.reports().map(DirectoryReport::planned).sum()
    }

    /// Files that were skipped or could not be moved, duplicates included.
    pub fn total_problems(&self) -> usize {
        self.reports()
            .map(|r| r.undated() + r.failed() + r.duplicated())
            .sum()
    }

    /// Pairs whose walk was aborted.
    pub fn aborted_directories(&self) -> usize {
        self.directories.iter().filter(|d| d.outcome.is_err()).count()
    }
}

/// Organizes every configured pair in order.
///
/// An error in one pair is logged and the run moves on to the next one.
pub fn run(config: &Config, dry_run: bool, log: &mut RunLog) -> RunSummary {
    let organizer = DirectoryOrganizer::from_config(config).dry_run(dry_run);
    let mut summary = RunSummary {
        directories: Vec::with_capacity(config.directories.len()),
        dry_run,
    };

    for pair in &config.directories {
        log.info(format!("Processing source folder: {}", pair.source.display()));

        let outcome = organizer.organize(&pair.source, &pair.target, log);
        if let Err(e) = &outcome {
            log.error(format!(
                "Error while processing folder {}: {}",
                pair.source.display(),
                e
            ));
        }

        summary.directories.push(DirectoryResult {
            pair: pair.clone(),
            outcome,
        });
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_failing_pair_does_not_stop_the_run() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let good = temp_dir.path().join("good");
        fs::create_dir(&good).expect("Failed to create source");
        fs::write(good.join("AB2024C05D17.mp4"), "video").expect("Failed to write file");
        let target = temp_dir.path().join("out");

        let config = Config {
            directories: vec![
                DirectoryPair::new(temp_dir.path().join("missing"), &target),
                DirectoryPair::new(&good, &target),
            ],
            min_file_size: 0,
            date_template: "??ГГГГ?ММ?ДД".to_string(),
        };

        let mut log = RunLog::capture();
        let summary = run(&config, false, &mut log);

        assert_eq!(summary.directories.len(), 2);
        assert_eq!(summary.aborted_directories(), 1);
        assert_eq!(summary.total_moved(), 1);
        assert!(target.join("17-05-2024/good/AB2024C05D17.mp4").exists());
        assert!(
            log.lines()
                .iter()
                .any(|l| l.contains("[ERROR] Error while processing folder"))
        );
    }

    #[test]
    fn test_empty_configuration_runs_nothing() {
        let config = Config {
            directories: Vec::new(),
            ..Config::default()
        };
        let mut log = RunLog::capture();

        let summary = run(&config, false, &mut log);

        assert!(summary.directories.is_empty());
        assert!(log.lines().is_empty());
    }
}
