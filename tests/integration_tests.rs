use datesort::cli::{Cli, run_cli};
use datesort::config::{Config, DirectoryPair};
use datesort::logging::RunLog;
use datesort::organizer::DirectoryOrganizer;
use datesort::runner;
/// Integration tests for datesort
///
/// These tests build real source and target trees in temporary directories
/// and run the organizer, the run coordinator and the full CLI pass on them.
///
/// Test categories:
/// 1. Date extraction and destination layout
/// 2. Size filtering
/// 3. Multiple source directories
/// 4. Collisions and repeated runs
/// 5. Full CLI runs: configuration, log files and retention
use filetime::{FileTime, set_file_mtime};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tempfile::TempDir;

// ============================================================================
// Test Utilities
// ============================================================================

const TEMPLATE: &str = "??ГГГГ?ММ?ДД";

/// A temporary workspace with `in/` and `out/` directories.
struct TestFixture {
    temp_dir: TempDir,
}

impl TestFixture {
    fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        TestFixture { temp_dir }
    }

    fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Path of a source directory, created on first use.
    fn source(&self, name: &str) -> PathBuf {
        let dir = self.path().join("in").join(name);
        fs::create_dir_all(&dir).expect("Failed to create source directory");
        dir
    }

    fn target(&self) -> PathBuf {
        self.path().join("out")
    }

    /// Create a file of `size` bytes under `dir`.
    fn create_sized_file(&self, dir: &Path, name: &str, size: usize) -> PathBuf {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        let content: Vec<u8> = (0..size).map(|i| (i % 251) as u8).collect();
        fs::write(&path, content).expect("Failed to write file");
        path
    }

    fn config(&self, directories: Vec<DirectoryPair>, min_file_size: u64) -> Config {
        Config {
            directories,
            min_file_size,
            date_template: TEMPLATE.to_string(),
        }
    }

    /// Write a configuration file and return a CLI pointing at it.
    fn cli(&self, config: &Config) -> Cli {
        let config_path = self.path().join("config.json");
        config.save(&config_path).expect("Failed to save config");
        Cli {
            config: config_path,
            log_dir: self.path().join("logs"),
            dry_run: false,
        }
    }

    fn assert_file_exists(&self, rel_path: &str) {
        let path = self.path().join(rel_path);
        assert!(path.is_file(), "File should exist: {}", path.display());
    }

    fn assert_not_exists(&self, rel_path: &str) {
        let path = self.path().join(rel_path);
        assert!(!path.exists(), "Path should not exist: {}", path.display());
    }

    /// All files below `out/`, relative to the fixture root.
    fn target_files(&self) -> Vec<String> {
        let mut files = Vec::new();
        Self::walk_dir(&self.target(), &mut files);
        let mut relative: Vec<String> = files
            .iter()
            .map(|p| {
                p.strip_prefix(self.path())
                    .expect("File outside fixture")
                    .to_string_lossy()
                    .replace('\\', "/")
            })
            .collect();
        relative.sort();
        relative
    }

    fn walk_dir(dir: &Path, files: &mut Vec<PathBuf>) {
        if let Ok(entries) = fs::read_dir(dir) {
            for entry in entries.flatten() {
                let path = entry.path();
                if path.is_file() {
                    files.push(path);
                } else if path.is_dir() {
                    Self::walk_dir(&path, files);
                }
            }
        }
    }
}

fn backdate(path: &Path, days: u64) {
    let when = SystemTime::now() - Duration::from_secs(days * 24 * 60 * 60);
    set_file_mtime(path, FileTime::from_system_time(when)).expect("Failed to set mtime");
}

// ============================================================================
// Test Suite 1: Date Extraction and Layout
// ============================================================================

#[test]
fn test_file_lands_in_dated_folder() {
    let fixture = TestFixture::new();
    let source = fixture.source("1");
    fixture.create_sized_file(&source, "AB2024C05D17", 64);

    let mut log = RunLog::capture();
    let report = DirectoryOrganizer::new(10, TEMPLATE)
        .organize(&source, &fixture.target(), &mut log)
        .expect("Organize failed");

    assert_eq!(report.moved(), 1);
    fixture.assert_file_exists("out/17-05-2024/1/AB2024C05D17");
    fixture.assert_not_exists("in/1/AB2024C05D17");
}

#[test]
fn test_moved_bytes_are_identical() {
    let fixture = TestFixture::new();
    let source = fixture.source("cam");
    let original = fixture.create_sized_file(&source, "XX2023Y12Z31.mov", 300_000);
    let expected = fs::read(&original).expect("Failed to read original");

    let mut log = RunLog::capture();
    DirectoryOrganizer::new(0, TEMPLATE)
        .organize(&source, &fixture.target(), &mut log)
        .expect("Organize failed");

    let moved = fs::read(fixture.target().join("31-12-2023/cam/XX2023Y12Z31.mov"))
        .expect("Failed to read moved file");
    assert_eq!(moved, expected);
    assert!(!original.exists());
}

#[test]
fn test_nested_files_are_flattened_into_dated_folders() {
    let fixture = TestFixture::new();
    let source = fixture.source("1");
    fixture.create_sized_file(&source, "deep/er/AB2024C05D17.mp4", 16);
    fixture.create_sized_file(&source, "AB2024C06D01.mp4", 16);

    let mut log = RunLog::capture();
    let report = DirectoryOrganizer::new(0, TEMPLATE)
        .organize(&source, &fixture.target(), &mut log)
        .expect("Organize failed");

    assert_eq!(report.moved(), 2);
    assert_eq!(
        fixture.target_files(),
        vec![
            "out/01-06-2024/1/AB2024C06D01.mp4".to_string(),
            "out/17-05-2024/1/AB2024C05D17.mp4".to_string(),
        ]
    );
    // Directories themselves are never moved
    assert!(source.join("deep/er").is_dir());
}

#[test]
fn test_undated_and_short_names_are_skipped() {
    let fixture = TestFixture::new();
    let source = fixture.source("1");
    fixture.create_sized_file(&source, "README", 16);
    fixture.create_sized_file(&source, "ABxxxxCyyDzz", 16);
    fixture.create_sized_file(&source, "AB2024C05D17", 16);

    let mut log = RunLog::capture();
    let report = DirectoryOrganizer::new(0, TEMPLATE)
        .organize(&source, &fixture.target(), &mut log)
        .expect("Organize failed");

    assert_eq!(report.undated(), 2);
    assert_eq!(report.moved(), 1);
    fixture.assert_file_exists("in/1/README");
    fixture.assert_file_exists("in/1/ABxxxxCyyDzz");
    let errors = log
        .lines()
        .iter()
        .filter(|l| l.contains("[ERROR] Failed to extract date"))
        .count();
    assert_eq!(errors, 2);
}

#[test]
fn test_invalid_template_skips_every_file() {
    let fixture = TestFixture::new();
    let source = fixture.source("1");
    fixture.create_sized_file(&source, "AB2024C05D17", 16);

    let mut log = RunLog::capture();
    let report = DirectoryOrganizer::new(0, "??YYYY?ММ?ДД")
        .organize(&source, &fixture.target(), &mut log)
        .expect("Organize failed");

    assert_eq!(report.undated(), 1);
    assert!(log.lines()[0].contains("'Y'"));
    fixture.assert_file_exists("in/1/AB2024C05D17");
}

// ============================================================================
// Test Suite 2: Size Filtering
// ============================================================================

#[test]
fn test_small_files_are_never_considered() {
    let fixture = TestFixture::new();
    let source = fixture.source("1");
    fixture.create_sized_file(&source, "AB2024C05D17", 99);
    fixture.create_sized_file(&source, "not-a-date", 99);
    fixture.create_sized_file(&source, "AB2024C05D18", 100);

    let mut log = RunLog::capture();
    let report = DirectoryOrganizer::new(100, TEMPLATE)
        .organize(&source, &fixture.target(), &mut log)
        .expect("Organize failed");

    assert_eq!(report.below_min_size, 2);
    assert_eq!(report.outcomes.len(), 1);
    assert_eq!(report.moved(), 1);
    fixture.assert_file_exists("in/1/AB2024C05D17");
    fixture.assert_file_exists("out/18-05-2024/1/AB2024C05D18");
    // A too-small file with an undated name produces no log line at all
    assert!(!log.lines().iter().any(|l| l.contains("not-a-date")));
}

// ============================================================================
// Test Suite 3: Multiple Source Directories
// ============================================================================

#[test]
fn test_sources_sharing_a_target_are_kept_apart() {
    let fixture = TestFixture::new();
    let first = fixture.source("1");
    let second = fixture.source("2");
    fixture.create_sized_file(&first, "AA2024C05D17.mp4", 32);
    fixture.create_sized_file(&second, "BB2024C05D17.mp4", 32);

    let config = fixture.config(
        vec![
            DirectoryPair::new(&first, fixture.target()),
            DirectoryPair::new(&second, fixture.target()),
        ],
        1,
    );

    let mut log = RunLog::capture();
    let summary = runner::run(&config, false, &mut log);

    assert_eq!(summary.total_moved(), 2);
    assert_eq!(
        fixture.target_files(),
        vec![
            "out/17-05-2024/1/AA2024C05D17.mp4".to_string(),
            "out/17-05-2024/2/BB2024C05D17.mp4".to_string(),
        ]
    );
    let processing = log
        .lines()
        .iter()
        .filter(|l| l.contains("[INFO] Processing source folder"))
        .count();
    assert_eq!(processing, 2);
}

#[test]
fn test_aborted_pair_does_not_block_later_pairs() {
    let fixture = TestFixture::new();
    let first = fixture.source("1");
    let second = fixture.source("2");
    fixture.create_sized_file(&first, "AA2024C05D17.mp4", 32);
    fixture.create_sized_file(&second, "BB2024C05D17.mp4", 32);
    let blocked_target = fixture.path().join("blocked");
    fs::write(&blocked_target, "a file, not a directory").expect("Failed to write blocker");

    let config = fixture.config(
        vec![
            DirectoryPair::new(&first, &blocked_target),
            DirectoryPair::new(&second, fixture.target()),
        ],
        1,
    );

    let mut log = RunLog::capture();
    let summary = runner::run(&config, false, &mut log);

    assert_eq!(summary.aborted_directories(), 1);
    assert_eq!(summary.total_moved(), 1);
    fixture.assert_file_exists("in/1/AA2024C05D17.mp4");
    fixture.assert_file_exists("out/17-05-2024/2/BB2024C05D17.mp4");
}

// ============================================================================
// Test Suite 4: Collisions and Repeated Runs
// ============================================================================

#[test]
fn test_collision_leaves_both_files_untouched() {
    let fixture = TestFixture::new();
    let source = fixture.source("1");
    let incoming = fixture.create_sized_file(&source, "AB2024C05D17", 10);
    let existing = fixture.create_sized_file(
        &fixture.target().join("17-05-2024/1"),
        "AB2024C05D17",
        20,
    );
    let incoming_bytes = fs::read(&incoming).unwrap();
    let existing_bytes = fs::read(&existing).unwrap();

    let mut log = RunLog::capture();
    let report = DirectoryOrganizer::new(0, TEMPLATE)
        .organize(&source, &fixture.target(), &mut log)
        .expect("Organize failed");

    assert_eq!(report.failed(), 1);
    assert_eq!(fs::read(&incoming).unwrap(), incoming_bytes);
    assert_eq!(fs::read(&existing).unwrap(), existing_bytes);
    assert!(
        log.lines()
            .iter()
            .any(|l| l.contains("Destination file already exists"))
    );
}

#[test]
fn test_second_run_does_nothing() {
    let fixture = TestFixture::new();
    let source = fixture.source("1");
    fixture.create_sized_file(&source, "AB2024C05D17", 50);
    fixture.create_sized_file(&source, "AB2024C05D18", 50);
    fixture.create_sized_file(&source, "small", 5);

    let organizer = DirectoryOrganizer::new(10, TEMPLATE);
    let mut log = RunLog::capture();
    let first = organizer
        .organize(&source, &fixture.target(), &mut log)
        .expect("First run failed");
    assert_eq!(first.moved(), 2);
    assert_eq!(first.folders_created, 2);

    let mut log = RunLog::capture();
    let second = organizer
        .organize(&source, &fixture.target(), &mut log)
        .expect("Second run failed");

    assert_eq!(second.moved(), 0);
    assert_eq!(second.folders_created, 0);
    assert!(second.outcomes.is_empty());
    assert!(log.lines().is_empty());
}

#[test]
fn test_dry_run_reports_without_touching_anything() {
    let fixture = TestFixture::new();
    let source = fixture.source("1");
    fixture.create_sized_file(&source, "AB2024C05D17", 50);

    let config = fixture.config(vec![DirectoryPair::new(&source, fixture.target())], 1);
    let mut log = RunLog::capture();
    let summary = runner::run(&config, true, &mut log);

    assert!(summary.dry_run);
    assert_eq!(summary.total_planned(), 1);
    assert_eq!(summary.total_moved(), 0);
    fixture.assert_file_exists("in/1/AB2024C05D17");
    fixture.assert_not_exists("out");
}

// ============================================================================
// Test Suite 5: Full CLI Runs
// ============================================================================

#[test]
fn test_cli_run_writes_log_file() {
    let fixture = TestFixture::new();
    let source = fixture.source("1");
    fixture.create_sized_file(&source, "AB2024C05D17", 50);
    let config = fixture.config(vec![DirectoryPair::new(&source, fixture.target())], 1);
    let cli = fixture.cli(&config);

    let summary = run_cli(&cli).expect("Run failed");

    assert_eq!(summary.total_moved(), 1);
    let log_files: Vec<_> = fs::read_dir(&cli.log_dir)
        .expect("Log directory missing")
        .flatten()
        .map(|e| e.path())
        .collect();
    assert_eq!(log_files.len(), 1);
    let content = fs::read_to_string(&log_files[0]).expect("Failed to read log");
    let lines: Vec<_> = content.lines().collect();
    assert!(lines.first().unwrap().ends_with("[INFO] Program started"));
    assert!(lines.last().unwrap().ends_with("[INFO] Program finished"));
    assert!(content.contains("Created folder"));
    assert!(content.contains("moved to"));
}

#[test]
fn test_cli_run_purges_expired_logs() {
    let fixture = TestFixture::new();
    let config = fixture.config(Vec::new(), 1);
    let cli = fixture.cli(&config);
    fs::create_dir_all(&cli.log_dir).expect("Failed to create log dir");
    let expired = cli.log_dir.join("01-01-2020.log");
    let kept = cli.log_dir.join("02-01-2020.log");
    fs::write(&expired, "old\n").expect("Failed to write log");
    fs::write(&kept, "recent\n").expect("Failed to write log");
    backdate(&expired, 6);
    backdate(&kept, 4);

    run_cli(&cli).expect("Run failed");

    assert!(!expired.exists());
    assert!(kept.exists());
}

#[test]
fn test_cli_run_accepts_parallel_list_config() {
    let fixture = TestFixture::new();
    let source = fixture.source("1");
    fixture.create_sized_file(&source, "AB2024C05D17", 50);
    let config_path = fixture.path().join("legacy.json");
    let json = serde_json::json!({
        "source_dirs": [source],
        "target_dirs": [fixture.target()],
        "min_file_size": 1,
        "date_template": TEMPLATE,
    });
    fs::write(&config_path, json.to_string()).expect("Failed to write config");

    let cli = Cli {
        config: config_path,
        log_dir: fixture.path().join("logs"),
        dry_run: false,
    };
    let summary = run_cli(&cli).expect("Run failed");

    assert_eq!(summary.total_moved(), 1);
    fixture.assert_file_exists("out/17-05-2024/1/AB2024C05D17");
}

#[test]
fn test_cli_run_fails_before_processing_on_bad_config() {
    let fixture = TestFixture::new();
    let source = fixture.source("1");
    fixture.create_sized_file(&source, "AB2024C05D17", 50);
    let config_path = fixture.path().join("config.json");
    fs::write(
        &config_path,
        r#"{"source_dirs": ["a", "b"], "target_dirs": ["c"], "min_file_size": 1, "date_template": "ГГГГ"}"#,
    )
    .expect("Failed to write config");

    let cli = Cli {
        config: config_path,
        log_dir: fixture.path().join("logs"),
        dry_run: false,
    };
    let result = run_cli(&cli);

    assert!(result.is_err());
    assert!(result.unwrap_err().contains("configuration"));
    fixture.assert_file_exists("in/1/AB2024C05D17");
    fixture.assert_not_exists("logs");
}

#[test]
fn test_cli_run_fails_when_log_dir_is_unusable() {
    let fixture = TestFixture::new();
    let config = fixture.config(Vec::new(), 1);
    let mut cli = fixture.cli(&config);
    cli.log_dir = fixture.path().join("not-a-dir");
    fs::write(&cli.log_dir, "file").expect("Failed to write blocker");

    let result = run_cli(&cli);

    assert!(result.is_err());
    assert!(result.unwrap_err().contains("log"));
}
