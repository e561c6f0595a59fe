//! Console output outside the run log.
//!
//! Fatal setup errors and the end-of-run summary table are printed here; all
//! per-file events go through [`crate::logging::RunLog`] instead.

use crate::runner::RunSummary;
use colored::*;

pub struct OutputFormatter;

impl OutputFormatter {
    /// Prints an error message in red with an X mark.
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Prints a warning message in yellow with a warning symbol.
    pub fn warning(message: &str) {
        println!("{} {}", "⚠".yellow(), message);
    }

    /// Prints a section header.
    pub fn header(header: &str) {
        println!("\n{}", header.bold());
    }

    /// Prints one row per configured pair with its counts.
    ///
    /// ```no_run
    /// use datesort::output::OutputFormatter;
    /// use datesort::runner::RunSummary;
    ///
    /// OutputFormatter::summary_table(&RunSummary::default());
    /// ```
    pub fn summary_table(summary: &RunSummary) {
        Self::header(if summary.dry_run {
            "DRY RUN SUMMARY"
        } else {
            "SUMMARY"
        });

        let rows: Vec<(String, String)> = summary
            .directories
            .iter()
            .map(|d| {
                let name = d.pair.source.display().to_string();
                let detail = match &d.outcome {
                    Ok(report) => {
                        let done = if summary.dry_run {
                            format!("{} planned", report.planned())
                        } else {
                            format!("{} moved", report.moved())
                        };
                        format!(
                            "{}, {} undated, {} failed, {} duplicated, {} too small",
                            done.green(),
                            report.undated(),
                            report.failed(),
                            report.duplicated(),
                            report.below_min_size
                        )
                    }
                    Err(e) => format!("{} {}", "aborted:".red(), e),
                };
                (name, detail)
            })
            .collect();

        let width = rows
            .iter()
            .map(|(name, _)| name.len())
            .max()
            .unwrap_or(0)
            .max(6); // At least "Source" width

        println!("{:<width$} | {}", "Source".bold(), "Result".bold(), width = width);
        println!("{}", "-".repeat(width + 10));
        for (name, detail) in &rows {
            println!("{:<width$} | {}", name, detail, width = width);
        }
        println!("{}", "-".repeat(width + 10));

        let total = if summary.dry_run {
            summary.total_planned()
        } else {
            summary.total_moved()
        };
        let file_word = if total == 1 { "file" } else { "files" };
        println!(
            "{:<width$} | {} {}",
            "Total".bold(),
            total.to_string().green().bold(),
            file_word,
            width = width
        );

        if summary.total_problems() > 0 || summary.aborted_directories() > 0 {
            Self::warning("Some files could not be organized. Please review the log.");
        }
    }
}
