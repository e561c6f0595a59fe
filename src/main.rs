use clap::Parser;
use datesort::cli::{Cli, run_cli};
use datesort::output::OutputFormatter;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run_cli(&cli) {
        Ok(summary) => {
            OutputFormatter::summary_table(&summary);
            ExitCode::SUCCESS
        }
        Err(e) => {
            OutputFormatter::error(&e);
            ExitCode::FAILURE
        }
    }
}
