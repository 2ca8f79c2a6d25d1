//! Execute command implementation - applies pending migrations

use anyhow::{Context, Result};
use pgm_core::MigrationFile;
use pgm_runner::{Reporter, RunSummary, SkipReason};
use std::time::Duration;

use crate::cli::GlobalArgs;
use crate::context::Settings;

/// Prints each applied file as it commits, then `Done.`
struct ConsoleReporter {
    verbose: bool,
}

impl Reporter for ConsoleReporter {
    fn applied(&mut self, file: &MigrationFile, duration: Duration) {
        println!("{}", file.name);
        if self.verbose {
            eprintln!("[verbose]   {}ms", duration.as_millis());
        }
    }

    fn skipped(&mut self, file: &MigrationFile, reason: SkipReason) {
        if self.verbose {
            eprintln!("[verbose] Skipping {} ({})", file.name, reason);
        }
    }

    fn done(&mut self, summary: &RunSummary) {
        if self.verbose {
            eprintln!(
                "[verbose] {} applied, {} already applied, {}ms",
                summary.applied.len(),
                summary.skipped.len(),
                summary.duration.as_millis()
            );
        }
        println!("Done.");
    }
}

/// Execute the execute command
pub(crate) fn execute(global: &GlobalArgs) -> Result<()> {
    let settings = Settings::load(global)?;
    let runner = settings.runner()?;
    settings.verbose(&format!(
        "Applying migrations from {}",
        runner.migrations_dir().display()
    ));

    let mut reporter = ConsoleReporter {
        verbose: settings.verbose,
    };
    runner
        .run(&mut reporter)
        .context("Migration run stopped; fix the failing file and run again")?;
    Ok(())
}
