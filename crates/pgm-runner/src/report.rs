//! Run progress reporting

use crate::executor::SkipReason;
use pgm_core::{MigrationFile, MigrationName};
use std::time::Duration;

/// Where a run currently is. Transitions are strictly in declaration order,
/// ending in `Done` or `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    NotStarted,
    Scanning,
    Applying,
    Done,
    Failed,
}

impl std::fmt::Display for RunPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RunPhase::NotStarted => "not-started",
            RunPhase::Scanning => "scanning",
            RunPhase::Applying => "applying",
            RunPhase::Done => "done",
            RunPhase::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Summary of a completed run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Migrations applied by this run, in order
    pub applied: Vec<MigrationName>,

    /// Migrations skipped because the ledger already had them
    pub skipped: Vec<MigrationName>,

    /// Wall time of the whole run
    pub duration: Duration,
}

impl RunSummary {
    /// Total number of candidate files seen
    pub fn total(&self) -> usize {
        self.applied.len() + self.skipped.len()
    }
}

/// Receives progress from a [`Runner`](crate::Runner).
///
/// Only `applied` and `done` are required; the CLI prints from those.
pub trait Reporter {
    fn phase(&mut self, _phase: RunPhase) {}

    /// A file was applied and committed
    fn applied(&mut self, file: &MigrationFile, duration: Duration);

    fn skipped(&mut self, _file: &MigrationFile, _reason: SkipReason) {}

    /// Every candidate was applied or skipped
    fn done(&mut self, summary: &RunSummary);
}
