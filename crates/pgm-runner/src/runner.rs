//! Run orchestration
//!
//! Connect, make sure the ledger exists, scan the directory once, then apply
//! each file in order and stop at the first failure. A later run re-scans and
//! skips whatever the ledger already has, so re-running after a fix is safe.

use crate::error::{RunError, RunResult};
use crate::executor::{apply, ApplyOutcome};
use crate::report::{Reporter, RunPhase, RunSummary};
use chrono::NaiveDateTime;
use pgm_core::source::scan_names;
use pgm_core::{list_pending, ordering_hazards, MigrationName};
use pgm_db::{Database, DbResult, LedgerEntry};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Opens database connections for a run.
///
/// Any `Fn() -> DbResult<D>` closure is a connector.
pub trait Connector {
    type Db: Database;

    fn connect(&self) -> DbResult<Self::Db>;
}

impl<F, D> Connector for F
where
    F: Fn() -> DbResult<D>,
    D: Database,
{
    type Db = D;

    fn connect(&self) -> DbResult<D> {
        self()
    }
}

/// Applied/pending state of one migration, for `status`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MigrationStatus {
    /// Migration file name
    pub name: MigrationName,

    /// When it was applied, if it was
    pub applied_at: Option<NaiveDateTime>,

    /// False when the ledger has a row whose file is gone from the directory
    pub on_disk: bool,
}

impl MigrationStatus {
    pub fn is_pending(&self) -> bool {
        self.applied_at.is_none()
    }
}

/// Applies the migrations in one directory against one database
pub struct Runner<C> {
    connector: C,
    migrations_dir: PathBuf,
}

impl<C: Connector> Runner<C> {
    /// Create a runner from a connector and the migrations directory
    pub fn new(connector: C, migrations_dir: impl Into<PathBuf>) -> Self {
        Self {
            connector,
            migrations_dir: migrations_dir.into(),
        }
    }

    pub fn migrations_dir(&self) -> &Path {
        &self.migrations_dir
    }

    /// Apply every pending migration in order.
    ///
    /// Stops at the first failing file; files before it stay applied.
    pub fn run(&self, reporter: &mut dyn Reporter) -> RunResult<RunSummary> {
        let started = Instant::now();
        enter(reporter, RunPhase::NotStarted);

        match self.run_phases(reporter, started) {
            Ok(summary) => {
                enter(reporter, RunPhase::Done);
                reporter.done(&summary);
                Ok(summary)
            }
            Err(e) => {
                enter(reporter, RunPhase::Failed);
                Err(e)
            }
        }
    }

    fn run_phases(&self, reporter: &mut dyn Reporter, started: Instant) -> RunResult<RunSummary> {
        let mut db = self.connector.connect().map_err(RunError::Connection)?;
        db.ensure_ledger().map_err(RunError::Schema)?;

        enter(reporter, RunPhase::Scanning);
        let files = list_pending(&self.migrations_dir)?;
        log::debug!(
            "Found {} migration files in {}",
            files.len(),
            self.migrations_dir.display()
        );
        for hazard in ordering_hazards(files.iter().map(|f| &f.name)) {
            log::warn!("Migration ordering: {hazard}");
        }

        enter(reporter, RunPhase::Applying);
        let mut summary = RunSummary::default();
        for file in &files {
            match apply(&mut db, file)? {
                ApplyOutcome::Applied { name, duration } => {
                    reporter.applied(file, duration);
                    summary.applied.push(name);
                }
                ApplyOutcome::Skipped { name, reason } => {
                    reporter.skipped(file, reason);
                    summary.skipped.push(name);
                }
            }
        }

        summary.duration = started.elapsed();
        log::debug!(
            "Applied {} of {} migrations on {} in {}ms",
            summary.applied.len(),
            summary.total(),
            db.db_type(),
            summary.duration.as_millis()
        );
        Ok(summary)
    }

    /// Pair every migration file and ledger row by name.
    ///
    /// Creates the ledger table if needed but applies nothing.
    pub fn status(&self) -> RunResult<Vec<MigrationStatus>> {
        let mut db = self.connector.connect().map_err(RunError::Connection)?;
        db.ensure_ledger().map_err(RunError::Schema)?;

        let files = scan_names(&self.migrations_dir)?;
        let entries = db.applied_migrations().map_err(RunError::Schema)?;
        Ok(merge_status(files.into_iter().map(|(name, _)| name), entries))
    }
}

fn enter(reporter: &mut dyn Reporter, phase: RunPhase) {
    log::debug!("Migration run: {phase}");
    reporter.phase(phase);
}

fn merge_status<I>(files: I, entries: Vec<LedgerEntry>) -> Vec<MigrationStatus>
where
    I: IntoIterator<Item = MigrationName>,
{
    let mut merged: BTreeMap<MigrationName, MigrationStatus> = files
        .into_iter()
        .map(|name| {
            let status = MigrationStatus {
                name: name.clone(),
                applied_at: None,
                on_disk: true,
            };
            (name, status)
        })
        .collect();

    for entry in entries {
        let Some(name) = MigrationName::try_new(entry.filename) else {
            continue;
        };
        merged
            .entry(name.clone())
            .or_insert_with(|| MigrationStatus {
                name,
                applied_at: None,
                on_disk: false,
            })
            .applied_at = Some(entry.applied_at);
    }

    merged.into_values().collect()
}

#[cfg(test)]
#[path = "runner_test.rs"]
mod tests;
