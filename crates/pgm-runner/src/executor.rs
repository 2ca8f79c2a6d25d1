//! Per-file migration execution
//!
//! One transaction per file: lock, check the ledger, run the SQL, insert the
//! ledger row, commit. Any failure rolls the whole file back, so the ledger
//! row exists exactly when the file's effects do.

use crate::error::{RunError, RunResult};
use pgm_core::{MigrationFile, MigrationName};
use pgm_db::{Database, DbError, MigrationTx};
use std::time::{Duration, Instant};

/// What happened to one migration file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// SQL ran and the ledger row was committed with it
    Applied {
        name: MigrationName,
        duration: Duration,
    },
    /// Nothing was executed
    Skipped {
        name: MigrationName,
        reason: SkipReason,
    },
}

impl ApplyOutcome {
    /// Name of the migration this outcome is for
    pub fn name(&self) -> &MigrationName {
        match self {
            ApplyOutcome::Applied { name, .. } | ApplyOutcome::Skipped { name, .. } => name,
        }
    }

    pub fn is_applied(&self) -> bool {
        matches!(self, ApplyOutcome::Applied { .. })
    }
}

/// Why a migration was skipped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The ledger already had the file when we checked
    AlreadyApplied,
    /// Another process recorded the file before our insert landed
    AppliedConcurrently,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::AlreadyApplied => write!(f, "already applied"),
            SkipReason::AppliedConcurrently => write!(f, "applied by another process"),
        }
    }
}

/// Steps that ran inside the transaction before commit/rollback is decided
enum Checked {
    AlreadyApplied,
    Executed,
}

/// Apply `file` unless the ledger says it already ran.
///
/// Database errors roll the transaction back and come back as
/// [`RunError::MigrationFailed`], except a duplicate ledger insert, which
/// means another runner won the race and is reported as a skip.
pub fn apply(db: &mut dyn Database, file: &MigrationFile) -> RunResult<ApplyOutcome> {
    let started = Instant::now();
    let filename = file.name.as_str();

    let mut tx = db
        .begin()
        .map_err(|e| RunError::migration_failed(filename, e))?;

    match run_in_transaction(tx.as_mut(), file) {
        Ok(Checked::AlreadyApplied) => {
            rollback_quietly(tx, filename);
            log::debug!("Skipping {filename}: already applied");
            Ok(ApplyOutcome::Skipped {
                name: file.name.clone(),
                reason: SkipReason::AlreadyApplied,
            })
        }
        Ok(Checked::Executed) => match tx.commit() {
            Ok(()) => {
                let duration = started.elapsed();
                log::info!("Applied {filename} in {}ms", duration.as_millis());
                Ok(ApplyOutcome::Applied {
                    name: file.name.clone(),
                    duration,
                })
            }
            Err(e) => resolve_failure(file, e),
        },
        Err(e) => {
            rollback_quietly(tx, filename);
            resolve_failure(file, e)
        }
    }
}

fn run_in_transaction(tx: &mut dyn MigrationTx, file: &MigrationFile) -> Result<Checked, DbError> {
    let filename = file.name.as_str();

    tx.lock_migration(filename)?;
    if tx.has_applied(filename)? {
        return Ok(Checked::AlreadyApplied);
    }

    if file.is_blank() {
        log::warn!("Migration {filename} is empty; recording it as applied");
    }
    tx.execute_batch(&file.sql)?;
    tx.record_applied(filename)?;
    Ok(Checked::Executed)
}

/// A duplicate ledger insert means another runner won the race; everything
/// else is fatal to the run.
fn resolve_failure(file: &MigrationFile, err: DbError) -> RunResult<ApplyOutcome> {
    match err {
        DbError::DuplicateMigration { .. } => {
            log::warn!(
                "Migration {} was recorded by another process during this run; treating as applied",
                file.name
            );
            Ok(ApplyOutcome::Skipped {
                name: file.name.clone(),
                reason: SkipReason::AppliedConcurrently,
            })
        }
        other => Err(RunError::migration_failed(file.name.as_str(), other)),
    }
}

fn rollback_quietly(tx: Box<dyn MigrationTx + '_>, filename: &str) {
    if let Err(e) = tx.rollback() {
        log::warn!("Rollback after {filename} failed: {e}");
    }
}

#[cfg(test)]
#[path = "executor_test.rs"]
mod tests;
