//! pgm-runner - Migration execution for pgmigrate
//!
//! This crate applies migration files exactly once each: the executor runs one
//! file and its ledger insert in a single transaction, and the runner wires
//! connection, ledger setup, directory scan and executor into one pass.

pub mod error;
pub mod executor;
pub mod report;
pub mod runner;

#[cfg(test)]
pub(crate) mod test_utils;

pub use error::{RunError, RunResult};
pub use executor::{apply, ApplyOutcome, SkipReason};
pub use report::{Reporter, RunPhase, RunSummary};
pub use runner::{Connector, MigrationStatus, Runner};
