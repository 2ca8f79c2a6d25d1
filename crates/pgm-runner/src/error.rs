//! Error types for pgm-runner

use pgm_core::CoreError;
use pgm_db::DbError;
use thiserror::Error;

/// Errors that stop a migration run
#[derive(Error, Debug)]
pub enum RunError {
    /// Could not open a connection (R001)
    #[error("[R001] Could not connect to the database: {0}")]
    Connection(#[source] DbError),

    /// Ledger table could not be created or read (R002)
    #[error("[R002] Migration ledger unavailable: {0}")]
    Schema(#[source] DbError),

    /// Migrations directory could not be scanned (R003)
    #[error("[R003] Could not read migrations: {0}")]
    Source(#[from] CoreError),

    /// A migration file failed and was rolled back (R004)
    #[error("[R004] Migration {filename} failed: {source}")]
    MigrationFailed {
        filename: String,
        #[source]
        source: DbError,
    },
}

impl RunError {
    /// Wrap a database error raised while applying `filename`
    pub fn migration_failed(filename: &str, source: DbError) -> Self {
        RunError::MigrationFailed {
            filename: filename.to_string(),
            source,
        }
    }
}

/// Result type alias for RunError
pub type RunResult<T> = Result<T, RunError>;
