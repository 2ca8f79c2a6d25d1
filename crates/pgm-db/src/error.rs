//! Error types for pgm-db

use postgres::error::SqlState;
use thiserror::Error;

/// Database operation errors
#[derive(Error, Debug)]
pub enum DbError {
    /// Connection error (D001)
    #[error("[D001] Database connection failed: {0}")]
    ConnectionError(String),

    /// Ledger table could not be created or read (D002)
    #[error("[D002] Migration ledger unavailable: {0}")]
    SchemaError(String),

    /// Migration SQL failed (D003)
    #[error("[D003] SQL execution failed: {0}")]
    ExecutionError(String),

    /// Ledger row already exists for this file (D004)
    #[error("[D004] Migration {filename} is already recorded in the ledger")]
    DuplicateMigration { filename: String },

    /// BEGIN / COMMIT / ROLLBACK failed (D005)
    #[error("[D005] Transaction failed: {0}")]
    TransactionError(String),

    /// Ledger query failed (D006)
    #[error("[D006] Ledger query failed: {0}")]
    QueryError(String),
}

/// Result type alias for DbError
pub type DbResult<T> = Result<T, DbError>;

/// Render a driver error with the server's message, detail and SQLSTATE.
///
/// `postgres::Error`'s own `Display` stops at "db error" for server-side
/// failures, which is useless to an operator fixing a migration.
pub fn describe(err: &postgres::Error) -> String {
    match err.as_db_error() {
        Some(db) => {
            let mut msg = format!("{}: {} (SQLSTATE {})", db.severity(), db.message(), db.code().code());
            if let Some(detail) = db.detail() {
                msg.push_str(&format!("; detail: {detail}"));
            }
            if let Some(hint) = db.hint() {
                msg.push_str(&format!("; hint: {hint}"));
            }
            msg
        }
        None => err.to_string(),
    }
}

/// Whether the error is a unique-constraint violation.
pub fn is_unique_violation(err: &postgres::Error) -> bool {
    err.code() == Some(&SqlState::UNIQUE_VIOLATION)
}
