//! Error types for pgm-core

use thiserror::Error;

/// Core error type for pgmigrate
#[derive(Error, Debug)]
pub enum CoreError {
    /// E001: Configuration file not found
    #[error("[E001] Config file not found: {path}")]
    ConfigNotFound { path: String },

    /// E002: Failed to parse configuration file
    #[error("[E002] Failed to parse config {path}: {message}")]
    ConfigParseError { path: String, message: String },

    /// E003: Invalid configuration value
    #[error("[E003] Invalid config: {message}")]
    ConfigInvalid { message: String },

    /// S001: Migrations directory does not exist
    #[error("[S001] Migrations directory not found: {path}")]
    MigrationsDirNotFound { path: String },

    /// S002: Migration file name does not fit the ledger column
    #[error("[S002] Migration file name '{name}' is {len} characters; the ledger holds at most {max}")]
    MigrationNameTooLong { name: String, len: usize, max: usize },

    /// S003: A generated migration file already exists
    #[error("[S003] Migration file already exists: {path}")]
    MigrationExists { path: String },

    /// S004: Name given to `new` has nothing usable in it
    #[error("[S004] Invalid migration name '{name}': {reason}")]
    InvalidMigrationName { name: String, reason: String },

    /// S005: No numeric prefix can sort after an existing file
    #[error("[S005] No timestamp prefix sorts after existing migration '{last}'; rename it with a numeric prefix")]
    NoOrderedPrefix { last: String },

    /// E014: IO error
    #[error("[E014] IO error: {0}")]
    Io(#[from] std::io::Error),

    /// E015: IO error with file path context
    #[error("[E015] Failed to access '{path}': {source}")]
    IoWithPath {
        path: String,
        source: std::io::Error,
    },
}

/// Result type alias for CoreError
pub type CoreResult<T> = Result<T, CoreError>;
