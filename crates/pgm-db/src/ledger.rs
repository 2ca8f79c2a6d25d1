//! The `migrations` ledger table
//!
//! One row per applied migration file. Rows are inserted in the same
//! transaction as the file's SQL and never updated or deleted.

use chrono::NaiveDateTime;
use serde::Serialize;

/// Name of the ledger table.
pub const LEDGER_TABLE: &str = "migrations";

/// Ledger DDL. Column names and types are shared with other tools reading
/// the same table, so they must not change.
pub const CREATE_LEDGER_SQL: &str = "
create table if not exists migrations (
    migration_id serial not null,
    filename char(120) not null,
    migrated_at timestamp not null default current_timestamp,
    constraint migrations_primary primary key (migration_id),
    unique (filename)
)";

/// Advisory lock key serializing ledger creation across processes.
pub const LEDGER_LOCK_SQL: &str = "SELECT pg_advisory_xact_lock(hashtext('migrations'))";

/// Per-file advisory lock, held until the apply transaction ends.
pub const LOCK_MIGRATION_SQL: &str = "SELECT pg_advisory_xact_lock(hashtext($1))";

pub const HAS_APPLIED_SQL: &str = "SELECT true FROM migrations WHERE filename = $1";

pub const RECORD_APPLIED_SQL: &str = "INSERT INTO migrations (filename) VALUES ($1)";

pub const LIST_APPLIED_SQL: &str =
    "SELECT migration_id, filename, migrated_at FROM migrations ORDER BY filename";

/// A persisted record that a migration was applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LedgerEntry {
    /// Surrogate key assigned by the database
    pub id: i32,

    /// Migration file name
    pub filename: String,

    /// Commit time of the apply transaction (server local time)
    pub applied_at: NaiveDateTime,
}

impl LedgerEntry {
    /// Build an entry from a raw row, stripping `char(120)` padding.
    pub fn new(id: i32, filename: &str, applied_at: NaiveDateTime) -> Self {
        Self {
            id,
            filename: filename.trim_end().to_string(),
            applied_at,
        }
    }
}
