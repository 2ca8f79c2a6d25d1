//! Database trait definitions
//!
//! The executor only talks to these traits. Connection-level work (ledger
//! setup, listing) lives on [`Database`]; everything that must share one
//! transaction with a migration's SQL lives on [`MigrationTx`].

use crate::error::DbResult;
use crate::ledger::LedgerEntry;

/// A connection to the database being migrated
pub trait Database {
    /// Create the ledger table if it does not exist, in its own transaction.
    ///
    /// Safe to call on every run. Fails with `DbError::SchemaError` when the
    /// table cannot be created or accessed.
    fn ensure_ledger(&mut self) -> DbResult<()>;

    /// All ledger entries, ordered by filename
    fn applied_migrations(&mut self) -> DbResult<Vec<LedgerEntry>>;

    /// Open a transaction for applying one migration
    fn begin(&mut self) -> DbResult<Box<dyn MigrationTx + '_>>;

    /// Database type identifier for logging
    fn db_type(&self) -> &'static str;
}

/// An open transaction in which one migration is checked, run, and recorded.
///
/// Dropping it without calling [`commit`](Self::commit) rolls back.
pub trait MigrationTx {
    /// Serialize with other transactions applying the same file.
    ///
    /// Held until this transaction commits or rolls back.
    fn lock_migration(&mut self, filename: &str) -> DbResult<()>;

    /// Whether the ledger already has `filename`
    fn has_applied(&mut self, filename: &str) -> DbResult<bool>;

    /// Run migration SQL verbatim; may contain several statements
    fn execute_batch(&mut self, sql: &str) -> DbResult<()>;

    /// Insert the ledger row for `filename`.
    ///
    /// Fails with `DbError::DuplicateMigration` if the row already exists.
    fn record_applied(&mut self, filename: &str) -> DbResult<()>;

    /// Make the SQL effects and the ledger row durable together
    fn commit(self: Box<Self>) -> DbResult<()>;

    /// Discard everything done in this transaction
    fn rollback(self: Box<Self>) -> DbResult<()>;
}
