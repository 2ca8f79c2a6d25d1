//! PostgreSQL database backend implementation

use crate::error::{describe, is_unique_violation, DbError, DbResult};
use crate::ledger::{
    LedgerEntry, CREATE_LEDGER_SQL, HAS_APPLIED_SQL, LEDGER_LOCK_SQL, LIST_APPLIED_SQL,
    LOCK_MIGRATION_SQL, RECORD_APPLIED_SQL,
};
use crate::traits::{Database, MigrationTx};
use chrono::NaiveDateTime;
use postgres::{Client, NoTls, Transaction};

/// PostgreSQL backend over a blocking client
pub struct PostgresBackend {
    client: Client,
}

impl std::fmt::Debug for PostgresBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgresBackend").finish_non_exhaustive()
    }
}

impl PostgresBackend {
    /// Connect using a libpq-style connection string or `postgres://` URL
    pub fn connect(database_url: &str) -> DbResult<Self> {
        let client = Client::connect(database_url, NoTls)
            .map_err(|e| DbError::ConnectionError(describe(&e)))?;
        Ok(Self { client })
    }

    /// Borrow the underlying client
    pub fn client(&mut self) -> &mut Client {
        &mut self.client
    }

    /// Run statements outside any migration transaction (session setup, tests)
    pub fn batch_execute(&mut self, sql: &str) -> DbResult<()> {
        self.client
            .batch_execute(sql)
            .map_err(|e| DbError::ExecutionError(describe(&e)))
    }
}

impl Database for PostgresBackend {
    fn ensure_ledger(&mut self) -> DbResult<()> {
        let mut tx = self
            .client
            .transaction()
            .map_err(|e| DbError::SchemaError(format!("BEGIN failed: {}", describe(&e))))?;

        // Concurrent CREATE TABLE IF NOT EXISTS can still collide on the
        // catalog, so first runs queue up behind one lock.
        tx.execute(LEDGER_LOCK_SQL, &[])
            .map_err(|e| DbError::SchemaError(describe(&e)))?;
        tx.batch_execute(CREATE_LEDGER_SQL)
            .map_err(|e| DbError::SchemaError(describe(&e)))?;
        tx.commit()
            .map_err(|e| DbError::SchemaError(format!("COMMIT failed: {}", describe(&e))))?;

        log::debug!("Ledger table ready");
        Ok(())
    }

    fn applied_migrations(&mut self) -> DbResult<Vec<LedgerEntry>> {
        let rows = self
            .client
            .query(LIST_APPLIED_SQL, &[])
            .map_err(|e| DbError::QueryError(describe(&e)))?;

        rows.iter()
            .map(|row| {
                let id: i32 = row.try_get(0).map_err(|e| DbError::QueryError(describe(&e)))?;
                let filename: String =
                    row.try_get(1).map_err(|e| DbError::QueryError(describe(&e)))?;
                let applied_at: NaiveDateTime =
                    row.try_get(2).map_err(|e| DbError::QueryError(describe(&e)))?;
                Ok(LedgerEntry::new(id, &filename, applied_at))
            })
            .collect()
    }

    fn begin(&mut self) -> DbResult<Box<dyn MigrationTx + '_>> {
        let tx = self
            .client
            .transaction()
            .map_err(|e| DbError::TransactionError(format!("BEGIN failed: {}", describe(&e))))?;
        Ok(Box::new(PostgresTx { tx }))
    }

    fn db_type(&self) -> &'static str {
        "postgres"
    }
}

/// A migration transaction on a [`PostgresBackend`]
struct PostgresTx<'a> {
    tx: Transaction<'a>,
}

impl MigrationTx for PostgresTx<'_> {
    fn lock_migration(&mut self, filename: &str) -> DbResult<()> {
        self.tx
            .execute(LOCK_MIGRATION_SQL, &[&filename])
            .map_err(|e| DbError::QueryError(describe(&e)))?;
        Ok(())
    }

    fn has_applied(&mut self, filename: &str) -> DbResult<bool> {
        let row = self
            .tx
            .query_opt(HAS_APPLIED_SQL, &[&filename])
            .map_err(|e| DbError::QueryError(describe(&e)))?;
        Ok(row.is_some())
    }

    fn execute_batch(&mut self, sql: &str) -> DbResult<()> {
        self.tx
            .batch_execute(sql)
            .map_err(|e| DbError::ExecutionError(describe(&e)))
    }

    fn record_applied(&mut self, filename: &str) -> DbResult<()> {
        match self.tx.execute(RECORD_APPLIED_SQL, &[&filename]) {
            Ok(_) => Ok(()),
            Err(e) if is_unique_violation(&e) => Err(DbError::DuplicateMigration {
                filename: filename.to_string(),
            }),
            Err(e) => Err(DbError::QueryError(describe(&e))),
        }
    }

    fn commit(self: Box<Self>) -> DbResult<()> {
        let PostgresTx { tx } = *self;
        tx.commit()
            .map_err(|e| DbError::TransactionError(format!("COMMIT failed: {}", describe(&e))))
    }

    fn rollback(self: Box<Self>) -> DbResult<()> {
        let PostgresTx { tx } = *self;
        tx.rollback()
            .map_err(|e| DbError::TransactionError(format!("ROLLBACK failed: {}", describe(&e))))
    }
}
