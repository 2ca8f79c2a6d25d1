//! In-memory `Database` double for executor and runner tests.
//!
//! Statements are split on `;` and only recorded, never interpreted. A
//! statement starting with `BOGUS` fails like a syntax error would. Effects
//! and ledger rows become visible only on commit, which is enough to check
//! atomicity, idempotence and ordering without a server.

use chrono::Utc;
use pgm_db::{Database, DbError, DbResult, LedgerEntry, MigrationTx};
use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

#[derive(Debug, Default)]
pub(crate) struct MemoryState {
    /// Committed ledger rows
    pub ledger: Vec<LedgerEntry>,
    /// Committed statements, in commit order
    pub effects: Vec<String>,
    /// Every statement handed to `execute_batch`, committed or not
    pub executed: Vec<String>,
    /// Files a simulated concurrent runner records just before our insert
    pub race_on: HashSet<String>,
    /// Make `ensure_ledger` fail as if privileges were missing
    pub deny_schema: bool,
    /// Make `connect` fail
    pub refuse_connections: bool,
    pub ledger_created: bool,
    pub transactions_opened: usize,
    pub rollbacks: usize,
}

impl MemoryState {
    pub fn ledger_names(&self) -> Vec<&str> {
        self.ledger.iter().map(|e| e.filename.as_str()).collect()
    }

    fn record(&mut self, filename: &str) {
        let id = self.ledger.len() as i32 + 1;
        self.ledger
            .push(LedgerEntry::new(id, filename, Utc::now().naive_utc()));
    }
}

/// Handle to shared in-memory state; clones see the same database.
#[derive(Debug, Clone, Default)]
pub(crate) struct MemoryDb {
    pub state: Rc<RefCell<MemoryState>>,
}

impl MemoryDb {
    pub fn new() -> Self {
        Self::default()
    }

    /// A connector closure handing out handles to this database
    pub fn connector(&self) -> impl Fn() -> DbResult<MemoryDb> {
        let db = self.clone();
        move || {
            if db.state.borrow().refuse_connections {
                return Err(DbError::ConnectionError("connection refused".to_string()));
            }
            Ok(db.clone())
        }
    }
}

impl Database for MemoryDb {
    fn ensure_ledger(&mut self) -> DbResult<()> {
        let mut state = self.state.borrow_mut();
        if state.deny_schema {
            return Err(DbError::SchemaError(
                "permission denied for schema public".to_string(),
            ));
        }
        state.ledger_created = true;
        Ok(())
    }

    fn applied_migrations(&mut self) -> DbResult<Vec<LedgerEntry>> {
        let mut entries = self.state.borrow().ledger.clone();
        entries.sort_by(|a, b| a.filename.cmp(&b.filename));
        Ok(entries)
    }

    fn begin(&mut self) -> DbResult<Box<dyn MigrationTx + '_>> {
        self.state.borrow_mut().transactions_opened += 1;
        Ok(Box::new(MemoryTx {
            state: Rc::clone(&self.state),
            effects: Vec::new(),
            ledger: Vec::new(),
        }))
    }

    fn db_type(&self) -> &'static str {
        "memory"
    }
}

struct MemoryTx {
    state: Rc<RefCell<MemoryState>>,
    effects: Vec<String>,
    ledger: Vec<String>,
}

impl MigrationTx for MemoryTx {
    fn lock_migration(&mut self, _filename: &str) -> DbResult<()> {
        Ok(())
    }

    fn has_applied(&mut self, filename: &str) -> DbResult<bool> {
        Ok(self
            .state
            .borrow()
            .ledger
            .iter()
            .any(|e| e.filename == filename))
    }

    fn execute_batch(&mut self, sql: &str) -> DbResult<()> {
        for stmt in sql.split(';').map(str::trim).filter(|s| !s.is_empty()) {
            self.state.borrow_mut().executed.push(stmt.to_string());
            if stmt.starts_with("BOGUS") {
                return Err(DbError::ExecutionError(format!(
                    "ERROR: syntax error at or near \"BOGUS\" (SQLSTATE 42601): {stmt}"
                )));
            }
            self.effects.push(stmt.to_string());
        }
        Ok(())
    }

    fn record_applied(&mut self, filename: &str) -> DbResult<()> {
        let mut state = self.state.borrow_mut();
        if state.race_on.remove(filename) {
            state.record(filename);
        }
        let taken = state.ledger.iter().any(|e| e.filename == filename)
            || self.ledger.iter().any(|f| f == filename);
        if taken {
            return Err(DbError::DuplicateMigration {
                filename: filename.to_string(),
            });
        }
        self.ledger.push(filename.to_string());
        Ok(())
    }

    fn commit(self: Box<Self>) -> DbResult<()> {
        let MemoryTx {
            state,
            effects,
            ledger,
        } = *self;
        let mut state = state.borrow_mut();
        state.effects.extend(effects);
        for filename in ledger {
            state.record(&filename);
        }
        Ok(())
    }

    fn rollback(self: Box<Self>) -> DbResult<()> {
        self.state.borrow_mut().rollbacks += 1;
        Ok(())
    }
}
