//! pgm-db - Ledger storage for pgmigrate
//!
//! This crate provides the `Database` and `MigrationTx` traits the executor
//! drives, the ledger table definition, and the PostgreSQL implementation.

pub mod error;
pub mod ledger;
pub mod postgres;
pub mod traits;

pub use self::postgres::PostgresBackend;
pub use error::{DbError, DbResult};
pub use ledger::{LedgerEntry, LEDGER_TABLE};
pub use traits::{Database, MigrationTx};
