//! pgm-core - Core library for pgmigrate
//!
//! This crate provides the migration data model, the directory scan that
//! discovers and orders migration files, new-file naming, and configuration
//! parsing shared by the runner and the CLI.

pub mod config;
pub mod error;
pub mod migration;
pub mod migration_name;
pub mod naming;
pub mod source;

pub use config::Config;
pub use error::{CoreError, CoreResult};
pub use migration::MigrationFile;
pub use migration_name::{MigrationName, MAX_MIGRATION_NAME_LEN};
pub use naming::{create_migration, sanitize_name};
pub use source::{list_pending, ordering_hazards, OrderingHazard};
