//! A single SQL migration file

use crate::error::{CoreError, CoreResult};
use crate::migration_name::MigrationName;
use std::path::{Path, PathBuf};

/// One candidate unit of work discovered in the migrations directory.
///
/// The SQL text is read once at scan time and executed verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationFile {
    /// File name, used as the ledger key
    pub name: MigrationName,

    /// Location the SQL was read from
    pub path: PathBuf,

    /// Full file contents
    pub sql: String,
}

impl MigrationFile {
    /// Read a migration from disk, keyed by `name`.
    pub fn load(name: MigrationName, path: &Path) -> CoreResult<Self> {
        let sql = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        Ok(Self {
            name,
            path: path.to_path_buf(),
            sql,
        })
    }

    /// True when the file has nothing but whitespace.
    ///
    /// Empty files are still applied and recorded, which is what `new`
    /// produces before the author fills it in.
    pub fn is_blank(&self) -> bool {
        self.sql.trim().is_empty()
    }
}
