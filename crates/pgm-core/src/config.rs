//! Configuration types and parsing for pgmigrate.yml
//!
//! Every setting can also come from the command line or environment; the
//! file is optional and fills in whatever those leave unset.

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Config file names looked up in a project directory, in order.
pub const CONFIG_FILE_NAMES: &[&str] = &["pgmigrate.yml", "pgmigrate.yaml"];

/// Migrations directory used when nothing else is configured.
pub const DEFAULT_MIGRATIONS_PATH: &str = "database/migrations";

/// Settings from pgmigrate.yml
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// PostgreSQL connection string (URL or key=value form)
    #[serde(default)]
    pub database_url: Option<String>,

    /// Directory holding the `.sql` migration files
    #[serde(default)]
    pub migrations_path: Option<String>,
}

impl Config {
    /// Load configuration from a file path
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            return Err(CoreError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        let config: Config =
            serde_yaml::from_str(&content).map_err(|e| CoreError::ConfigParseError {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Load pgmigrate.yml (or .yaml) from `dir` if one exists.
    ///
    /// A missing file is not an error here; it yields the empty config.
    pub fn load_from_dir(dir: &Path) -> CoreResult<Self> {
        match CONFIG_FILE_NAMES
            .iter()
            .map(|name| dir.join(name))
            .find(|path| path.exists())
        {
            Some(path) => Self::load(&path),
            None => Ok(Self::default()),
        }
    }

    fn validate(&self) -> CoreResult<()> {
        if matches!(&self.database_url, Some(url) if url.trim().is_empty()) {
            return Err(CoreError::ConfigInvalid {
                message: "database_url cannot be empty".to_string(),
            });
        }
        if matches!(&self.migrations_path, Some(p) if p.trim().is_empty()) {
            return Err(CoreError::ConfigInvalid {
                message: "migrations_path cannot be empty".to_string(),
            });
        }
        Ok(())
    }

    /// Overlay explicit values (CLI flags, environment) on top of the file.
    pub fn with_overrides(
        mut self,
        database_url: Option<String>,
        migrations_path: Option<String>,
    ) -> Self {
        if database_url.is_some() {
            self.database_url = database_url;
        }
        if migrations_path.is_some() {
            self.migrations_path = migrations_path;
        }
        self
    }

    /// Connection string, or an error naming the ways to set it.
    pub fn require_database_url(&self) -> CoreResult<&str> {
        self.database_url
            .as_deref()
            .ok_or_else(|| CoreError::ConfigInvalid {
                message: "no database URL configured; pass --database-url, set DATABASE_URL, \
                          or add database_url to pgmigrate.yml"
                    .to_string(),
            })
    }

    /// Migrations directory resolved against `root` when relative.
    pub fn migrations_path_absolute(&self, root: &Path) -> PathBuf {
        let path = Path::new(
            self.migrations_path
                .as_deref()
                .unwrap_or(DEFAULT_MIGRATIONS_PATH),
        );
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            root.join(path)
        }
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
