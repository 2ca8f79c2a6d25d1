//! Settings resolution for CLI commands
//!
//! Precedence, highest first: command-line flags and environment, then
//! pgmigrate.yml, then built-in defaults.

use anyhow::{Context, Result};
use pgm_core::Config;
use pgm_db::{DbResult, PostgresBackend};
use pgm_runner::Runner;
use std::path::{Path, PathBuf};

use crate::cli::GlobalArgs;

/// Resolved configuration for one command invocation
pub(crate) struct Settings {
    /// Merged configuration
    pub config: Config,

    /// Directory relative paths are resolved against
    pub root: PathBuf,

    /// Verbose output enabled
    pub verbose: bool,
}

impl Settings {
    /// Merge config file, flags and environment
    pub fn load(global: &GlobalArgs) -> Result<Self> {
        let root = PathBuf::from(&global.project_dir);

        let file_config = match &global.config {
            Some(path) => Config::load(Path::new(path)).context("Failed to load configuration file")?,
            None => Config::load_from_dir(&root).context("Failed to load project configuration")?,
        };

        let config = file_config
            .with_overrides(global.database_url.clone(), global.migrations_path.clone());
        log::debug!(
            "Resolved migrations directory {}",
            config.migrations_path_absolute(&root).display()
        );

        Ok(Self {
            config,
            root,
            verbose: global.verbose,
        })
    }

    /// Absolute or project-relative migrations directory
    pub fn migrations_dir(&self) -> PathBuf {
        self.config.migrations_path_absolute(&self.root)
    }

    /// Build a runner that opens a fresh PostgreSQL connection per run
    pub fn runner(&self) -> Result<Runner<impl Fn() -> DbResult<PostgresBackend>>> {
        let url = self.config.require_database_url()?.to_string();
        Ok(Runner::new(
            move || PostgresBackend::connect(&url),
            self.migrations_dir(),
        ))
    }

    /// Print verbose output if enabled
    pub fn verbose(&self, msg: &str) {
        if self.verbose {
            eprintln!("[verbose] {}", msg);
        }
    }
}
