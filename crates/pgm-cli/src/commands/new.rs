//! New command implementation - creates an empty migration file

use anyhow::{Context, Result};
use chrono::Utc;
use pgm_core::create_migration;

use crate::cli::{GlobalArgs, NewArgs};
use crate::context::Settings;

/// Execute the new command
pub(crate) fn execute(args: &NewArgs, global: &GlobalArgs) -> Result<()> {
    let settings = Settings::load(global)?;
    let dir = settings.migrations_dir();

    let path = create_migration(&dir, &args.name, Utc::now())
        .with_context(|| format!("Failed to create migration in {}", dir.display()))?;

    println!("New file: {}", path.display());
    Ok(())
}

#[cfg(test)]
#[path = "new_test.rs"]
mod tests;
