//! Status command implementation - lists applied and pending migrations

use anyhow::{Context, Result};
use pgm_runner::MigrationStatus;

use crate::cli::{GlobalArgs, StatusArgs, StatusOutput};
use crate::context::Settings;

/// Execute the status command
pub(crate) fn execute(args: &StatusArgs, global: &GlobalArgs) -> Result<()> {
    let settings = Settings::load(global)?;
    let runner = settings.runner()?;
    let status = runner.status().context("Failed to read migration status")?;

    match args.output {
        StatusOutput::Json => println!("{}", serde_json::to_string_pretty(&status)?),
        StatusOutput::Table => print!("{}", render_table(&status)),
    }
    Ok(())
}

fn render_table(status: &[MigrationStatus]) -> String {
    let mut out = String::new();
    let width = status
        .iter()
        .map(|s| s.name.len())
        .max()
        .unwrap_or(0)
        .max("MIGRATION".len());

    out.push_str(&format!("{:<width$}  APPLIED AT\n", "MIGRATION"));
    for s in status {
        let applied = match s.applied_at {
            Some(at) => at.format("%Y-%m-%d %H:%M:%S").to_string(),
            None => "pending".to_string(),
        };
        let missing = if s.on_disk { "" } else { "  (file missing)" };
        out.push_str(&format!("{:<width$}  {applied}{missing}\n", s.name.as_str()));
    }

    let pending = status.iter().filter(|s| s.is_pending()).count();
    out.push_str(&format!(
        "\n{} applied, {} pending\n",
        status.len() - pending,
        pending
    ));
    out
}
