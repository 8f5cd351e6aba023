//! `sentinel purge` — one-shot crash-log cleanup.

use anyhow::{Context, Result};
use colored::Colorize;

use sentinel_core::{purge_crash_logs, Config, LocalFs};

pub fn run(config: &Config) -> Result<()> {
    let crash_dir = config.crash_reports_dir();
    let removed = purge_crash_logs(&LocalFs, &crash_dir)
        .with_context(|| format!("failed to purge {}", crash_dir.display()))?;
    println!(
        "{} {removed} crash report(s) from {}",
        "removed".green(),
        crash_dir.display()
    );
    Ok(())
}
