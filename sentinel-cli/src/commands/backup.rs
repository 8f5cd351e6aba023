//! `sentinel backup` — one-shot snapshot.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use sentinel_core::{has_recent_backup, perform_backup, Clock, Config, LocalFs, SystemClock};

/// Arguments for `sentinel backup`.
#[derive(Args, Debug)]
pub struct BackupArgs {
    /// Take a snapshot even if one exists within the backup interval.
    #[arg(long)]
    pub force: bool,
}

impl BackupArgs {
    pub fn run(self, config: &Config) -> Result<()> {
        let now = SystemClock.now();
        let base_dir = &config.backup.base_dir;
        let prefix = &config.backup.prefix;

        if !self.force
            && has_recent_backup(&LocalFs, base_dir, prefix, config.backup_interval(), now)
        {
            println!(
                "{} a snapshot newer than {}h already exists (use --force to take another)",
                "skipping:".yellow(),
                config.backup_interval_hours
            );
            return Ok(());
        }

        let report = perform_backup(&LocalFs, base_dir, prefix, &config.backup_items(), now)
            .context("backup failed")?;

        println!("{} {}", "created".green(), report.snapshot.display());
        for item in &report.copied {
            println!("  {} {}", "+".green(), item.display());
        }
        for item in &report.skipped {
            println!("  {} {} (missing)", "-".dimmed(), item.display());
        }
        for (item, error) in &report.failed {
            println!("  {} {} ({error})", "!".red(), item.display());
        }
        Ok(())
    }
}
