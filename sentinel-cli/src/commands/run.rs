//! `sentinel run` — the supervisor loop.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use sentinel_core::{Clock, Config, LocalFs, SystemClock};
use sentinel_daemon::{
    host_for, start_blocking, BackupOutcome, LivenessOutcome, PurgeOutcome, ScheduleState,
    Supervisor, TickReport,
};

/// Arguments for `sentinel run`.
#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// Run a single iteration with backup and purge both due, then exit.
    #[arg(long)]
    pub once: bool,

    /// Print the iteration report as JSON (with --once).
    #[arg(long, requires = "once")]
    pub json: bool,
}

impl RunArgs {
    pub fn run(self, config: Config) -> Result<()> {
        if !self.once {
            return start_blocking(config).context("supervisor exited with error");
        }

        let state = ScheduleState::overdue_at(SystemClock.now(), &config);
        let host = host_for(config.multiplexer);
        let mut supervisor = Supervisor::with_state(config, host, LocalFs, SystemClock, state);
        let report = supervisor.tick();

        if self.json {
            let json = serde_json::to_string_pretty(&report)
                .context("failed to serialize tick report")?;
            println!("{json}");
        } else {
            print_report(&report);
        }
        Ok(())
    }
}

fn print_report(report: &TickReport) {
    match &report.backup {
        BackupOutcome::NotDue => println!("backup    {}", "not due".dimmed()),
        BackupOutcome::SkippedRecent => {
            println!("backup    {}", "skipped (recent snapshot exists)".yellow())
        }
        BackupOutcome::Completed {
            snapshot,
            failed_items,
        } if *failed_items == 0 => {
            println!("backup    {} {}", "created".green(), snapshot.display())
        }
        BackupOutcome::Completed {
            snapshot,
            failed_items,
        } => println!(
            "backup    {} {} ({failed_items} item(s) failed to copy)",
            "created".yellow(),
            snapshot.display()
        ),
        BackupOutcome::Failed { error } => println!("backup    {} {error}", "failed".red()),
    }

    match &report.purge {
        PurgeOutcome::NotDue => println!("purge     {}", "not due".dimmed()),
        PurgeOutcome::Completed { removed } => {
            println!("purge     {} {removed} crash report(s)", "removed".green())
        }
        PurgeOutcome::Failed { error } => println!("purge     {} {error}", "failed".red()),
    }

    match &report.liveness {
        LivenessOutcome::Running => println!("server    {}", "running".green()),
        LivenessOutcome::Restarted => println!("server    {}", "restarted".yellow()),
        LivenessOutcome::RestartFailed { error } => {
            println!("server    {} {error}", "restart failed".red())
        }
        LivenessOutcome::Unknown { error } => println!("server    {} {error}", "unknown".red()),
    }
}
