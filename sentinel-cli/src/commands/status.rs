//! `sentinel status` — liveness, snapshots, and crash reports at a glance.

use anyhow::{Context, Result};
use chrono::{Duration, NaiveDateTime};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use sentinel_core::{backup::list_snapshots, Clock, Config, Filesystem, LocalFs, SystemClock};
use sentinel_daemon::{host_for, is_running};

/// How many of the newest snapshots the table shows.
const RECENT_SNAPSHOTS: usize = 5;

/// Arguments for `sentinel status`.
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct StatusReport {
    session: String,
    /// `None` when the session list could not be read.
    running: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    liveness_error: Option<String>,
    backup_dir: String,
    snapshot_count: usize,
    latest_snapshot: Option<SnapshotJson>,
    backup_due: bool,
    crash_reports: usize,
    #[serde(skip)]
    recent: Vec<SnapshotJson>,
}

#[derive(Debug, Clone, Serialize)]
struct SnapshotJson {
    name: String,
    taken_at: String,
    age: String,
}

#[derive(Tabled)]
struct SnapshotRow {
    #[tabled(rename = "snapshot")]
    name: String,
    #[tabled(rename = "taken at")]
    taken_at: String,
    #[tabled(rename = "age")]
    age: String,
}

impl StatusArgs {
    pub fn run(self, config: &Config) -> Result<()> {
        let report = build_report(config)?;
        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&report).context("failed to render status JSON")?
            );
            return Ok(());
        }

        print_human(&report);
        Ok(())
    }
}

fn build_report(config: &Config) -> Result<StatusReport> {
    let now = SystemClock.now().naive_local();
    let session = config.server.session_name.clone();

    let host = host_for(config.multiplexer);
    let (running, liveness_error) = match is_running(host.as_ref(), &session) {
        Ok(running) => (Some(running), None),
        Err(err) => (None, Some(err.to_string())),
    };

    let base_dir = &config.backup.base_dir;
    let snapshots = if base_dir.exists() {
        list_snapshots(&LocalFs, base_dir, &config.backup.prefix)
            .with_context(|| format!("failed to list snapshots in {}", base_dir.display()))?
    } else {
        Vec::new()
    };

    let to_json = |name: &str, taken_at: NaiveDateTime| SnapshotJson {
        name: name.to_string(),
        taken_at: taken_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        age: format_age(now - taken_at),
    };

    let latest = snapshots.last().map(|s| to_json(&s.name, s.taken_at));
    let backup_due = snapshots
        .last()
        .map(|s| now - s.taken_at >= config.backup_interval())
        .unwrap_or(true);
    let recent = snapshots
        .iter()
        .rev()
        .take(RECENT_SNAPSHOTS)
        .map(|s| to_json(&s.name, s.taken_at))
        .collect();

    let crash_dir = config.crash_reports_dir();
    let crash_reports = if crash_dir.exists() {
        LocalFs
            .list_dir(&crash_dir)
            .with_context(|| format!("failed to read {}", crash_dir.display()))?
            .len()
    } else {
        0
    };

    Ok(StatusReport {
        session,
        running,
        liveness_error,
        backup_dir: base_dir.display().to_string(),
        snapshot_count: snapshots.len(),
        latest_snapshot: latest,
        backup_due,
        crash_reports,
        recent,
    })
}

fn print_human(report: &StatusReport) {
    let liveness = match report.running {
        Some(true) => "running".green().bold(),
        Some(false) => "not running".red().bold(),
        None => "unknown".yellow().bold(),
    };
    println!("server session '{}': {liveness}", report.session);
    if let Some(error) = &report.liveness_error {
        println!("  {}", error.dimmed());
    }

    println!(
        "snapshots in {}: {}{}",
        report.backup_dir,
        report.snapshot_count,
        if report.backup_due {
            format!(" ({})", "backup due".yellow())
        } else {
            String::new()
        }
    );
    if !report.recent.is_empty() {
        let rows: Vec<SnapshotRow> = report
            .recent
            .iter()
            .map(|s| SnapshotRow {
                name: s.name.clone(),
                taken_at: s.taken_at.clone(),
                age: s.age.clone(),
            })
            .collect();
        let mut table = Table::new(rows);
        table.with(Style::rounded());
        println!("{table}");
    }

    println!("pending crash reports: {}", report.crash_reports);
}

/// Coarse human-readable age, e.g. `3d 4h ago`, `12m ago`, `just now`.
fn format_age(age: Duration) -> String {
    if age < Duration::zero() {
        return "in the future".to_string();
    }
    let days = age.num_days();
    let hours = age.num_hours() % 24;
    let minutes = age.num_minutes() % 60;
    match (days, hours, minutes) {
        (0, 0, 0) => "just now".to_string(),
        (0, 0, m) => format!("{m}m ago"),
        (0, h, m) => format!("{h}h {m}m ago"),
        (d, h, _) => format!("{d}d {h}h ago"),
    }
}
