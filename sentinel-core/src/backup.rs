//! Timestamped snapshot directories.
//!
//! # Layout
//!
//! ```text
//! <base_dir>/
//!   <prefix>2024-05-01_03-00-00/
//!     world/              (directory item, copied recursively)
//!     banned-ips.json     (file item)
//!   <prefix>2024-05-01_15-00-00/
//!   unrelated-dir/        (ignored: no prefix)
//! ```
//!
//! The snapshot names are the only persisted scheduling state: the recency
//! scan reads them back to decide whether a new backup is due, which keeps a
//! freshly restarted supervisor from taking a duplicate snapshot.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Local, NaiveDateTime};

use crate::error::{io_err, SentinelError};
use crate::fs::Filesystem;

/// `strftime` layout of the timestamp suffix, e.g. `2024-05-01_03-00-00`.
pub const SNAPSHOT_TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

/// A snapshot directory found under the base directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub name: String,
    pub taken_at: NaiveDateTime,
}

/// What a single `perform_backup` call did with each configured item.
#[derive(Debug, Default)]
pub struct BackupReport {
    pub snapshot: PathBuf,
    pub copied: Vec<PathBuf>,
    pub skipped: Vec<PathBuf>,
    pub failed: Vec<(PathBuf, String)>,
}

impl BackupReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// `<prefix><YYYY-MM-DD_HH-MM-SS>` for the given instant, in local time.
pub fn snapshot_name(prefix: &str, at: &DateTime<Local>) -> String {
    format!("{prefix}{}", at.format(SNAPSHOT_TIMESTAMP_FORMAT))
}

/// Parse a directory name back into its timestamp.
///
/// Returns `None` for names without `prefix` and for suffixes that are not
/// exactly in [`SNAPSHOT_TIMESTAMP_FORMAT`] (chrono alone would accept
/// unpadded fields, so the parse must also round-trip).
pub fn parse_snapshot_name(name: &str, prefix: &str) -> Option<NaiveDateTime> {
    let suffix = name.strip_prefix(prefix)?;
    let parsed = NaiveDateTime::parse_from_str(suffix, SNAPSHOT_TIMESTAMP_FORMAT).ok()?;
    if parsed.format(SNAPSHOT_TIMESTAMP_FORMAT).to_string() != suffix {
        return None;
    }
    Some(parsed)
}

/// Every well-formed snapshot under `base_dir`, oldest first.
pub fn list_snapshots(
    fs: &dyn Filesystem,
    base_dir: &Path,
    prefix: &str,
) -> Result<Vec<Snapshot>, SentinelError> {
    let names = fs.list_dir(base_dir).map_err(|e| io_err(base_dir, e))?;
    let mut snapshots: Vec<Snapshot> = names
        .into_iter()
        .filter_map(|name| {
            let taken_at = parse_snapshot_name(&name, prefix)?;
            Some(Snapshot { name, taken_at })
        })
        .collect();
    snapshots.sort_by(|a, b| a.taken_at.cmp(&b.taken_at).then(a.name.cmp(&b.name)));
    Ok(snapshots)
}

/// Whether a snapshot taken at or after `now - interval` exists under `base_dir`.
///
/// Malformed names are skipped. An unreadable base directory counts as "no
/// recent backup" so that the caller goes on to attempt one.
pub fn has_recent_backup(
    fs: &dyn Filesystem,
    base_dir: &Path,
    prefix: &str,
    interval: Duration,
    now: DateTime<Local>,
) -> bool {
    let cutoff = (now - interval).naive_local();
    let names = match fs.list_dir(base_dir) {
        Ok(names) => names,
        Err(err) => {
            tracing::warn!(
                path = %base_dir.display(),
                error = %err,
                "could not list backup directory",
            );
            return false;
        }
    };

    for name in names {
        let Some(taken_at) = parse_snapshot_name(&name, prefix) else {
            continue;
        };
        if taken_at >= cutoff {
            tracing::info!(snapshot = %name, "recent backup found");
            return true;
        }
    }

    tracing::info!(path = %base_dir.display(), "no recent backup found");
    false
}

/// Create `<base_dir>/<prefix><now>` and copy every existing item into it.
///
/// Missing items are skipped silently and per-item copy failures are
/// collected into the report. The only error is failing to create the
/// snapshot directory itself. Creating a directory that already exists (two
/// backups within the same second) merges into it.
pub fn perform_backup(
    fs: &dyn Filesystem,
    base_dir: &Path,
    prefix: &str,
    items: &[PathBuf],
    now: DateTime<Local>,
) -> Result<BackupReport, SentinelError> {
    let snapshot = base_dir.join(snapshot_name(prefix, &now));
    tracing::info!(snapshot = %snapshot.display(), "starting backup");
    fs.create_dir_all(&snapshot)
        .map_err(|e| io_err(&snapshot, e))?;

    let mut report = BackupReport {
        snapshot,
        ..BackupReport::default()
    };

    for item in items {
        if !fs.exists(item) {
            tracing::debug!(item = %item.display(), "backup item missing, skipping");
            report.skipped.push(item.clone());
            continue;
        }
        match fs.copy_path(item, &report.snapshot) {
            Ok(()) => report.copied.push(item.clone()),
            Err(err) => {
                tracing::warn!(item = %item.display(), error = %err, "failed to copy backup item");
                report.failed.push((item.clone(), err.to_string()));
            }
        }
    }

    tracing::info!(
        snapshot = %report.snapshot.display(),
        copied = report.copied.len(),
        skipped = report.skipped.len(),
        failed = report.failed.len(),
        "backup completed",
    );
    Ok(report)
}
