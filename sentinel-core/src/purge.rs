//! Crash-report purge.

use std::path::Path;

use crate::error::{io_err, SentinelError};
use crate::fs::Filesystem;

/// Delete the direct children of `crash_dir`.
///
/// A missing directory is not an error. Entries that cannot be removed
/// (including subdirectories, which are never descended into) are logged and
/// left in place. Returns how many entries were removed.
pub fn purge_crash_logs(fs: &dyn Filesystem, crash_dir: &Path) -> Result<usize, SentinelError> {
    tracing::info!(path = %crash_dir.display(), "purging crash logs");
    if !fs.exists(crash_dir) {
        tracing::info!(path = %crash_dir.display(), "no crash-report directory, nothing to purge");
        return Ok(0);
    }

    let outcome = fs
        .remove_entries(crash_dir)
        .map_err(|e| io_err(crash_dir, e))?;
    for (path, err) in &outcome.failed {
        tracing::warn!(path = %path.display(), error = %err, "could not remove crash log");
    }

    tracing::info!(removed = outcome.removed, "purged crash logs");
    Ok(outcome.removed)
}
