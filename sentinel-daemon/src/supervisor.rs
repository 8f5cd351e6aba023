//! The supervision loop body: one call to [`Supervisor::tick`] per polling
//! quantum.
//!
//! Each tick runs three independent branches in a fixed order (backup,
//! purge, liveness). A branch never prevents the others from running; its
//! failures are logged and reported in the [`TickReport`], and the next
//! scheduled tick is the retry.

use std::path::PathBuf;

use chrono::{DateTime, Local};
use serde::Serialize;

use sentinel_core::{
    has_recent_backup, perform_backup, purge_crash_logs, Clock, Config, Filesystem,
};

use crate::session::{is_running, start, SessionHost};

/// When the last backup succeeded and the last purge ran. Never persisted:
/// after a restart both timers start from "now", and the snapshot directory
/// names decide whether a backup is really due.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleState {
    pub last_backup_time: DateTime<Local>,
    pub last_purge_time: DateTime<Local>,
}

impl ScheduleState {
    pub fn starting_at(now: DateTime<Local>) -> Self {
        Self {
            last_backup_time: now,
            last_purge_time: now,
        }
    }

    /// State in which both backup and purge are due at `now`.
    pub fn overdue_at(now: DateTime<Local>, config: &Config) -> Self {
        Self {
            last_backup_time: now - config.backup_interval(),
            last_purge_time: now - config.purge_interval(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum BackupOutcome {
    NotDue,
    SkippedRecent,
    Completed {
        snapshot: PathBuf,
        failed_items: usize,
    },
    Failed {
        error: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PurgeOutcome {
    NotDue,
    Completed { removed: usize },
    Failed { error: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum LivenessOutcome {
    Running,
    Restarted,
    RestartFailed { error: String },
    /// The session list could not be read, so no restart was attempted.
    Unknown { error: String },
}

/// What one tick did, branch by branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TickReport {
    pub backup: BackupOutcome,
    pub purge: PurgeOutcome,
    pub liveness: LivenessOutcome,
}

pub struct Supervisor<H, F, C> {
    config: Config,
    host: H,
    fs: F,
    clock: C,
    state: ScheduleState,
}

impl<H, F, C> Supervisor<H, F, C>
where
    H: SessionHost,
    F: Filesystem,
    C: Clock,
{
    /// Timers start at the clock's current time.
    pub fn new(config: Config, host: H, fs: F, clock: C) -> Self {
        let state = ScheduleState::starting_at(clock.now());
        Self::with_state(config, host, fs, clock, state)
    }

    pub fn with_state(config: Config, host: H, fs: F, clock: C, state: ScheduleState) -> Self {
        Self {
            config,
            host,
            fs,
            clock,
            state,
        }
    }

    pub fn state(&self) -> ScheduleState {
        self.state
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    /// Run one iteration of the loop.
    pub fn tick(&mut self) -> TickReport {
        let now = self.clock.now();
        let backup = self.backup_branch(now);
        let purge = self.purge_branch(now);
        let liveness = self.liveness_branch();
        TickReport {
            backup,
            purge,
            liveness,
        }
    }

    fn backup_branch(&mut self, now: DateTime<Local>) -> BackupOutcome {
        let interval = self.config.backup_interval();
        if now - self.state.last_backup_time < interval {
            return BackupOutcome::NotDue;
        }

        let base_dir = &self.config.backup.base_dir;
        let prefix = &self.config.backup.prefix;
        if has_recent_backup(&self.fs, base_dir, prefix, interval, now) {
            tracing::info!("skipping backup, one was recently completed");
            return BackupOutcome::SkippedRecent;
        }

        match perform_backup(&self.fs, base_dir, prefix, &self.config.backup_items(), now) {
            Ok(report) => {
                self.state.last_backup_time = now;
                BackupOutcome::Completed {
                    failed_items: report.failed.len(),
                    snapshot: report.snapshot,
                }
            }
            Err(err) => {
                tracing::error!(error = %err, "backup failed, will retry next tick");
                BackupOutcome::Failed {
                    error: err.to_string(),
                }
            }
        }
    }

    fn purge_branch(&mut self, now: DateTime<Local>) -> PurgeOutcome {
        if now - self.state.last_purge_time < self.config.purge_interval() {
            return PurgeOutcome::NotDue;
        }

        // Advances on failure too: the next attempt is the next scheduled purge.
        self.state.last_purge_time = now;
        match purge_crash_logs(&self.fs, &self.config.crash_reports_dir()) {
            Ok(removed) => PurgeOutcome::Completed { removed },
            Err(err) => {
                tracing::warn!(error = %err, "crash log purge failed, will retry next interval");
                PurgeOutcome::Failed {
                    error: err.to_string(),
                }
            }
        }
    }

    fn liveness_branch(&self) -> LivenessOutcome {
        let server = &self.config.server;
        match is_running(&self.host, &server.session_name) {
            Ok(true) => LivenessOutcome::Running,
            Ok(false) => {
                tracing::info!(session = %server.session_name, "server not running, restarting");
                match start(
                    &self.host,
                    &server.session_name,
                    &server.java,
                    &self.config.launch_args(),
                    Some(server.dir.as_path()),
                ) {
                    Ok(()) => LivenessOutcome::Restarted,
                    Err(err) => {
                        tracing::warn!(error = %err, "failed to start server session");
                        LivenessOutcome::RestartFailed {
                            error: err.to_string(),
                        }
                    }
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, "could not list sessions, skipping liveness check");
                LivenessOutcome::Unknown {
                    error: err.to_string(),
                }
            }
        }
    }
}
