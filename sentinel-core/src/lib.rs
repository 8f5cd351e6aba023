//! Sentinel core library — configuration, clock, filesystem capability,
//! backup snapshots, and crash-log purge.
//!
//! - [`config`] — YAML config with built-in defaults
//! - [`backup`] — snapshot naming, recency scan, `perform_backup`
//! - [`purge`] — crash-report cleanup
//! - [`fs`] — [`Filesystem`] trait and [`LocalFs`]
//! - [`clock`] — [`Clock`] trait, [`SystemClock`], [`ManualClock`]

pub mod backup;
pub mod clock;
pub mod config;
pub mod error;
pub mod fs;
pub mod purge;

pub use backup::{has_recent_backup, perform_backup, BackupReport, Snapshot};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{Config, Multiplexer};
pub use error::SentinelError;
pub use fs::{Filesystem, LocalFs, RemovedEntries};
pub use purge::purge_crash_logs;
