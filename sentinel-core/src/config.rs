//! YAML configuration.
//!
//! # Storage layout
//!
//! ```text
//! ~/.sentinel/
//!   config.yaml     (optional — built-in defaults apply when absent)
//! ```
//!
//! # API pattern
//!
//! As with every home-derived path in this workspace, there are two forms:
//! - `fn_at(home: &Path, …)` — explicit home; used in tests with `TempDir`
//! - `fn(…)` — derives home from `dirs::home_dir()`, delegates to `_at`

use std::path::{Path, PathBuf};
use std::time::Duration as StdDuration;

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::error::{io_err, SentinelError};

/// Upper bound on either interval (about a century).
pub const MAX_INTERVAL_HOURS: u64 = 24 * 365 * 100;

/// Which terminal multiplexer hosts the server session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Multiplexer {
    #[default]
    Screen,
    Tmux,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub backup_interval_hours: u64,
    pub purge_interval_hours: u64,
    pub poll_quantum_seconds: u64,
    pub multiplexer: Multiplexer,
    pub server: ServerConfig,
    pub backup: BackupConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    /// Session name used both to detect liveness and to name the launched session.
    pub session_name: String,
    pub jar_path: PathBuf,
    /// Root of the backup items and the crash-report directory.
    pub dir: PathBuf,
    pub memory_min: String,
    pub memory_max: String,
    pub java: String,
    /// Appended after `-jar <jar_path>`.
    pub extra_args: Vec<String>,
    /// Relative to `dir` unless absolute.
    pub crash_reports: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BackupConfig {
    pub base_dir: PathBuf,
    pub prefix: String,
    /// Relative to `server.dir` unless absolute.
    pub items: Vec<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backup_interval_hours: 12,
            purge_interval_hours: 24,
            poll_quantum_seconds: 10,
            multiplexer: Multiplexer::default(),
            server: ServerConfig::default(),
            backup: BackupConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            session_name: "solar".to_string(),
            jar_path: PathBuf::from("~/solar-smp/server.jar"),
            dir: PathBuf::from("~/solar-smp/"),
            memory_min: "1G".to_string(),
            memory_max: "7G".to_string(),
            java: "java".to_string(),
            extra_args: Vec::new(),
            crash_reports: PathBuf::from("crash-reports"),
        }
    }
}

impl Default for BackupConfig {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from("~/"),
            prefix: "autobackup-".to_string(),
            items: ["solar3", "banned-ips.json", "banned-players.json", "config"]
                .into_iter()
                .map(PathBuf::from)
                .collect(),
        }
    }
}

impl Config {
    pub fn backup_interval(&self) -> Duration {
        Duration::hours(self.backup_interval_hours as i64)
    }

    pub fn purge_interval(&self) -> Duration {
        Duration::hours(self.purge_interval_hours as i64)
    }

    pub fn poll_quantum(&self) -> StdDuration {
        StdDuration::from_secs(self.poll_quantum_seconds)
    }

    /// Absolute paths of every configured backup item.
    pub fn backup_items(&self) -> Vec<PathBuf> {
        self.backup
            .items
            .iter()
            .map(|item| self.server.dir.join(item))
            .collect()
    }

    pub fn crash_reports_dir(&self) -> PathBuf {
        self.server.dir.join(&self.server.crash_reports)
    }

    /// `-Xms<min> -Xmx<max> -jar <jar> [extra_args…]`
    pub fn launch_args(&self) -> Vec<String> {
        let mut args = vec![
            format!("-Xms{}", self.server.memory_min),
            format!("-Xmx{}", self.server.memory_max),
            "-jar".to_string(),
            self.server.jar_path.display().to_string(),
        ];
        args.extend(self.server.extra_args.iter().cloned());
        args
    }

    pub fn validate(&self) -> Result<(), SentinelError> {
        for (name, hours) in [
            ("backup_interval_hours", self.backup_interval_hours),
            ("purge_interval_hours", self.purge_interval_hours),
        ] {
            if hours == 0 || hours > MAX_INTERVAL_HOURS {
                return Err(SentinelError::Invalid(format!(
                    "{name} must be between 1 and {MAX_INTERVAL_HOURS}, got {hours}"
                )));
            }
        }
        if self.poll_quantum_seconds == 0 {
            return Err(SentinelError::Invalid(
                "poll_quantum_seconds must be greater than 0".to_string(),
            ));
        }
        if self.server.session_name.trim().is_empty() {
            return Err(SentinelError::Invalid(
                "server.session_name must not be empty".to_string(),
            ));
        }
        if self.backup.prefix.is_empty() {
            return Err(SentinelError::Invalid(
                "backup.prefix must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Expand a leading `~` in every path field against `home`.
    pub fn expanded(mut self, home: &Path) -> Self {
        self.server.jar_path = expand_tilde(&self.server.jar_path, home);
        self.server.dir = expand_tilde(&self.server.dir, home);
        self.server.crash_reports = expand_tilde(&self.server.crash_reports, home);
        self.backup.base_dir = expand_tilde(&self.backup.base_dir, home);
        self.backup.items = self
            .backup
            .items
            .iter()
            .map(|item| expand_tilde(item, home))
            .collect();
        self
    }
}

/// `<home>/.sentinel/config.yaml` — pure, no I/O.
pub fn config_path_at(home: &Path) -> PathBuf {
    home.join(".sentinel").join("config.yaml")
}

/// Load the config from `explicit`, or from `<home>/.sentinel/config.yaml`.
///
/// An explicit path must exist; the default path falls back to built-in
/// defaults when absent. The result is validated and `~`-expanded.
pub fn load_at(home: &Path, explicit: Option<&Path>) -> Result<Config, SentinelError> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => config_path_at(home),
    };

    let config = match std::fs::read_to_string(&path) {
        Ok(contents) => serde_yaml::from_str::<Config>(&contents)
            .map_err(|source| SentinelError::ConfigParse {
                path: path.clone(),
                source,
            })?,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound && explicit.is_none() => {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            Config::default()
        }
        Err(err) => return Err(io_err(&path, err)),
    };

    config.validate()?;
    Ok(config.expanded(home))
}

/// `load_at` convenience wrapper.
pub fn load(explicit: Option<&Path>) -> Result<Config, SentinelError> {
    load_at(&home()?, explicit)
}

fn expand_tilde(path: &Path, home: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => home.join(rest),
        Err(_) => path.to_path_buf(),
    }
}

fn home() -> Result<PathBuf, SentinelError> {
    dirs::home_dir().ok_or(SentinelError::HomeNotFound)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tilde_expands_only_as_leading_component() {
        let home = Path::new("/home/op");
        assert_eq!(
            expand_tilde(Path::new("~/solar-smp/server.jar"), home),
            PathBuf::from("/home/op/solar-smp/server.jar")
        );
        assert_eq!(expand_tilde(Path::new("~"), home), PathBuf::from("/home/op"));
        assert_eq!(
            expand_tilde(Path::new("/srv/~data"), home),
            PathBuf::from("/srv/~data")
        );
        assert_eq!(
            expand_tilde(Path::new("~other/x"), home),
            PathBuf::from("~other/x")
        );
    }

    #[test]
    fn launch_args_match_java_heap_flags() {
        let config = Config::default().expanded(Path::new("/home/op"));
        assert_eq!(
            config.launch_args(),
            vec!["-Xms1G", "-Xmx7G", "-jar", "/home/op/solar-smp/server.jar"]
        );
    }

    #[test]
    fn backup_items_resolve_under_server_dir() {
        let config = Config::default().expanded(Path::new("/home/op"));
        let items = config.backup_items();
        assert_eq!(items[0], PathBuf::from("/home/op/solar-smp/solar3"));
        assert_eq!(items.len(), 4);
        assert_eq!(
            config.crash_reports_dir(),
            PathBuf::from("/home/op/solar-smp/crash-reports")
        );
    }
}
