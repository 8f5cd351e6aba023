//! Error types for sentinel-core.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise from configuration loading and maintenance operations.
#[derive(Debug, Error)]
pub enum SentinelError {
    /// Underlying I/O failure, tagged with the path that was being touched.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML parse error on load — includes file path and line context from serde_yaml.
    #[error("failed to parse config at {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// A config value was out of range or empty.
    #[error("invalid config: {0}")]
    Invalid(String),

    /// `dirs::home_dir()` returned `None` — cannot expand `~` or locate `~/.sentinel/`.
    #[error("cannot determine home directory; set $HOME or equivalent")]
    HomeNotFound,
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SentinelError {
    SentinelError::Io {
        path: path.into(),
        source,
    }
}
