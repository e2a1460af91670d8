/// Structured error types for dashctl-core.
///
/// Library consumers get `thiserror` enums; the `dashctl` binary wraps
/// them in `anyhow` with context.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for dashctl-core operations
#[derive(Error, Debug)]
pub enum DashError {
    /// I/O operation failed
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },

    /// Config file exists but is not valid TOML for `DashConfig`
    #[error("Failed to parse config file {path:?}: {source}")]
    ConfigParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// Configuration error
    #[error("Configuration error: {reason}")]
    Config { reason: String },
}

/// Result type alias for dashctl-core operations
pub type Result<T> = std::result::Result<T, DashError>;

impl DashError {
    /// Create a config parse error for the given file
    pub fn config_parse(path: impl Into<PathBuf>, source: toml::de::Error) -> Self {
        Self::ConfigParse {
            path: path.into(),
            source,
        }
    }

    /// Create a config error
    pub fn config(reason: impl Into<String>) -> Self {
        Self::Config {
            reason: reason.into(),
        }
    }
}
