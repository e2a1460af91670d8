//! Configuration for dashctl
//!
//! Loaded from `~/.dashctl/config.toml` (or the file named by
//! `DASHCTL_CONFIG`), then overridden by environment variables:
//! - `DATABASE_URL`: PostgreSQL connection string
//! - `DASHCTL_BIND`: server bind address (e.g. 0.0.0.0:3030)
//! - `DASHCTL_CORS_PERMISSIVE`: `true`/`1` to allow any origin
//!
//! A missing file is not an error; every setting has a default except the
//! database URL.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{DashError, Result};

/// Kept low: the service issues a handful of DDL statements per call.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashConfig {
    pub database_url: Option<String>,
    pub server: ServerSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Address to bind to (default: 127.0.0.1:3030)
    pub bind: SocketAddr,

    /// Allow any CORS origin (default: localhost only)
    pub cors_permissive: bool,

    /// Deadline for a handler's database work
    pub request_timeout_secs: u64,

    pub max_connections: u32,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 3030)),
            cors_permissive: false,
            request_timeout_secs: 30,
            max_connections: DEFAULT_MAX_CONNECTIONS,
        }
    }
}

impl DashConfig {
    /// Path of the config file: `$DASHCTL_CONFIG` or `~/.dashctl/config.toml`
    pub fn config_path() -> Result<PathBuf> {
        if let Ok(path) = std::env::var("DASHCTL_CONFIG") {
            return Ok(PathBuf::from(path));
        }
        let home = dirs::home_dir()
            .ok_or_else(|| DashError::config("could not determine home directory"))?;
        Ok(home.join(".dashctl").join("config.toml"))
    }

    /// Load file config (if present) with environment overrides applied
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        let mut config = Self::load_from(&path)?;
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Load a config file, falling back to defaults when it doesn't exist
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)?;
        toml::from_str(&raw).map_err(|e| DashError::config_parse(path, e))
    }

    /// Apply environment overrides using the given lookup
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("DATABASE_URL").filter(|v| !v.is_empty()) {
            self.database_url = Some(url);
        }
        if let Some(bind) = lookup("DASHCTL_BIND") {
            self.server.bind = bind
                .parse()
                .map_err(|e| DashError::config(format!("invalid DASHCTL_BIND '{}': {}", bind, e)))?;
        }
        if let Some(flag) = lookup("DASHCTL_CORS_PERMISSIVE") {
            self.server.cors_permissive = matches!(flag.trim(), "1" | "true" | "yes");
        }
        Ok(())
    }

    /// The database URL, or an error telling the operator how to set it
    pub fn database_url(&self) -> Result<&str> {
        self.database_url.as_deref().ok_or_else(|| {
            DashError::config(
                "DATABASE_URL not set. Set via --database-url, DATABASE_URL env, or ~/.dashctl/config.toml",
            )
        })
    }
}
