//! Subcommand implementations

pub mod migrate;
pub mod schema;
pub mod serve;

use anyhow::{Context, Result};
use clap::Args;
use dashctl_core::{DashConfig, MigrationPlan};

/// Which plan to run; the full fallback plan when neither flag is given
#[derive(Args, Debug, Clone, Default)]
pub struct PlanSelection {
    /// Only create missing tables, never drop anything
    #[arg(long, conflicts_with = "reset_settings_only")]
    pub ensure_only: bool,

    /// Only drop and recreate the dashboard_settings table
    #[arg(long)]
    pub reset_settings_only: bool,
}

impl PlanSelection {
    pub fn plan(&self) -> MigrationPlan {
        if self.ensure_only {
            MigrationPlan::ensure_missing()
        } else if self.reset_settings_only {
            MigrationPlan::reset_settings()
        } else {
            MigrationPlan::force()
        }
    }
}

/// Load config file + environment, then apply a non-empty `--database-url` flag
pub fn load_config(database_url: Option<String>) -> Result<DashConfig> {
    let mut config = DashConfig::load().context("Failed to load dashctl config")?;
    if let Some(url) = database_url.filter(|url| !url.is_empty()) {
        config.database_url = Some(url);
    }
    Ok(config)
}
