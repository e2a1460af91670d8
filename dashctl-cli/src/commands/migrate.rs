//! Run a schema plan directly against the database, without HTTP

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};

use dashctl_server::db::{self, create_pool_with_options};

use super::{load_config, PlanSelection};

#[derive(Parser, Debug)]
pub struct MigrateArgs {
    #[command(flatten)]
    pub plan: PlanSelection,

    /// Database URL (overrides config/environment)
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,
}

pub async fn run_migrate(args: MigrateArgs) -> Result<()> {
    let config = load_config(args.database_url)?;
    let plan = args.plan.plan();

    if plan.is_destructive() {
        warn!(tables = ?plan.tables(), "plan drops and recreates dashboard_settings");
    }

    let pool = create_pool_with_options(config.database_url()?, 1)
        .await
        .context("Failed to connect to database")?;

    info!(tables = ?plan.tables(), "applying schema plan");
    let report = db::apply(&pool, &plan)
        .await
        .context("Schema migration failed, no changes were kept")?;

    println!(
        "reset: {}  ensured: {}",
        list_or_dash(&report.reset),
        list_or_dash(&report.ensured)
    );
    Ok(())
}

fn list_or_dash(tables: &[&str]) -> String {
    if tables.is_empty() {
        "-".to_string()
    } else {
        tables.join(", ")
    }
}
