//! Inspect the schema: print a plan's SQL or check which tables exist

use anyhow::{Context, Result};
use clap::{Args, Subcommand, ValueEnum};

use dashctl_server::db::{self, create_pool_with_options};

use super::{load_config, PlanSelection};

#[derive(Args, Debug)]
pub struct SchemaArgs {
    #[command(subcommand)]
    pub command: SchemaCommand,
}

#[derive(Subcommand, Debug)]
pub enum SchemaCommand {
    /// Print the SQL a plan would run (no database needed)
    Print(PlanSelection),
    /// Show which dashboard tables exist
    Status(StatusArgs),
}

#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Database URL (overrides config/environment)
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

pub async fn run_schema(args: SchemaArgs) -> Result<()> {
    match args.command {
        SchemaCommand::Print(selection) => {
            print!("{}", selection.plan().to_sql());
            Ok(())
        }
        SchemaCommand::Status(status) => run_status(status).await,
    }
}

async fn run_status(args: StatusArgs) -> Result<()> {
    let config = load_config(args.database_url)?;
    let pool = create_pool_with_options(config.database_url()?, 1)
        .await
        .context("Failed to connect to database")?;

    let tables = db::table_status(&pool)
        .await
        .context("Failed to query table status")?;

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&tables)?),
        OutputFormat::Text => {
            for table in &tables {
                let mark = if table.exists { "present" } else { "missing" };
                println!("{:<26} {}", table.name, mark);
            }
        }
    }
    Ok(())
}
