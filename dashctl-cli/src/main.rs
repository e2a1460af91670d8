//! dashctl CLI - emergency schema bootstrap for the community dashboard
//!
//! - `serve`: HTTP endpoints (`POST /api/force-migrate` and friends)
//! - `migrate`: run the same plans directly
//! - `schema print|status`: inspect the SQL or the live database

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod tracing_setup;

use tracing_setup::TracingConfig;

#[derive(Parser, Debug)]
#[command(
    name = "dashctl",
    author,
    version,
    about = "Recreate the community dashboard tables when regular migrations fail",
    long_about = "Issues hard-coded DDL to (re)create the dashboard tables. The full plan \
                  drops and recreates dashboard_settings and creates the other tables when \
                  missing, all in one transaction."
)]
struct Cli {
    /// Debug logging (RUST_LOG still wins when set)
    #[arg(long, global = true)]
    debug: bool,

    /// Export traces over OTLP (requires the `telemetry` feature)
    #[arg(long, global = true)]
    otel: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP server
    Serve(commands::serve::ServeArgs),
    /// Apply a schema plan directly (no HTTP)
    Migrate(commands::migrate::MigrateArgs),
    /// Print plan SQL or show which tables exist
    Schema(commands::schema::SchemaArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    // .env is optional
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    tracing_setup::init(&TracingConfig {
        debug: cli.debug,
        otel: cli.otel,
    })?;

    let result = match cli.command {
        Commands::Serve(args) => commands::serve::run_serve(args).await,
        Commands::Migrate(args) => commands::migrate::run_migrate(args).await,
        Commands::Schema(args) => commands::schema::run_schema(args).await,
    };

    tracing_setup::shutdown_otel();
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn plan_flags_conflict() {
        let parsed = Cli::try_parse_from([
            "dashctl",
            "migrate",
            "--ensure-only",
            "--reset-settings-only",
        ]);
        assert!(parsed.is_err());
    }

    #[test]
    fn serve_accepts_bind() {
        let cli = Cli::try_parse_from(["dashctl", "serve", "--bind", "0.0.0.0:8080"]).unwrap();
        match cli.command {
            Commands::Serve(args) => assert_eq!(args.bind.unwrap().port(), 8080),
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
