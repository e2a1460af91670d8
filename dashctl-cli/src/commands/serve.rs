//! HTTP server command
//!
//! Runs the schema endpoints until Ctrl+C/SIGTERM.

use anyhow::{Context, Result};
use clap::Parser;
use std::net::SocketAddr;

use dashctl_server::db::create_lazy_pool;
use dashctl_server::http::{run_server, ServerConfig};

use super::load_config;

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Address to bind to (overrides config; default 127.0.0.1:3030)
    #[arg(long, short = 'b')]
    pub bind: Option<SocketAddr>,

    /// Allow permissive CORS (all origins) - use with caution
    #[arg(long)]
    pub cors_permissive: bool,

    /// Database URL (overrides config/environment)
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,
}

/// Run the HTTP server
pub async fn run_serve(args: ServeArgs) -> Result<()> {
    let dash = load_config(args.database_url)?;
    let database_url = dash.database_url()?;

    let mut config = ServerConfig::from(&dash.server);
    if let Some(bind) = args.bind {
        config.bind_addr = bind;
    }
    config.cors_permissive |= args.cors_permissive;

    tracing::info!(bind = %config.bind_addr, "Starting dashctl server");

    // Lazy: the fallback endpoint must come up even while the database is down
    let pool = create_lazy_pool(database_url, dash.server.max_connections)
        .context("Invalid database URL")?;

    run_server(pool, config).await.context("Server error")?;

    Ok(())
}
