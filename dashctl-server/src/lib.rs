//! dashctl-server: emergency schema bootstrap over HTTP
//!
//! Fallback for when the regular migration system has failed: a POST
//! recreates the dashboard tables from hard-coded DDL. See
//! [`http::routes::schema`] for the endpoints and [`db::migrate`] for how
//! a plan is executed.

pub mod db;
pub mod http;
pub mod state;

pub use http::{build_router, run_server, ServerConfig};
pub use state::AppState;
