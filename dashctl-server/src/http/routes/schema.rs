//! Schema endpoints
//!
//! - POST /api/force-migrate: emergency fallback, resets `dashboard_settings`
//!   and creates the other tables when missing
//! - POST /api/schema/ensure: create missing tables only
//! - POST /api/schema/reset-settings: rebuild `dashboard_settings` only
//! - GET  /api/schema/status: which tables exist
//!
//! No handler reads the request body or query string. Each database round
//! is bounded by [`AppState::request_timeout`]; running out of time is a
//! failure like any other and answers with the JSON error shape.

use std::future::Future;

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use dashctl_core::MigrationPlan;
use serde::Serialize;
use tracing::info;

use crate::db::{self, TableStatus};
use crate::http::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct MigrateResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub success: bool,
    /// All six tables present
    pub complete: bool,
    pub tables: Vec<TableStatus>,
}

/// Success message of the force migration, matched verbatim by existing clients
pub const FORCE_MIGRATE_MESSAGE: &str = "Database tables created successfully via raw SQL!";

/// POST /api/force-migrate
async fn force_migrate(State(state): State<AppState>) -> Result<Json<MigrateResponse>, ApiError> {
    run_plan(
        &state,
        "force migration",
        &MigrationPlan::force(),
        FORCE_MIGRATE_MESSAGE,
    )
    .await
}

/// POST /api/schema/ensure
async fn ensure_tables(State(state): State<AppState>) -> Result<Json<MigrateResponse>, ApiError> {
    run_plan(
        &state,
        "ensure tables",
        &MigrationPlan::ensure_missing(),
        "Missing database tables created",
    )
    .await
}

/// POST /api/schema/reset-settings
async fn reset_settings(State(state): State<AppState>) -> Result<Json<MigrateResponse>, ApiError> {
    run_plan(
        &state,
        "reset settings",
        &MigrationPlan::reset_settings(),
        "Settings table dropped and recreated",
    )
    .await
}

async fn run_plan(
    state: &AppState,
    name: &'static str,
    plan: &MigrationPlan,
    message: &str,
) -> Result<Json<MigrateResponse>, ApiError> {
    info!(plan = name, tables = ?plan.tables(), destructive = plan.is_destructive(), "starting schema plan");

    let report = with_deadline(state, name, db::apply(state.pool(), plan)).await??;
    info!(plan = name, reset = ?report.reset, ensured = ?report.ensured, "schema plan complete");

    Ok(Json(MigrateResponse {
        success: true,
        message: message.to_string(),
    }))
}

/// Run a database future under the request deadline.
///
/// Dropping an unfinished plan drops its transaction, which rolls back.
async fn with_deadline<T>(
    state: &AppState,
    operation: &'static str,
    work: impl Future<Output = T>,
) -> Result<T, ApiError> {
    let after = state.request_timeout();
    tokio::time::timeout(after, work)
        .await
        .map_err(|_| ApiError::Timeout { operation, after })
}

/// GET /api/schema/status
async fn schema_status(State(state): State<AppState>) -> Result<Json<StatusResponse>, ApiError> {
    let tables = with_deadline(&state, "schema status", db::table_status(state.pool())).await??;
    let complete = tables.iter().all(|t| t.exists);

    Ok(Json(StatusResponse {
        success: true,
        complete,
        tables,
    }))
}

/// Schema routes
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/force-migrate", post(force_migrate))
        .route("/api/schema/ensure", post(ensure_tables))
        .route("/api/schema/reset-settings", post(reset_settings))
        .route("/api/schema/status", get(schema_status))
}
