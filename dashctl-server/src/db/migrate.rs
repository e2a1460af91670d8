//! Plan executor and schema status
//!
//! A plan runs inside one transaction holding a transaction-scoped advisory
//! lock, so concurrent callers queue behind each other and a failing
//! statement rolls back everything the same call already did.

use dashctl_core::schema::{MigrationPlan, StepKind, ALL_TABLES};
use serde::Serialize;
use sqlx::PgPool;
use tracing::{debug, info, warn};

/// Advisory lock key, hashed server-side with `hashtext`.
pub const MIGRATION_LOCK_KEY: &str = "dashctl_schema_migration";

/// Failure while applying a plan. Every variant carries the driver error.
#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    #[error("failed to open transaction: {0}")]
    Begin(#[source] sqlx::Error),

    #[error("failed to acquire migration lock: {0}")]
    Lock(#[source] sqlx::Error),

    #[error("failed to apply {kind} step for table \"{table}\": {source}")]
    Step {
        table: &'static str,
        kind: StepKind,
        #[source]
        source: sqlx::Error,
    },

    #[error("failed to commit schema changes: {0}")]
    Commit(#[source] sqlx::Error),
}

/// Tables touched by a successful run, by step kind
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MigrationReport {
    pub reset: Vec<&'static str>,
    pub ensured: Vec<&'static str>,
}

/// Apply a plan atomically.
pub async fn apply(pool: &PgPool, plan: &MigrationPlan) -> Result<MigrationReport, MigrationError> {
    let mut tx = pool.begin().await.map_err(MigrationError::Begin)?;

    sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
        .bind(MIGRATION_LOCK_KEY)
        .execute(&mut *tx)
        .await
        .map_err(MigrationError::Lock)?;

    let mut report = MigrationReport::default();
    for step in plan.steps() {
        debug!(table = step.table, kind = %step.kind, "applying schema step");

        for statement in &step.statements {
            sqlx::query(statement.as_str())
                .execute(&mut *tx)
                .await
                .map_err(|source| MigrationError::Step {
                    table: step.table,
                    kind: step.kind,
                    source,
                })?;
        }

        match step.kind {
            StepKind::Reset => {
                warn!(table = step.table, "table dropped and recreated, previous rows discarded");
                report.reset.push(step.table);
            }
            StepKind::Ensure => report.ensured.push(step.table),
        }
    }

    tx.commit().await.map_err(MigrationError::Commit)?;

    info!(
        reset = report.reset.len(),
        ensured = report.ensured.len(),
        "schema plan applied"
    );
    Ok(report)
}

/// Whether one dashboard table exists in the current schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableStatus {
    pub name: &'static str,
    pub exists: bool,
}

/// Existence of every dashboard table, in creation order.
pub async fn table_status(pool: &PgPool) -> Result<Vec<TableStatus>, sqlx::Error> {
    let names: Vec<&str> = ALL_TABLES.iter().map(|t| t.name).collect();

    let present: Vec<String> = sqlx::query_scalar(
        r#"
        SELECT table_name::text
        FROM information_schema.tables
        WHERE table_schema = current_schema()
          AND table_name::text = ANY($1)
        "#,
    )
    .bind(names)
    .fetch_all(pool)
    .await?;

    Ok(ALL_TABLES
        .iter()
        .map(|t| TableStatus {
            name: t.name,
            exists: present.iter().any(|p| p == t.name),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_error_names_table_and_kind() {
        let err = MigrationError::Step {
            table: "dashboard_settings",
            kind: StepKind::Reset,
            source: sqlx::Error::PoolTimedOut,
        };
        let msg = err.to_string();
        assert!(msg.contains("reset"));
        assert!(msg.contains("\"dashboard_settings\""));
        assert!(msg.contains("timed out"));
    }

    #[test]
    fn begin_error_is_never_empty() {
        let err = MigrationError::Begin(sqlx::Error::PoolClosed);
        assert!(err.to_string().starts_with("failed to open transaction: "));
    }
}
