//! API error type with IntoResponse
//!
//! Every failure is a SQL execution failure from the caller's point of
//! view: HTTP 500 with `{ "success": false, "error": "<message>" }`.
//! Connection loss and constraint violations look the same.

use std::time::Duration;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::db::MigrationError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// A schema plan failed (500, logged)
    #[error(transparent)]
    Migration(#[from] MigrationError),

    /// A read-only query failed (500, logged)
    #[error(transparent)]
    Database(#[from] sqlx::Error),

    /// The database did not answer within the request deadline (500, logged)
    #[error("{operation} timed out after {}ms waiting on the database; uncommitted changes were rolled back", .after.as_millis())]
    Timeout {
        operation: &'static str,
        after: Duration,
    },
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = self.to_string();
        match &self {
            Self::Migration(e) => tracing::error!(error = %e, "schema migration failed"),
            Self::Database(e) => tracing::error!(error = %e, "database error"),
            Self::Timeout { operation, after } => {
                tracing::error!(operation, after_ms = after.as_millis() as u64, "database request timed out")
            }
        }

        let body = json!({
            "success": false,
            "error": message,
        });

        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[tokio::test]
    async fn migration_error_is_500_with_message() {
        let err = ApiError::Migration(MigrationError::Begin(sqlx::Error::PoolTimedOut));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["success"], false);
        assert!(body["error"]
            .as_str()
            .unwrap()
            .starts_with("failed to open transaction"));
        assert!(body.get("message").is_none());
    }

    #[tokio::test]
    async fn timeout_is_500_with_message() {
        let err = ApiError::Timeout {
            operation: "force migration",
            after: Duration::from_millis(300),
        };
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["success"], false);
        assert_eq!(
            body["error"],
            "force migration timed out after 300ms waiting on the database; uncommitted changes were rolled back"
        );
    }

    #[tokio::test]
    async fn database_error_is_500() {
        let response = ApiError::Database(sqlx::Error::PoolClosed).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
