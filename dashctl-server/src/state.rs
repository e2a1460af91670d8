//! Application state shared across handlers

use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;

/// Deadline for one database round of a handler unless the server config says otherwise
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    pool: PgPool,
    request_timeout: Duration,
}

impl AppState {
    pub fn new(pool: PgPool) -> Self {
        Self::with_request_timeout(pool, DEFAULT_REQUEST_TIMEOUT)
    }

    pub fn with_request_timeout(pool: PgPool, request_timeout: Duration) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                pool,
                request_timeout,
            }),
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// How long a handler waits on the database before answering with an error
    pub fn request_timeout(&self) -> Duration {
        self.inner.request_timeout
    }
}
