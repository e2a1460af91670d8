//! Database layer - connection pool and schema executor
//!
//! - Connection pool (default 5 connections)
//! - Plans run in one transaction under an advisory lock

pub mod migrate;
pub mod pool;

pub use migrate::{apply, table_status, MigrationError, MigrationReport, TableStatus};
pub use pool::{create_lazy_pool, create_pool, create_pool_with_options};
