//! dashctl-core: dashboard schema definitions and configuration
//!
//! Holds the hard-coded table DDL, the migration plans built from it and
//! the config layer shared by the server and the CLI. Nothing here talks
//! to a database.

pub mod config;
pub mod error;
pub mod schema;

pub use config::{DashConfig, ServerSettings};
pub use error::{DashError, Result};
pub use schema::{MigrationPlan, Step, StepKind, TableDef, ALL_TABLES};
