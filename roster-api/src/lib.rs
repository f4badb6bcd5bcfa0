//! Roster API - HTTP Layer
//!
//! Axum REST surface over the employee record store:
//! - bulk spreadsheet ingestion with observable import jobs
//! - cache-aside reads of the full employee list
//! - partial updates followed by a full snapshot refresh
//!
//! The record store is PostgreSQL (`DbClient`) or in-memory; the snapshot
//! cache is Redis or in-process.

pub mod config;
pub mod constants;
pub mod db;
pub mod error;
pub mod ingest;
pub mod jobs;
pub mod macros;
pub mod openapi;
pub mod routes;
pub mod services;
pub mod state;
pub mod telemetry;
pub mod types;

// Re-export commonly used types
pub use config::{ApiConfig, CacheSettings, StoreKind};
pub use db::{DbClient, DbConfig};
pub use error::{ApiError, ApiResult, ErrorCode};
pub use ingest::{ImportPipeline, ImportReport};
pub use jobs::{ImportJob, JobRegistry, JobStatus};
pub use openapi::ApiDoc;
pub use routes::create_api_router;
pub use services::{EmployeeService, EmployeeSnapshot, SnapshotSource};
pub use state::AppState;
pub use types::*;
