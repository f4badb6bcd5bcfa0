//! Shared application state for Axum routers.

use std::sync::Arc;

use roster_storage::{EmployeeStore, SnapshotCache};

use crate::config::ApiConfig;
use crate::ingest::ImportPipeline;
use crate::jobs::JobRegistry;
use crate::services::EmployeeService;

/// Application-wide state shared across all routes.
#[derive(Clone)]
pub struct AppState {
    /// Cache-aside reads and write-through updates.
    pub employees: EmployeeService,
    /// Parse/validate/commit for uploads; shares the service above.
    pub importer: ImportPipeline,
    /// Import jobs visible through `GET /jobs/{id}`.
    pub jobs: JobRegistry,
    pub config: Arc<ApiConfig>,
    pub start_time: std::time::Instant,
}

impl AppState {
    pub fn new(store: Arc<dyn EmployeeStore>, cache: SnapshotCache, config: ApiConfig) -> Self {
        let employees = EmployeeService::new(store, cache);
        Self {
            importer: ImportPipeline::new(employees.clone()),
            employees,
            jobs: JobRegistry::new(),
            config: Arc::new(config),
            start_time: std::time::Instant::now(),
        }
    }
}

// Use macro to reduce boilerplate for FromRef implementations
crate::impl_from_ref!(EmployeeService, employees);
crate::impl_from_ref!(JobRegistry, jobs);
crate::impl_from_ref!(Arc<ApiConfig>, config);
crate::impl_from_ref!(std::time::Instant, start_time);
