//! Service layer shared by the HTTP handlers and the import pipeline.

pub mod employee_service;

pub use employee_service::{EmployeeService, EmployeeSnapshot, SnapshotRefresh, SnapshotSource};
