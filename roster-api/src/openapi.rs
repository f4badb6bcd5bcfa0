//! OpenAPI document for the roster API
//!
//! Generated with utoipa from the route annotations and schema derives.

use utoipa::OpenApi;

use roster_core::{Employee, EmployeePatch};

use crate::error::{ApiError, ErrorCode};
use crate::jobs::{ImportJob, JobStatus};
use crate::routes::health::{ComponentHealth, HealthDetails, HealthResponse, HealthStatus};
use crate::routes::{employee, health, jobs, upload};
use crate::telemetry::metrics;
use crate::types::{EmployeeListResponse, MessageResponse, UploadAccepted, UploadForm};

/// OpenAPI document for the roster API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Roster API",
        version = "0.1.0",
        description = "Bulk spreadsheet ingestion and cached access to employee records",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "http://localhost:8080", description = "Local Development")
    ),
    tags(
        (name = "Imports", description = "Spreadsheet uploads and import job status"),
        (name = "Employees", description = "Cached reads and partial updates"),
        (name = "Health", description = "Liveness and readiness probes"),
        (name = "Observability", description = "Prometheus metrics")
    ),
    paths(
        upload::upload_file,
        jobs::get_job,
        employee::get_employees,
        employee::edit_record,
        health::ping,
        health::readiness,
        metrics::metrics_handler,
    ),
    components(schemas(
        Employee,
        EmployeePatch,
        EmployeeListResponse,
        MessageResponse,
        UploadAccepted,
        UploadForm,
        ImportJob,
        JobStatus,
        HealthResponse,
        HealthStatus,
        HealthDetails,
        ComponentHealth,
        ApiError,
        ErrorCode,
    ))
)]
pub struct ApiDoc;

impl ApiDoc {
    /// Pretty-printed JSON document.
    pub fn to_json() -> Result<String, serde_json::Error> {
        ApiDoc::openapi().to_pretty_json()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_renders() -> Result<(), serde_json::Error> {
        let json = ApiDoc::to_json()?;
        assert!(json.contains("Roster API"));
        assert!(json.contains("EmployeePatch"));
        assert!(json.contains("/health/ready"));
        Ok(())
    }

    #[test]
    fn test_employee_timestamps_are_date_time_strings() -> Result<(), serde_json::Error> {
        let doc = serde_json::to_value(ApiDoc::openapi())?;
        let properties = &doc["components"]["schemas"]["Employee"]["properties"];
        for field in ["CreatedAt", "UpdatedAt", "DeletedAt"] {
            assert_eq!(properties[field]["format"], "date-time", "{field}");
        }
        assert_eq!(properties["CreatedAt"]["type"], "string");
        Ok(())
    }
}
