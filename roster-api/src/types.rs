//! Request and response bodies that are not domain entities.

use roster_core::Employee;
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;
use uuid::Uuid;

/// `{"message": "..."}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Body of `POST /upload`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct UploadAccepted {
    pub message: String,
    /// Poll `GET /jobs/{job_id}` for the outcome.
    pub job_id: Uuid,
}

/// Body of `GET /employees` with the array embedded verbatim.
#[derive(Debug, Serialize)]
pub struct RawEmployeeList {
    pub data: Box<RawValue>,
}

/// Documented shape of `GET /employees`.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct EmployeeListResponse {
    pub data: Vec<Employee>,
}

/// Multipart body of `POST /upload`, for documentation only.
#[derive(utoipa::ToSchema)]
#[allow(dead_code)]
pub struct UploadForm {
    /// Spreadsheet (xlsx, xls, ods); only the first sheet is read.
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
}
