//! Employee REST API Routes
//!
//! - `GET /employees`: every live employee, cache-aside
//! - `PUT /employee/{id}`: partial update, then a full snapshot refresh

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::HeaderValue,
    response::{IntoResponse, Response},
    Json,
};
use roster_core::{EmployeeId, EmployeePatch};

use crate::constants::CACHE_STATUS_HEADER;
use crate::error::{ApiError, ApiResult};
use crate::services::EmployeeService;
use crate::types::{EmployeeListResponse, MessageResponse, RawEmployeeList};

/// List all employees.
///
/// The cached snapshot is embedded verbatim; `x-cache` tells whether it came
/// from the cache (`hit`) or was rebuilt from the store (`miss`).
#[utoipa::path(
    get,
    path = "/employees",
    tag = "Employees",
    responses(
        (status = 200, description = "All live employees", body = EmployeeListResponse,
         headers(("x-cache" = String, description = "hit or miss"))),
        (status = 500, description = "Record store read failed", body = ApiError),
    ),
)]
pub async fn get_employees(State(service): State<EmployeeService>) -> ApiResult<Response> {
    let snapshot = service.get_all_employees().await?;
    let source = snapshot.source;

    let mut response = Json(RawEmployeeList {
        data: snapshot.json,
    })
    .into_response();
    response.headers_mut().insert(
        CACHE_STATUS_HEADER,
        HeaderValue::from_static(source.as_header_value()),
    );
    Ok(response)
}

/// Update an employee. Absent or empty fields are left unchanged.
#[utoipa::path(
    put,
    path = "/employee/{id}",
    tag = "Employees",
    params(
        ("id" = i64, Path, description = "Employee ID")
    ),
    request_body = EmployeePatch,
    responses(
        (status = 200, description = "Record updated", body = MessageResponse),
        (status = 400, description = "Malformed id or body", body = ApiError),
        (status = 404, description = "Employee not found", body = ApiError),
        (status = 500, description = "Record store failure", body = ApiError),
    ),
)]
pub async fn edit_record(
    State(service): State<EmployeeService>,
    id: Result<Path<EmployeeId>, PathRejection>,
    body: Result<Json<EmployeePatch>, JsonRejection>,
) -> ApiResult<Json<MessageResponse>> {
    let Path(id) = id.map_err(|_| ApiError::invalid_format("id", "a numeric employee id"))?;
    let Json(patch) =
        body.map_err(|e| ApiError::invalid_input(format!("Invalid input: {}", e.body_text())))?;

    service.edit_record(id, &patch).await?;
    Ok(Json(MessageResponse::new("Record updated")))
}
