//! Import job status route.

use axum::{
    extract::{rejection::PathRejection, Path, State},
    Json,
};
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::jobs::{ImportJob, JobRegistry};

/// Get the state of an import job.
#[utoipa::path(
    get,
    path = "/jobs/{id}",
    tag = "Imports",
    params(
        ("id" = Uuid, Path, description = "Job ID returned by POST /upload")
    ),
    responses(
        (status = 200, description = "Job state", body = ImportJob),
        (status = 400, description = "Malformed job id", body = ApiError),
        (status = 404, description = "Unknown job", body = ApiError),
    ),
)]
pub async fn get_job(
    State(jobs): State<JobRegistry>,
    id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Json<ImportJob>> {
    let Path(id) = id.map_err(|_| ApiError::invalid_format("id", "a UUID"))?;
    jobs.get(id)
        .map(Json)
        .ok_or_else(|| ApiError::job_not_found(id))
}
