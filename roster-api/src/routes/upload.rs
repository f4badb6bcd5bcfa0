//! Spreadsheet upload route.
//!
//! The file is streamed to the staging directory, an import job is
//! registered, and the response goes out before any parsing happens.

use std::path::{Path, PathBuf};

use axum::{
    extract::{
        multipart::{Field, MultipartError, MultipartRejection},
        Multipart, State,
    },
    http::StatusCode,
    Json,
};
use tokio::io::AsyncWriteExt;

use crate::constants::UPLOAD_FIELD_NAME;
use crate::error::{ApiError, ApiResult};
use crate::ingest::{sanitize_file_name, staged_path};
use crate::jobs::spawn_import;
use crate::state::AppState;
use crate::types::{UploadAccepted, UploadForm};

/// A file written to the staging directory.
#[derive(Debug, Clone)]
pub struct StagedUpload {
    pub path: PathBuf,
    pub file_name: String,
    pub bytes: u64,
}

/// Accept a spreadsheet and import it in the background.
#[utoipa::path(
    post,
    path = "/upload",
    tag = "Imports",
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "File accepted, import running", body = UploadAccepted),
        (status = 400, description = "Missing file field or malformed form", body = ApiError),
        (status = 413, description = "Upload exceeds the size limit", body = ApiError),
        (status = 500, description = "Staging the file failed", body = ApiError),
    ),
)]
pub async fn upload_file(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<(StatusCode, Json<UploadAccepted>)> {
    let mut multipart = multipart
        .map_err(|e| ApiError::invalid_input(format!("Failed to upload file: {}", e.body_text())))?;

    let mut staged = None;
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() == Some(UPLOAD_FIELD_NAME) {
            staged = Some(stage_field(&state.config.upload_dir, field).await?);
            break;
        }
    }
    let staged = staged.ok_or_else(|| ApiError::missing_field(UPLOAD_FIELD_NAME))?;

    let job = state.jobs.create(staged.file_name.clone());
    tracing::info!(
        job_id = %job.id,
        file_name = %staged.file_name,
        bytes = staged.bytes,
        "Upload staged"
    );
    spawn_import(state.jobs.clone(), state.importer.clone(), job.id, staged.path);

    Ok((
        StatusCode::OK,
        Json(UploadAccepted {
            message: "File is being processed".to_string(),
            job_id: job.id,
        }),
    ))
}

/// Stream one multipart field into `<upload_dir>/<uuid>-<name>`.
pub async fn stage_field(upload_dir: &Path, mut field: Field<'_>) -> ApiResult<StagedUpload> {
    let file_name = sanitize_file_name(field.file_name());
    let path = staged_path(upload_dir, &file_name);

    tokio::fs::create_dir_all(upload_dir)
        .await
        .map_err(|e| staging_failed(upload_dir, e))?;
    let mut file = tokio::fs::File::create(&path)
        .await
        .map_err(|e| staging_failed(&path, e))?;

    let mut bytes = 0u64;
    let written = async {
        while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
            bytes += chunk.len() as u64;
            file.write_all(&chunk)
                .await
                .map_err(|e| staging_failed(&path, e))?;
        }
        file.flush().await.map_err(|e| staging_failed(&path, e))
    }
    .await;

    if let Err(err) = written {
        // A half-written file would only confuse whoever looks at the directory.
        let _ = tokio::fs::remove_file(&path).await;
        return Err(err);
    }

    Ok(StagedUpload {
        path,
        file_name,
        bytes,
    })
}

fn multipart_error(err: MultipartError) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::payload_too_large(err.body_text())
    } else {
        ApiError::invalid_input(format!("Failed to upload file: {}", err.body_text()))
    }
}

fn staging_failed(path: &Path, err: std::io::Error) -> ApiError {
    tracing::error!(path = %path.display(), error = %err, "Failed to stage upload");
    ApiError::internal_error("Failed to save file")
}
