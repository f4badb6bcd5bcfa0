//! Import jobs: one per upload, observable through `GET /jobs/{id}`.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::ingest::ImportPipeline;
use crate::telemetry::metrics::with_metrics;

/// Lifecycle of an import job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Running,
    Succeeded,
    Failed,
}

impl JobStatus {
    pub fn is_finished(&self) -> bool {
        matches!(self, JobStatus::Succeeded | JobStatus::Failed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Running => "running",
            JobStatus::Succeeded => "succeeded",
            JobStatus::Failed => "failed",
        }
    }
}

/// State of one spreadsheet import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ImportJob {
    pub id: Uuid,
    /// Sanitized name of the uploaded file.
    pub file_name: String,
    pub status: JobStatus,
    /// Rows inserted into the store so far.
    pub rows_committed: usize,
    /// First failure, if the job failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
}

/// In-process registry of import jobs. Cloning shares the registry.
#[derive(Debug, Clone, Default)]
pub struct JobRegistry {
    jobs: Arc<DashMap<Uuid, ImportJob>>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new pending job.
    pub fn create(&self, file_name: impl Into<String>) -> ImportJob {
        let job = ImportJob {
            id: Uuid::new_v4(),
            file_name: file_name.into(),
            status: JobStatus::Pending,
            rows_committed: 0,
            error: None,
            created_at: Utc::now(),
            started_at: None,
            finished_at: None,
        };
        self.jobs.insert(job.id, job.clone());
        job
    }

    pub fn get(&self, id: Uuid) -> Option<ImportJob> {
        self.jobs.get(&id).map(|job| job.clone())
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    pub fn mark_running(&self, id: Uuid) {
        if let Some(mut job) = self.jobs.get_mut(&id) {
            job.status = JobStatus::Running;
            job.started_at = Some(Utc::now());
        }
    }

    pub fn mark_succeeded(&self, id: Uuid, rows_committed: usize) {
        self.finish(id, JobStatus::Succeeded, rows_committed, None);
    }

    pub fn mark_failed(&self, id: Uuid, rows_committed: usize, error: impl Into<String>) {
        self.finish(id, JobStatus::Failed, rows_committed, Some(error.into()));
    }

    fn finish(&self, id: Uuid, status: JobStatus, rows_committed: usize, error: Option<String>) {
        if let Some(mut job) = self.jobs.get_mut(&id) {
            job.status = status;
            job.rows_committed = rows_committed;
            job.error = error;
            job.finished_at = Some(Utc::now());
        }
        with_metrics(|metrics| metrics.record_import_job(status.as_str(), rows_committed));
    }

    /// Drop finished jobs that ended before `cutoff`. Returns how many went.
    pub fn prune_finished_before(&self, cutoff: DateTime<Utc>) -> usize {
        let before = self.jobs.len();
        self.jobs.retain(|_, job| {
            !(job.status.is_finished() && job.finished_at.is_some_and(|at| at < cutoff))
        });
        before.saturating_sub(self.jobs.len())
    }
}

/// Drive `job_id` through the pipeline on a detached task.
///
/// The returned handle is only useful to tests; the HTTP layer drops it.
pub fn spawn_import(
    registry: JobRegistry,
    pipeline: ImportPipeline,
    job_id: Uuid,
    path: PathBuf,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        registry.mark_running(job_id);
        tracing::info!(%job_id, path = %path.display(), "Import started");

        match pipeline.run_file(path).await {
            Ok(report) => match report.error {
                None => {
                    tracing::info!(
                        %job_id,
                        rows = report.rows_committed,
                        "Import succeeded"
                    );
                    registry.mark_succeeded(job_id, report.rows_committed);
                }
                Some(err) => {
                    tracing::error!(
                        %job_id,
                        rows = report.rows_committed,
                        snapshot_refreshed = report.snapshot_refreshed,
                        error = %err,
                        "Import failed during commit"
                    );
                    registry.mark_failed(job_id, report.rows_committed, err.to_string());
                }
            },
            Err(err) => {
                tracing::error!(%job_id, error = %err, "Import rejected before commit");
                registry.mark_failed(job_id, 0, err.to_string());
            }
        }
    })
}
