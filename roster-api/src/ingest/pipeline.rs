//! Parse, validate and commit one uploaded sheet.
//!
//! Commit runs two tasks concurrently over the validated batch:
//!
//! - the store task inserts rows in order and stops at the first error;
//! - the cache task drops the snapshot straight away, waits for the store
//!   task, then rebuilds the snapshot from the full store state.
//!
//! Each task sends exactly one report on a shared channel and the pipeline
//! waits for both. There is no rollback: rows inserted before a failure stay.

use std::path::PathBuf;

use roster_core::{IngestError, NewEmployee, RosterError, RosterResult};
use tokio::sync::{mpsc, oneshot};

use crate::services::EmployeeService;

use super::sheet::{read_first_sheet, SheetRows};
use super::validate::validate_rows;

/// What a finished commit did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportReport {
    /// Rows inserted into the store.
    pub rows_committed: usize,
    /// Whether the snapshot was rebuilt and written.
    pub snapshot_refreshed: bool,
    /// First failure reported by either task.
    pub error: Option<RosterError>,
}

impl ImportReport {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

enum CommitSignal {
    Store {
        committed: usize,
        error: Option<RosterError>,
    },
    Cache(RosterResult<()>),
}

/// Runs uploads through parse, validate and commit.
#[derive(Clone)]
pub struct ImportPipeline {
    employees: EmployeeService,
}

impl ImportPipeline {
    pub fn new(employees: EmployeeService) -> Self {
        Self { employees }
    }

    /// Import the staged file at `path`.
    ///
    /// Parse and validation failures are returned as `Err` with nothing
    /// committed. Once committing starts the outcome is in the report.
    pub async fn run_file(&self, path: PathBuf) -> RosterResult<ImportReport> {
        let rows = read_first_sheet(path).await?;
        self.run_rows(rows).await
    }

    /// Validate already parsed rows and commit them.
    pub async fn run_rows(&self, rows: SheetRows) -> RosterResult<ImportReport> {
        let batch = validate_rows(&rows)?;
        tracing::debug!(rows = batch.len(), "Sheet validated");
        Ok(self.commit(batch).await)
    }

    /// Commit a validated batch to the store and the snapshot concurrently.
    pub async fn commit(&self, batch: Vec<NewEmployee>) -> ImportReport {
        let (done_tx, mut done_rx) = mpsc::channel::<CommitSignal>(2);
        let (stored_tx, stored_rx) = oneshot::channel::<()>();

        let store = self.employees.store().clone();
        let store_done = done_tx.clone();
        tokio::spawn(async move {
            let mut committed = 0;
            let mut error = None;
            for new in batch {
                match store.insert(new).await {
                    Ok(_) => committed += 1,
                    Err(err) => {
                        tracing::error!(row = committed + 2, error = %err, "Row insert failed");
                        error = Some(err);
                        break;
                    }
                }
            }
            let _ = stored_tx.send(());
            let _ = store_done.send(CommitSignal::Store { committed, error }).await;
        });

        let employees = self.employees.clone();
        tokio::spawn(async move {
            if let Err(err) = employees.cache().invalidate().await {
                tracing::warn!(error = %err, "Failed to drop snapshot before import");
            }
            // A dropped sender means the store task died; refresh anyway.
            let _ = stored_rx.await;

            let result = match employees.refresh_snapshot().await {
                Ok(refresh) => match refresh.cache_error {
                    Some(err) => Err(err),
                    None => Ok(()),
                },
                Err(err) => Err(err),
            };
            let _ = done_tx.send(CommitSignal::Cache(result)).await;
        });

        let mut report = ImportReport {
            rows_committed: 0,
            snapshot_refreshed: false,
            error: None,
        };
        for _ in 0..2 {
            match done_rx.recv().await {
                Some(CommitSignal::Store { committed, error }) => {
                    report.rows_committed = committed;
                    if let Some(err) = error {
                        report.error.get_or_insert(err);
                    }
                }
                Some(CommitSignal::Cache(Ok(()))) => report.snapshot_refreshed = true,
                Some(CommitSignal::Cache(Err(err))) => {
                    report.error.get_or_insert(err);
                }
                None => {
                    report.error.get_or_insert(
                        IngestError::TaskFailed {
                            reason: "commit task exited without reporting".to_string(),
                        }
                        .into(),
                    );
                    break;
                }
            }
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roster_core::EMAIL_COLUMN;
    use roster_storage::{
        CacheLookup, EmployeeStore, InMemoryCacheBackend, InMemoryEmployeeStore, SnapshotCache,
    };
    use roster_test_utils::{sample_new_employee, sheet_rows, FailingStore};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    use crate::services::SnapshotSource;

    fn pipeline_over(store: Arc<dyn EmployeeStore>) -> (ImportPipeline, SnapshotCache) {
        let cache = SnapshotCache::with_defaults(Arc::new(InMemoryCacheBackend::new()));
        let service = EmployeeService::new(store, cache.clone());
        (ImportPipeline::new(service), cache)
    }

    #[tokio::test]
    async fn test_two_row_sheet_commits_and_caches() -> RosterResult<()> {
        let store = Arc::new(InMemoryEmployeeStore::new());
        let (pipeline, cache) = pipeline_over(store.clone());

        let report = pipeline.run_rows(sheet_rows(2)).await?;
        assert!(report.is_success());
        assert_eq!(report.rows_committed, 2);
        assert!(report.snapshot_refreshed);

        let stored = store.list_all().await?;
        let blob = cache.load().await.into_hit().unwrap_or_default();
        assert_eq!(SnapshotCache::decode(&blob)?, stored);
        Ok(())
    }

    #[tokio::test]
    async fn test_snapshot_includes_existing_records() -> RosterResult<()> {
        let store = Arc::new(InMemoryEmployeeStore::new());
        store.insert(sample_new_employee(90)).await?;
        let (pipeline, cache) = pipeline_over(store.clone());

        pipeline.run_rows(sheet_rows(2)).await?;

        let blob = cache.load().await.into_hit().unwrap_or_default();
        assert_eq!(SnapshotCache::decode(&blob)?.len(), 3);
        Ok(())
    }

    #[tokio::test]
    async fn test_invalid_email_commits_nothing() -> RosterResult<()> {
        let store = Arc::new(InMemoryEmployeeStore::new());
        let (pipeline, cache) = pipeline_over(store.clone());
        cache.store_raw("[\"sentinel\"]".to_string()).await?;

        let mut rows = sheet_rows(2);
        rows[2][EMAIL_COLUMN] = "not-an-email".to_string();
        let result = pipeline.run_rows(rows).await;

        assert!(matches!(result, Err(RosterError::Validation(_))));
        assert_eq!(store.count().await?, 0);
        assert_eq!(
            cache.load().await,
            CacheLookup::Hit("[\"sentinel\"]".to_string())
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_insert_failure_stops_and_still_refreshes() -> RosterResult<()> {
        let store = Arc::new(FailingStore::new());
        store.fail_inserts_after(1);
        let (pipeline, cache) = pipeline_over(store.clone());

        let report = pipeline.run_rows(sheet_rows(3)).await?;
        assert_eq!(report.rows_committed, 1);
        assert!(report.error.is_some());
        assert!(report.snapshot_refreshed);

        let blob = cache.load().await.into_hit().unwrap_or_default();
        assert_eq!(SnapshotCache::decode(&blob)?.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_header_only_sheet_commits_zero_rows() -> RosterResult<()> {
        let store = Arc::new(InMemoryEmployeeStore::new());
        let (pipeline, cache) = pipeline_over(store.clone());

        let report = pipeline.run_rows(sheet_rows(0)).await?;
        assert!(report.is_success());
        assert_eq!(report.rows_committed, 0);
        assert_eq!(cache.load().await, CacheLookup::Hit("[]".to_string()));
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_reads_during_import_leave_snapshot_matching_store() -> RosterResult<()> {
        const ROWS: usize = 3000;
        let store = Arc::new(InMemoryEmployeeStore::new());
        let cache = SnapshotCache::with_defaults(Arc::new(InMemoryCacheBackend::new()));
        let service = EmployeeService::new(store.clone(), cache.clone());
        let pipeline = ImportPipeline::new(service.clone());

        let stop = Arc::new(AtomicBool::new(false));
        let reader = {
            let service = service.clone();
            let stop = stop.clone();
            tokio::spawn(async move {
                let mut reads = 0usize;
                while !stop.load(Ordering::Acquire) {
                    let snapshot = service.get_all_employees().await?;
                    let seen = SnapshotCache::decode(snapshot.json.get())?;
                    assert!(seen.len() <= ROWS);
                    reads += 1;
                    tokio::task::yield_now().await;
                }
                Ok::<usize, RosterError>(reads)
            })
        };

        let report = pipeline.run_rows(sheet_rows(ROWS)).await?;
        stop.store(true, Ordering::Release);
        let reads = reader
            .await
            .map_err(|err| IngestError::TaskFailed {
                reason: err.to_string(),
            })??;

        assert!(report.is_success());
        assert_eq!(report.rows_committed, ROWS);
        assert!(reads > 0);

        let stored = store.list_all().await?;
        assert_eq!(stored.len(), ROWS);
        let blob = cache.load().await.into_hit().unwrap_or_default();
        assert_eq!(SnapshotCache::decode(&blob)?, stored);

        let after = service.get_all_employees().await?;
        assert_eq!(after.source, SnapshotSource::Cache);
        assert_eq!(SnapshotCache::decode(after.json.get())?.len(), ROWS);
        Ok(())
    }
}
