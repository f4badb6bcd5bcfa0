//! Spreadsheet ingestion against real workbook files.

use std::sync::Arc;

use roster_api::ingest::{read_first_sheet, read_first_sheet_blocking};
use roster_api::{EmployeeService, ImportPipeline};
use roster_core::{IngestError, RosterError, RosterResult};
use roster_storage::{
    CacheLookup, EmployeeStore, InMemoryCacheBackend, InMemoryEmployeeStore, SnapshotCache,
};
use roster_test_utils::assertions::{assert_same_data, assert_validation_error};
use roster_test_utils::{employee_row, sample_new_employee, sheet_rows, write_xlsx};
use tempfile::TempDir;

type TestResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

fn pipeline() -> (ImportPipeline, Arc<InMemoryEmployeeStore>, SnapshotCache) {
    let store = Arc::new(InMemoryEmployeeStore::new());
    let cache = SnapshotCache::with_defaults(Arc::new(InMemoryCacheBackend::new()));
    let service = EmployeeService::new(store.clone(), cache.clone());
    (ImportPipeline::new(service), store, cache)
}

#[tokio::test]
async fn workbook_rows_come_back_as_written() -> TestResult {
    let dir = TempDir::new()?;
    let path = dir.path().join("staff.xlsx");
    write_xlsx(&path, &sheet_rows(3))?;

    let rows = read_first_sheet(path).await?;
    assert_eq!(rows, sheet_rows(3));
    Ok(())
}

#[test]
fn blank_trailing_cells_shorten_the_row() -> TestResult {
    let dir = TempDir::new()?;
    let path = dir.path().join("short.xlsx");
    let mut rows = sheet_rows(2);
    rows[1][9] = String::new();
    write_xlsx(&path, &rows)?;

    let read = read_first_sheet_blocking(&path)?;
    assert_eq!(read[1].len(), 9);
    assert_eq!(read[2].len(), 10);
    Ok(())
}

#[test]
fn missing_file_is_an_open_error() {
    let result = read_first_sheet_blocking(std::path::Path::new("/nonexistent/staff.xlsx"));
    assert!(matches!(
        result,
        Err(RosterError::Ingest(IngestError::Open { .. }))
    ));
}

#[tokio::test]
async fn run_file_commits_in_sheet_order() -> TestResult {
    let dir = TempDir::new()?;
    let path = dir.path().join("staff.xlsx");
    write_xlsx(&path, &sheet_rows(4))?;
    let (pipeline, store, cache) = pipeline();

    let report = pipeline.run_file(path).await?;
    assert!(report.is_success());
    assert_eq!(report.rows_committed, 4);

    let stored = store.list_all().await?;
    assert_eq!(stored.len(), 4);
    for (i, employee) in stored.iter().enumerate() {
        assert_eq!(employee.id, i as i64 + 1);
        assert_same_data(employee, &sample_new_employee(i));
    }

    let blob = cache.load().await.into_hit().ok_or("snapshot not cached")?;
    assert_eq!(SnapshotCache::decode(&blob)?, stored);
    Ok(())
}

#[tokio::test]
async fn run_file_rejects_whole_batch_on_one_bad_row() -> TestResult {
    let dir = TempDir::new()?;
    let path = dir.path().join("staff.xlsx");
    let mut rows = sheet_rows(3);
    rows.push(employee_row(9)[..7].to_vec());
    write_xlsx(&path, &rows)?;
    let (pipeline, store, cache) = pipeline();

    let result: RosterResult<_> = pipeline.run_file(path).await;
    assert_validation_error(&result);
    assert_eq!(store.count().await?, 0);
    assert_eq!(cache.load().await, CacheLookup::Miss);
    Ok(())
}
