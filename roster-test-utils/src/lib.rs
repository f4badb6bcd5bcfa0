//! Roster Test Utilities
//!
//! Shared test infrastructure for the roster workspace:
//! - Fault-injecting cache and record store wrappers
//! - Sheet row and workbook fixtures
//! - Proptest generators for ingestible rows
//! - Assertions for roster error kinds

use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

// Re-export core types for convenience
pub use roster_core::{
    Employee, EmployeeId, EmployeePatch, NewEmployee, RosterError, RosterResult, StorageError,
    ValidationError, COLUMN_COUNT, EMAIL_COLUMN, EXPECTED_HEADERS,
};
pub use roster_storage::{
    CacheBackend, CacheLookup, CacheStats, EmployeeStore, InMemoryCacheBackend,
    InMemoryEmployeeStore,
};

pub use fixtures::*;

// ============================================================================
// FAULT-INJECTING CACHE
// ============================================================================

/// In-memory cache whose reads and writes can be switched to fail.
///
/// Failing reads report `BackendUnavailable`. Failing writes only affect
/// `set`: `delete` keeps working so invalidation can still be observed.
#[derive(Debug, Default)]
pub struct FlakyCache {
    inner: InMemoryCacheBackend,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    unavailable: AtomicU64,
    write_failures: AtomicU64,
}

impl FlakyCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// The wrapped backend, for inspecting stored values directly.
    pub fn inner(&self) -> &InMemoryCacheBackend {
        &self.inner
    }
}

#[async_trait]
impl CacheBackend for FlakyCache {
    async fn get(&self, key: &str) -> CacheLookup {
        if self.fail_reads.load(Ordering::SeqCst) {
            self.unavailable.fetch_add(1, Ordering::Relaxed);
            return CacheLookup::BackendUnavailable("injected read failure".to_string());
        }
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> RosterResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            self.write_failures.fetch_add(1, Ordering::Relaxed);
            return Err(roster_core::CacheError::Unavailable {
                reason: "injected write failure".to_string(),
            }
            .into());
        }
        self.inner.set(key, value, ttl).await
    }

    async fn delete(&self, key: &str) -> RosterResult<()> {
        self.inner.delete(key).await
    }

    async fn ping(&self) -> RosterResult<()> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(roster_core::CacheError::Unavailable {
                reason: "injected ping failure".to_string(),
            }
            .into());
        }
        self.inner.ping().await
    }

    fn stats(&self) -> CacheStats {
        let inner = self.inner.stats();
        CacheStats {
            unavailable: inner.unavailable + self.unavailable.load(Ordering::Relaxed),
            write_failures: inner.write_failures + self.write_failures.load(Ordering::Relaxed),
            ..inner
        }
    }
}

// ============================================================================
// FAULT-INJECTING RECORD STORE
// ============================================================================

/// In-memory record store that can fail inserts past a threshold or go
/// unavailable altogether.
#[derive(Debug)]
pub struct FailingStore {
    inner: InMemoryEmployeeStore,
    insert_limit: AtomicUsize,
    inserts: AtomicUsize,
    unavailable: AtomicBool,
}

impl Default for FailingStore {
    fn default() -> Self {
        Self {
            inner: InMemoryEmployeeStore::new(),
            insert_limit: AtomicUsize::new(usize::MAX),
            inserts: AtomicUsize::new(0),
            unavailable: AtomicBool::new(false),
        }
    }
}

impl FailingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Let `n` more inserts succeed, then fail every later one.
    pub fn fail_inserts_after(&self, n: usize) {
        let done = self.inserts.load(Ordering::SeqCst);
        self.insert_limit.store(done.saturating_add(n), Ordering::SeqCst);
    }

    /// Make every operation fail with `StorageError::Unavailable`.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of insert attempts seen so far, failed ones included.
    pub fn insert_attempts(&self) -> usize {
        self.inserts.load(Ordering::SeqCst)
    }

    fn check_available(&self) -> RosterResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable {
                reason: "injected store outage".to_string(),
            }
            .into());
        }
        Ok(())
    }
}

#[async_trait]
impl EmployeeStore for FailingStore {
    async fn insert(&self, new: NewEmployee) -> RosterResult<Employee> {
        self.check_available()?;
        let attempt = self.inserts.fetch_add(1, Ordering::SeqCst);
        if attempt >= self.insert_limit.load(Ordering::SeqCst) {
            return Err(StorageError::InsertFailed {
                reason: format!("injected failure on insert {}", attempt + 1),
            }
            .into());
        }
        self.inner.insert(new).await
    }

    async fn get(&self, id: EmployeeId) -> RosterResult<Option<Employee>> {
        self.check_available()?;
        self.inner.get(id).await
    }

    async fn list_all(&self) -> RosterResult<Vec<Employee>> {
        self.check_available()?;
        self.inner.list_all().await
    }

    async fn update(&self, employee: &Employee) -> RosterResult<Employee> {
        self.check_available()?;
        self.inner.update(employee).await
    }

    async fn count(&self) -> RosterResult<u64> {
        self.check_available()?;
        self.inner.count().await
    }

    async fn ping(&self) -> RosterResult<()> {
        self.check_available()?;
        self.inner.ping().await
    }
}

// ============================================================================
// FIXTURES
// ============================================================================

/// Sheet rows, insert payloads and workbook bytes.
pub mod fixtures {
    use super::*;
    use rust_xlsxwriter::{Workbook, XlsxError};

    /// The expected header row as owned cells.
    pub fn header_row() -> Vec<String> {
        EXPECTED_HEADERS.iter().map(|h| h.to_string()).collect()
    }

    /// A valid data row, distinct for every `i`.
    pub fn employee_row(i: usize) -> Vec<String> {
        vec![
            format!("First{}", i),
            format!("Last{}", i),
            format!("Company {}", i),
            format!("{} Main Street", i + 1),
            "Paris".to_string(),
            "France".to_string(),
            format!("75{:03}", i % 1000),
            format!("+33 1 00 00 {:02} {:02}", (i / 100) % 100, i % 100),
            format!("employee{}@example.com", i),
            format!("https://example.com/{}", i),
        ]
    }

    /// Header plus `n` valid data rows.
    pub fn sheet_rows(n: usize) -> Vec<Vec<String>> {
        std::iter::once(header_row())
            .chain((0..n).map(employee_row))
            .collect()
    }

    /// Insert payload matching `employee_row(i)`.
    pub fn sample_new_employee(i: usize) -> NewEmployee {
        let row = employee_row(i);
        NewEmployee {
            first_name: row[0].clone(),
            last_name: row[1].clone(),
            company: row[2].clone(),
            address: row[3].clone(),
            city: row[4].clone(),
            country: row[5].clone(),
            postal: row[6].clone(),
            phone: row[7].clone(),
            email: row[8].clone(),
            web: row[9].clone(),
        }
    }

    fn build_workbook(rows: &[Vec<String>]) -> Result<Workbook, XlsxError> {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        for (r, row) in rows.iter().enumerate() {
            for (c, cell) in row.iter().enumerate().filter(|(_, cell)| !cell.is_empty()) {
                sheet.write_string(r as u32, c as u16, cell)?;
            }
        }
        Ok(workbook)
    }

    /// Write `rows` as the first sheet of a new `.xlsx` file.
    pub fn write_xlsx(path: &Path, rows: &[Vec<String>]) -> Result<(), XlsxError> {
        build_workbook(rows)?.save(path)
    }

    /// `rows` as `.xlsx` bytes.
    pub fn xlsx_bytes(rows: &[Vec<String>]) -> Result<Vec<u8>, XlsxError> {
        build_workbook(rows)?.save_to_buffer()
    }

    /// A `multipart/form-data` body carrying one file field.
    pub fn multipart_body(boundary: &str, field: &str, file_name: &str, bytes: &[u8]) -> Vec<u8> {
        let mut body = Vec::with_capacity(bytes.len() + 256);
        body.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                field, file_name
            )
            .as_bytes(),
        );
        body.extend_from_slice(
            b"Content-Type: application/vnd.openxmlformats-officedocument.spreadsheetml.sheet\r\n\r\n",
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(format!("\r\n--{}--\r\n", boundary).as_bytes());
        body
    }
}

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

/// Proptest strategies for sheet content.
pub mod generators {
    use super::*;
    use proptest::prelude::*;

    /// Addresses accepted by the ingestion email check.
    pub fn arb_valid_email() -> impl Strategy<Value = String> {
        ("[a-z0-9._]{1,12}", "[a-z0-9]{1,10}", "[a-z]{2,5}")
            .prop_map(|(user, domain, tld)| format!("{}@{}.{}", user, domain, tld))
    }

    /// Free text for the non-email columns.
    pub fn arb_cell() -> impl Strategy<Value = String> {
        "[A-Za-z0-9 ,.'-]{0,24}"
    }

    /// A data row that passes validation.
    pub fn arb_employee_row() -> impl Strategy<Value = Vec<String>> {
        (
            proptest::collection::vec(arb_cell(), COLUMN_COUNT - 1),
            arb_valid_email(),
        )
            .prop_map(|(mut cells, email)| {
                cells.insert(EMAIL_COLUMN, email);
                cells
            })
    }

    /// Header plus up to `max_rows` valid data rows.
    pub fn arb_valid_sheet(max_rows: usize) -> impl Strategy<Value = Vec<Vec<String>>> {
        proptest::collection::vec(arb_employee_row(), 0..=max_rows).prop_map(|rows| {
            std::iter::once(fixtures::header_row())
                .chain(rows)
                .collect()
        })
    }
}

// ============================================================================
// ASSERTIONS
// ============================================================================

/// Assertions on roster error kinds.
pub mod assertions {
    use super::*;

    /// Assert that a result is a validation error.
    pub fn assert_validation_error<T: std::fmt::Debug>(result: &RosterResult<T>) {
        assert!(
            matches!(result, Err(RosterError::Validation(_))),
            "Expected validation error, got {:?}",
            result
        );
    }

    /// Assert that a result is the "record missing" error for `id`.
    pub fn assert_not_found<T: std::fmt::Debug>(result: &RosterResult<T>, id: EmployeeId) {
        match result {
            Err(RosterError::Storage(StorageError::NotFound { id: found })) => {
                assert_eq!(*found, id, "NotFound for the wrong id");
            }
            other => panic!("Expected NotFound for id {}, got {:?}", id, other),
        }
    }

    /// Assert that a stored employee carries the data of `expected`.
    pub fn assert_same_data(employee: &Employee, expected: &NewEmployee) {
        assert_eq!(employee.first_name, expected.first_name);
        assert_eq!(employee.last_name, expected.last_name);
        assert_eq!(employee.company, expected.company);
        assert_eq!(employee.address, expected.address);
        assert_eq!(employee.city, expected.city);
        assert_eq!(employee.country, expected.country);
        assert_eq!(employee.postal, expected.postal);
        assert_eq!(employee.phone, expected.phone);
        assert_eq!(employee.email, expected.email);
        assert_eq!(employee.web, expected.web);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_sheet_rows_shape() {
        let rows = sheet_rows(3);
        assert_eq!(rows.len(), 4);
        assert!(rows.iter().all(|r| r.len() == COLUMN_COUNT));
        assert_eq!(rows[0], header_row());
        assert!(roster_core::is_valid_email(&rows[1][EMAIL_COLUMN]));
    }

    #[tokio::test]
    async fn test_flaky_cache_write_failure_spares_delete() -> RosterResult<()> {
        let cache = FlakyCache::new();
        cache.set("k", "v".to_string(), Duration::from_secs(60)).await?;
        cache.set_fail_writes(true);
        assert!(cache.set("k", "w".to_string(), Duration::from_secs(60)).await.is_err());
        cache.delete("k").await?;
        assert_eq!(cache.get("k").await, CacheLookup::Miss);
        assert_eq!(cache.stats().write_failures, 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_failing_store_threshold() -> RosterResult<()> {
        let store = FailingStore::new();
        store.fail_inserts_after(1);
        store.insert(sample_new_employee(0)).await?;
        assert!(store.insert(sample_new_employee(1)).await.is_err());
        assert_eq!(store.count().await?, 1);
        assert_eq!(store.insert_attempts(), 2);
        Ok(())
    }

    proptest! {
        #[test]
        fn prop_generated_emails_are_valid(email in generators::arb_valid_email()) {
            prop_assert!(roster_core::is_valid_email(&email));
        }
    }
}
