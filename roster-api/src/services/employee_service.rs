//! Employee query/update service.
//!
//! Reads are cache-aside over the single snapshot key. Updates commit to the
//! record store and then rebuild the whole snapshot from the store.
//!
//! Two locks are involved:
//! - a per-id mutex serialises `edit_record` calls on the same employee;
//! - one refresh lock is held across "list_all + set", so a refresh that
//!   read the store earlier can never overwrite a newer snapshot.

use std::sync::Arc;

use dashmap::DashMap;
use roster_core::{
    Employee, EmployeeId, EmployeePatch, RosterError, RosterResult, StorageError,
};
use roster_storage::{CacheLookup, EmployeeStore, SnapshotCache};
use serde_json::value::RawValue;
use tokio::sync::Mutex;

use crate::telemetry::metrics::with_metrics;

/// Where a snapshot returned by [`EmployeeService::get_all_employees`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotSource {
    Cache,
    Store,
}

impl SnapshotSource {
    /// Value of the `x-cache` response header.
    pub fn as_header_value(&self) -> &'static str {
        match self {
            SnapshotSource::Cache => "hit",
            SnapshotSource::Store => "miss",
        }
    }
}

/// The serialized employee list plus its origin.
#[derive(Debug)]
pub struct EmployeeSnapshot {
    /// JSON array of employees, exactly as cached or freshly encoded.
    pub json: Box<RawValue>,
    pub source: SnapshotSource,
}

impl EmployeeSnapshot {
    pub fn as_str(&self) -> &str {
        self.json.get()
    }

    pub fn decode(&self) -> RosterResult<Vec<Employee>> {
        SnapshotCache::decode(self.json.get())
    }
}

/// Result of rebuilding the snapshot from the store.
#[derive(Debug)]
pub struct SnapshotRefresh {
    /// The encoded snapshot.
    pub json: String,
    /// Number of employees in it.
    pub rows: usize,
    /// Set when the store read worked but the cache write did not.
    pub cache_error: Option<RosterError>,
}

/// Composes the record store and the snapshot cache.
#[derive(Clone)]
pub struct EmployeeService {
    store: Arc<dyn EmployeeStore>,
    cache: SnapshotCache,
    record_locks: Arc<DashMap<EmployeeId, Arc<Mutex<()>>>>,
    refresh_lock: Arc<Mutex<()>>,
}

impl EmployeeService {
    pub fn new(store: Arc<dyn EmployeeStore>, cache: SnapshotCache) -> Self {
        Self {
            store,
            cache,
            record_locks: Arc::new(DashMap::new()),
            refresh_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn store(&self) -> &Arc<dyn EmployeeStore> {
        &self.store
    }

    pub fn cache(&self) -> &SnapshotCache {
        &self.cache
    }

    /// Number of per-id locks currently held or awaited.
    pub fn active_record_locks(&self) -> usize {
        self.record_locks.len()
    }

    // ========================================================================
    // READ
    // ========================================================================

    /// Return every live employee as a JSON array.
    ///
    /// A cache hit is returned verbatim. A miss, an unreadable blob or an
    /// unavailable backend falls back to the store; the rebuilt snapshot is
    /// written back best-effort.
    pub async fn get_all_employees(&self) -> RosterResult<EmployeeSnapshot> {
        let lookup = self.cache.load().await;
        with_metrics(|metrics| metrics.record_cache_lookup(lookup.outcome()));

        match lookup {
            CacheLookup::Hit(blob) => match RawValue::from_string(blob) {
                Ok(json) => {
                    tracing::debug!(cache_key = self.cache.key(), "Snapshot served from cache");
                    return Ok(EmployeeSnapshot {
                        json,
                        source: SnapshotSource::Cache,
                    });
                }
                Err(err) => {
                    tracing::warn!(
                        cache_key = self.cache.key(),
                        error = %err,
                        "Cached snapshot is not valid JSON, rebuilding"
                    );
                }
            },
            CacheLookup::Miss => {
                tracing::debug!(cache_key = self.cache.key(), "Snapshot cache miss");
            }
            CacheLookup::BackendUnavailable(cause) => {
                tracing::warn!(
                    cache_key = self.cache.key(),
                    %cause,
                    "Cache backend unavailable, serving from record store"
                );
            }
        }

        let refresh = self.refresh_snapshot().await?;
        let json = RawValue::from_string(refresh.json)?;
        Ok(EmployeeSnapshot {
            json,
            source: SnapshotSource::Store,
        })
    }

    /// Rebuild the snapshot from the full store state and write it.
    ///
    /// A store failure is an error. A cache write failure is logged and
    /// reported in [`SnapshotRefresh::cache_error`].
    pub async fn refresh_snapshot(&self) -> RosterResult<SnapshotRefresh> {
        let _guard = self.refresh_lock.lock().await;

        let employees = self.store.list_all().await?;
        let json = SnapshotCache::encode(&employees)?;

        let cache_error = match self.cache.store_raw(json.clone()).await {
            Ok(()) => None,
            Err(err) => {
                tracing::warn!(
                    cache_key = self.cache.key(),
                    error = %err,
                    "Failed to write employee snapshot"
                );
                Some(err)
            }
        };
        with_metrics(|metrics| metrics.record_cache_write(cache_error.is_none()));

        tracing::debug!(
            cache_key = self.cache.key(),
            rows = employees.len(),
            cached = cache_error.is_none(),
            "Snapshot refreshed"
        );

        Ok(SnapshotRefresh {
            json,
            rows: employees.len(),
            cache_error,
        })
    }

    // ========================================================================
    // UPDATE
    // ========================================================================

    /// Merge `patch` into employee `id`, persist it, then refresh the snapshot.
    ///
    /// Fails with `StorageError::NotFound` when the employee does not exist.
    /// A snapshot refresh failure after the commit does not fail the update.
    pub async fn edit_record(&self, id: EmployeeId, patch: &EmployeePatch) -> RosterResult<Employee> {
        let lock = self.record_lock(id);
        let result = {
            let _guard = lock.lock().await;
            self.merge_and_persist(id, patch).await
        };
        drop(lock);
        self.release_record_lock(id);

        let updated = result?;
        self.refresh_after_write(id).await;
        Ok(updated)
    }

    async fn merge_and_persist(&self, id: EmployeeId, patch: &EmployeePatch) -> RosterResult<Employee> {
        let mut employee = self
            .store
            .get(id)
            .await?
            .ok_or(StorageError::NotFound { id })?;

        let applied = patch.apply_to(&mut employee);
        let updated = self.store.update(&employee).await?;

        tracing::info!(
            employee_id = id,
            fields = ?patch.provided_fields(),
            applied,
            "Employee record updated"
        );
        Ok(updated)
    }

    async fn refresh_after_write(&self, id: EmployeeId) {
        let failure = match self.refresh_snapshot().await {
            Ok(refresh) => refresh.cache_error,
            Err(err) => Some(err),
        };

        if let Some(err) = failure {
            tracing::warn!(
                employee_id = id,
                error = %err,
                "Snapshot refresh after update failed, dropping cached snapshot"
            );
            if let Err(err) = self.cache.invalidate().await {
                tracing::warn!(
                    cache_key = self.cache.key(),
                    error = %err,
                    "Failed to drop stale snapshot"
                );
            }
        }
    }

    fn record_lock(&self, id: EmployeeId) -> Arc<Mutex<()>> {
        self.record_locks
            .entry(id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    fn release_record_lock(&self, id: EmployeeId) {
        // Only the map itself still holds the lock: nobody is waiting on it.
        self.record_locks
            .remove_if(&id, |_, lock| Arc::strong_count(lock) == 1);
    }
}
