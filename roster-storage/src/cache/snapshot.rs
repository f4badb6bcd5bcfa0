//! Typed access to the single-key employee snapshot.

use std::sync::Arc;
use std::time::Duration;

use roster_core::{Employee, RosterResult, DEFAULT_CACHE_TTL, EMPLOYEE_CACHE_KEY};

use super::lookup::CacheLookup;
use super::traits::{CacheBackend, CacheStats};

/// The "all employees" snapshot stored under one cache key.
///
/// The stored value is a JSON array of [`Employee`]. Writes always replace
/// the full array; there is no partial update.
#[derive(Clone)]
pub struct SnapshotCache {
    backend: Arc<dyn CacheBackend>,
    key: String,
    ttl: Duration,
}

impl SnapshotCache {
    /// Snapshot cache on the standard key with the given TTL.
    pub fn new(backend: Arc<dyn CacheBackend>, ttl: Duration) -> Self {
        Self {
            backend,
            key: EMPLOYEE_CACHE_KEY.to_string(),
            ttl,
        }
    }

    /// Snapshot cache on the standard key with the 5 minute TTL.
    pub fn with_defaults(backend: Arc<dyn CacheBackend>) -> Self {
        Self::new(backend, DEFAULT_CACHE_TTL)
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn backend(&self) -> &dyn CacheBackend {
        self.backend.as_ref()
    }

    pub fn stats(&self) -> CacheStats {
        self.backend.stats()
    }

    /// Read the snapshot blob.
    pub async fn load(&self) -> CacheLookup {
        self.backend.get(&self.key).await
    }

    /// Serialize a full employee list into the snapshot wire format.
    pub fn encode(employees: &[Employee]) -> RosterResult<String> {
        Ok(serde_json::to_string(employees)?)
    }

    /// Parse a snapshot blob back into employees.
    pub fn decode(blob: &str) -> RosterResult<Vec<Employee>> {
        Ok(serde_json::from_str(blob)?)
    }

    /// Replace the snapshot with an already encoded blob, restarting the TTL.
    pub async fn store_raw(&self, blob: String) -> RosterResult<()> {
        self.backend.set(&self.key, blob, self.ttl).await
    }

    /// Encode and store a full employee list. Returns the stored blob.
    pub async fn store(&self, employees: &[Employee]) -> RosterResult<String> {
        let blob = Self::encode(employees)?;
        self.store_raw(blob.clone()).await?;
        Ok(blob)
    }

    /// Drop the snapshot so the next read falls back to the store.
    pub async fn invalidate(&self) -> RosterResult<()> {
        self.backend.delete(&self.key).await
    }
}

impl std::fmt::Debug for SnapshotCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnapshotCache")
            .field("key", &self.key)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::InMemoryCacheBackend;
    use chrono::Utc;
    use roster_core::NewEmployee;

    fn employees() -> Vec<Employee> {
        (1..=3)
            .map(|id| {
                let new = NewEmployee {
                    first_name: format!("First{}", id),
                    email: format!("user{}@example.com", id),
                    ..NewEmployee::default()
                };
                Employee::from_new(id, new, Utc::now())
            })
            .collect()
    }

    #[tokio::test]
    async fn test_store_then_load_round_trips_blob() -> RosterResult<()> {
        let backend = Arc::new(InMemoryCacheBackend::new());
        let cache = SnapshotCache::with_defaults(backend.clone());
        assert_eq!(cache.key(), "employee_data");
        assert_eq!(cache.ttl(), Duration::from_secs(300));

        let list = employees();
        let blob = cache.store(&list).await?;
        let loaded = cache.load().await.into_hit().unwrap_or_default();
        assert_eq!(loaded, blob);
        assert_eq!(SnapshotCache::decode(&loaded)?, list);
        Ok(())
    }

    #[tokio::test]
    async fn test_empty_list_encodes_as_empty_array() -> RosterResult<()> {
        assert_eq!(SnapshotCache::encode(&[])?, "[]");
        Ok(())
    }

    #[tokio::test]
    async fn test_invalidate_forces_miss() -> RosterResult<()> {
        let cache = SnapshotCache::with_defaults(Arc::new(InMemoryCacheBackend::new()));
        cache.store(&employees()).await?;
        cache.invalidate().await?;
        assert_eq!(cache.load().await, CacheLookup::Miss);
        Ok(())
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(SnapshotCache::decode("{not json").is_err());
    }
}
