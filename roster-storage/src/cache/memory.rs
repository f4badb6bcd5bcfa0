//! In-process cache backend with per-entry expiry.
//!
//! Expiry uses the tokio clock, so tests can pause and advance time instead
//! of sleeping. Expired entries read as a miss and are evicted lazily.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use roster_core::RosterResult;
use tokio::time::Instant;

use super::lookup::CacheLookup;
use super::traits::{CacheBackend, CacheStats, StatsRecorder};

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at: Instant,
}

/// DashMap-backed cache. Cloning shares the underlying map.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCacheBackend {
    entries: Arc<DashMap<String, Entry>>,
    stats: Arc<StatsRecorder>,
}

impl InMemoryCacheBackend {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Remaining lifetime of a key, if present and unexpired.
    pub fn ttl_remaining(&self, key: &str) -> Option<Duration> {
        let now = Instant::now();
        self.entries
            .get(key)
            .filter(|entry| entry.expires_at > now)
            .map(|entry| entry.expires_at - now)
    }
}

#[async_trait]
impl CacheBackend for InMemoryCacheBackend {
    async fn get(&self, key: &str) -> CacheLookup {
        let now = Instant::now();
        let lookup = match self.entries.get(key) {
            Some(entry) if entry.expires_at > now => CacheLookup::Hit(entry.value.clone()),
            _ => CacheLookup::Miss,
        };

        if !lookup.is_hit() {
            self.entries.remove_if(key, |_, entry| entry.expires_at <= now);
        }

        self.stats.record_lookup(&lookup);
        lookup
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> RosterResult<()> {
        let entry = Entry {
            value,
            expires_at: Instant::now() + ttl,
        };
        self.entries.insert(key.to_string(), entry);
        self.stats.record_write(true);
        Ok(())
    }

    async fn delete(&self, key: &str) -> RosterResult<()> {
        self.entries.remove(key);
        Ok(())
    }

    async fn ping(&self) -> RosterResult<()> {
        Ok(())
    }

    fn stats(&self) -> CacheStats {
        self.stats.snapshot(self.entries.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &str = "employee_data";

    #[tokio::test(start_paused = true)]
    async fn test_entry_expires_after_ttl() -> RosterResult<()> {
        let cache = InMemoryCacheBackend::new();
        cache.set(KEY, "[]".to_string(), Duration::from_secs(300)).await?;

        tokio::time::advance(Duration::from_secs(299)).await;
        assert_eq!(cache.get(KEY).await, CacheLookup::Hit("[]".to_string()));

        tokio::time::advance(Duration::from_secs(2)).await;
        assert_eq!(cache.get(KEY).await, CacheLookup::Miss);
        assert_eq!(cache.stats().entry_count, 0);
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn test_read_hits_do_not_extend_lifetime() -> RosterResult<()> {
        let cache = InMemoryCacheBackend::new();
        cache.set(KEY, "[1]".to_string(), Duration::from_secs(10)).await?;

        for _ in 0..9 {
            tokio::time::advance(Duration::from_secs(1)).await;
            assert!(cache.get(KEY).await.is_hit());
        }

        tokio::time::advance(Duration::from_secs(1)).await;
        assert_eq!(cache.get(KEY).await, CacheLookup::Miss);
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn test_set_replaces_value_and_resets_ttl() -> RosterResult<()> {
        let cache = InMemoryCacheBackend::new();
        cache.set(KEY, "[1]".to_string(), Duration::from_secs(10)).await?;
        tokio::time::advance(Duration::from_secs(8)).await;

        cache.set(KEY, "[1,2]".to_string(), Duration::from_secs(10)).await?;
        tokio::time::advance(Duration::from_secs(8)).await;

        assert_eq!(cache.get(KEY).await, CacheLookup::Hit("[1,2]".to_string()));
        assert_eq!(cache.ttl_remaining(KEY), Some(Duration::from_secs(2)));
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_and_stats() -> RosterResult<()> {
        let cache = InMemoryCacheBackend::new();
        assert_eq!(cache.get(KEY).await, CacheLookup::Miss);

        cache.set(KEY, "[]".to_string(), Duration::from_secs(60)).await?;
        assert!(cache.get(KEY).await.is_hit());

        cache.delete(KEY).await?;
        cache.delete(KEY).await?;
        assert_eq!(cache.get(KEY).await, CacheLookup::Miss);

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 2);
        assert_eq!(stats.writes, 1);
        assert_eq!(stats.unavailable, 0);
        Ok(())
    }
}
