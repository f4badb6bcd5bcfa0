//! Cache backend trait.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use roster_core::RosterResult;

use super::lookup::CacheLookup;

/// Cache backend trait for pluggable cache implementations.
///
/// Implementations must make `set` an atomic replace of the whole value:
/// readers see either the previous value or the new one, never a mix.
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// Look up a key.
    ///
    /// Backend failures are reported as `CacheLookup::BackendUnavailable`
    /// and never folded into `Miss`.
    async fn get(&self, key: &str) -> CacheLookup;

    /// Store a value that expires `ttl` after this call.
    async fn set(&self, key: &str, value: String, ttl: Duration) -> RosterResult<()>;

    /// Remove a key. Removing an absent key is not an error.
    async fn delete(&self, key: &str) -> RosterResult<()>;

    /// Cheap connectivity check for readiness probes.
    async fn ping(&self) -> RosterResult<()>;

    /// Get cache statistics.
    fn stats(&self) -> CacheStats;
}

/// Statistics about cache usage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of cache hits.
    pub hits: u64,
    /// Number of lookups that found nothing (absent or expired).
    pub misses: u64,
    /// Number of lookups the backend failed to answer.
    pub unavailable: u64,
    /// Number of successful writes.
    pub writes: u64,
    /// Number of failed writes.
    pub write_failures: u64,
    /// Number of entries currently held, when the backend can tell.
    pub entry_count: u64,
}

impl CacheStats {
    /// Calculate the hit rate (0.0 to 1.0) over all lookups.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses + self.unavailable;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Atomic counters shared by the backends.
#[derive(Debug, Default)]
pub(crate) struct StatsRecorder {
    hits: AtomicU64,
    misses: AtomicU64,
    unavailable: AtomicU64,
    writes: AtomicU64,
    write_failures: AtomicU64,
}

impl StatsRecorder {
    pub(crate) fn record_lookup(&self, lookup: &CacheLookup) {
        let counter = match lookup {
            CacheLookup::Hit(_) => &self.hits,
            CacheLookup::Miss => &self.misses,
            CacheLookup::BackendUnavailable(_) => &self.unavailable,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_write(&self, ok: bool) {
        let counter = if ok { &self.writes } else { &self.write_failures };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self, entry_count: u64) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            unavailable: self.unavailable.load(Ordering::Relaxed),
            writes: self.writes.load(Ordering::Relaxed),
            write_failures: self.write_failures.load(Ordering::Relaxed),
            entry_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_rate_counts_unavailable_lookups() {
        let stats = CacheStats {
            hits: 2,
            misses: 1,
            unavailable: 1,
            ..CacheStats::default()
        };
        assert!((stats.hit_rate() - 0.5).abs() < f64::EPSILON);
        assert_eq!(CacheStats::default().hit_rate(), 0.0);
    }
}
