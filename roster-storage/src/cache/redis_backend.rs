//! Redis-backed cache implementation.
//!
//! Uses a multiplexed `ConnectionManager`, which reconnects on its own after
//! a dropped connection. Every Redis error on a read is reported as
//! `CacheLookup::BackendUnavailable`; on a write it becomes
//! `CacheError::Unavailable`.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use roster_core::{CacheError, RosterResult};

use super::lookup::CacheLookup;
use super::traits::{CacheBackend, CacheStats, StatsRecorder};

/// Cache backend talking to a Redis server.
#[derive(Clone)]
pub struct RedisCacheBackend {
    conn: ConnectionManager,
    stats: Arc<StatsRecorder>,
}

impl RedisCacheBackend {
    /// Connect to `url` (e.g. `redis://localhost:6379/0`) and verify the
    /// server answers a PING.
    pub async fn connect(url: &str) -> RosterResult<Self> {
        let client = redis::Client::open(url).map_err(unavailable)?;
        let conn = client
            .get_connection_manager()
            .await
            .map_err(unavailable)?;

        let backend = Self {
            conn,
            stats: Arc::new(StatsRecorder::default()),
        };
        backend.ping().await?;
        Ok(backend)
    }
}

fn unavailable(err: redis::RedisError) -> CacheError {
    CacheError::Unavailable {
        reason: err.to_string(),
    }
}

#[async_trait]
impl CacheBackend for RedisCacheBackend {
    async fn get(&self, key: &str) -> CacheLookup {
        let mut conn = self.conn.clone();
        let result: redis::RedisResult<Option<String>> = conn.get(key).await;

        let lookup = match result {
            Ok(Some(value)) => CacheLookup::Hit(value),
            Ok(None) => CacheLookup::Miss,
            Err(err) => CacheLookup::BackendUnavailable(err.to_string()),
        };
        self.stats.record_lookup(&lookup);
        lookup
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> RosterResult<()> {
        let mut conn = self.conn.clone();
        // SET EX rejects a zero expiry.
        let seconds = ttl.as_secs().max(1);
        let result: redis::RedisResult<()> = conn.set_ex(key, value, seconds).await;

        self.stats.record_write(result.is_ok());
        result.map_err(|e| unavailable(e).into())
    }

    async fn delete(&self, key: &str) -> RosterResult<()> {
        let mut conn = self.conn.clone();
        let result: redis::RedisResult<()> = conn.del(key).await;
        result.map_err(|e| unavailable(e).into())
    }

    async fn ping(&self) -> RosterResult<()> {
        let mut conn = self.conn.clone();
        let pong: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(unavailable)?;

        if pong == "PONG" {
            Ok(())
        } else {
            Err(CacheError::Unavailable {
                reason: format!("unexpected PING reply: {}", pong),
            }
            .into())
        }
    }

    fn stats(&self) -> CacheStats {
        self.stats.snapshot(0)
    }
}
