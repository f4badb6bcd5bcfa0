//! Roster Storage - Record Store and Cache Layer
//!
//! Defines the storage abstractions the service composes:
//! - [`EmployeeStore`]: the authoritative relational record store
//! - [`CacheBackend`]: a key-value cache with per-key expiry
//! - [`SnapshotCache`]: the single-key "all employees" snapshot on top of it
//!
//! The PostgreSQL store lives in roster-api next to its connection pool.

pub mod cache;
pub mod store;

pub use cache::{
    CacheBackend, CacheLookup, CacheStats, InMemoryCacheBackend, RedisCacheBackend,
    SnapshotCache,
};
pub use store::{EmployeeStore, InMemoryEmployeeStore};
