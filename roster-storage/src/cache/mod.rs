//! Cache layer for the employee snapshot.
//!
//! The cache holds one logical key whose value is the whole employee
//! collection serialized as a JSON array. There is no per-record caching:
//! any write replaces the entire blob.
//!
//! # Lookup outcomes
//!
//! Backends report lookups as a [`CacheLookup`], which keeps "the key is
//! absent" apart from "the backend could not answer". Callers fall back to
//! the record store in both cases but only the latter is a degraded mode.
//!
//! # Expiration
//!
//! Entries expire a fixed TTL after the write that stored them. Read hits do
//! not extend the lifetime.

pub mod lookup;
pub mod memory;
pub mod redis_backend;
pub mod snapshot;
pub mod traits;

pub use lookup::CacheLookup;
pub use memory::InMemoryCacheBackend;
pub use redis_backend::RedisCacheBackend;
pub use snapshot::SnapshotCache;
pub use traits::{CacheBackend, CacheStats};
