//! Roster Core - Entity Types
//!
//! Pure data structures shared by every roster crate: the employee entity,
//! the ingestion column schema, the error taxonomy and the cache constants.
//! No I/O lives here.

pub mod employee;
pub mod error;
pub mod schema;

use chrono::{DateTime, Utc};
use std::time::Duration;

pub use employee::{Employee, EmployeePatch, NewEmployee};
pub use error::{
    CacheError, ConfigError, IngestError, RosterError, RosterResult, StorageError,
    ValidationError,
};
pub use schema::{is_valid_email, COLUMN_COUNT, EMAIL_COLUMN, EXPECTED_HEADERS};

// ============================================================================
// IDENTITY TYPES
// ============================================================================

/// Surrogate key assigned by the record store in insertion order.
pub type EmployeeId = i64;

/// Timestamp type using UTC timezone.
pub type Timestamp = DateTime<Utc>;

// ============================================================================
// CACHE CONSTANTS
// ============================================================================

/// The single cache key holding the serialized "all employees" snapshot.
pub const EMPLOYEE_CACHE_KEY: &str = "employee_data";

/// Default snapshot time-to-live in seconds (5 minutes).
pub const DEFAULT_CACHE_TTL_SECS: u64 = 300;

/// Default snapshot time-to-live.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(DEFAULT_CACHE_TTL_SECS);
