//! Record store abstraction.
//!
//! The store is the source of truth. Implementations are expected to give
//! single-row atomicity; nothing here adds cross-call transactions.

pub mod memory;

use ::async_trait::async_trait;
use roster_core::{Employee, EmployeeId, NewEmployee, RosterResult};

pub use memory::InMemoryEmployeeStore;

/// Async record store for employee entities.
///
/// Every read excludes soft-deleted rows.
#[async_trait]
pub trait EmployeeStore: Send + Sync {
    /// Insert a new employee and return the stored record with its id.
    async fn insert(&self, new: NewEmployee) -> RosterResult<Employee>;

    /// Get an employee by id.
    async fn get(&self, id: EmployeeId) -> RosterResult<Option<Employee>>;

    /// List every live employee ordered by id.
    async fn list_all(&self) -> RosterResult<Vec<Employee>>;

    /// Persist the data fields of `employee` and bump `updated_at`.
    ///
    /// Fails with `StorageError::NotFound` if the row no longer exists.
    async fn update(&self, employee: &Employee) -> RosterResult<Employee>;

    /// Count live employees.
    async fn count(&self) -> RosterResult<u64>;

    /// Cheap connectivity check for readiness probes.
    async fn ping(&self) -> RosterResult<()>;
}
