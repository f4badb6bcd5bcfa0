//! In-process record store used by tests and database-less deployments.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, RwLock};

use ::async_trait::async_trait;
use chrono::Utc;
use roster_core::{Employee, EmployeeId, NewEmployee, RosterResult, StorageError};

use super::EmployeeStore;

/// `BTreeMap`-backed store with a monotonically increasing id sequence.
#[derive(Debug, Clone, Default)]
pub struct InMemoryEmployeeStore {
    rows: Arc<RwLock<BTreeMap<EmployeeId, Employee>>>,
    next_id: Arc<AtomicI64>,
}

impl InMemoryEmployeeStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a row as soft-deleted. Returns false if it does not exist.
    pub fn soft_delete(&self, id: EmployeeId) -> RosterResult<bool> {
        let mut rows = self.rows.write().map_err(|_| StorageError::LockPoisoned)?;
        match rows.get_mut(&id) {
            Some(row) if !row.is_deleted() => {
                row.deleted_at = Some(Utc::now());
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Total rows including soft-deleted ones.
    pub fn raw_len(&self) -> RosterResult<usize> {
        let rows = self.rows.read().map_err(|_| StorageError::LockPoisoned)?;
        Ok(rows.len())
    }
}

#[async_trait]
impl EmployeeStore for InMemoryEmployeeStore {
    async fn insert(&self, new: NewEmployee) -> RosterResult<Employee> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let employee = Employee::from_new(id, new, Utc::now());
        let mut rows = self.rows.write().map_err(|_| StorageError::LockPoisoned)?;
        rows.insert(id, employee.clone());
        Ok(employee)
    }

    async fn get(&self, id: EmployeeId) -> RosterResult<Option<Employee>> {
        let rows = self.rows.read().map_err(|_| StorageError::LockPoisoned)?;
        Ok(rows.get(&id).filter(|row| !row.is_deleted()).cloned())
    }

    async fn list_all(&self) -> RosterResult<Vec<Employee>> {
        let rows = self.rows.read().map_err(|_| StorageError::LockPoisoned)?;
        Ok(rows.values().filter(|row| !row.is_deleted()).cloned().collect())
    }

    async fn update(&self, employee: &Employee) -> RosterResult<Employee> {
        let mut rows = self.rows.write().map_err(|_| StorageError::LockPoisoned)?;
        let stored = rows
            .get_mut(&employee.id)
            .filter(|row| !row.is_deleted())
            .ok_or(StorageError::NotFound { id: employee.id })?;

        let created_at = stored.created_at;
        *stored = Employee {
            created_at,
            updated_at: Utc::now(),
            deleted_at: None,
            ..employee.clone()
        };
        Ok(stored.clone())
    }

    async fn count(&self) -> RosterResult<u64> {
        let rows = self.rows.read().map_err(|_| StorageError::LockPoisoned)?;
        Ok(rows.values().filter(|row| !row.is_deleted()).count() as u64)
    }

    async fn ping(&self) -> RosterResult<()> {
        self.rows
            .read()
            .map(|_| ())
            .map_err(|_| StorageError::LockPoisoned.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_employee(first: &str, email: &str) -> NewEmployee {
        NewEmployee {
            first_name: first.to_string(),
            email: email.to_string(),
            ..NewEmployee::default()
        }
    }

    #[tokio::test]
    async fn test_insert_assigns_sequential_ids() -> RosterResult<()> {
        let store = InMemoryEmployeeStore::new();
        let a = store.insert(new_employee("A", "a@example.com")).await?;
        let b = store.insert(new_employee("B", "b@example.com")).await?;

        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);
        assert_eq!(store.count().await?, 2);

        let all = store.list_all().await?;
        assert_eq!(all.iter().map(|e| e.id).collect::<Vec<_>>(), vec![1, 2]);
        Ok(())
    }

    #[tokio::test]
    async fn test_update_preserves_identity_and_bumps_timestamp() -> RosterResult<()> {
        let store = InMemoryEmployeeStore::new();
        let original = store.insert(new_employee("A", "a@example.com")).await?;

        let mut changed = original.clone();
        changed.city = "Lyon".to_string();
        changed.created_at = Utc::now() + chrono::Duration::days(1);

        let stored = store.update(&changed).await?;
        assert_eq!(stored.city, "Lyon");
        assert_eq!(stored.created_at, original.created_at);
        assert!(stored.updated_at >= original.updated_at);
        Ok(())
    }

    #[tokio::test]
    async fn test_update_missing_row_is_not_found() {
        let store = InMemoryEmployeeStore::new();
        let ghost = Employee::from_new(42, new_employee("G", "g@example.com"), Utc::now());

        let err = store.update(&ghost).await.expect_err("missing row");
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_soft_deleted_rows_are_invisible() -> RosterResult<()> {
        let store = InMemoryEmployeeStore::new();
        let a = store.insert(new_employee("A", "a@example.com")).await?;
        store.insert(new_employee("B", "b@example.com")).await?;

        assert!(store.soft_delete(a.id)?);
        assert!(!store.soft_delete(a.id)?);

        assert_eq!(store.get(a.id).await?, None);
        assert_eq!(store.count().await?, 1);
        assert_eq!(store.raw_len()?, 2);
        assert!(store.update(&a).await.is_err());
        Ok(())
    }
}
