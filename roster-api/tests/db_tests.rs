#![cfg(feature = "db-tests")]
//! PostgreSQL record store tests.
//!
//! Require a reachable database configured through the `ROSTER_DB_*`
//! environment variables.

use roster_api::{ApiResult, DbClient, DbConfig};
use roster_core::EmployeePatch;
use roster_storage::EmployeeStore;
use roster_test_utils::assertions::assert_same_data;
use roster_test_utils::sample_new_employee;

async fn test_db() -> ApiResult<DbClient> {
    let db = DbClient::from_config(&DbConfig::from_env())?;
    db.ensure_schema().await?;
    Ok(db)
}

#[tokio::test]
async fn insert_get_update_round_trip() -> ApiResult<()> {
    let db = test_db().await?;
    db.ping().await?;

    let inserted = db.insert(sample_new_employee(1)).await?;
    assert_same_data(&inserted, &sample_new_employee(1));

    let mut employee = db.get(inserted.id).await?.ok_or_else(|| {
        roster_api::ApiError::entity_not_found("Employee", inserted.id)
    })?;
    EmployeePatch {
        city: Some("Lyon".to_string()),
        ..EmployeePatch::default()
    }
    .apply_to(&mut employee);

    let updated = db.update(&employee).await?;
    assert_eq!(updated.city, "Lyon");
    assert_eq!(updated.created_at, inserted.created_at);
    assert!(updated.updated_at >= inserted.updated_at);

    let all = db.list_all().await?;
    assert!(all.iter().any(|e| e.id == inserted.id && e.city == "Lyon"));
    assert!(db.count().await? >= 1);
    Ok(())
}

#[tokio::test]
async fn update_of_missing_row_is_not_found() -> ApiResult<()> {
    let db = test_db().await?;
    let mut ghost = db.insert(sample_new_employee(2)).await?;
    ghost.id = i64::MAX;

    let err = db.update(&ghost).await.err();
    assert!(err.is_some_and(|e| e.is_not_found()));
    Ok(())
}
