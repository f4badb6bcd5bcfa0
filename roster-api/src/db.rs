//! Database Connection Pool Module
//!
//! PostgreSQL connection pooling using deadpool-postgres, and the
//! `EmployeeStore` implementation over the `employees` table.

use async_trait::async_trait;
use deadpool_postgres::{Config, ManagerConfig, Pool, PoolError, RecyclingMethod, Runtime};
use roster_core::{Employee, EmployeeId, NewEmployee, RosterResult, StorageError};
use roster_storage::EmployeeStore;
use std::time::Duration;
use tokio_postgres::{NoTls, Row};

use crate::error::{ApiError, ApiResult};

// ============================================================================
// CONNECTION POOL CONFIGURATION
// ============================================================================

/// Database connection pool configuration.
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// PostgreSQL host
    pub host: String,
    /// PostgreSQL port
    pub port: u16,
    /// Database name
    pub dbname: String,
    /// Database user
    pub user: String,
    /// Database password
    pub password: String,
    /// Maximum pool size
    pub max_size: usize,
    /// Connection timeout
    pub timeout: Duration,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5432,
            dbname: "roster".to_string(),
            user: "postgres".to_string(),
            password: "".to_string(),
            max_size: 16,
            timeout: Duration::from_secs(30),
        }
    }
}

impl DbConfig {
    /// Create a new database configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            host: std::env::var("ROSTER_DB_HOST").unwrap_or_else(|_| "localhost".to_string()),
            port: std::env::var("ROSTER_DB_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(5432),
            dbname: std::env::var("ROSTER_DB_NAME").unwrap_or_else(|_| "roster".to_string()),
            user: std::env::var("ROSTER_DB_USER").unwrap_or_else(|_| "postgres".to_string()),
            password: std::env::var("ROSTER_DB_PASSWORD").unwrap_or_default(),
            max_size: std::env::var("ROSTER_DB_POOL_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(16),
            timeout: Duration::from_secs(
                std::env::var("ROSTER_DB_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(30),
            ),
        }
    }

    /// Create a connection pool from this configuration.
    pub fn create_pool(&self) -> ApiResult<Pool> {
        let mut cfg = Config::new();
        cfg.host = Some(self.host.clone());
        cfg.port = Some(self.port);
        cfg.dbname = Some(self.dbname.clone());
        cfg.user = Some(self.user.clone());
        cfg.password = Some(self.password.clone());
        cfg.connect_timeout = Some(self.timeout);

        cfg.manager = Some(ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        });

        let mut pool_config = deadpool_postgres::PoolConfig::new(self.max_size);
        pool_config.timeouts.wait = Some(self.timeout);
        cfg.pool = Some(pool_config);

        let pool = cfg
            .create_pool(Some(Runtime::Tokio1), NoTls)
            .map_err(|e| ApiError::database_error(format!("Failed to create pool: {}", e)))?;

        Ok(pool)
    }
}

// ============================================================================
// SQL
// ============================================================================

const SCHEMA_SQL: &str = "
CREATE TABLE IF NOT EXISTS employees (
    id          BIGSERIAL PRIMARY KEY,
    created_at  TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at  TIMESTAMPTZ NOT NULL DEFAULT now(),
    deleted_at  TIMESTAMPTZ NULL,
    first_name  TEXT NOT NULL,
    last_name   TEXT NOT NULL,
    company     TEXT NOT NULL,
    address     TEXT NOT NULL,
    city        TEXT NOT NULL,
    country     TEXT NOT NULL,
    postal      TEXT NOT NULL,
    phone       TEXT NOT NULL,
    email       TEXT NOT NULL,
    web         TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_employees_deleted_at ON employees (deleted_at);
";

const COLUMNS: &str = "id, created_at, updated_at, deleted_at, first_name, last_name, company, \
                       address, city, country, postal, phone, email, web";

// ============================================================================
// DATABASE CLIENT WRAPPER
// ============================================================================

/// Record store backed by a PostgreSQL connection pool.
#[derive(Clone)]
pub struct DbClient {
    pool: Pool,
}

impl DbClient {
    /// Create a new database client with the given pool.
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    /// Create a new database client from configuration.
    pub fn from_config(config: &DbConfig) -> ApiResult<Self> {
        let pool = config.create_pool()?;
        Ok(Self::new(pool))
    }

    /// Get the current pool size for observability.
    pub fn pool_size(&self) -> usize {
        self.pool.status().size
    }

    /// Create the `employees` table and its index if they do not exist.
    pub async fn ensure_schema(&self) -> RosterResult<()> {
        let conn = self.get_conn().await?;
        conn.batch_execute(SCHEMA_SQL).await.map_err(query_failed)?;
        tracing::info!("Employee schema ensured");
        Ok(())
    }

    /// Get a connection from the pool.
    async fn get_conn(&self) -> Result<deadpool_postgres::Object, StorageError> {
        self.pool.get().await.map_err(pool_unavailable)
    }
}

fn query_failed(err: tokio_postgres::Error) -> StorageError {
    tracing::error!("Database error: {:?}", err);
    StorageError::QueryFailed {
        reason: err.to_string(),
    }
}

fn pool_unavailable(err: PoolError) -> StorageError {
    tracing::error!("Connection pool error: {:?}", err);
    StorageError::Unavailable {
        reason: err.to_string(),
    }
}

fn employee_from_row(row: &Row) -> Result<Employee, tokio_postgres::Error> {
    Ok(Employee {
        id: row.try_get("id")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
        deleted_at: row.try_get("deleted_at")?,
        first_name: row.try_get("first_name")?,
        last_name: row.try_get("last_name")?,
        company: row.try_get("company")?,
        address: row.try_get("address")?,
        city: row.try_get("city")?,
        country: row.try_get("country")?,
        postal: row.try_get("postal")?,
        phone: row.try_get("phone")?,
        email: row.try_get("email")?,
        web: row.try_get("web")?,
    })
}

#[async_trait]
impl EmployeeStore for DbClient {
    async fn insert(&self, new: NewEmployee) -> RosterResult<Employee> {
        let conn = self.get_conn().await?;

        let sql = format!(
            "INSERT INTO employees (first_name, last_name, company, address, city, country, \
             postal, phone, email, web) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
             RETURNING {}",
            COLUMNS
        );
        let row = conn
            .query_one(
                sql.as_str(),
                &[
                    &new.first_name,
                    &new.last_name,
                    &new.company,
                    &new.address,
                    &new.city,
                    &new.country,
                    &new.postal,
                    &new.phone,
                    &new.email,
                    &new.web,
                ],
            )
            .await
            .map_err(|e| StorageError::InsertFailed {
                reason: e.to_string(),
            })?;

        Ok(employee_from_row(&row).map_err(query_failed)?)
    }

    async fn get(&self, id: EmployeeId) -> RosterResult<Option<Employee>> {
        let conn = self.get_conn().await?;

        let sql = format!(
            "SELECT {} FROM employees WHERE id = $1 AND deleted_at IS NULL",
            COLUMNS
        );
        let row = conn
            .query_opt(sql.as_str(), &[&id])
            .await
            .map_err(query_failed)?;

        match row {
            Some(row) => Ok(Some(employee_from_row(&row).map_err(query_failed)?)),
            None => Ok(None),
        }
    }

    async fn list_all(&self) -> RosterResult<Vec<Employee>> {
        let conn = self.get_conn().await?;

        let sql = format!(
            "SELECT {} FROM employees WHERE deleted_at IS NULL ORDER BY id",
            COLUMNS
        );
        let rows = conn.query(sql.as_str(), &[]).await.map_err(query_failed)?;

        let employees = rows
            .iter()
            .map(employee_from_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(query_failed)?;
        Ok(employees)
    }

    async fn update(&self, employee: &Employee) -> RosterResult<Employee> {
        let conn = self.get_conn().await?;

        let sql = format!(
            "UPDATE employees SET first_name = $2, last_name = $3, company = $4, address = $5, \
             city = $6, country = $7, postal = $8, phone = $9, email = $10, web = $11, \
             updated_at = now() WHERE id = $1 AND deleted_at IS NULL RETURNING {}",
            COLUMNS
        );
        let row = conn
            .query_opt(
                sql.as_str(),
                &[
                    &employee.id,
                    &employee.first_name,
                    &employee.last_name,
                    &employee.company,
                    &employee.address,
                    &employee.city,
                    &employee.country,
                    &employee.postal,
                    &employee.phone,
                    &employee.email,
                    &employee.web,
                ],
            )
            .await
            .map_err(|e| StorageError::UpdateFailed {
                id: employee.id,
                reason: e.to_string(),
            })?;

        match row {
            Some(row) => Ok(employee_from_row(&row).map_err(query_failed)?),
            None => Err(StorageError::NotFound { id: employee.id }.into()),
        }
    }

    async fn count(&self) -> RosterResult<u64> {
        let conn = self.get_conn().await?;

        let row = conn
            .query_one(
                "SELECT COUNT(*) FROM employees WHERE deleted_at IS NULL",
                &[],
            )
            .await
            .map_err(query_failed)?;

        let count: i64 = row.try_get(0).map_err(query_failed)?;
        Ok(count.max(0) as u64)
    }

    async fn ping(&self) -> RosterResult<()> {
        let conn = self.get_conn().await?;

        // Simple query to verify connectivity
        conn.query_one("SELECT 1", &[]).await.map_err(query_failed)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_db_config_default() {
        let config = DbConfig::default();
        assert_eq!(config.host, "localhost");
        assert_eq!(config.port, 5432);
        assert_eq!(config.dbname, "roster");
        assert_eq!(config.max_size, 16);
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_columns_cover_every_employee_field() {
        let names: Vec<&str> = COLUMNS.split(',').map(str::trim).collect();
        assert_eq!(names.len(), 14);
        assert_eq!(names.first(), Some(&"id"));
        assert_eq!(names.last(), Some(&"web"));
    }

    #[test]
    fn test_schema_is_idempotent_sql() {
        assert!(SCHEMA_SQL.contains("CREATE TABLE IF NOT EXISTS employees"));
        assert!(SCHEMA_SQL.contains("CREATE INDEX IF NOT EXISTS"));
    }
}
