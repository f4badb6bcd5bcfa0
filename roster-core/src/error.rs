//! Error types for roster operations

use thiserror::Error;

use crate::EmployeeId;

/// Record store errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    #[error("Employee not found: id {id}")]
    NotFound { id: EmployeeId },

    #[error("Insert failed: {reason}")]
    InsertFailed { reason: String },

    #[error("Update failed for employee {id}: {reason}")]
    UpdateFailed { id: EmployeeId, reason: String },

    #[error("Query failed: {reason}")]
    QueryFailed { reason: String },

    #[error("Record store unavailable: {reason}")]
    Unavailable { reason: String },

    #[error("Storage lock poisoned")]
    LockPoisoned,
}

/// Cache layer errors. Lookups never return these: a failed lookup is a
/// `CacheLookup::BackendUnavailable`, not an error.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CacheError {
    #[error("Cache backend unavailable: {reason}")]
    Unavailable { reason: String },

    #[error("Snapshot serialization failed: {reason}")]
    Serialization { reason: String },
}

/// Upload validation errors. Any of these rejects the whole batch.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Sheet is empty: a header row is required")]
    EmptySheet,

    #[error("Header has {found} columns, expected {expected}")]
    HeaderLength { expected: usize, found: usize },

    #[error("Invalid header at column {column}: expected '{expected}', got '{found}'")]
    HeaderMismatch {
        column: usize,
        expected: String,
        found: String,
    },

    #[error("Row {row} has {found} columns, expected {expected}")]
    ColumnCount {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("Invalid email format in row {row}: '{value}'")]
    InvalidEmail { row: usize, value: String },
}

/// Spreadsheet ingestion errors outside of validation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IngestError {
    #[error("Failed to open spreadsheet: {reason}")]
    Open { reason: String },

    #[error("No sheets found in the spreadsheet")]
    NoSheets,

    #[error("Failed to read rows from sheet '{sheet}': {reason}")]
    ReadRows { sheet: String, reason: String },

    #[error("Failed to stage upload: {reason}")]
    Staging { reason: String },

    #[error("Commit task failed: {reason}")]
    TaskFailed { reason: String },
}

/// Configuration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required configuration field: {field}")]
    MissingRequired { field: String },

    #[error("Invalid value for {field}: {value} - {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
}

/// Master error type for all roster errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RosterError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Ingest error: {0}")]
    Ingest(#[from] IngestError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

impl RosterError {
    /// True for the "update target missing" case surfaced as 404.
    pub fn is_not_found(&self) -> bool {
        matches!(self, RosterError::Storage(StorageError::NotFound { .. }))
    }
}

impl From<serde_json::Error> for RosterError {
    fn from(err: serde_json::Error) -> Self {
        RosterError::Cache(CacheError::Serialization {
            reason: err.to_string(),
        })
    }
}

/// Result type alias for roster operations.
pub type RosterResult<T> = Result<T, RosterError>;

// =============================================================================
// TESTS
// =============================================================================
