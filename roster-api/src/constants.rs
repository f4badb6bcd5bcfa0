//! Constants for the roster API
//!
//! This module contains all constant values used throughout the API.
//! Centralizing constants makes them easy to find, modify, and test.

// ============================================================================
// SERVER
// ============================================================================

/// Default bind host
pub const DEFAULT_BIND_HOST: &str = "0.0.0.0";

/// Default HTTP port
pub const DEFAULT_PORT: u16 = 8080;

// ============================================================================
// CORS
// ============================================================================

/// Default CORS max age in seconds (24 hours)
pub const DEFAULT_CORS_MAX_AGE_SECS: u64 = 86400;

// ============================================================================
// UPLOADS
// ============================================================================

/// Multipart form field carrying the spreadsheet
pub const UPLOAD_FIELD_NAME: &str = "file";

/// Default staging directory for uploaded spreadsheets
pub const DEFAULT_UPLOAD_DIR: &str = "./uploads";

/// Default maximum upload size (25 MiB)
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

/// File name used when the client sends none
pub const FALLBACK_UPLOAD_NAME: &str = "upload.xlsx";

// ============================================================================
// IMPORT JOBS
// ============================================================================

/// How often finished import jobs are swept (default: 10 minutes)
pub const DEFAULT_JOB_SWEEP_INTERVAL_SECS: u64 = 600;

/// How long a finished import job stays queryable (default: 24 hours)
pub const DEFAULT_JOB_RETENTION_SECS: u64 = 86400;

// ============================================================================
// RESPONSE HEADERS
// ============================================================================

/// Reports whether `GET /employees` was served from the cache
pub const CACHE_STATUS_HEADER: &str = "x-cache";
