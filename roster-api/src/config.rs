//! API Configuration Module
//!
//! Server, upload, CORS and cache settings. Configuration is loaded from
//! environment variables with sensible defaults for development.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use roster_core::{ConfigError, DEFAULT_CACHE_TTL_SECS};

use crate::constants::{
    DEFAULT_BIND_HOST, DEFAULT_CORS_MAX_AGE_SECS, DEFAULT_MAX_UPLOAD_BYTES, DEFAULT_PORT,
    DEFAULT_UPLOAD_DIR,
};

// ============================================================================
// API CONFIGURATION
// ============================================================================

/// Which record store the server runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    Postgres,
    Memory,
}

/// API configuration for binding, uploads and CORS.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    // ========================================================================
    // Server
    // ========================================================================
    /// Host to bind.
    pub bind_host: String,

    /// Port to bind.
    pub port: u16,

    // ========================================================================
    // Uploads
    // ========================================================================
    /// Directory uploaded spreadsheets are staged into.
    pub upload_dir: PathBuf,

    /// Maximum accepted request body for `POST /upload`.
    pub max_upload_bytes: usize,

    // ========================================================================
    // CORS Configuration
    // ========================================================================
    /// Allowed CORS origins (comma-separated in env var).
    /// Empty means allow all origins (dev mode).
    pub cors_origins: Vec<String>,

    /// Max age for CORS preflight cache in seconds.
    pub cors_max_age_secs: u64,

    // ========================================================================
    // Backends
    // ========================================================================
    /// Record store selection.
    pub store: StoreKind,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_host: DEFAULT_BIND_HOST.to_string(),
            port: DEFAULT_PORT,
            upload_dir: PathBuf::from(DEFAULT_UPLOAD_DIR),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            cors_origins: Vec::new(),
            cors_max_age_secs: DEFAULT_CORS_MAX_AGE_SECS,
            store: StoreKind::Postgres,
        }
    }
}

impl ApiConfig {
    /// Create ApiConfig from environment variables.
    ///
    /// Environment variables:
    /// - `ROSTER_API_BIND`: Bind host (default: 0.0.0.0)
    /// - `PORT` or `ROSTER_API_PORT`: Bind port (default: 8080)
    /// - `ROSTER_UPLOAD_DIR`: Staging directory (default: ./uploads)
    /// - `ROSTER_MAX_UPLOAD_BYTES`: Upload size limit (default: 25 MiB)
    /// - `ROSTER_CORS_ORIGINS`: Comma-separated allowed origins (empty = allow all)
    /// - `ROSTER_CORS_MAX_AGE_SECS`: Preflight cache duration (default: 86400)
    /// - `ROSTER_STORE`: `postgres` or `memory` (default: postgres)
    pub fn from_env() -> Result<Self, ConfigError> {
        let bind_host =
            std::env::var("ROSTER_API_BIND").unwrap_or_else(|_| DEFAULT_BIND_HOST.to_string());

        let port = match std::env::var("PORT")
            .ok()
            .or_else(|| std::env::var("ROSTER_API_PORT").ok())
        {
            Some(value) => value.parse::<u16>().map_err(|e| ConfigError::InvalidValue {
                field: "port".to_string(),
                value: value.clone(),
                reason: e.to_string(),
            })?,
            None => DEFAULT_PORT,
        };

        let upload_dir = std::env::var("ROSTER_UPLOAD_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_UPLOAD_DIR));

        let max_upload_bytes = std::env::var("ROSTER_MAX_UPLOAD_BYTES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES);

        let cors_origins = std::env::var("ROSTER_CORS_ORIGINS")
            .ok()
            .map(|s| {
                s.split(',')
                    .map(|o| o.trim().to_string())
                    .filter(|o| !o.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        let cors_max_age_secs = std::env::var("ROSTER_CORS_MAX_AGE_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_CORS_MAX_AGE_SECS);

        let store = match std::env::var("ROSTER_STORE") {
            Ok(value) => parse_store_kind(&value)?,
            Err(_) => StoreKind::Postgres,
        };

        Ok(Self {
            bind_host,
            port,
            upload_dir,
            max_upload_bytes,
            cors_origins,
            cors_max_age_secs,
            store,
        })
    }

    /// Resolve the socket address to bind.
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        let addr = format!("{}:{}", self.bind_host, self.port);
        addr.parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidValue {
                field: "bind address".to_string(),
                value: addr,
                reason: e.to_string(),
            })
    }

    /// Check if running in production mode (strict CORS).
    pub fn is_production(&self) -> bool {
        !self.cors_origins.is_empty()
    }
}

fn parse_store_kind(value: &str) -> Result<StoreKind, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "postgres" | "postgresql" => Ok(StoreKind::Postgres),
        "memory" => Ok(StoreKind::Memory),
        other => Err(ConfigError::InvalidValue {
            field: "ROSTER_STORE".to_string(),
            value: other.to_string(),
            reason: "expected 'postgres' or 'memory'".to_string(),
        }),
    }
}

// ============================================================================
// CACHE CONFIGURATION
// ============================================================================

/// Snapshot cache backend settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheSettings {
    /// Redis URL; `None` selects the in-process backend.
    pub redis_url: Option<String>,

    /// Snapshot time-to-live.
    pub ttl: Duration,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            redis_url: None,
            ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
        }
    }
}

impl CacheSettings {
    /// Create CacheSettings from environment variables.
    ///
    /// - `ROSTER_REDIS_URL`: e.g. `redis://localhost:6379/0` (unset = in-process cache)
    /// - `ROSTER_CACHE_TTL_SECS`: Snapshot TTL (default: 300)
    pub fn from_env() -> Result<Self, ConfigError> {
        let redis_url = std::env::var("ROSTER_REDIS_URL")
            .ok()
            .filter(|url| !url.trim().is_empty());

        let ttl_secs = match std::env::var("ROSTER_CACHE_TTL_SECS") {
            Ok(value) => match value.parse::<u64>() {
                Ok(secs) if secs > 0 => secs,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        field: "ROSTER_CACHE_TTL_SECS".to_string(),
                        value,
                        reason: "expected a positive number of seconds".to_string(),
                    })
                }
            },
            Err(_) => DEFAULT_CACHE_TTL_SECS,
        };

        Ok(Self {
            redis_url,
            ttl: Duration::from_secs(ttl_secs),
        })
    }
}
