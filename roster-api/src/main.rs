//! Roster API Server Entry Point
//!
//! Bootstraps configuration, connects the record store and the snapshot
//! cache, and starts the Axum HTTP server.

use std::sync::Arc;

use axum::Router;
use roster_api::jobs::{job_sweeper_task, JobSweeperConfig};
use roster_api::telemetry::{init_tracing, TelemetryConfig};
use roster_api::{
    create_api_router, ApiConfig, ApiError, ApiResult, AppState, CacheSettings, DbClient,
    DbConfig, StoreKind,
};
use roster_core::RosterError;
use roster_storage::{
    CacheBackend, EmployeeStore, InMemoryCacheBackend, InMemoryEmployeeStore, RedisCacheBackend,
    SnapshotCache,
};
use tokio::sync::watch;

#[tokio::main]
async fn main() -> ApiResult<()> {
    let telemetry_config = TelemetryConfig::default();
    init_tracing(&telemetry_config)?;

    let api_config = ApiConfig::from_env().map_err(RosterError::from)?;
    let cache_settings = CacheSettings::from_env().map_err(RosterError::from)?;

    let store = connect_store(api_config.store).await?;
    let backend = connect_cache(&cache_settings).await?;
    let cache = SnapshotCache::new(backend, cache_settings.ttl);

    let addr = api_config.bind_addr().map_err(RosterError::from)?;
    let state = AppState::new(store, cache, api_config);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let sweeper = tokio::spawn(job_sweeper_task(
        state.jobs.clone(),
        JobSweeperConfig::from_env(),
        shutdown_rx,
    ));

    let app: Router = create_api_router(state);

    tracing::info!(%addr, "Starting roster API server");
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ApiError::internal_error(format!("Failed to bind {}: {}", addr, e)))?;

    let server = axum::serve(listener, app);
    tokio::select! {
        result = server => {
            result.map_err(|e| ApiError::internal_error(format!("Server error: {}", e)))?;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    let _ = shutdown_tx.send(true);
    let _ = sweeper.await;
    Ok(())
}

async fn connect_store(kind: StoreKind) -> ApiResult<Arc<dyn EmployeeStore>> {
    match kind {
        StoreKind::Memory => {
            tracing::warn!("Using the in-memory record store; data is lost on restart");
            Ok(Arc::new(InMemoryEmployeeStore::new()))
        }
        StoreKind::Postgres => {
            let db = DbClient::from_config(&DbConfig::from_env())?;
            db.ensure_schema().await?;
            tracing::info!(pool_size = db.pool_size(), "Connected to PostgreSQL");
            Ok(Arc::new(db))
        }
    }
}

async fn connect_cache(settings: &CacheSettings) -> ApiResult<Arc<dyn CacheBackend>> {
    match &settings.redis_url {
        Some(url) => {
            let backend = RedisCacheBackend::connect(url).await?;
            tracing::info!(ttl_secs = settings.ttl.as_secs(), "Connected to Redis cache");
            Ok(Arc::new(backend))
        }
        None => {
            tracing::info!(
                ttl_secs = settings.ttl.as_secs(),
                "Using the in-process snapshot cache"
            );
            Ok(Arc::new(InMemoryCacheBackend::new()))
        }
    }
}
