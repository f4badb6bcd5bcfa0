use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, Response, StatusCode},
    Router,
};
use roster_api::{create_api_router, ApiConfig, AppState, ImportJob, StoreKind};
use roster_storage::{CacheBackend, EmployeeStore, InMemoryCacheBackend, InMemoryEmployeeStore, SnapshotCache};
use roster_test_utils::multipart_body;
use tempfile::TempDir;
use tower::ServiceExt; // for `oneshot`
use uuid::Uuid;

pub type TestResult<T = ()> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

pub const BOUNDARY: &str = "roster-test-boundary";

/// Router over in-memory backends with a throwaway upload directory.
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub store: Arc<dyn EmployeeStore>,
    pub cache: Arc<dyn CacheBackend>,
    _uploads: TempDir,
}

impl TestApp {
    pub fn new() -> TestResult<Self> {
        Self::with_backends(
            Arc::new(InMemoryEmployeeStore::new()),
            Arc::new(InMemoryCacheBackend::new()),
        )
    }

    pub fn with_backends(
        store: Arc<dyn EmployeeStore>,
        cache: Arc<dyn CacheBackend>,
    ) -> TestResult<Self> {
        let uploads = TempDir::new()?;
        let config = ApiConfig {
            upload_dir: uploads.path().to_path_buf(),
            store: StoreKind::Memory,
            ..ApiConfig::default()
        };
        let state = AppState::new(
            store.clone(),
            SnapshotCache::with_defaults(cache.clone()),
            config,
        );
        Ok(Self {
            router: create_api_router(state.clone()),
            state,
            store,
            cache,
            _uploads: uploads,
        })
    }

    pub async fn send(&self, request: Request<Body>) -> TestResult<Response<Body>> {
        Ok(self.router.clone().oneshot(request).await?)
    }

    pub async fn get(&self, uri: &str) -> TestResult<Response<Body>> {
        self.send(Request::builder().uri(uri).body(Body::empty())?).await
    }

    pub async fn put_json(&self, uri: &str, body: &str) -> TestResult<Response<Body>> {
        let request = Request::builder()
            .method("PUT")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))?;
        self.send(request).await
    }

    pub async fn upload(&self, field: &str, file_name: &str, bytes: &[u8]) -> TestResult<Response<Body>> {
        let request = Request::builder()
            .method("POST")
            .uri("/upload")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(multipart_body(BOUNDARY, field, file_name, bytes)))?;
        self.send(request).await
    }

    /// Poll `GET /jobs/{id}` until the job finishes.
    pub async fn wait_for_job(&self, id: Uuid) -> TestResult<ImportJob> {
        for _ in 0..500 {
            let response = self.get(&format!("/jobs/{}", id)).await?;
            assert_eq!(response.status(), StatusCode::OK);
            let job: ImportJob = serde_json::from_slice(&body_bytes(response).await?)?;
            if job.status.is_finished() {
                return Ok(job);
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        Err(format!("import job {} did not finish", id).into())
    }
}

pub async fn body_bytes(response: Response<Body>) -> TestResult<Vec<u8>> {
    Ok(to_bytes(response.into_body(), usize::MAX).await?.to_vec())
}

pub async fn body_json(response: Response<Body>) -> TestResult<serde_json::Value> {
    Ok(serde_json::from_slice(&body_bytes(response).await?)?)
}
