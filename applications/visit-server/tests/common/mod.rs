/// Common test utilities and fixtures
use async_trait::async_trait;
use axum::{body::Body, http::Request, Router};
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tower::util::ServiceExt;
use visit_server::{
    api, AppState, MemoryVisitStore, Result, ServerError, VisitStore,
};

/// Memory store whose reads and writes can be made to fail
#[derive(Default)]
pub struct FlakyStore {
    inner: MemoryVisitStore,
    pub fail_reads: AtomicBool,
    pub fail_writes: AtomicBool,
}

impl FlakyStore {
    fn check(&self, flag: &AtomicBool, what: &str) -> Result<()> {
        if flag.load(Ordering::SeqCst) {
            Err(ServerError::Store(format!("{what} unavailable")))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl VisitStore for FlakyStore {
    async fn count(&self) -> Result<u64> {
        self.check(&self.fail_reads, "read")?;
        self.inner.count().await
    }

    async fn is_known(&self, visitor: &str) -> Result<bool> {
        self.check(&self.fail_reads, "read")?;
        self.inner.is_known(visitor).await
    }

    async fn record(&self, visitor: &str) -> Result<u64> {
        self.check(&self.fail_writes, "write")?;
        self.inner.record(visitor).await
    }
}

/// Router over a fresh flaky store
pub fn create_test_app() -> (Router, Arc<FlakyStore>) {
    let store = Arc::new(FlakyStore::default());
    let app = api::router(AppState::new(store.clone()));
    (app, store)
}

/// Send one request and decode the JSON reply
pub async fn send(app: &Router, request: Request<Body>) -> (axum::http::StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&body_bytes).unwrap();
    (status, body)
}

pub fn visit_from(ip: &str) -> Request<Body> {
    Request::builder()
        .uri("/api/visits")
        .method("POST")
        .header("x-forwarded-for", ip)
        .body(Body::empty())
        .unwrap()
}

pub fn read_count() -> Request<Body> {
    Request::builder()
        .uri("/api/visits?op=get")
        .body(Body::empty())
        .unwrap()
}
