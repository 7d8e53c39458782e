use std::path::PathBuf;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use tower::ServiceExt;

use sharptracker::api::router::create_router;
use sharptracker::api::ws_types::WsMessage;
use sharptracker::config::{AppConfig, StoreBackend, WagerLimits};
use sharptracker::staging::SessionRegistry;
use sharptracker::store::{LedgerStore, MemoryStore};
use sharptracker::AppState;

#[allow(dead_code)]
pub fn test_config(api_token: Option<&str>) -> AppConfig {
    AppConfig {
        host: "127.0.0.1".into(),
        port: 0,
        api_token: api_token.map(String::from),
        store: StoreBackend::Memory,
        limits: WagerLimits::default(),
    }
}

/// Router over `store`, with the bearer gate enabled when `api_token` is set.
#[allow(dead_code)]
pub fn build_test_app(store: Arc<dyn LedgerStore>, api_token: Option<&str>) -> Router {
    let config = test_config(api_token);
    let (ws_tx, _) = tokio::sync::broadcast::channel::<WsMessage>(16);

    let state = AppState {
        sessions: Arc::new(SessionRegistry::new(store, config.limits.clone())),
        config,
        ws_tx,
        metrics_handle: sharptracker::metrics::detached_handle(),
    };

    create_router(state)
}

/// Fresh in-memory store plus an open router over it.
#[allow(dead_code)]
pub fn memory_app() -> (Router, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let app = build_test_app(store.clone(), None);
    (app, store)
}

#[allow(dead_code)]
pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[allow(dead_code)]
pub fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[allow(dead_code)]
pub fn post_empty(uri: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

/// Run one request and decode the JSON body.
#[allow(dead_code)]
pub async fn send(app: &Router, req: Request<Body>) -> (StatusCode, serde_json::Value) {
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let body = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let json = if body.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null)
    };
    (status, json)
}

#[allow(dead_code)]
pub fn decimal(v: &serde_json::Value) -> rust_decimal::Decimal {
    match v {
        serde_json::Value::String(s) => s.parse().unwrap(),
        other => other.to_string().parse().unwrap(),
    }
}

#[allow(dead_code)]
pub fn temp_data_dir() -> (tempfile::TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().to_path_buf();
    (dir, path)
}
