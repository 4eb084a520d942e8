//! API surface tests against an in-process router

use axum::http::StatusCode;
use axum_test::TestServer;
use chrono::Utc;
use sentrix::core::http::{create_router, AppState, HealthStatus};
use sentrix::metrics::Metrics;
use sentrix::models::position::{Direction, Position};
use sentrix::positions::store::{InMemoryPositionStore, PositionStore};
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;

fn state(position_store: Option<Arc<dyn PositionStore>>) -> AppState {
    AppState {
        health: Arc::new(RwLock::new(HealthStatus::default())),
        metrics: Arc::new(Metrics::new().unwrap()),
        start_time: Arc::new(Instant::now()),
        position_store,
        dispatcher: None,
        candidates: None,
    }
}

fn server(state: AppState) -> TestServer {
    TestServer::new(create_router(state)).unwrap()
}

#[tokio::test]
async fn test_health_endpoint_reports_service() {
    let server = server(state(None));
    let response = server.get("/health").await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "sentrix-supervision-engine");
    assert!(body["uptime_seconds"].is_number());
}

#[tokio::test]
async fn test_metrics_endpoint_exports_prometheus_text() {
    let server = server(state(None));
    let response = server.get("/metrics").await;
    response.assert_status_ok();
    assert!(response.text().contains("sentrix_"));
}

#[tokio::test]
async fn test_positions_unavailable_without_store() {
    let server = server(state(None));
    let response = server.get("/api/positions").await;
    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_positions_lists_open_positions() {
    let store = Arc::new(InMemoryPositionStore::new());
    let position = Position::open(
        0,
        "BTC-PERP".to_string(),
        Direction::Long,
        100.0,
        1.0,
        1.0,
        98.0,
        104.0,
        Utc::now(),
    );
    store.insert(&position).await.unwrap();

    let server = server(state(Some(store)));
    let response = server.get("/api/positions").await;
    response.assert_status_ok();

    let body: Value = response.json();
    let positions = body.as_array().unwrap();
    assert_eq!(positions.len(), 1);
    assert_eq!(positions[0]["symbol"], "BTC-PERP");
    assert_eq!(positions[0]["direction"], "long");
    assert_eq!(positions[0]["status"], "open");
}

#[tokio::test]
async fn test_close_all_unavailable_without_dispatcher() {
    let server = server(state(None));
    let response = server
        .post("/api/close-all")
        .json(&serde_json::json!({ "direction": "long" }))
        .await;
    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_candidates_unavailable_without_queue() {
    let server = server(state(None));
    let response = server
        .post("/api/candidates")
        .json(&serde_json::json!({
            "symbol": "BTC-PERP",
            "direction": "buy",
            "confidence": 0.8,
            "source": "telegram",
            "created_at": Utc::now()
        }))
        .await;
    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
}
