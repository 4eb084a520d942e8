//! HTTP endpoint server using Axum

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{Json, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{error, info, Level};

use crate::cache::RedisCache;
use crate::config::EngineConfig;
use crate::db::PgStore;
use crate::execution::RestExecutionProvider;
use crate::metrics::Metrics;
use crate::models::position::Direction;
use crate::models::signal::RawCandidate;
use crate::positions::dispatcher::DirectionalCloseDispatcher;
use crate::positions::store::PositionStore;
use crate::positions::supervisor::PositionSupervisor;
use crate::services::cache_provider::CacheMarketDataProvider;
use crate::signals::candidates::CandidateQueue;

#[derive(Clone)]
pub struct AppState {
    pub health: Arc<RwLock<HealthStatus>>,
    pub metrics: Arc<Metrics>,
    pub start_time: Arc<Instant>,
    pub position_store: Option<Arc<dyn PositionStore>>,
    pub dispatcher: Option<Arc<DirectionalCloseDispatcher>>,
    pub candidates: Option<Arc<CandidateQueue>>,
}

#[derive(Clone, Debug)]
pub struct HealthStatus {
    pub status: String,
}

impl Default for HealthStatus {
    fn default() -> Self {
        Self {
            status: "healthy".to_string(),
        }
    }
}

pub async fn health_check(State(state): State<AppState>) -> Result<Json<Value>, StatusCode> {
    let health = state.health.read().await;
    let uptime_seconds = state.start_time.elapsed().as_secs();
    Ok(Json(json!({
        "status": health.status,
        "uptime_seconds": uptime_seconds,
        "service": "sentrix-supervision-engine"
    })))
}

pub async fn metrics_handler(State(state): State<AppState>) -> Result<String, StatusCode> {
    state
        .metrics
        .export()
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}

/// Middleware to track HTTP request metrics
async fn metrics_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    state.metrics.http_requests_in_flight.inc();
    let response = next.run(request).await;
    let status = response.status();
    let duration = start.elapsed();
    state.metrics.http_requests_in_flight.dec();

    state.metrics.http_requests_total.inc();
    state
        .metrics
        .http_request_duration_seconds
        .observe(duration.as_secs_f64());

    if status.is_server_error() {
        tracing::error!(
            method = %method,
            path = %path,
            status = %status,
            duration_ms = duration.as_millis(),
            "HTTP request error"
        );
    }

    response
}

/// List open positions
async fn list_positions(State(state): State<AppState>) -> Result<Json<Value>, StatusCode> {
    let store = state
        .position_store
        .as_ref()
        .ok_or(StatusCode::SERVICE_UNAVAILABLE)?;

    let positions = store.list_open().await.map_err(|e| {
        error!(error = %e, "Failed to list open positions");
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    Ok(Json(json!(positions)))
}

#[derive(Debug, Deserialize)]
struct CloseAllRequest {
    direction: Direction,
}

/// Close every open position on one side of the book
async fn close_all(
    State(state): State<AppState>,
    Json(request): Json<CloseAllRequest>,
) -> Result<Json<Value>, StatusCode> {
    let dispatcher = state
        .dispatcher
        .as_ref()
        .ok_or(StatusCode::SERVICE_UNAVAILABLE)?;

    let report = dispatcher.close_all(request.direction).await.map_err(|e| {
        error!(error = %e, direction = request.direction.as_str(), "Close-all failed");
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    Ok(Json(json!(report)))
}

/// Accept an external signal candidate for the next evaluation cycle
async fn submit_candidate(
    State(state): State<AppState>,
    Json(candidate): Json<RawCandidate>,
) -> Result<StatusCode, StatusCode> {
    let queue = state
        .candidates
        .as_ref()
        .ok_or(StatusCode::SERVICE_UNAVAILABLE)?;

    queue.publish(&candidate).await.map_err(|e| {
        error!(error = %e, symbol = %candidate.symbol, "Failed to queue candidate");
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    Ok(StatusCode::ACCEPTED)
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_handler))
        .route("/api/positions", get(list_positions))
        .route("/api/close-all", post(close_all))
        .route("/api/candidates", post(submit_candidate))
        .layer(
            ServiceBuilder::new()
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(DefaultMakeSpan::new().level(Level::DEBUG))
                        .on_request(DefaultOnRequest::new().level(Level::DEBUG))
                        .on_response(DefaultOnResponse::new().level(Level::DEBUG)),
                )
                .layer(axum::middleware::from_fn_with_state(
                    state.clone(),
                    metrics_middleware,
                ))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

pub async fn start_server(port: u16) -> Result<(), Box<dyn std::error::Error>> {
    let metrics = Arc::new(Metrics::new()?);
    let start_time = Arc::new(Instant::now());
    let config = EngineConfig::from_env();

    // Position endpoints are optional: the API still serves health and
    // metrics when the database or cache is down.
    let position_store: Option<Arc<dyn PositionStore>> = match PgStore::new().await {
        Ok(db) => {
            info!("Postgres connected for API server");
            metrics.database_connected.set(1.0);
            Some(Arc::new(db))
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to connect to Postgres - position endpoints unavailable");
            metrics.database_connected.set(0.0);
            None
        }
    };

    let cache = match RedisCache::new().await {
        Ok(cache) => {
            metrics.cache_connected.set(1.0);
            Some(Arc::new(cache))
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to connect to Redis - candidate endpoint unavailable");
            metrics.cache_connected.set(0.0);
            None
        }
    };

    let candidates = cache
        .as_ref()
        .map(|cache| Arc::new(CandidateQueue::new(cache.clone(), config.freshness_window_secs)));

    let dispatcher = match (&position_store, &cache) {
        (Some(store), Some(cache)) => {
            let market_data = Arc::new(CacheMarketDataProvider::new(
                cache.clone(),
                crate::indicators::MIN_BARS + 50,
            ));
            let executor = Arc::new(RestExecutionProvider::new(
                crate::config::get_execution_url(),
            ));
            let supervisor = Arc::new(PositionSupervisor::new(
                store.clone(),
                market_data,
                executor,
                config.clone(),
                Some(metrics.clone()),
            ));
            Some(Arc::new(DirectionalCloseDispatcher::new(
                store.clone(),
                supervisor,
            )))
        }
        _ => None,
    };

    let state = AppState {
        health: Arc::new(RwLock::new(HealthStatus::default())),
        metrics: metrics.clone(),
        start_time: start_time.clone(),
        position_store,
        dispatcher,
        candidates,
    };
    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;

    info!(port = port, "HTTP server listening on port {}", port);
    info!(
        "Metrics endpoint available at http://0.0.0.0:{}/metrics",
        port
    );
    axum::serve(listener, app).await?;

    Ok(())
}
