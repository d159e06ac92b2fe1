//! IVR call records HTTP REST API
//!
//! Axum-based HTTP server exposing CRUD over the call record store.
//!
//! Architecture: each endpoint has a thin axum handler that delegates to a pure
//! inner function returning `(StatusCode, serde_json::Value)`. The inner
//! functions are directly testable without axum dispatch machinery.
//!
//! Endpoints:
//! - GET    /calls      — list every record
//! - GET    /calls/:id  — one record
//! - POST   /calls      — create (duplicate id → 400)
//! - PUT    /calls/:id  — upsert (id mismatch → 400)
//! - PATCH  /calls/:id  — partial update
//! - DELETE /calls/:id  — delete
//! - GET    /health     — store reachability
//! - GET    /version    — server version info

use std::sync::Arc;

use anyhow::Result;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use ivr_core::{CallRecord, CallStore, CallUpdate, IvrConfig};
use serde::Serialize;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::trace::TraceLayer;

use crate::calls::{self, CallError};

/// Shared state for all HTTP handlers
#[derive(Clone)]
pub struct HttpState {
    pub store: Arc<dyn CallStore>,
}

/// Build the Axum router with all endpoints
pub fn build_router(state: Arc<HttpState>) -> Router {
    Router::new()
        .route("/calls", get(list_handler).post(create_handler))
        .route(
            "/calls/:id",
            get(get_handler)
                .put(upsert_handler)
                .patch(patch_handler)
                .delete(delete_handler),
        )
        .route("/health", get(health_handler))
        .route("/version", get(version_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the HTTP server on the configured address.
/// Gracefully shuts down when the broadcast shutdown signal fires.
pub async fn start_http_server(
    store: Arc<dyn CallStore>,
    config: IvrConfig,
    mut shutdown: broadcast::Receiver<()>,
) -> Result<()> {
    let addr = format!("{}:{}", config.http.host, config.http.port);
    let state = Arc::new(HttpState { store });

    let app = build_router(state);
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("IVR call API listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = shutdown.recv().await;
            tracing::info!("HTTP server shutting down...");
        })
        .await?;

    Ok(())
}

// ============================================================================
// Error responses
// ============================================================================

/// Standard HTTP error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub detail: String,
    pub status: String,
}

impl ErrorResponse {
    pub fn new(msg: impl Into<String>) -> Self {
        Self {
            detail: msg.into(),
            status: "error".to_string(),
        }
    }
}

/// Map an operation failure onto its HTTP status and JSON body.
pub fn error_to_http(err: &CallError) -> (StatusCode, serde_json::Value) {
    let status = match err {
        CallError::NotFound(_) => StatusCode::NOT_FOUND,
        CallError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        CallError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        CallError::Store(e) => {
            tracing::error!("Store failure: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (status, error_body(err.to_string()))
}

fn error_body(msg: impl Into<String>) -> serde_json::Value {
    serde_json::to_value(ErrorResponse::new(msg)).unwrap_or_default()
}

/// Rejected path: a non-integer id is a validation failure.
fn path_rejection(rejection: PathRejection) -> (StatusCode, serde_json::Value) {
    (StatusCode::UNPROCESSABLE_ENTITY, error_body(rejection.body_text()))
}

/// Rejected body: keep axum's status (400 syntax, 415 content type, 422 shape).
fn json_rejection(rejection: JsonRejection) -> (StatusCode, serde_json::Value) {
    (rejection.status(), error_body(rejection.body_text()))
}

fn to_http<T: Serialize>(result: Result<T, CallError>) -> (StatusCode, serde_json::Value) {
    match result {
        Ok(body) => match serde_json::to_value(body) {
            Ok(v) => (StatusCode::OK, v),
            Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, error_body(e.to_string())),
        },
        Err(e) => error_to_http(&e),
    }
}

// ============================================================================
// Inner (directly testable) business logic functions
// ============================================================================

pub async fn list_inner(store: &dyn CallStore) -> (StatusCode, serde_json::Value) {
    to_http(calls::list_calls(store).await)
}

pub async fn get_inner(store: &dyn CallStore, call_id: i64) -> (StatusCode, serde_json::Value) {
    to_http(calls::get_call(store, call_id).await)
}

pub async fn create_inner(
    store: &dyn CallStore,
    record: CallRecord,
) -> (StatusCode, serde_json::Value) {
    to_http(calls::create_call(store, record).await)
}

pub async fn upsert_inner(
    store: &dyn CallStore,
    call_id: i64,
    record: CallRecord,
) -> (StatusCode, serde_json::Value) {
    to_http(calls::upsert_call(store, call_id, record).await)
}

pub async fn patch_inner(
    store: &dyn CallStore,
    call_id: i64,
    update: CallUpdate,
) -> (StatusCode, serde_json::Value) {
    to_http(calls::patch_call(store, call_id, update).await)
}

pub async fn delete_inner(store: &dyn CallStore, call_id: i64) -> (StatusCode, serde_json::Value) {
    to_http(calls::delete_call(store, call_id).await)
}

/// Inner health check — loads the store and reports its size.
pub async fn health_inner(store: &dyn CallStore) -> (StatusCode, serde_json::Value) {
    match store.load().await {
        Ok(table) => (
            StatusCode::OK,
            serde_json::json!({
                "status": "healthy",
                "version": env!("CARGO_PKG_VERSION"),
                "store": store.describe(),
                "records": table.len(),
            }),
        ),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            serde_json::json!({
                "status": "unhealthy",
                "store": store.describe(),
                "error": e.to_string(),
            }),
        ),
    }
}

/// Inner version — returns version info (pure, no IO).
pub fn version_inner() -> serde_json::Value {
    serde_json::json!({
        "version": env!("CARGO_PKG_VERSION"),
        "service": "ivr-calls",
    })
}

// ============================================================================
// Axum handler wrappers (thin — delegate to inner functions)
// ============================================================================

pub async fn list_handler(State(state): State<Arc<HttpState>>) -> impl IntoResponse {
    let (status, body) = list_inner(state.store.as_ref()).await;
    (status, Json(body))
}

pub async fn get_handler(
    State(state): State<Arc<HttpState>>,
    id: Result<Path<i64>, PathRejection>,
) -> impl IntoResponse {
    let (status, body) = match id {
        Ok(Path(id)) => get_inner(state.store.as_ref(), id).await,
        Err(rejection) => path_rejection(rejection),
    };
    (status, Json(body))
}

pub async fn create_handler(
    State(state): State<Arc<HttpState>>,
    record: Result<Json<CallRecord>, JsonRejection>,
) -> impl IntoResponse {
    let (status, body) = match record {
        Ok(Json(record)) => create_inner(state.store.as_ref(), record).await,
        Err(rejection) => json_rejection(rejection),
    };
    (status, Json(body))
}

pub async fn upsert_handler(
    State(state): State<Arc<HttpState>>,
    id: Result<Path<i64>, PathRejection>,
    record: Result<Json<CallRecord>, JsonRejection>,
) -> impl IntoResponse {
    let (status, body) = match (id, record) {
        (Err(rejection), _) => path_rejection(rejection),
        (_, Err(rejection)) => json_rejection(rejection),
        (Ok(Path(id)), Ok(Json(record))) => upsert_inner(state.store.as_ref(), id, record).await,
    };
    (status, Json(body))
}

pub async fn patch_handler(
    State(state): State<Arc<HttpState>>,
    id: Result<Path<i64>, PathRejection>,
    update: Result<Json<CallUpdate>, JsonRejection>,
) -> impl IntoResponse {
    let (status, body) = match (id, update) {
        (Err(rejection), _) => path_rejection(rejection),
        (_, Err(rejection)) => json_rejection(rejection),
        (Ok(Path(id)), Ok(Json(update))) => patch_inner(state.store.as_ref(), id, update).await,
    };
    (status, Json(body))
}

pub async fn delete_handler(
    State(state): State<Arc<HttpState>>,
    id: Result<Path<i64>, PathRejection>,
) -> impl IntoResponse {
    let (status, body) = match id {
        Ok(Path(id)) => delete_inner(state.store.as_ref(), id).await,
        Err(rejection) => path_rejection(rejection),
    };
    (status, Json(body))
}

pub async fn health_handler(State(state): State<Arc<HttpState>>) -> impl IntoResponse {
    let (status, body) = health_inner(state.store.as_ref()).await;
    (status, Json(body))
}

pub async fn version_handler() -> impl IntoResponse {
    (StatusCode::OK, Json(version_inner()))
}

// ============================================================================
// Unit Tests — call inner functions directly
// ============================================================================
