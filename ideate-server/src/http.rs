//! Ideate HTTP REST API
//!
//! Axum-based HTTP server exposing the ideation stages and saved sessions.
//!
//! Architecture: each endpoint has a thin axum handler that delegates to a pure
//! inner function. The inner functions are directly testable without axum dispatch
//! machinery.
//!
//! Endpoints:
//! - POST /ideate/start     - summarize a raw idea
//! - POST /ideate/enrich    - list missing context for a summary
//! - POST /ideate/draft     - draft subdomains + requirements
//! - POST /ideate/refine    - improve one requirement's text
//! - POST /ideate/save      - persist a finished session
//! - GET  /ideate/list      - list saved sessions
//! - GET  /ideate/load/:id  - load one saved session
//! - GET  /health           - health check with store status
//! - GET  /version          - server version info

use std::sync::Arc;

use anyhow::Result;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use ideate_core::{
    CompletionClient, IdeateConfig, IdeateError, NewConversation, Requirement, SessionStore,
};
use serde::Deserialize;
use tokio::net::TcpListener;
use tokio::sync::broadcast;

use crate::subsystems::{sessions, workflow};

/// Shared state for all HTTP handlers
#[derive(Clone)]
pub struct HttpState {
    pub completion: Arc<dyn CompletionClient>,
    pub store: Arc<dyn SessionStore>,
}

/// Build the Axum router with all endpoints
pub fn build_router(state: Arc<HttpState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/version", get(version_handler))
        .route("/ideate/start", post(start_handler))
        .route("/ideate/enrich", post(enrich_handler))
        .route("/ideate/draft", post(draft_handler))
        .route("/ideate/refine", post(refine_handler))
        .route("/ideate/save", post(save_handler))
        .route("/ideate/list", get(list_handler))
        .route("/ideate/load/:id", get(load_handler))
        .with_state(state)
}

/// Start the HTTP server on the configured address.
/// Gracefully shuts down when the broadcast shutdown signal fires.
pub async fn start_http_server(
    state: Arc<HttpState>,
    config: &IdeateConfig,
    mut shutdown: broadcast::Receiver<()>,
) -> Result<()> {
    let addr = format!("{}:{}", config.http.host, config.http.port);

    let app = build_router(state);
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("Ideate HTTP API listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = shutdown.recv().await;
            tracing::info!("HTTP server shutting down...");
        })
        .await?;

    Ok(())
}

// ============================================================================
// Request DTOs
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct StartRequest {
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct EnrichRequest {
    pub summary: String,
}

#[derive(Debug, Deserialize)]
pub struct DraftRequest {
    pub summary: String,
    pub context: String,
}

/// Refine takes a single requirement as-is.
pub type RefineRequest = Requirement;

/// Save takes the full conversation payload.
pub type SaveRequest = NewConversation;

// ============================================================================
// Inner (directly testable) business logic functions
// ============================================================================

/// Map an operation error to its HTTP status and error body.
pub fn error_to_http(err: &IdeateError) -> (StatusCode, serde_json::Value) {
    let status = match err {
        IdeateError::NotFound(_) => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };

    let mut body = serde_json::json!({
        "error": err.to_string(),
        "kind": err.kind(),
        "status": "error",
    });
    if let (Some(raw), Some(obj)) = (err.raw_output(), body.as_object_mut()) {
        obj.insert("raw".to_string(), serde_json::json!(raw));
    }

    (status, body)
}

fn respond<T: serde::Serialize>(result: Result<T, IdeateError>) -> (StatusCode, serde_json::Value) {
    match result.and_then(|v| {
        serde_json::to_value(v).map_err(|e| IdeateError::Other(e.to_string()))
    }) {
        Ok(body) => (StatusCode::OK, body),
        Err(e) => error_to_http(&e),
    }
}

/// Inner health check - asks the store and returns (status_code, json_body).
pub async fn health_inner(store: &dyn SessionStore) -> (StatusCode, serde_json::Value) {
    match store.health().await {
        Ok(engine) => (
            StatusCode::OK,
            serde_json::json!({
                "status": "healthy",
                "version": env!("CARGO_PKG_VERSION"),
                "store": store.name(),
                "engine": engine,
            }),
        ),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            serde_json::json!({
                "status": "unhealthy",
                "error": e.to_string(),
            }),
        ),
    }
}

/// Inner version - returns version info (pure, no IO).
pub fn version_inner() -> serde_json::Value {
    serde_json::json!({
        "version": env!("CARGO_PKG_VERSION"),
        "protocol": "ideate/1",
    })
}

pub async fn start_inner(
    client: &dyn CompletionClient,
    req: StartRequest,
) -> (StatusCode, serde_json::Value) {
    respond(
        workflow::summarize(client, &req.text)
            .await
            .map(|summary| serde_json::json!({ "summary": summary })),
    )
}

pub async fn enrich_inner(
    client: &dyn CompletionClient,
    req: EnrichRequest,
) -> (StatusCode, serde_json::Value) {
    respond(
        workflow::enrich(client, &req.summary)
            .await
            .map(|context| serde_json::json!({ "context": context })),
    )
}

pub async fn draft_inner(
    client: &dyn CompletionClient,
    req: DraftRequest,
) -> (StatusCode, serde_json::Value) {
    respond(workflow::draft(client, &req.summary, &req.context).await)
}

pub async fn refine_inner(
    client: &dyn CompletionClient,
    req: RefineRequest,
) -> (StatusCode, serde_json::Value) {
    respond(workflow::refine(client, req).await)
}

pub async fn save_inner(
    store: &dyn SessionStore,
    req: SaveRequest,
) -> (StatusCode, serde_json::Value) {
    respond(
        sessions::save(store, req)
            .await
            .map(|id| serde_json::json!({ "id": id })),
    )
}

pub async fn list_inner(store: &dyn SessionStore) -> (StatusCode, serde_json::Value) {
    respond(sessions::list(store).await)
}

pub async fn load_inner(store: &dyn SessionStore, id: i64) -> (StatusCode, serde_json::Value) {
    respond(sessions::load(store, id).await)
}

// ============================================================================
// Axum handler wrappers (thin - delegate to inner functions)
// ============================================================================

pub async fn health_handler(State(state): State<Arc<HttpState>>) -> impl IntoResponse {
    let (status, body) = health_inner(state.store.as_ref()).await;
    (status, Json(body))
}

pub async fn version_handler() -> impl IntoResponse {
    (StatusCode::OK, Json(version_inner()))
}

pub async fn start_handler(
    State(state): State<Arc<HttpState>>,
    Json(req): Json<StartRequest>,
) -> impl IntoResponse {
    let (status, body) = start_inner(state.completion.as_ref(), req).await;
    (status, Json(body))
}

pub async fn enrich_handler(
    State(state): State<Arc<HttpState>>,
    Json(req): Json<EnrichRequest>,
) -> impl IntoResponse {
    let (status, body) = enrich_inner(state.completion.as_ref(), req).await;
    (status, Json(body))
}

pub async fn draft_handler(
    State(state): State<Arc<HttpState>>,
    Json(req): Json<DraftRequest>,
) -> impl IntoResponse {
    let (status, body) = draft_inner(state.completion.as_ref(), req).await;
    (status, Json(body))
}

pub async fn refine_handler(
    State(state): State<Arc<HttpState>>,
    Json(req): Json<RefineRequest>,
) -> impl IntoResponse {
    let (status, body) = refine_inner(state.completion.as_ref(), req).await;
    (status, Json(body))
}

pub async fn save_handler(
    State(state): State<Arc<HttpState>>,
    Json(req): Json<SaveRequest>,
) -> impl IntoResponse {
    let (status, body) = save_inner(state.store.as_ref(), req).await;
    (status, Json(body))
}

pub async fn list_handler(State(state): State<Arc<HttpState>>) -> impl IntoResponse {
    let (status, body) = list_inner(state.store.as_ref()).await;
    (status, Json(body))
}

pub async fn load_handler(
    State(state): State<Arc<HttpState>>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    let (status, body) = load_inner(state.store.as_ref(), id).await;
    (status, Json(body))
}

// ============================================================================
// Unit Tests - call inner functions directly
// ============================================================================
