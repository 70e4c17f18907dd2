use axum::{
    extract::State,
    http::{Method, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use chrono::Local;
use journal_record_store::StoreResult;
use serde_json::{json, Value};
use tokio::task;
use tower_http::cors::{Any, CorsLayer};

use crate::errors::{JournalError, JournalResult};
use crate::metrics;

mod pages;
mod reflections;
mod scores;

pub(crate) use pages::router as page_routes;
pub(crate) use reflections::router as reflection_routes;
pub(crate) use scores::router as score_routes;

use super::state::ServeState;

/// Pages, static assets, health and the JSON API, with the offline page as
/// the fallback for unknown paths.
pub fn build_journal_router() -> Router<ServeState> {
    journal_shell_router()
        .merge(build_api_router())
        .fallback(pages::not_found_handler)
}

pub fn journal_shell_router() -> Router<ServeState> {
    Router::new()
        .route("/health", get(health_handler))
        .route("/livez", get(live_handler))
        .route("/readyz", get(ready_handler))
        .route("/metrics", get(metrics_handler))
        .merge(page_routes())
}

pub fn build_api_router() -> Router<ServeState> {
    Router::new()
        .merge(reflection_routes())
        .merge(score_routes())
        .layer(cors_layer())
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers(Any)
}

/// Runs a store call on the blocking pool.
async fn run_store<T, F>(call: F) -> JournalResult<T>
where
    F: FnOnce() -> StoreResult<T> + Send + 'static,
    T: Send + 'static,
{
    task::spawn_blocking(call)
        .await
        .map_err(|err| JournalError::Internal(format!("store task failed: {err}")))?
        .map_err(JournalError::from)
}

async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": Local::now().to_rfc3339(),
    }))
}

async fn live_handler(State(state): State<ServeState>) -> impl IntoResponse {
    let snapshot = state.health_snapshot();
    let status = if snapshot.live {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (
        status,
        Json(json!({
            "live": snapshot.live,
            "ready": snapshot.ready,
        })),
    )
}

async fn ready_handler(State(state): State<ServeState>) -> impl IntoResponse {
    let snapshot = state.health_snapshot();
    let status = if snapshot.ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (
        status,
        Json(json!({
            "ready": snapshot.ready,
            "last_ready_check_ts": snapshot.last_ready_check,
            "last_error": snapshot.last_error,
        })),
    )
}

async fn metrics_handler() -> impl IntoResponse {
    metrics::render()
}
