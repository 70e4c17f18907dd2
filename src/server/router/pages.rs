use std::path::Path as FsPath;

use axum::{
    extract::{Path, Request, State},
    http::{header, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;
use tower::ServiceExt;
use tower_http::services::ServeDir;
use tracing::{debug, warn};

use crate::server::ServeState;

const JAVASCRIPT: &str = "application/javascript";
const JSON: &str = "application/json";

pub(crate) fn router() -> Router<ServeState> {
    Router::new()
        .route("/", get(|state: State<ServeState>| template(state, "index.html")))
        .route("/journal", get(|state: State<ServeState>| template(state, "journal.html")))
        .route("/about", get(|state: State<ServeState>| template(state, "about.html")))
        .route("/projects", get(|state: State<ServeState>| template(state, "projects.html")))
        .route("/offline", get(|state: State<ServeState>| template(state, "offline.html")))
        .route("/sw.js", get(service_worker_handler))
        .route("/manifest.json", get(manifest_handler))
        .route("/static/*path", get(static_asset_handler))
}

async fn template(State(state): State<ServeState>, name: &'static str) -> Response {
    let path = state.templates_dir().join(name);
    match tokio::fs::read_to_string(&path).await {
        Ok(body) => Html(body).into_response(),
        Err(err) => {
            warn!(page = name, ?err, "page template unavailable");
            offline_response(&state).await
        }
    }
}

async fn service_worker_handler(State(state): State<ServeState>) -> Response {
    let path = state.static_dir().join("js").join("sw.js");
    file_response(&state, &path, JAVASCRIPT).await
}

async fn manifest_handler(State(state): State<ServeState>) -> Response {
    let path = state.static_dir().join("manifest.json");
    file_response(&state, &path, JSON).await
}

async fn static_asset_handler(
    State(state): State<ServeState>,
    Path(path): Path<String>,
    request: Request,
) -> Response {
    // The live leaderboard doubles as a static fallback for offline clients.
    if path == "snake_scores.json" {
        let scores = state.scores.store().path().to_path_buf();
        return file_response(&state, &scores, JSON).await;
    }

    let response = match ServeDir::new(&state.site_dir).oneshot(request).await {
        Ok(response) => response,
        Err(never) => match never {},
    };
    if response.status() == StatusCode::NOT_FOUND {
        debug!(%path, "static asset not found");
        return offline_response(&state).await;
    }
    response.into_response()
}

async fn file_response(state: &ServeState, path: &FsPath, content_type: &'static str) -> Response {
    match tokio::fs::read(path).await {
        Ok(bytes) => (
            [(header::CONTENT_TYPE, HeaderValue::from_static(content_type))],
            bytes,
        )
            .into_response(),
        Err(err) => {
            debug!(path = %path.display(), ?err, "file unavailable");
            offline_response(state).await
        }
    }
}

pub(crate) async fn not_found_handler(State(state): State<ServeState>) -> Response {
    offline_response(&state).await
}

/// The offline page with a 404 status, or a JSON error when it is missing.
async fn offline_response(state: &ServeState) -> Response {
    let path = state.templates_dir().join("offline.html");
    match tokio::fs::read_to_string(&path).await {
        Ok(body) => (StatusCode::NOT_FOUND, Html(body)).into_response(),
        Err(_) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "Not found" })),
        )
            .into_response(),
    }
}
