use axum::{
    extract::{rejection::JsonRejection, State},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use journal_record_store::{score_from_value, SnakeScore};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{error, instrument};

use super::reflections::parse_body;
use super::run_store;
use crate::errors::{JournalError, JournalResult};
use crate::metrics;
use crate::server::ServeState;

pub(crate) fn router() -> Router<ServeState> {
    Router::new().route(
        "/api/snake-scores",
        get(score_list_handler).post(score_create_handler),
    )
}

#[instrument(name = "journal.scores.list", skip(state))]
async fn score_list_handler(State(state): State<ServeState>) -> JournalResult<Json<Vec<SnakeScore>>> {
    let leaderboard = state.scores.clone();
    Ok(Json(run_store(move || leaderboard.list()).await?))
}

#[derive(Debug, Deserialize)]
struct ScoreCreateRequest {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    score: Value,
}

#[derive(Serialize)]
struct ScoreCreateResponse {
    success: bool,
    rank: Option<usize>,
}

#[instrument(name = "journal.scores.create", skip(state, payload))]
async fn score_create_handler(
    State(state): State<ServeState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Response {
    match record_score(&state, payload).await {
        Ok(rank) => Json(ScoreCreateResponse {
            success: true,
            rank,
        })
        .into_response(),
        Err(err) => score_failure(err),
    }
}

async fn record_score(
    state: &ServeState,
    payload: Result<Json<Value>, JsonRejection>,
) -> JournalResult<Option<usize>> {
    let payload: ScoreCreateRequest = parse_body(payload)?;
    let score = score_from_value(&payload.score)?;
    let leaderboard = state.scores.clone();
    run_store(move || leaderboard.add(payload.name.as_deref(), score)).await
}

/// Score failures keep the `success` flag the game client checks.
fn score_failure(err: JournalError) -> Response {
    let status = err.http_status();
    if status.is_server_error() {
        error!(error = %err, "failed to save snake score");
    } else {
        metrics::record_rejection(err.reason());
    }
    (
        status,
        Json(json!({ "success": false, "error": err.to_string() })),
    )
        .into_response()
}
