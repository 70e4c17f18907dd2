use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get},
    Json, Router,
};
use journal_record_store::Reflection;
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::Value;
use tracing::instrument;
use uuid::Uuid;

use super::run_store;
use crate::errors::{JournalError, JournalResult};
use crate::server::ServeState;

const NO_DATA: &str = "No data provided";

pub(crate) fn router() -> Router<ServeState> {
    Router::new()
        .route(
            "/api/reflections",
            get(reflection_list_handler).post(reflection_create_handler),
        )
        .route(
            "/api/reflections/by-id/:id",
            delete(reflection_delete_by_id_handler),
        )
        .route(
            "/api/reflections/:index",
            delete(reflection_delete_handler),
        )
}

#[instrument(name = "journal.reflections.list", skip(state))]
async fn reflection_list_handler(
    State(state): State<ServeState>,
) -> JournalResult<Json<Vec<Reflection>>> {
    let book = state.reflections.clone();
    Ok(Json(run_store(move || book.list()).await?))
}

#[derive(Debug, Deserialize)]
struct ReflectionCreateRequest {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    reflection: Option<String>,
}

#[instrument(name = "journal.reflections.create", skip(state, payload))]
async fn reflection_create_handler(
    State(state): State<ServeState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> JournalResult<impl IntoResponse> {
    let payload: ReflectionCreateRequest = parse_body(payload)?;
    let book = state.reflections.clone();
    let stored = run_store(move || {
        book.add(
            payload.name.as_deref(),
            payload.reflection.as_deref().unwrap_or_default(),
        )
    })
    .await?;
    Ok((StatusCode::CREATED, Json(stored)))
}

#[instrument(name = "journal.reflections.delete", skip(state))]
async fn reflection_delete_handler(
    State(state): State<ServeState>,
    Path(index): Path<String>,
) -> JournalResult<Json<Reflection>> {
    let index: i64 = index
        .trim()
        .parse()
        .map_err(|_| JournalError::not_found("Index out of range"))?;
    let book = state.reflections.clone();
    Ok(Json(run_store(move || book.delete(index)).await?))
}

#[instrument(name = "journal.reflections.delete_by_id", skip(state))]
async fn reflection_delete_by_id_handler(
    State(state): State<ServeState>,
    Path(id): Path<String>,
) -> JournalResult<Json<Reflection>> {
    let id = Uuid::parse_str(id.trim())
        .map_err(|_| JournalError::not_found(format!("record {id} not found")))?;
    let book = state.reflections.clone();
    Ok(Json(run_store(move || book.delete_by_id(id)).await?))
}

/// Decodes a JSON body; a missing, null or empty body counts as no data.
pub(super) fn parse_body<T: DeserializeOwned>(
    payload: Result<Json<Value>, JsonRejection>,
) -> JournalResult<T> {
    let Json(value) = payload.map_err(reject_body)?;
    let empty = match &value {
        Value::Null => true,
        Value::Object(fields) => fields.is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    };
    if empty {
        return Err(JournalError::bad_request(NO_DATA));
    }
    serde_json::from_value(value).map_err(|err| JournalError::bad_request(err.to_string()))
}

fn reject_body(rejection: JsonRejection) -> JournalError {
    match rejection {
        JsonRejection::MissingJsonContentType(_) => JournalError::bad_request(NO_DATA),
        other => JournalError::bad_request(other.body_text()),
    }
}
