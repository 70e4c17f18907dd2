//! Error handling module
//!
//! Maps store and request failures onto HTTP responses of the form
//! `{"error": "..."}`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use journal_record_store::StoreError;
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::metrics;

#[derive(Debug, Error)]
pub enum JournalError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("{0}")]
    Internal(String),
}

impl JournalError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn http_status(&self) -> StatusCode {
        match self {
            JournalError::BadRequest(_) => StatusCode::BAD_REQUEST,
            JournalError::NotFound(_) => StatusCode::NOT_FOUND,
            JournalError::Store(err) if err.is_rejection() => StatusCode::BAD_REQUEST,
            JournalError::Store(err) if err.is_not_found() => StatusCode::NOT_FOUND,
            JournalError::Store(_) | JournalError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Short label used for the rejection counter.
    pub fn reason(&self) -> &'static str {
        match self {
            JournalError::BadRequest(_) => "bad_request",
            JournalError::NotFound(_) => "not_found",
            JournalError::Store(StoreError::EmptyReflection) => "empty_reflection",
            JournalError::Store(StoreError::InvalidScore) => "invalid_score",
            JournalError::Store(StoreError::IndexOutOfRange { .. }) => "index_out_of_range",
            JournalError::Store(StoreError::NotFound(_)) => "record_not_found",
            JournalError::Store(_) => "store_failure",
            JournalError::Internal(_) => "internal",
        }
    }
}

impl From<anyhow::Error> for JournalError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

impl IntoResponse for JournalError {
    fn into_response(self) -> Response {
        let status = self.http_status();
        if status.is_server_error() {
            error!(error = %self, "request failed");
        } else {
            metrics::record_rejection(self.reason());
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

pub type JournalResult<T> = Result<T, JournalError>;
