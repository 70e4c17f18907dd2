use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io failure on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{path} is not a valid JSON collection: {reason}")]
    Corrupt { path: PathBuf, reason: String },
    #[error("failed to serialize collection: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("Reflection content cannot be empty")]
    EmptyReflection,
    #[error("Index out of range")]
    IndexOutOfRange { index: i64, len: usize },
    #[error("record {0} not found")]
    NotFound(String),
    #[error("score must be a number")]
    InvalidScore,
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// True for errors caused by caller input rather than the backing file.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            StoreError::EmptyReflection | StoreError::InvalidScore
        )
    }

    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            StoreError::IndexOutOfRange { .. } | StoreError::NotFound(_)
        )
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
