//! Storage backend error type

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("project not found: {0}")]
    ProjectNotFound(String),

    #[error("chunk not found: {0}")]
    ChunkNotFound(String),

    #[error("backend error: {0}")]
    Backend(String),

    #[error("an index is already in progress for project {0}")]
    IndexInProgress(String),
}

impl From<StorageError> for gocontext_core::error::Error {
    fn from(e: StorageError) -> Self {
        match e {
            StorageError::ProjectNotFound(p) => gocontext_core::error::Error::ProjectNotFound(p),
            other => gocontext_core::error::Error::storage(other.to_string()),
        }
    }
}
