//! Crate-wide error type for gocontext
//!
//! Every component-local error enum (embeddings, storage, the MCP adapter)
//! converts into this type via `From`. Only the MCP layer maps these
//! variants onto JSON-RPC error codes; nothing else should assume a wire
//! format for errors.

use thiserror::Error;

/// Result type for gocontext operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for gocontext operations
#[derive(Error, Debug)]
pub enum Error {
    /// I/O related errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Embedding generation errors
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// Storage related errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// A referenced project was not found in the store
    #[error("Project not found: {0}")]
    ProjectNotFound(String),

    /// A project exists but has not been indexed
    #[error("Project not indexed: {0}")]
    NotIndexed(String),

    /// Invalid input supplied by a caller
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Query string was empty or whitespace-only
    #[error("Empty query")]
    EmptyQuery,

    /// Caller-requested cancellation fired
    #[error("Operation cancelled")]
    Cancelled,

    /// Any other error
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    /// Creates a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates an embedding error
    pub fn embedding(msg: impl Into<String>) -> Self {
        Self::Embedding(msg.into())
    }

    /// Creates a storage error
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// Creates an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }
}
