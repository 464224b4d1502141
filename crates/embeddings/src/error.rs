//! Embedding-provider error type

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EmbeddingError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("provider returned an error response: {0}")]
    Provider(String),

    #[error("rate limited by provider")]
    RateLimited,

    #[error("request timed out")]
    Timeout,

    #[error("invalid API key for provider {0}")]
    InvalidApiKey(String),

    #[error("unsupported provider: {0}")]
    UnknownProvider(String),

    #[error("{0}")]
    InvalidInput(String),

    #[error("operation cancelled")]
    Cancelled,
}

impl From<EmbeddingError> for gocontext_core::error::Error {
    fn from(e: EmbeddingError) -> Self {
        gocontext_core::error::Error::embedding(e.to_string())
    }
}
