//! Error types for the MCP server, and their mapping onto JSON-RPC codes
//!
//! Custom codes per spec.md §7: -32001 (not found), -32002 (index in
//! progress), -32003 (not indexed), -32004 (empty query), layered over the
//! two reserved JSON-RPC codes -32602 (invalid params) and -32603
//! (internal error).

use rmcp::model::{ErrorCode, ErrorData};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, McpError>;

#[derive(Debug, Error)]
pub enum McpError {
    #[error("invalid path: {0}")]
    InvalidPath(String),

    #[error("empty query")]
    EmptyQuery,

    #[error("invalid parameter: {0}")]
    InvalidParams(String),

    #[error("project not found: {0}")]
    NotFound(String),

    #[error("an index is already in progress for {0}")]
    IndexInProgress(String),

    #[error("project not indexed: {0}")]
    NotIndexed(String),

    #[error("internal error: {0}")]
    Internal(String),

    #[error("transport error: {0}")]
    Transport(String),
}

impl From<gocontext_core::error::Error> for McpError {
    fn from(e: gocontext_core::error::Error) -> Self {
        use gocontext_core::error::Error;
        match e {
            Error::EmptyQuery => McpError::EmptyQuery,
            Error::InvalidInput(msg) => McpError::InvalidParams(msg),
            Error::ProjectNotFound(p) => McpError::NotFound(p),
            Error::NotIndexed(p) => McpError::NotIndexed(p),
            other => McpError::Internal(other.to_string()),
        }
    }
}

impl McpError {
    pub fn code(&self) -> i32 {
        match self {
            McpError::InvalidPath(_) | McpError::InvalidParams(_) => -32602,
            McpError::NotFound(_) => -32001,
            McpError::IndexInProgress(_) => -32002,
            McpError::NotIndexed(_) => -32003,
            McpError::EmptyQuery => -32004,
            McpError::Internal(_) | McpError::Transport(_) => -32603,
        }
    }
}

impl From<&McpError> for ErrorData {
    fn from(err: &McpError) -> Self {
        ErrorData {
            code: ErrorCode(err.code()),
            message: err.to_string().into(),
            data: None,
        }
    }
}

impl From<McpError> for ErrorData {
    fn from(err: McpError) -> Self {
        ErrorData::from(&err)
    }
}
