//! Project identity and indexing status, as reported by `get_status`.

use serde::{Deserialize, Serialize};

/// An indexed project as known to storage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub path: String,
    pub name: String,
}

/// Health and coverage snapshot returned by the `get_status` tool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectStatus {
    pub indexed: bool,
    pub path: String,
    pub message: Option<String>,
    pub project: Option<Project>,
    pub file_count: usize,
    pub chunk_count: usize,
    pub symbol_count: usize,
    pub last_indexed_at: Option<String>,
    pub healthy: bool,
}

impl ProjectStatus {
    /// Status for a path that has never been indexed
    pub fn not_indexed(path: impl Into<String>) -> Self {
        let path = path.into();
        Self {
            indexed: false,
            message: Some(format!("{path} has not been indexed")),
            path,
            project: None,
            file_count: 0,
            chunk_count: 0,
            symbol_count: 0,
            last_indexed_at: None,
            healthy: false,
        }
    }
}
