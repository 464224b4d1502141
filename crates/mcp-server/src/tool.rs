//! MCP tool input schemas
//!
//! One input type per tool exposed by [`crate::server::GocontextMcpServer`],
//! following the teacher's pattern of a dedicated `#[derive(JsonSchema)]`
//! struct per tool in `tool.rs`.

use schemars::JsonSchema;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct IndexCodebaseInput {
    /// Absolute path to the project root to index
    #[schemars(description = "Absolute path to the project root to index")]
    pub path: String,

    /// Re-index even if the project already has an index
    #[schemars(description = "Re-index even if already indexed")]
    pub force_reindex: Option<bool>,

    /// Include test files in the index (default true)
    #[schemars(description = "Include test files")]
    pub include_tests: Option<bool>,

    /// Include vendored dependencies in the index (default false)
    #[schemars(description = "Include vendored dependencies")]
    pub include_vendor: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct SearchFiltersInput {
    pub symbol_kinds: Option<Vec<String>>,
    pub file_path_glob: Option<String>,
    pub domain_patterns: Option<Vec<String>>,
    pub packages: Option<Vec<String>>,
    pub min_relevance: Option<f32>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct SearchCodeInput {
    /// Absolute path to the indexed project root
    #[schemars(description = "Absolute path to the indexed project root")]
    pub path: String,

    /// Natural-language or keyword search query
    #[schemars(description = "Search query")]
    pub query: String,

    /// Maximum number of results (default 10, capped at 100)
    #[schemars(description = "Maximum number of results")]
    pub limit: Option<usize>,

    /// One of "hybrid" (default), "vector", or "keyword"
    #[schemars(description = "Search mode: hybrid, vector, or keyword")]
    pub search_mode: Option<String>,

    /// Optional narrowing filters
    #[schemars(description = "Optional narrowing filters")]
    pub filters: Option<SearchFiltersInput>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct GetStatusInput {
    /// Absolute path to the project root
    #[schemars(description = "Absolute path to the project root")]
    pub path: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_code_minimal_input_deserializes() {
        let json = r#"{"path": "/repo", "query": "handler"}"#;
        let input: SearchCodeInput = serde_json::from_str(json).unwrap();
        assert_eq!(input.path, "/repo");
        assert_eq!(input.query, "handler");
        assert!(input.limit.is_none());
        assert!(input.filters.is_none());
    }

    #[test]
    fn search_code_full_input_deserializes() {
        let json = r#"{
            "path": "/repo",
            "query": "handler",
            "limit": 5,
            "search_mode": "vector",
            "filters": {"min_relevance": 0.5}
        }"#;
        let input: SearchCodeInput = serde_json::from_str(json).unwrap();
        assert_eq!(input.limit, Some(5));
        assert_eq!(input.search_mode.as_deref(), Some("vector"));
        assert_eq!(input.filters.unwrap().min_relevance, Some(0.5));
    }

    #[test]
    fn index_codebase_defaults_are_optional() {
        let json = r#"{"path": "/repo"}"#;
        let input: IndexCodebaseInput = serde_json::from_str(json).unwrap();
        assert!(input.force_reindex.is_none());
        assert!(input.include_tests.is_none());
    }
}
