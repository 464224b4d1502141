//! Search request/response data model shared by the search executor and
//! the MCP protocol adapter.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default result page size
pub const DEFAULT_LIMIT: usize = 10;
/// Hard cap on result page size
pub const MAX_LIMIT: usize = 100;
/// Default RRF constant
pub const DEFAULT_RRF_K: usize = 60;
/// Default query-cache TTL
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(3600);

/// Which retrieval strategy a search request should use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    Hybrid,
    Vector,
    Keyword,
}

impl Default for SearchMode {
    fn default() -> Self {
        Self::Hybrid
    }
}

impl SearchMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hybrid => "hybrid",
            Self::Vector => "vector",
            Self::Keyword => "keyword",
        }
    }

    /// Parse a mode string case-insensitively; empty string maps to hybrid.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "" | "hybrid" => Some(Self::Hybrid),
            "vector" => Some(Self::Vector),
            "keyword" => Some(Self::Keyword),
            _ => None,
        }
    }
}

/// Symbol kinds that may be requested in search filters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SymbolKind {
    Function,
    Method,
    Struct,
    Interface,
    Type,
    Const,
    Var,
}

impl SymbolKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "function" => Some(Self::Function),
            "method" => Some(Self::Method),
            "struct" => Some(Self::Struct),
            "interface" => Some(Self::Interface),
            "type" => Some(Self::Type),
            "const" => Some(Self::Const),
            "var" => Some(Self::Var),
            _ => None,
        }
    }
}

/// Domain-classification tags attached to symbols at index time, used only
/// as a filter here (the indexer that produces them is out of scope).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DomainPattern {
    Repository,
    Aggregate,
    Entity,
    ValueObject,
    DomainService,
    Factory,
    Controller,
}

impl DomainPattern {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().replace(['-', ' '], "_").as_str() {
            "repository" => Some(Self::Repository),
            "aggregate" => Some(Self::Aggregate),
            "entity" => Some(Self::Entity),
            "value_object" => Some(Self::ValueObject),
            "domain_service" => Some(Self::DomainService),
            "factory" => Some(Self::Factory),
            "controller" => Some(Self::Controller),
            _ => None,
        }
    }
}

/// Narrowing filters applied by both the vector and keyword branches
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchFilters {
    pub symbol_kinds: Option<Vec<SymbolKind>>,
    pub file_path_glob: Option<String>,
    pub domain_patterns: Option<Vec<DomainPattern>>,
    pub packages: Option<Vec<String>>,
    pub min_relevance: Option<f32>,
}

/// A search request as seen by the executor, after adapter-level parsing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    pub project_id: String,
    pub limit: usize,
    pub mode: SearchMode,
    pub filters: Option<SearchFilters>,
    pub use_cache: bool,
    #[serde(with = "duration_secs")]
    pub cache_ttl: Duration,
    pub rrf_k: usize,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>, project_id: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            project_id: project_id.into(),
            limit: DEFAULT_LIMIT,
            mode: SearchMode::Hybrid,
            filters: None,
            use_cache: false,
            cache_ttl: DEFAULT_CACHE_TTL,
            rrf_k: DEFAULT_RRF_K,
        }
    }
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let secs = u64::deserialize(d)?;
        Ok(Duration::from_secs(secs))
    }
}

/// File location information attached to a hydrated result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileInfo {
    pub path: String,
    pub package: Option<String>,
    pub start_line: usize,
    pub end_line: usize,
}

/// Symbol information attached to a hydrated result, when available
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymbolInfo {
    pub name: String,
    pub kind: SymbolKind,
    pub signature: Option<String>,
}

/// A single ranked, hydrated search result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub chunk_id: String,
    pub rank: usize,
    pub relevance_score: f32,
    pub content: String,
    pub context: String,
    pub file: FileInfo,
    pub symbol: Option<SymbolInfo>,
}

/// Full search response returned to the protocol adapter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    pub results: Vec<SearchResult>,
    pub total: usize,
    pub mode: SearchMode,
    pub duration_ms: u64,
    pub cache_hit: bool,
    pub vector_results: usize,
    pub text_results: usize,
}

/// Internal (chunk id, score, rank) tuple used between storage search and
/// RRF fusion, before hydration.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedTuple {
    pub chunk_id: String,
    pub score: f32,
    pub rank: usize,
}

/// Normalize a request in place per spec.md §4.6 `validateRequest`.
///
/// Returns an error only for an empty/whitespace-only query; every other
/// field is clamped or defaulted rather than rejected.
pub fn validate_request(req: &mut SearchRequest) -> crate::error::Result<()> {
    if req.query.trim().is_empty() {
        return Err(crate::error::Error::EmptyQuery);
    }
    if req.limit == 0 {
        req.limit = DEFAULT_LIMIT;
    } else if req.limit > MAX_LIMIT {
        req.limit = MAX_LIMIT;
    }
    if req.rrf_k == 0 {
        req.rrf_k = DEFAULT_RRF_K;
    }
    if req.cache_ttl.is_zero() {
        req.cache_ttl = DEFAULT_CACHE_TTL;
    }
    Ok(())
}
