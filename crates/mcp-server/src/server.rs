//! MCP server exposing the three gocontext tools over stdio
//!
//! Grounded on the teacher's `CodesearchMcpServer`: a `#[tool_router]` impl
//! block plus a `#[tool_handler]` `ServerHandler` impl, served over
//! `rmcp::transport::stdio()`.

use crate::error::McpError;
use crate::indexer;
use crate::tool::{GetStatusInput, IndexCodebaseInput, SearchCodeInput};
use crate::validate::validate_project_path;
use gocontext_core::project::ProjectStatus;
use gocontext_core::search::{DomainPattern, SearchFilters, SearchMode, SearchRequest, SymbolKind};
use gocontext_embeddings::EmbeddingProvider;
use gocontext_search::SearchExecutor;
use gocontext_storage::{StorageClient, StorageWriter};
use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{
        CallToolResult, Content, ErrorData, Implementation, ProtocolVersion, ServerCapabilities,
        ServerInfo,
    },
    tool, tool_handler, tool_router, ServerHandler, ServiceExt,
};
use serde_json::json;
use sha2::{Digest, Sha256};
use std::path::Path;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;

pub fn project_id_for_path(path: &Path) -> String {
    format!("{:x}", Sha256::digest(path.to_string_lossy().as_bytes()))
}

#[derive(Clone)]
pub struct GocontextMcpServer {
    tool_router: ToolRouter<Self>,
    executor: Arc<SearchExecutor>,
    storage: Arc<dyn StorageClientAndWriter>,
    embedder: Arc<dyn EmbeddingProvider>,
}

/// Storage needs both read and write sides inside the MCP layer: writes for
/// `index_codebase`, reads for `search_code`/`get_status` (via the
/// executor) and for the status lookup here.
pub trait StorageClientAndWriter: StorageClient + StorageWriter {}
impl<T: StorageClient + StorageWriter> StorageClientAndWriter for T {}

impl std::fmt::Debug for GocontextMcpServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GocontextMcpServer").finish()
    }
}

impl GocontextMcpServer {
    pub fn new(
        executor: Arc<SearchExecutor>,
        storage: Arc<dyn StorageClientAndWriter>,
        embedder: Arc<dyn EmbeddingProvider>,
    ) -> Self {
        Self {
            tool_router: Self::tool_router(),
            executor,
            storage,
            embedder,
        }
    }

    fn resolve_filters(input: Option<crate::tool::SearchFiltersInput>) -> Result<Option<SearchFilters>, McpError> {
        let Some(input) = input else { return Ok(None) };
        let symbol_kinds = input
            .symbol_kinds
            .map(|kinds| {
                kinds
                    .iter()
                    .map(|k| SymbolKind::parse(k).ok_or_else(|| McpError::InvalidParams(format!("unknown symbol kind: {k}"))))
                    .collect::<Result<Vec<_>, _>>()
            })
            .transpose()?;
        let domain_patterns = input
            .domain_patterns
            .map(|patterns| {
                patterns
                    .iter()
                    .map(|p| DomainPattern::parse(p).ok_or_else(|| McpError::InvalidParams(format!("unknown domain pattern: {p}"))))
                    .collect::<Result<Vec<_>, _>>()
            })
            .transpose()?;
        if let Some(r) = input.min_relevance {
            if !(0.0..=1.0).contains(&r) {
                return Err(McpError::InvalidParams("min_relevance must be within [0, 1]".to_string()));
            }
        }
        Ok(Some(SearchFilters {
            symbol_kinds,
            file_path_glob: input.file_path_glob,
            domain_patterns,
            packages: input.packages,
            min_relevance: input.min_relevance,
        }))
    }
}

#[tool_router]
impl GocontextMcpServer {
    /// Index a codebase: walk the source tree, chunk files, embed, and
    /// populate storage so subsequent `search_code` calls can find them.
    #[tool(
        name = "index_codebase",
        description = "Index a codebase at an absolute path so it can be searched with search_code."
    )]
    async fn index_codebase(&self, Parameters(input): Parameters<IndexCodebaseInput>) -> Result<CallToolResult, ErrorData> {
        let path = validate_project_path(&input.path).map_err(ErrorData::from)?;
        if !indexer::contains_source_file(&path) {
            return Err(ErrorData::from(McpError::InvalidPath(format!(
                "{} contains no source files",
                path.display()
            ))));
        }

        let project_id = project_id_for_path(&path);
        let include_tests = input.include_tests.unwrap_or(true);
        let include_vendor = input.include_vendor.unwrap_or(false);

        if input.force_reindex.unwrap_or(false) {
            let _ = self.storage.clear_project(&project_id).await;
        }

        let writer: Arc<dyn StorageWriter> = self.storage.clone();
        let outcome = indexer::index_codebase(&path, &project_id, include_tests, include_vendor, &self.embedder, &writer).await;

        let status = ProjectStatus {
            indexed: outcome.files_failed == 0,
            path: path.display().to_string(),
            message: None,
            project: self.storage.get_project(&project_id).await.ok().flatten(),
            file_count: outcome.files_indexed,
            chunk_count: outcome.chunks_created,
            symbol_count: outcome.symbols_extracted,
            last_indexed_at: Some(chrono::Utc::now().to_rfc3339()),
            healthy: outcome.files_failed == 0,
        };
        let _ = self.storage.set_status(&project_id, status).await;

        let total_errors = outcome.errors.len();
        let body = json!({
            "indexed": outcome.files_failed == 0,
            "files_indexed": outcome.files_indexed,
            "files_skipped": outcome.files_skipped,
            "files_failed": outcome.files_failed,
            "symbols_extracted": outcome.symbols_extracted,
            "chunks_created": outcome.chunks_created,
            "duration_ms": outcome.duration_ms,
            "errors": outcome.errors,
            "total_errors": total_errors,
        });

        info!(project_id, files_indexed = outcome.files_indexed, "index_codebase completed");
        Ok(CallToolResult::success(vec![Content::text(body.to_string())]))
    }

    /// Search previously indexed code with hybrid vector+keyword retrieval.
    #[tool(
        name = "search_code",
        description = "Search indexed code by natural language or keyword query, returning ranked, hydrated results."
    )]
    async fn search_code(&self, Parameters(input): Parameters<SearchCodeInput>) -> Result<CallToolResult, ErrorData> {
        let path = validate_project_path(&input.path).map_err(ErrorData::from)?;
        let project_id = project_id_for_path(&path);

        if self.storage.get_project(&project_id).await.ok().flatten().is_none() {
            return Err(ErrorData::from(McpError::NotIndexed(path.display().to_string())));
        }

        let mode = match &input.search_mode {
            Some(m) => SearchMode::parse(m).ok_or_else(|| McpError::InvalidParams(format!("unknown search mode: {m}")))?,
            None => SearchMode::Hybrid,
        };
        let filters = Self::resolve_filters(input.filters).map_err(ErrorData::from)?;

        let mut request = SearchRequest::new(input.query, project_id);
        request.mode = mode;
        request.filters = filters;
        request.use_cache = true;
        if let Some(limit) = input.limit {
            request.limit = limit;
        }

        let cancel = CancellationToken::new();
        let response = self
            .executor
            .search(request, &cancel)
            .await
            .map_err(|e| ErrorData::from(McpError::from(e)))?;

        let body = serde_json::to_string(&response).map_err(|e| ErrorData::from(McpError::Internal(e.to_string())))?;
        Ok(CallToolResult::success(vec![Content::text(body)]))
    }

    /// Report whether a project is indexed, and basic coverage counts.
    #[tool(
        name = "get_status",
        description = "Report indexing status and coverage for a project path."
    )]
    async fn get_status(&self, Parameters(input): Parameters<GetStatusInput>) -> Result<CallToolResult, ErrorData> {
        let path = validate_project_path(&input.path).map_err(ErrorData::from)?;
        let project_id = project_id_for_path(&path);

        let status = match self.storage.get_status(&project_id).await {
            Ok(Some(status)) => status,
            Ok(None) => ProjectStatus::not_indexed(path.display().to_string()),
            Err(e) => return Err(ErrorData::from(McpError::Internal(e.to_string()))),
        };

        let body = serde_json::to_string(&status).map_err(|e| ErrorData::from(McpError::Internal(e.to_string())))?;
        Ok(CallToolResult::success(vec![Content::text(body)]))
    }
}

#[tool_handler]
impl ServerHandler for GocontextMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "gocontext-mcp".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                ..Default::default()
            },
            instructions: Some(
                "Hybrid code search over indexed Go codebases. Call index_codebase once per \
                project, then search_code with a natural-language or keyword query."
                    .to_string(),
            ),
        }
    }
}

/// Run the MCP server with stdio transport until the client disconnects.
pub async fn run_mcp_server(
    executor: Arc<SearchExecutor>,
    storage: Arc<dyn StorageClientAndWriter>,
    embedder: Arc<dyn EmbeddingProvider>,
) -> crate::error::Result<()> {
    let server = GocontextMcpServer::new(executor, storage, embedder);

    let service = server
        .serve(rmcp::transport::stdio())
        .await
        .map_err(|e| McpError::Transport(e.to_string()))?;

    info!("MCP server started, waiting for client requests");
    service.waiting().await.map_err(|e| McpError::Transport(e.to_string()))?;
    info!("MCP server shutting down");
    Ok(())
}
