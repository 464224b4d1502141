//! Search Executor: dispatches a validated request to vector, keyword, or
//! hybrid retrieval, then hydrates ranked chunk ids into public results.

use crate::query_cache::{self, QueryCache};
use crate::rrf;
use crate::sanitize::sanitize_query;
use gocontext_core::embedding::normalize_vector;
use gocontext_core::error::{Error, Result};
use gocontext_core::search::{
    FileInfo, RankedTuple, SearchMode, SearchRequest, SearchResponse, SearchResult, SymbolInfo,
};
use gocontext_embeddings::EmbeddingProvider;
use gocontext_storage::StorageClient;
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

pub struct SearchExecutor {
    embedder: Arc<dyn EmbeddingProvider>,
    storage: Arc<dyn StorageClient>,
    cache: QueryCache,
}

impl SearchExecutor {
    pub fn new(embedder: Arc<dyn EmbeddingProvider>, storage: Arc<dyn StorageClient>, cache_capacity: usize) -> Self {
        Self {
            embedder,
            storage,
            cache: QueryCache::new(cache_capacity),
        }
    }

    pub async fn search(&self, mut request: SearchRequest, cancel: &CancellationToken) -> Result<SearchResponse> {
        let start = Instant::now();
        gocontext_core::search::validate_request(&mut request)?;

        let key = query_cache::cache_key(&request);
        if request.use_cache {
            if let Some(mut cached) = self.cache.get(&key) {
                cached.cache_hit = true;
                cached.duration_ms = start.elapsed().as_millis() as u64;
                return Ok(cached);
            }
        }

        let (results, vector_count, text_count) = match request.mode {
            SearchMode::Vector => {
                let tuples = self.vector_branch(&request, request.limit, cancel).await?;
                let count = tuples.len();
                (self.hydrate(&request.project_id, tuples, request.limit).await, count, 0)
            }
            SearchMode::Keyword => {
                let tuples = self.keyword_branch(&request, request.limit, cancel).await?;
                let count = tuples.len();
                (self.hydrate(&request.project_id, tuples, request.limit).await, 0, count)
            }
            SearchMode::Hybrid => {
                let (vector_tuples, text_tuples) = self.hybrid_branches(&request, cancel).await?;
                let vector_count = vector_tuples.len();
                let text_count = text_tuples.len();
                let fused = rrf::fuse(&vector_tuples, &text_tuples, request.rrf_k);
                (self.hydrate(&request.project_id, fused, request.limit).await, vector_count, text_count)
            }
        };

        let mut response = SearchResponse {
            total: results.len(),
            results,
            mode: request.mode,
            duration_ms: start.elapsed().as_millis() as u64,
            cache_hit: false,
            vector_results: vector_count,
            text_results: text_count,
        };

        if request.use_cache && !response.results.is_empty() {
            self.cache.put(key, request.project_id.clone(), response.clone(), request.cache_ttl);
        }
        response.cache_hit = false;
        Ok(response)
    }

    async fn vector_branch(&self, request: &SearchRequest, limit: usize, cancel: &CancellationToken) -> Result<Vec<RankedTuple>> {
        vector_branch_standalone(&self.embedder, &self.storage, request, limit, cancel).await
    }

    async fn keyword_branch(&self, request: &SearchRequest, limit: usize, cancel: &CancellationToken) -> Result<Vec<RankedTuple>> {
        keyword_branch_standalone(&self.storage, request, limit, cancel).await
    }

    /// Runs the vector and keyword branches concurrently at `2*limit` recall
    /// width. Tolerates either branch failing alone; surfaces a combined
    /// error only if both fail. Races against `cancel`.
    async fn hybrid_branches(&self, request: &SearchRequest, cancel: &CancellationToken) -> Result<(Vec<RankedTuple>, Vec<RankedTuple>)> {
        let wide_limit = request.limit * 2;

        let vector_task = {
            let request = request.clone();
            let cancel = cancel.clone();
            let embedder = self.embedder.clone();
            let storage = self.storage.clone();
            tokio::spawn(async move {
                vector_branch_standalone(&embedder, &storage, &request, wide_limit, &cancel).await
            })
        };
        let text_task = {
            let request = request.clone();
            let cancel = cancel.clone();
            let storage = self.storage.clone();
            tokio::spawn(async move { keyword_branch_standalone(&storage, &request, wide_limit, &cancel).await })
        };

        tokio::select! {
            _ = cancel.cancelled() => Err(Error::Cancelled),
            joined = async { tokio::join!(vector_task, text_task) } => {
                let (vector_result, text_result) = joined;
                let vector_result = vector_result.map_err(|e| Error::Other(e.into()))?;
                let text_result = text_result.map_err(|e| Error::Other(e.into()))?;

                match (vector_result, text_result) {
                    (Ok(v), Ok(t)) => Ok((v, t)),
                    (Ok(v), Err(e)) => {
                        warn!(error = %e, "keyword branch failed, proceeding with vector results only");
                        Ok((v, Vec::new()))
                    }
                    (Err(e), Ok(t)) => {
                        warn!(error = %e, "vector branch failed, proceeding with text results only");
                        Ok((Vec::new(), t))
                    }
                    (Err(ev), Err(et)) => Err(Error::Other(anyhow::anyhow!(
                        "both search branches failed: vector={ev}, text={et}"
                    ))),
                }
            }
        }
    }

    async fn hydrate(&self, project_id: &str, ranked: Vec<RankedTuple>, limit: usize) -> Vec<SearchResult> {
        let mut results = Vec::with_capacity(limit.min(ranked.len()));
        for tuple in ranked {
            if results.len() >= limit {
                break;
            }
            let Ok(Some(chunk)) = self.storage.get_chunk(project_id, &tuple.chunk_id).await else {
                debug!(chunk_id = %tuple.chunk_id, "chunk missing at hydration, skipping");
                continue;
            };
            let Ok(Some(file)) = self.storage.get_file_by_id(project_id, &chunk.file_id).await else {
                debug!(file_id = %chunk.file_id, "file missing at hydration, skipping");
                continue;
            };
            let symbol = match &chunk.symbol_id {
                Some(symbol_id) => self
                    .storage
                    .get_symbol(project_id, symbol_id)
                    .await
                    .ok()
                    .flatten()
                    .map(|s| SymbolInfo { name: s.info.name, kind: s.info.kind, signature: s.info.signature }),
                None => None,
            };

            results.push(SearchResult {
                chunk_id: tuple.chunk_id,
                rank: tuple.rank,
                relevance_score: tuple.score,
                content: chunk.content,
                context: chunk.context,
                file: FileInfo {
                    path: file.info.path,
                    package: file.info.package,
                    start_line: file.info.start_line,
                    end_line: file.info.end_line,
                },
                symbol,
            });
        }
        results
    }
}

async fn vector_branch_standalone(
    embedder: &Arc<dyn EmbeddingProvider>,
    storage: &Arc<dyn StorageClient>,
    request: &SearchRequest,
    limit: usize,
    cancel: &CancellationToken,
) -> Result<Vec<RankedTuple>> {
    if cancel.is_cancelled() {
        return Err(Error::Cancelled);
    }
    let embedding = embedder.generate_embedding(&request.query).await?;
    let vector = normalize_vector(embedding.vector);
    let hits = storage
        .search_vector(&request.project_id, &vector, limit, request.filters.as_ref())
        .await
        .map_err(|e| Error::storage(e.to_string()))?;
    Ok(hits
        .into_iter()
        .enumerate()
        .map(|(rank, hit)| RankedTuple { chunk_id: hit.chunk_id, score: hit.score, rank: rank + 1 })
        .collect())
}

#[cfg(test)]
mod integration_tests {
    use super::*;
    use gocontext_embeddings::local::LocalProvider;
    use gocontext_storage::mock::MockStorageClient;
    use gocontext_storage::{Chunk, StorageWriter};

    async fn seeded_storage() -> Arc<MockStorageClient> {
        let store = Arc::new(MockStorageClient::new());
        let provider = LocalProvider::new();

        for (id, text) in [("c1", "fn handler() { serve() }"), ("c2", "struct Widget;")] {
            let embedding = provider.generate_embedding(text).await.unwrap();
            store
                .upsert_chunk(
                    &Chunk {
                        id: id.to_string(),
                        project_id: "proj".to_string(),
                        file_id: "f1".to_string(),
                        content: text.to_string(),
                        context: String::new(),
                        symbol_id: None,
                    },
                    embedding.vector,
                )
                .await
                .unwrap();
        }
        store
            .upsert_file(
                "proj",
                &gocontext_storage::FileRecord {
                    id: "f1".to_string(),
                    info: FileInfo { path: "a.go".to_string(), package: None, start_line: 1, end_line: 2 },
                },
            )
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn hybrid_search_returns_hydrated_results() {
        let store = seeded_storage().await;
        let embedder: Arc<dyn EmbeddingProvider> = Arc::new(LocalProvider::new());
        let executor = SearchExecutor::new(embedder, store, 10);

        let mut request = SearchRequest::new("handler", "proj");
        request.use_cache = false;
        let cancel = CancellationToken::new();
        let response = executor.search(request, &cancel).await.unwrap();

        assert!(!response.results.is_empty());
        assert_eq!(response.mode, SearchMode::Hybrid);
    }

    #[tokio::test]
    async fn cached_response_is_marked_as_a_hit_on_second_call() {
        let store = seeded_storage().await;
        let embedder: Arc<dyn EmbeddingProvider> = Arc::new(LocalProvider::new());
        let executor = SearchExecutor::new(embedder, store, 10);
        let cancel = CancellationToken::new();

        let mut request = SearchRequest::new("handler", "proj");
        request.use_cache = true;
        let first = executor.search(request.clone(), &cancel).await.unwrap();
        assert!(!first.cache_hit);

        let second = executor.search(request, &cancel).await.unwrap();
        assert!(second.cache_hit);
    }

    #[tokio::test]
    async fn keyword_only_mode_skips_vector_branch() {
        let store = seeded_storage().await;
        let embedder: Arc<dyn EmbeddingProvider> = Arc::new(LocalProvider::new());
        let executor = SearchExecutor::new(embedder, store, 10);

        let mut request = SearchRequest::new("handler", "proj");
        request.mode = SearchMode::Keyword;
        let cancel = CancellationToken::new();
        let response = executor.search(request, &cancel).await.unwrap();

        assert_eq!(response.vector_results, 0);
        assert!(response.text_results > 0);
    }

    #[tokio::test]
    async fn already_cancelled_token_short_circuits_vector_search() {
        let store = seeded_storage().await;
        let embedder: Arc<dyn EmbeddingProvider> = Arc::new(LocalProvider::new());
        let executor = SearchExecutor::new(embedder, store, 10);

        let mut request = SearchRequest::new("handler", "proj");
        request.mode = SearchMode::Vector;
        let cancel = CancellationToken::new();
        cancel.cancel();
        let result = executor.search(request, &cancel).await;
        assert!(result.is_err());
    }
}

async fn keyword_branch_standalone(
    storage: &Arc<dyn StorageClient>,
    request: &SearchRequest,
    limit: usize,
    cancel: &CancellationToken,
) -> Result<Vec<RankedTuple>> {
    if cancel.is_cancelled() {
        return Err(Error::Cancelled);
    }
    let sanitized = sanitize_query(&request.query);
    let hits = storage
        .search_text(&request.project_id, &sanitized, limit, request.filters.as_ref())
        .await
        .map_err(|e| Error::storage(e.to_string()))?;
    Ok(hits
        .into_iter()
        .enumerate()
        .map(|(rank, hit)| RankedTuple { chunk_id: hit.chunk_id, score: hit.score, rank: rank + 1 })
        .collect())
}
