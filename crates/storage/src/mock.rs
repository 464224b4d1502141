//! In-memory storage client, used by executor/indexer tests and by the
//! `local` embedding provider's offline mode.

use crate::{Chunk, FileRecord, Result, StorageClient, StorageHit, StorageWriter, SymbolRecord};
use async_trait::async_trait;
use gocontext_core::project::{Project, ProjectStatus};
use gocontext_core::search::SearchFilters;
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Default)]
struct ProjectData {
    project: Option<Project>,
    status: Option<ProjectStatus>,
    files: HashMap<String, FileRecord>,
    symbols: HashMap<String, SymbolRecord>,
    chunks: HashMap<String, (Chunk, Vec<f32>)>,
}

#[derive(Default)]
pub struct MockStorageClient {
    data: Mutex<HashMap<String, ProjectData>>,
}

impl MockStorageClient {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_project<T>(&self, project_id: &str, f: impl FnOnce(&ProjectData) -> T) -> T
    where
        T: Default,
    {
        let guard = self.data.lock().expect("mock storage lock poisoned");
        match guard.get(project_id) {
            Some(p) => f(p),
            None => T::default(),
        }
    }

    fn cosine(a: &[f32], b: &[f32]) -> f32 {
        if a.len() != b.len() || a.is_empty() {
            return 0.0;
        }
        let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
        let na = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        let nb = b.iter().map(|x| x * x).sum::<f32>().sqrt();
        if na == 0.0 || nb == 0.0 {
            0.0
        } else {
            dot / (na * nb)
        }
    }
}

#[async_trait]
impl StorageClient for MockStorageClient {
    async fn search_vector(
        &self,
        project_id: &str,
        vector: &[f32],
        limit: usize,
        _filters: Option<&SearchFilters>,
    ) -> Result<Vec<StorageHit>> {
        let guard = self.data.lock().expect("mock storage lock poisoned");
        let Some(project) = guard.get(project_id) else {
            return Ok(Vec::new());
        };
        let mut hits: Vec<StorageHit> = project
            .chunks
            .values()
            .map(|(chunk, chunk_vector)| StorageHit {
                chunk_id: chunk.id.clone(),
                score: Self::cosine(vector, chunk_vector),
            })
            .collect();
        hits.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        hits.truncate(limit);
        Ok(hits)
    }

    async fn search_text(
        &self,
        project_id: &str,
        query: &str,
        limit: usize,
        _filters: Option<&SearchFilters>,
    ) -> Result<Vec<StorageHit>> {
        let guard = self.data.lock().expect("mock storage lock poisoned");
        let Some(project) = guard.get(project_id) else {
            return Ok(Vec::new());
        };
        let needle = query.to_lowercase();
        let mut hits: Vec<StorageHit> = project
            .chunks
            .values()
            .filter_map(|(chunk, _)| {
                let haystack = chunk.content.to_lowercase();
                let count = haystack.matches(&needle).count();
                if count > 0 {
                    Some(StorageHit {
                        chunk_id: chunk.id.clone(),
                        score: count as f32,
                    })
                } else {
                    None
                }
            })
            .collect();
        hits.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        hits.truncate(limit);
        Ok(hits)
    }

    async fn get_chunk(&self, project_id: &str, chunk_id: &str) -> Result<Option<Chunk>> {
        Ok(self.with_project(project_id, |p| p.chunks.get(chunk_id).map(|(c, _)| c.clone())))
    }

    async fn get_file_by_id(&self, project_id: &str, file_id: &str) -> Result<Option<FileRecord>> {
        Ok(self.with_project(project_id, |p| p.files.get(file_id).cloned()))
    }

    async fn get_symbol(&self, project_id: &str, symbol_id: &str) -> Result<Option<SymbolRecord>> {
        Ok(self.with_project(project_id, |p| p.symbols.get(symbol_id).cloned()))
    }

    async fn get_project(&self, project_id: &str) -> Result<Option<Project>> {
        Ok(self.with_project(project_id, |p| p.project.clone()))
    }

    async fn get_status(&self, project_id: &str) -> Result<Option<ProjectStatus>> {
        Ok(self.with_project(project_id, |p| p.status.clone()))
    }
}

#[async_trait]
impl StorageWriter for MockStorageClient {
    async fn upsert_project(&self, project: &Project) -> Result<()> {
        let mut guard = self.data.lock().expect("mock storage lock poisoned");
        guard.entry(project.id.clone()).or_default().project = Some(project.clone());
        Ok(())
    }

    async fn upsert_file(&self, project_id: &str, file: &FileRecord) -> Result<()> {
        let mut guard = self.data.lock().expect("mock storage lock poisoned");
        guard
            .entry(project_id.to_string())
            .or_default()
            .files
            .insert(file.id.clone(), file.clone());
        Ok(())
    }

    async fn upsert_symbol(&self, project_id: &str, symbol: &SymbolRecord) -> Result<()> {
        let mut guard = self.data.lock().expect("mock storage lock poisoned");
        guard
            .entry(project_id.to_string())
            .or_default()
            .symbols
            .insert(symbol.id.clone(), symbol.clone());
        Ok(())
    }

    async fn upsert_chunk(&self, chunk: &Chunk, vector: Vec<f32>) -> Result<()> {
        let mut guard = self.data.lock().expect("mock storage lock poisoned");
        guard
            .entry(chunk.project_id.clone())
            .or_default()
            .chunks
            .insert(chunk.id.clone(), (chunk.clone(), vector));
        Ok(())
    }

    async fn set_status(&self, project_id: &str, status: ProjectStatus) -> Result<()> {
        let mut guard = self.data.lock().expect("mock storage lock poisoned");
        guard.entry(project_id.to_string()).or_default().status = Some(status);
        Ok(())
    }

    async fn clear_project(&self, project_id: &str) -> Result<()> {
        let mut guard = self.data.lock().expect("mock storage lock poisoned");
        guard.remove(project_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gocontext_core::search::{FileInfo, SymbolInfo, SymbolKind};

    fn chunk(id: &str, project_id: &str, content: &str) -> Chunk {
        Chunk {
            id: id.to_string(),
            project_id: project_id.to_string(),
            file_id: "file-1".to_string(),
            content: content.to_string(),
            context: String::new(),
            symbol_id: None,
        }
    }

    #[tokio::test]
    async fn vector_search_ranks_by_cosine_similarity() {
        let store = MockStorageClient::new();
        store.upsert_chunk(&chunk("a", "p", "alpha"), vec![1.0, 0.0]).await.unwrap();
        store.upsert_chunk(&chunk("b", "p", "beta"), vec![0.0, 1.0]).await.unwrap();

        let hits = store.search_vector("p", &[1.0, 0.0], 10, None).await.unwrap();
        assert_eq!(hits[0].chunk_id, "a");
    }

    #[tokio::test]
    async fn text_search_matches_substring() {
        let store = MockStorageClient::new();
        store.upsert_chunk(&chunk("a", "p", "fn handler() {}"), vec![]).await.unwrap();
        store.upsert_chunk(&chunk("b", "p", "struct Other;"), vec![]).await.unwrap();

        let hits = store.search_text("p", "handler", 10, None).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].chunk_id, "a");
    }

    #[tokio::test]
    async fn unknown_project_returns_empty_results() {
        let store = MockStorageClient::new();
        assert!(store.search_vector("missing", &[1.0], 10, None).await.unwrap().is_empty());
        assert!(store.get_chunk("missing", "a").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn file_and_symbol_round_trip() {
        let store = MockStorageClient::new();
        let file = FileRecord {
            id: "file-1".to_string(),
            info: FileInfo { path: "a.go".to_string(), package: None, start_line: 1, end_line: 10 },
        };
        store.upsert_file("p", &file).await.unwrap();
        assert_eq!(store.get_file_by_id("p", "file-1").await.unwrap().unwrap().info.path, "a.go");

        let symbol = SymbolRecord {
            id: "sym-1".to_string(),
            info: SymbolInfo { name: "Handler".to_string(), kind: SymbolKind::Function, signature: None },
        };
        store.upsert_symbol("p", &symbol).await.unwrap();
        assert_eq!(store.get_symbol("p", "sym-1").await.unwrap().unwrap().info.name, "Handler");
    }
}
