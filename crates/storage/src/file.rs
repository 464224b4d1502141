//! File-backed storage
//!
//! Persists the in-memory index as a single JSON file under
//! `~/.gocontext/indices/<hash>.json` (spec.md §5 "Persisted state"). The
//! on-disk format is deliberately simple — a serde dump of the same shape
//! `MockStorageClient` holds in memory — since the persistence schema
//! itself is out of scope; what matters is that the process durably writes
//! one file per instance rather than losing the index on exit.

use crate::error::StorageError;
use crate::{Chunk, FileRecord, Result, StorageClient, StorageHit, StorageWriter, SymbolRecord};
use async_trait::async_trait;
use gocontext_core::project::{Project, ProjectStatus};
use gocontext_core::search::SearchFilters;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::warn;

#[derive(Default, Serialize, Deserialize)]
struct ProjectData {
    project: Option<Project>,
    status: Option<ProjectStatus>,
    files: HashMap<String, FileRecord>,
    symbols: HashMap<String, SymbolRecord>,
    chunks: HashMap<String, (Chunk, Vec<f32>)>,
}

#[derive(Default, Serialize, Deserialize)]
struct Database {
    projects: HashMap<String, ProjectData>,
}

pub struct FileStorage {
    path: PathBuf,
    data: Mutex<Database>,
}

impl FileStorage {
    /// Opens (or creates) the database file at `path`, loading any existing
    /// contents into memory.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let data = if path.exists() {
            let raw = std::fs::read_to_string(&path).map_err(|e| StorageError::Backend(e.to_string()))?;
            serde_json::from_str(&raw).unwrap_or_else(|e| {
                warn!(error = %e, "failed to parse existing database file, starting fresh");
                Database::default()
            })
        } else {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).map_err(|e| StorageError::Backend(e.to_string()))?;
            }
            Database::default()
        };
        Ok(Self { path, data: Mutex::new(data) })
    }

    fn persist(&self, guard: &Database) -> Result<()> {
        let raw = serde_json::to_string(guard).map_err(|e| StorageError::Backend(e.to_string()))?;
        std::fs::write(&self.path, raw).map_err(|e| StorageError::Backend(e.to_string()))
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
impl StorageClient for FileStorage {
    async fn search_vector(&self, project_id: &str, vector: &[f32], limit: usize, _filters: Option<&SearchFilters>) -> Result<Vec<StorageHit>> {
        let guard = self.data.lock().expect("file storage lock poisoned");
        let Some(project) = guard.projects.get(project_id) else {
            return Ok(Vec::new());
        };
        let mut hits: Vec<StorageHit> = project
            .chunks
            .values()
            .map(|(chunk, chunk_vector)| StorageHit { chunk_id: chunk.id.clone(), score: Self::cosine(vector, chunk_vector) })
            .collect();
        hits.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        hits.truncate(limit);
        Ok(hits)
    }

    async fn search_text(&self, project_id: &str, query: &str, limit: usize, _filters: Option<&SearchFilters>) -> Result<Vec<StorageHit>> {
        let guard = self.data.lock().expect("file storage lock poisoned");
        let Some(project) = guard.projects.get(project_id) else {
            return Ok(Vec::new());
        };
        let needle = query.to_lowercase();
        let mut hits: Vec<StorageHit> = project
            .chunks
            .values()
            .filter_map(|(chunk, _)| {
                let count = chunk.content.to_lowercase().matches(&needle).count();
                (count > 0).then(|| StorageHit { chunk_id: chunk.id.clone(), score: count as f32 })
            })
            .collect();
        hits.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        hits.truncate(limit);
        Ok(hits)
    }

    async fn get_chunk(&self, project_id: &str, chunk_id: &str) -> Result<Option<Chunk>> {
        let guard = self.data.lock().expect("file storage lock poisoned");
        Ok(guard.projects.get(project_id).and_then(|p| p.chunks.get(chunk_id)).map(|(c, _)| c.clone()))
    }

    async fn get_file_by_id(&self, project_id: &str, file_id: &str) -> Result<Option<FileRecord>> {
        let guard = self.data.lock().expect("file storage lock poisoned");
        Ok(guard.projects.get(project_id).and_then(|p| p.files.get(file_id)).cloned())
    }

    async fn get_symbol(&self, project_id: &str, symbol_id: &str) -> Result<Option<SymbolRecord>> {
        let guard = self.data.lock().expect("file storage lock poisoned");
        Ok(guard.projects.get(project_id).and_then(|p| p.symbols.get(symbol_id)).cloned())
    }

    async fn get_project(&self, project_id: &str) -> Result<Option<Project>> {
        let guard = self.data.lock().expect("file storage lock poisoned");
        Ok(guard.projects.get(project_id).and_then(|p| p.project.clone()))
    }

    async fn get_status(&self, project_id: &str) -> Result<Option<ProjectStatus>> {
        let guard = self.data.lock().expect("file storage lock poisoned");
        Ok(guard.projects.get(project_id).and_then(|p| p.status.clone()))
    }
}

#[async_trait]
impl StorageWriter for FileStorage {
    async fn upsert_project(&self, project: &Project) -> Result<()> {
        let mut guard = self.data.lock().expect("file storage lock poisoned");
        guard.projects.entry(project.id.clone()).or_default().project = Some(project.clone());
        self.persist(&guard)
    }

    async fn upsert_file(&self, project_id: &str, file: &FileRecord) -> Result<()> {
        let mut guard = self.data.lock().expect("file storage lock poisoned");
        guard.projects.entry(project_id.to_string()).or_default().files.insert(file.id.clone(), file.clone());
        self.persist(&guard)
    }

    async fn upsert_symbol(&self, project_id: &str, symbol: &SymbolRecord) -> Result<()> {
        let mut guard = self.data.lock().expect("file storage lock poisoned");
        guard.projects.entry(project_id.to_string()).or_default().symbols.insert(symbol.id.clone(), symbol.clone());
        self.persist(&guard)
    }

    async fn upsert_chunk(&self, chunk: &Chunk, vector: Vec<f32>) -> Result<()> {
        let mut guard = self.data.lock().expect("file storage lock poisoned");
        guard
            .projects
            .entry(chunk.project_id.clone())
            .or_default()
            .chunks
            .insert(chunk.id.clone(), (chunk.clone(), vector));
        self.persist(&guard)
    }

    async fn set_status(&self, project_id: &str, status: ProjectStatus) -> Result<()> {
        let mut guard = self.data.lock().expect("file storage lock poisoned");
        guard.projects.entry(project_id.to_string()).or_default().status = Some(status);
        self.persist(&guard)
    }

    async fn clear_project(&self, project_id: &str) -> Result<()> {
        let mut guard = self.data.lock().expect("file storage lock poisoned");
        guard.projects.remove(project_id);
        self.persist(&guard)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(id: &str, project_id: &str, content: &str) -> Chunk {
        Chunk { id: id.to_string(), project_id: project_id.to_string(), file_id: "f1".to_string(), content: content.to_string(), context: String::new(), symbol_id: None }
    }

    #[tokio::test]
    async fn persists_and_reloads_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("index.json");

        {
            let store = FileStorage::open(&db_path).unwrap();
            store.upsert_chunk(&chunk("a", "proj", "fn handler() {}"), vec![1.0, 0.0]).await.unwrap();
        }

        let reopened = FileStorage::open(&db_path).unwrap();
        let chunk = reopened.get_chunk("proj", "a").await.unwrap();
        assert_eq!(chunk.unwrap().content, "fn handler() {}");
    }

    #[tokio::test]
    async fn missing_project_returns_empty_not_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStorage::open(dir.path().join("index.json")).unwrap();
        assert!(store.search_vector("missing", &[1.0], 10, None).await.unwrap().is_empty());
    }
}
