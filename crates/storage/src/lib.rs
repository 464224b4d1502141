//! Storage abstraction
//!
//! The persistence schema itself is out of scope (spec.md §Non-goals); this
//! crate defines only the interface the executor and indexer depend on —
//! cosine-similarity vector search, BM25 keyword search, and row lookups —
//! modeled on the teacher's `StorageClient` trait split from `StorageManager`.

pub mod error;
pub mod file;
pub mod mock;

use async_trait::async_trait;
use error::StorageError;
use gocontext_core::project::{Project, ProjectStatus};
use gocontext_core::search::{FileInfo, SearchFilters, SymbolInfo};
use serde::{Deserialize, Serialize};

pub type Result<T> = std::result::Result<T, StorageError>;

/// A single indexed chunk of source text
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    pub id: String,
    pub project_id: String,
    pub file_id: String,
    pub content: String,
    pub context: String,
    pub symbol_id: Option<String>,
}

/// A source file record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileRecord {
    pub id: String,
    pub info: FileInfo,
}

/// A symbol record extracted from a file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymbolRecord {
    pub id: String,
    pub info: SymbolInfo,
}

/// A (chunk id, storage-native score) pair returned by the two search
/// primitives, before RRF fusion.
#[derive(Debug, Clone, PartialEq)]
pub struct StorageHit {
    pub chunk_id: String,
    pub score: f32,
}

/// Client interface for read/search operations against the storage backend
#[async_trait]
pub trait StorageClient: Send + Sync {
    async fn search_vector(
        &self,
        project_id: &str,
        vector: &[f32],
        limit: usize,
        filters: Option<&SearchFilters>,
    ) -> Result<Vec<StorageHit>>;

    async fn search_text(
        &self,
        project_id: &str,
        query: &str,
        limit: usize,
        filters: Option<&SearchFilters>,
    ) -> Result<Vec<StorageHit>>;

    async fn get_chunk(&self, project_id: &str, chunk_id: &str) -> Result<Option<Chunk>>;

    async fn get_file_by_id(&self, project_id: &str, file_id: &str) -> Result<Option<FileRecord>>;

    async fn get_symbol(&self, project_id: &str, symbol_id: &str) -> Result<Option<SymbolRecord>>;

    async fn get_project(&self, project_id: &str) -> Result<Option<Project>>;

    async fn get_status(&self, project_id: &str) -> Result<Option<ProjectStatus>>;
}

/// Write-side operations used by the indexer to populate storage. Kept
/// separate from `StorageClient` the way the teacher splits `StorageClient`
/// from `StorageManager`.
#[async_trait]
pub trait StorageWriter: Send + Sync {
    async fn upsert_project(&self, project: &Project) -> Result<()>;

    async fn upsert_file(&self, project_id: &str, file: &FileRecord) -> Result<()>;

    async fn upsert_symbol(&self, project_id: &str, symbol: &SymbolRecord) -> Result<()>;

    async fn upsert_chunk(&self, chunk: &Chunk, vector: Vec<f32>) -> Result<()>;

    async fn set_status(&self, project_id: &str, status: ProjectStatus) -> Result<()>;

    async fn clear_project(&self, project_id: &str) -> Result<()>;
}
