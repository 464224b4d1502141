//! Trait definition for embedding providers
//!
//! Mirrors the shape of the teacher's `EmbeddingProvider` trait, split into
//! single-text and batch methods per spec.md §4.2 rather than a single
//! `embed(Vec<String>)` call, since batch and single-text requests have
//! distinct validation and caching paths here.

use crate::error::EmbeddingError;
use async_trait::async_trait;
use gocontext_core::embedding::Embedding;

#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embed a single piece of text
    async fn generate_embedding(&self, text: &str) -> Result<Embedding, EmbeddingError>;

    /// Embed a batch of texts in as few upstream calls as the provider allows
    async fn generate_batch(&self, texts: &[String]) -> Result<Vec<Embedding>, EmbeddingError>;

    /// Short provider identifier, e.g. "jina", "openai", "local"
    fn provider(&self) -> &str;

    /// Model name reported on produced embeddings
    fn model(&self) -> &str;

    /// Dimensionality of vectors this provider produces
    fn dimension(&self) -> usize;

    /// Release any held resources (connection pools, background tasks).
    /// Most providers are stateless beyond their HTTP client and no-op here.
    async fn close(&self) -> Result<(), EmbeddingError> {
        Ok(())
    }
}
