//! Local fallback embedding provider
//!
//! Deterministic and offline: each embedding is seeded from the SHA-256
//! digest of the input text, per spec.md §4.3. The digest is 32 bytes but
//! the provider's dimension is 384, so only the first 32 components are
//! digest-derived; the rest are zero-padded (grounded on the teacher's
//! `MockEmbeddingProvider`, generalized from all-zero to hash-seeded so
//! distinct texts don't collide in query-cache or RRF comparisons).

use crate::cache::{cache_key, EmbeddingCache};
use crate::error::EmbeddingError;
use crate::provider::EmbeddingProvider;
use async_trait::async_trait;
use gocontext_core::embedding::{
    normalize_vector, validate_batch_request, validate_request, BatchEmbeddingRequest, Embedding,
    EmbeddingRequest,
};
use sha2::{Digest, Sha256};
use std::sync::Arc;

const LOCAL_DIMENSIONS: usize = 384;
const LOCAL_MODEL: &str = "local-sha256-v1";
const LOCAL_CACHE_CAPACITY: usize = 10_000;

pub struct LocalProvider {
    cache: Arc<EmbeddingCache>,
}

impl LocalProvider {
    pub fn new() -> Self {
        Self {
            cache: Arc::new(EmbeddingCache::new(LOCAL_CACHE_CAPACITY)),
        }
    }

    fn embed_one(&self, text: &str) -> Vec<f32> {
        let digest = Sha256::digest(text.as_bytes());
        let mut vector = vec![0.0f32; LOCAL_DIMENSIONS];
        for (i, byte) in digest.iter().enumerate() {
            vector[i] = *byte as f32 / 255.0;
        }
        normalize_vector(vector)
    }
}

impl Default for LocalProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EmbeddingProvider for LocalProvider {
    async fn generate_embedding(&self, text: &str) -> Result<Embedding, EmbeddingError> {
        validate_request(&EmbeddingRequest { text: text.to_string(), model: None })
            .map_err(|e| EmbeddingError::InvalidInput(e.to_string()))?;

        let key = cache_key(text);
        if let Some(cached) = self.cache.get(&key) {
            return Ok(cached);
        }
        let vector = self.embed_one(text);
        let embedding = Embedding::new(vector, self.provider(), self.model(), key.clone());
        self.cache.put(key, embedding.clone());
        Ok(embedding)
    }

    async fn generate_batch(&self, texts: &[String]) -> Result<Vec<Embedding>, EmbeddingError> {
        validate_batch_request(&BatchEmbeddingRequest { texts: texts.to_vec(), model: None })
            .map_err(|e| EmbeddingError::InvalidInput(e.to_string()))?;

        texts
            .iter()
            .map(|t| {
                let key = cache_key(t);
                if let Some(cached) = self.cache.get(&key) {
                    return Ok(cached);
                }
                let vector = self.embed_one(t);
                let embedding = Embedding::new(vector, self.provider(), self.model(), key.clone());
                self.cache.put(key, embedding.clone());
                Ok(embedding)
            })
            .collect()
    }

    fn provider(&self) -> &str {
        "local"
    }

    fn model(&self) -> &str {
        LOCAL_MODEL
    }

    fn dimension(&self) -> usize {
        LOCAL_DIMENSIONS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn same_text_produces_same_embedding() {
        let provider = LocalProvider::new();
        let a = provider.generate_embedding("fn main() {}").await.unwrap();
        let b = provider.generate_embedding("fn main() {}").await.unwrap();
        assert_eq!(a.vector, b.vector);
    }

    #[tokio::test]
    async fn different_text_produces_different_embedding() {
        let provider = LocalProvider::new();
        let a = provider.generate_embedding("fn main() {}").await.unwrap();
        let b = provider.generate_embedding("fn other() {}").await.unwrap();
        assert_ne!(a.vector, b.vector);
    }

    #[tokio::test]
    async fn reports_expected_dimension() {
        let provider = LocalProvider::new();
        let e = provider.generate_embedding("x").await.unwrap();
        assert_eq!(e.vector.len(), LOCAL_DIMENSIONS);
        assert_eq!(e.dimension, LOCAL_DIMENSIONS);
    }

    #[tokio::test]
    async fn empty_text_rejected() {
        let provider = LocalProvider::new();
        assert!(provider.generate_embedding("").await.is_err());
    }

    #[tokio::test]
    async fn oversized_batch_rejected() {
        let provider = LocalProvider::new();
        let texts = vec!["x".to_string(); gocontext_core::embedding::MAX_BATCH_SIZE + 1];
        assert!(provider.generate_batch(&texts).await.is_err());
    }

    #[tokio::test]
    async fn second_call_for_same_text_is_a_cache_hit() {
        let provider = LocalProvider::new();
        let a = provider.generate_embedding("fn main() {}").await.unwrap();
        assert_eq!(provider.cache.len(), 1);
        let b = provider.generate_embedding("fn main() {}").await.unwrap();
        assert_eq!(a.vector, b.vector);
        assert_eq!(provider.cache.len(), 1);
    }
}
