//! Bounded LRU cache for embeddings, keyed by the hex-encoded SHA-256 hash
//! of the source text (spec.md §3/§4.2). Each provider owns its own cache
//! instance, so a hash collision across providers/models is not possible
//! within a single cache.
//!
//! Modeled on the teacher's `ContentCache` (an `lru::LruCache` behind a
//! lock), generalized to return owned clones so a caller mutating a
//! returned `Embedding` never perturbs the cached entry.

use gocontext_core::embedding::Embedding;
use lru::LruCache;
use sha2::{Digest, Sha256};
use std::num::NonZeroUsize;
use std::sync::RwLock;

/// The standard SHA-256 hex digest of `text`, used both as the cache key
/// and as the `Embedding.hash` field.
pub fn cache_key(text: &str) -> String {
    format!("{:x}", Sha256::digest(text.as_bytes()))
}

pub struct EmbeddingCache {
    inner: RwLock<LruCache<String, Embedding>>,
}

impl EmbeddingCache {
    pub fn new(capacity: usize) -> Self {
        let cap = NonZeroUsize::new(capacity.max(1)).expect("capacity clamped to at least 1");
        Self {
            inner: RwLock::new(LruCache::new(cap)),
        }
    }

    /// Returns a deep copy of the cached embedding, if present, and bumps
    /// its recency.
    pub fn get(&self, key: &str) -> Option<Embedding> {
        let mut guard = self.inner.write().expect("embedding cache lock poisoned");
        guard.get(key).cloned()
    }

    pub fn put(&self, key: String, value: Embedding) {
        let mut guard = self.inner.write().expect("embedding cache lock poisoned");
        guard.put(key, value);
    }

    pub fn len(&self) -> usize {
        self.inner.read().expect("embedding cache lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.inner.write().expect("embedding cache lock poisoned").clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn emb(v: f32) -> Embedding {
        Embedding::new(vec![v], "local", "test-model", "hash")
    }

    #[test]
    fn put_then_get_round_trips() {
        let cache = EmbeddingCache::new(2);
        cache.put("a".into(), emb(1.0));
        assert_eq!(cache.get("a").unwrap().vector, vec![1.0]);
    }

    #[test]
    fn get_is_isolated_from_later_mutation() {
        let cache = EmbeddingCache::new(2);
        cache.put("a".into(), emb(1.0));
        let mut out = cache.get("a").unwrap();
        out.vector[0] = 99.0;
        assert_eq!(cache.get("a").unwrap().vector, vec![1.0]);
    }

    #[test]
    fn evicts_least_recently_used() {
        let cache = EmbeddingCache::new(2);
        cache.put("a".into(), emb(1.0));
        cache.put("b".into(), emb(2.0));
        cache.put("c".into(), emb(3.0));
        assert!(cache.get("a").is_none());
        assert!(cache.get("b").is_some());
        assert!(cache.get("c").is_some());
    }

    #[test]
    fn get_refreshes_recency() {
        let cache = EmbeddingCache::new(2);
        cache.put("a".into(), emb(1.0));
        cache.put("b".into(), emb(2.0));
        cache.get("a");
        cache.put("c".into(), emb(3.0));
        assert!(cache.get("b").is_none());
        assert!(cache.get("a").is_some());
    }

    #[test]
    fn cache_key_matches_plain_sha256_hex_of_text() {
        use sha2::{Digest, Sha256};
        let expected = format!("{:x}", Sha256::digest(b"hello"));
        assert_eq!(cache_key("hello"), expected);
    }

    #[test]
    fn cache_key_differs_by_text() {
        assert_ne!(cache_key("hello"), cache_key("goodbye"));
    }
}
