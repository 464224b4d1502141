//! Query-result cache
//!
//! An LRU cache of `SearchResponse` keyed by the SHA-256 of the canonical
//! request encoding, with a per-entry TTL (spec.md §4.5). Structured the
//! same way as the embedding cache: read path first takes a read lock to
//! check presence and freshness, then escalates to a write lock only to
//! record the recency bump or evict a stale entry.

use gocontext_core::search::{SearchRequest, SearchResponse};
use lru::LruCache;
use sha2::{Digest, Sha256};
use std::num::NonZeroUsize;
use std::sync::RwLock;
use std::time::{Duration, Instant};

struct Entry {
    project_id: String,
    response: SearchResponse,
    inserted_at: Instant,
    ttl: Duration,
}

impl Entry {
    fn is_fresh(&self) -> bool {
        self.inserted_at.elapsed() < self.ttl
    }
}

/// Canonical cache key for a search request: hashes the fields that affect
/// the result set, not bookkeeping fields like `use_cache` or `cache_ttl`.
pub fn cache_key(req: &SearchRequest) -> String {
    let mut hasher = Sha256::new();
    hasher.update(req.project_id.as_bytes());
    hasher.update([0u8]);
    hasher.update(req.query.as_bytes());
    hasher.update([0u8]);
    hasher.update(req.mode.as_str().as_bytes());
    hasher.update([0u8]);
    hasher.update(req.limit.to_le_bytes());
    hasher.update(req.rrf_k.to_le_bytes());
    if let Some(filters) = &req.filters {
        if let Ok(bytes) = serde_json::to_vec(filters) {
            hasher.update(bytes);
        }
    }
    format!("{:x}", hasher.finalize())
}

pub struct QueryCache {
    inner: RwLock<LruCache<String, Entry>>,
}

impl QueryCache {
    pub fn new(capacity: usize) -> Self {
        let cap = NonZeroUsize::new(capacity.max(1)).expect("capacity clamped to at least 1");
        Self {
            inner: RwLock::new(LruCache::new(cap)),
        }
    }

    /// Returns a deep copy of the cached response if present and still
    /// fresh; a stale entry is treated as a miss and evicted.
    pub fn get(&self, key: &str) -> Option<SearchResponse> {
        {
            let guard = self.inner.read().expect("query cache lock poisoned");
            match guard.peek(key) {
                Some(entry) if entry.is_fresh() => {}
                _ => return None,
            }
        }
        let mut guard = self.inner.write().expect("query cache lock poisoned");
        match guard.get(key) {
            Some(entry) if entry.is_fresh() => Some(entry.response.clone()),
            Some(_) => {
                guard.pop(key);
                None
            }
            None => None,
        }
    }

    pub fn put(&self, key: String, project_id: String, response: SearchResponse, ttl: Duration) {
        let mut guard = self.inner.write().expect("query cache lock poisoned");
        guard.put(
            key,
            Entry {
                project_id,
                response,
                inserted_at: Instant::now(),
                ttl,
            },
        );
    }

    /// Drop every cached entry belonging to a project, e.g. after reindexing.
    pub fn invalidate_project(&self, project_id: &str) {
        let mut guard = self.inner.write().expect("query cache lock poisoned");
        let stale: Vec<String> = guard
            .iter()
            .filter(|(_, entry)| entry.project_id == project_id)
            .map(|(k, _)| k.clone())
            .collect();
        for k in stale {
            guard.pop(&k);
        }
    }

    /// Replaces the cache with a fresh, empty one of the new capacity.
    /// Unlike `lru::LruCache::resize`, this discards every entry rather
    /// than keeping the most-recently-used survivors (spec.md §4.5).
    pub fn resize(&self, capacity: usize) {
        let cap = NonZeroUsize::new(capacity.max(1)).expect("capacity clamped to at least 1");
        let mut guard = self.inner.write().expect("query cache lock poisoned");
        *guard = LruCache::new(cap);
    }

    pub fn len(&self) -> usize {
        self.inner.read().expect("query cache lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gocontext_core::search::{SearchMode, SearchResponse};

    fn response() -> SearchResponse {
        SearchResponse {
            results: vec![],
            total: 0,
            mode: SearchMode::Hybrid,
            duration_ms: 1,
            cache_hit: false,
            vector_results: 0,
            text_results: 0,
        }
    }

    #[test]
    fn put_then_get_round_trips() {
        let cache = QueryCache::new(4);
        cache.put("k".to_string(), "proj".to_string(), response(), Duration::from_secs(60));
        assert!(cache.get("k").is_some());
    }

    #[test]
    fn expired_entry_is_a_miss() {
        let cache = QueryCache::new(4);
        cache.put("k".to_string(), "proj".to_string(), response(), Duration::from_millis(1));
        std::thread::sleep(Duration::from_millis(20));
        assert!(cache.get("k").is_none());
    }

    #[test]
    fn key_is_stable_for_identical_requests() {
        let a = SearchRequest::new("foo", "proj");
        let b = SearchRequest::new("foo", "proj");
        assert_eq!(cache_key(&a), cache_key(&b));
    }

    #[test]
    fn key_differs_by_query() {
        let a = SearchRequest::new("foo", "proj");
        let b = SearchRequest::new("bar", "proj");
        assert_ne!(cache_key(&a), cache_key(&b));
    }

    #[test]
    fn resize_discards_all_entries() {
        let cache = QueryCache::new(4);
        cache.put("a".to_string(), "proj".to_string(), response(), Duration::from_secs(60));
        cache.put("b".to_string(), "proj".to_string(), response(), Duration::from_secs(60));
        cache.resize(1);
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn invalidate_project_drops_only_its_entries() {
        let cache = QueryCache::new(4);
        cache.put("a".to_string(), "proj-1".to_string(), response(), Duration::from_secs(60));
        cache.put("b".to_string(), "proj-2".to_string(), response(), Duration::from_secs(60));
        cache.invalidate_project("proj-1");
        assert!(cache.get("a").is_none());
        assert!(cache.get("b").is_some());
    }
}
