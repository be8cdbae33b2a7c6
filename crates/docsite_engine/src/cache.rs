/* In-memory page cache.

Rendered pages are cached by slug for the lifetime of the process. The
corpus of pages is small and fixed per deploy, so the default cache never
evicts; a bounded variant exists for memory-constrained deployments. */

use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::Value;

/// A cached page: the HTTP-ready JSON payload.
pub type CachedPage = Arc<Value>;

/// Slug-keyed storage for rendered pages.
pub trait PageCache: Debug + Send + Sync + 'static {
    fn get(&self, slug: &str) -> Option<CachedPage>;
    fn insert(&mut self, slug: String, page: CachedPage);
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Cache that keeps every page until the process exits.
///
/// Page content only changes with a redeploy, so staleness is not a
/// concern and the entry count is bounded by the number of pages.
#[derive(Debug, Default)]
pub struct UnboundedCache {
    pages: HashMap<String, CachedPage>,
}

impl UnboundedCache {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PageCache for UnboundedCache {
    fn get(&self, slug: &str) -> Option<CachedPage> {
        self.pages.get(slug).cloned()
    }

    fn insert(&mut self, slug: String, page: CachedPage) {
        self.pages.insert(slug, page);
    }

    fn len(&self) -> usize {
        self.pages.len()
    }
}

/// Cache that stops accepting new entries once full.
///
/// Existing entries are never evicted; pages beyond the bound are rendered
/// on every request instead.
#[derive(Debug)]
pub struct BoundedCache {
    pages: HashMap<String, CachedPage>,
    max_entries: usize,
}

impl BoundedCache {
    pub fn new(max_entries: usize) -> Self {
        Self {
            pages: HashMap::new(),
            max_entries,
        }
    }
}

impl PageCache for BoundedCache {
    fn get(&self, slug: &str) -> Option<CachedPage> {
        self.pages.get(slug).cloned()
    }

    fn insert(&mut self, slug: String, page: CachedPage) {
        if self.pages.len() < self.max_entries || self.pages.contains_key(&slug) {
            self.pages.insert(slug, page);
        }
    }

    fn len(&self) -> usize {
        self.pages.len()
    }
}

/// Shared handle to a page cache.
#[derive(Debug, Clone)]
pub struct CacheHandle {
    cache: Arc<RwLock<dyn PageCache>>,
}

impl CacheHandle {
    pub fn new(cache: impl PageCache) -> Self {
        Self {
            cache: Arc::new(RwLock::new(cache)),
        }
    }

    pub fn get(&self, slug: &str) -> Option<CachedPage> {
        self.cache.read().get(slug)
    }

    pub fn insert(&self, slug: String, page: CachedPage) {
        self.cache.write().insert(slug, page);
    }

    pub fn len(&self) -> usize {
        self.cache.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn page(n: u64) -> CachedPage {
        Arc::new(json!({ "n": n }))
    }

    #[test]
    fn test_unbounded_cache() {
        let cache = CacheHandle::new(UnboundedCache::new());
        assert!(cache.is_empty());
        assert!(cache.get("index").is_none());

        cache.insert("index".to_string(), page(1));
        let hit = cache.get("index").unwrap();
        assert_eq!(hit["n"], 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_cache_hit_is_same_payload() {
        let cache = CacheHandle::new(UnboundedCache::new());
        cache.insert("a".to_string(), page(7));

        let first = cache.get("a").unwrap();
        let second = cache.get("a").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_bounded_cache_stops_inserting_when_full() {
        let cache = CacheHandle::new(BoundedCache::new(2));
        cache.insert("a".to_string(), page(1));
        cache.insert("b".to_string(), page(2));
        cache.insert("c".to_string(), page(3));

        assert_eq!(cache.len(), 2);
        assert!(cache.get("a").is_some());
        assert!(cache.get("b").is_some());
        assert!(cache.get("c").is_none());
    }

    #[test]
    fn test_bounded_cache_allows_overwrite_when_full() {
        let cache = CacheHandle::new(BoundedCache::new(1));
        cache.insert("a".to_string(), page(1));
        cache.insert("a".to_string(), page(2));

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("a").unwrap()["n"], 2);
    }
}
