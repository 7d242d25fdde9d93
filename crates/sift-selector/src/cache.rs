//! Compiled expression caching.
//!
//! Compiling a query runs the selector's generator and every expression
//! filter, then renders the result. For a page object that issues the same
//! queries over and over this is repeated work, so the engine can keep the
//! rendered expressions in an LRU cache. Guarded by a `Mutex`, so a shared
//! engine can be used from several threads.

use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use lru::LruCache;
use sift_xpath::Matching;

use crate::config::CacheConfig;
use crate::result::CompiledQuery;

/// Identifies a compiled expression.
///
/// Built from everything that feeds the generator and the expression
/// filters: kind, locator, matching mode and the option values of
/// expression-level filters (in display form).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    kind: String,
    locator: Option<String>,
    matching: Matching,
    filters: Vec<(String, String)>,
}

impl CacheKey {
    /// Creates a cache key.
    pub fn new(
        kind: impl Into<String>,
        locator: Option<&str>,
        matching: Matching,
        filters: Vec<(String, String)>,
    ) -> Self {
        Self {
            kind: kind.into(),
            locator: locator.map(str::to_string),
            matching,
            filters,
        }
    }
}

/// Thread-safe LRU cache of compiled queries.
pub struct ExpressionCache {
    inner: Mutex<LruCache<CacheKey, CompiledQuery>>,
    capacity: usize,
    hits: AtomicUsize,
    misses: AtomicUsize,
}

impl ExpressionCache {
    /// Creates a cache with the given configuration.
    pub fn new(config: &CacheConfig) -> Self {
        Self::with_capacity(config.max_entries)
    }

    /// Creates a cache holding at most `max_entries` entries (at least one).
    pub fn with_capacity(max_entries: usize) -> Self {
        let capacity = NonZeroUsize::new(max_entries).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner: Mutex::new(LruCache::new(capacity)),
            capacity: capacity.get(),
            hits: AtomicUsize::new(0),
            misses: AtomicUsize::new(0),
        }
    }

    /// Gets a compiled query, promoting it to most-recently-used.
    pub fn get(&self, key: &CacheKey) -> Option<CompiledQuery> {
        let found = self
            .inner
            .lock()
            .ok()
            .and_then(|mut cache| cache.get(key).cloned());
        let counter = if found.is_some() {
            &self.hits
        } else {
            &self.misses
        };
        counter.fetch_add(1, Ordering::Relaxed);
        found
    }

    /// Stores a compiled query, evicting the least recently used entry when
    /// full.
    pub fn insert(&self, key: CacheKey, compiled: CompiledQuery) {
        if let Ok(mut cache) = self.inner.lock() {
            cache.put(key, compiled);
        }
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        match self.inner.lock() {
            Ok(cache) => cache.len(),
            _ => 0,
        }
    }

    /// Returns true if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Removes every entry. Hit and miss counters are kept.
    pub fn clear(&self) {
        if let Ok(mut cache) = self.inner.lock() {
            cache.clear();
        }
    }

    /// Returns cache statistics.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.len(),
            capacity: self.capacity,
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

impl std::fmt::Debug for ExpressionCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let stats = self.stats();
        f.debug_struct("ExpressionCache")
            .field("entries", &stats.entries)
            .field("capacity", &stats.capacity)
            .finish()
    }
}

/// Statistics about the cache state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CacheStats {
    /// Number of cached entries.
    pub entries: usize,
    /// Maximum number of entries.
    pub capacity: usize,
    /// Lookups that found an entry.
    pub hits: usize,
    /// Lookups that found nothing.
    pub misses: usize,
}
