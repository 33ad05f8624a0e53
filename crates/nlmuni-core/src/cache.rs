//! Result memoization
//!
//! Results are cached per raw input, bucketed by the effective options they
//! were resolved with. A cached result is returned as-is, provenance
//! included, so repeated lookups are indistinguishable from the first one.

use std::sync::atomic::{AtomicU64, Ordering};

use ahash::AHashMap;
use parking_lot::RwLock;

use crate::options::MatchOptions;
use crate::result::MatchResult;

/// Hit/miss counters and size of a cache
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

/// Thread-safe map from (effective options, raw input) to result
#[derive(Debug, Default)]
pub struct ResultCache {
    buckets: RwLock<AHashMap<MatchOptions, AHashMap<String, MatchResult>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl ResultCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached result for `raw` under `options`, counting the hit or miss
    pub fn get(&self, options: &MatchOptions, raw: &str) -> Option<MatchResult> {
        let found = self
            .buckets
            .read()
            .get(options)
            .and_then(|bucket| bucket.get(raw))
            .cloned();

        let counter = if found.is_some() { &self.hits } else { &self.misses };
        counter.fetch_add(1, Ordering::Relaxed);
        found
    }

    /// Whether `raw` is cached under `options`, without touching the counters
    pub fn contains(&self, options: &MatchOptions, raw: &str) -> bool {
        self.buckets
            .read()
            .get(options)
            .map_or(false, |bucket| bucket.contains_key(raw))
    }

    pub fn insert(&self, options: &MatchOptions, raw: impl Into<String>, result: MatchResult) {
        let mut buckets = self.buckets.write();
        match buckets.get_mut(options) {
            Some(bucket) => {
                bucket.insert(raw.into(), result);
            }
            None => {
                let mut bucket = AHashMap::new();
                bucket.insert(raw.into(), result);
                buckets.insert(options.clone(), bucket);
            }
        }
    }

    /// Fold a per-worker cache into this one; existing entries win
    pub fn merge(&self, other: ResultCache) {
        let incoming = other.buckets.into_inner();
        let mut buckets = self.buckets.write();
        for (options, entries) in incoming {
            let bucket = buckets.entry(options).or_default();
            for (raw, result) in entries {
                bucket.entry(raw).or_insert(result);
            }
        }
        self.hits
            .fetch_add(other.hits.into_inner(), Ordering::Relaxed);
        self.misses
            .fetch_add(other.misses.into_inner(), Ordering::Relaxed);
    }

    /// Number of cached results across all option sets
    pub fn len(&self) -> usize {
        self.buckets.read().values().map(|bucket| bucket.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.buckets.write().clear();
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.len(),
        }
    }
}
