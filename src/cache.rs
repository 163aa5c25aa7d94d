//! Bounded LRU cache of compiled patterns.
//!
//! Entries are handed out as `Arc<CompiledPattern>`, so matching runs
//! without holding the lock. Lookup, recency update and eviction all happen
//! inside one critical section; compilation on a miss happens outside it.
//! Hits are serialized too, since an LRU `get` updates recency.

use std::num::NonZeroUsize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use lru::LruCache;
use parking_lot::Mutex;
use serde::Serialize;

use crate::error::PatternSyntaxError;
use crate::pattern::CompiledPattern;

/// Point-in-time cache counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub len: usize,
    pub capacity: usize,
}

pub struct PatternCache {
    entries: Mutex<LruCache<String, Arc<CompiledPattern>>>,
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
}

impl PatternCache {
    /// Create a cache holding at most `capacity` patterns (at least one).
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        PatternCache {
            entries: Mutex::new(LruCache::new(capacity)),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }

    /// Return the cached compilation of `pattern`, compiling it on a miss.
    pub fn get_or_compile(&self, pattern: &str) -> Result<Arc<CompiledPattern>, PatternSyntaxError> {
        if let Some(hit) = self.entries.lock().get(pattern) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            tracing::debug!("pattern cache hit for {:?}", pattern);
            return Ok(Arc::clone(hit));
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        tracing::debug!("pattern cache miss for {:?}", pattern);
        let compiled = Arc::new(CompiledPattern::new(pattern)?);

        let mut entries = self.entries.lock();
        // Another caller may have compiled the same pattern meanwhile; keep theirs.
        if let Some(existing) = entries.get(pattern) {
            return Ok(Arc::clone(existing));
        }
        if let Some((evicted, _)) = entries.push(pattern.to_string(), Arc::clone(&compiled)) {
            self.evictions.fetch_add(1, Ordering::Relaxed);
            tracing::debug!("pattern cache evicted {:?}", evicted);
        }
        Ok(compiled)
    }

    /// Whether `pattern` is cached. Does not update recency.
    pub fn contains(&self, pattern: &str) -> bool {
        self.entries.lock().contains(pattern)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.entries.lock().cap().get()
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    pub fn stats(&self) -> CacheStats {
        let entries = self.entries.lock();
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            len: entries.len(),
            capacity: entries.cap().get(),
        }
    }
}

#[cfg(test)]
#[path = "cache_tests.rs"]
mod tests;
