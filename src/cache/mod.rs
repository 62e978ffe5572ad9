//! Fixed-capacity link cache
//!
//! Maps `short_code -> original_url`. The LRU list and the hit/miss counters
//! sit behind one mutex, so every operation is atomic as a whole and
//! concurrent readers never see a half-finished eviction.

pub mod lru;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::trace;

pub use lru::LruList;

/// 缓存统计快照
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CacheStats {
    pub size: usize,
    pub capacity: usize,
    pub hits: u64,
    pub misses: u64,
    /// 命中率百分比，保留两位小数；尚无查询时为 0
    pub hit_rate: f64,
}

struct CacheState {
    entries: LruList<String, String>,
    hits: u64,
    misses: u64,
}

pub struct UrlCache {
    state: Mutex<CacheState>,
}

impl UrlCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            state: Mutex::new(CacheState {
                entries: LruList::new(capacity),
                hits: 0,
                misses: 0,
            }),
        }
    }

    /// Look up a short code. A hit marks the entry most recently used.
    pub fn get(&self, short_code: &str) -> Option<String> {
        let mut state = self.state.lock();
        let cached = state.entries.get(short_code).cloned();
        match cached {
            Some(url) => {
                state.hits += 1;
                trace!("UrlCache: hit for '{}'", short_code);
                Some(url)
            }
            None => {
                state.misses += 1;
                trace!("UrlCache: miss for '{}'", short_code);
                None
            }
        }
    }

    /// Insert or overwrite an entry, evicting the least recently used one if
    /// the cache is full.
    pub fn put(&self, short_code: impl Into<String>, original_url: impl Into<String>) {
        let mut state = self.state.lock();
        if let Some((evicted, _)) = state.entries.put(short_code.into(), original_url.into()) {
            trace!("UrlCache: evicted '{}'", evicted);
        }
    }

    /// Drop an entry. Removing an absent code is a no-op.
    pub fn remove(&self, short_code: &str) {
        let mut state = self.state.lock();
        if state.entries.remove(short_code).is_some() {
            trace!("UrlCache: removed '{}'", short_code);
        }
    }

    /// Empty the cache and reset the hit/miss counters.
    pub fn clear(&self) {
        let mut state = self.state.lock();
        state.entries.clear();
        state.hits = 0;
        state.misses = 0;
    }

    pub fn stats(&self) -> CacheStats {
        let state = self.state.lock();
        let total = state.hits + state.misses;
        let hit_rate = if total > 0 {
            let pct = state.hits as f64 / total as f64 * 100.0;
            (pct * 100.0).round() / 100.0
        } else {
            0.0
        };

        CacheStats {
            size: state.entries.len(),
            capacity: state.entries.capacity(),
            hits: state.hits,
            misses: state.misses,
            hit_rate,
        }
    }

    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().entries.is_empty()
    }

    /// Whether `short_code` is cached, without counting a lookup or touching
    /// recency.
    pub fn contains(&self, short_code: &str) -> bool {
        self.state.lock().entries.peek(short_code).is_some()
    }
}
