//! Process-wide URL result cache.
//!
//! Conversions are expensive (several speculative fetches plus extraction),
//! so finished results are kept for a short window. Entries expire after ten
//! minutes, checked on every read, and the oldest entry is dropped first
//! once the cache holds a hundred.

use std::collections::HashMap;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Per-entry time to live.
pub const CACHE_TTL: Duration = Duration::from_secs(10 * 60);

/// Maximum number of cached URLs.
pub const CACHE_CAPACITY: usize = 100;

/// A cached conversion result.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub content: String,
    pub strategy: String,
    pub content_type: String,
    pub title: Option<String>,
}

struct Stamped {
    entry: CacheEntry,
    inserted_at: Instant,
}

struct Inner {
    entries: HashMap<String, Stamped>,
    /// Insertion order for FIFO eviction.
    order: VecDeque<String>,
}

/// Mutexed URL→result map with TTL and FIFO eviction.
pub struct UrlCache {
    inner: Mutex<Inner>,
    ttl: Duration,
    capacity: usize,
}

impl Default for UrlCache {
    fn default() -> Self {
        Self::new(CACHE_TTL, CACHE_CAPACITY)
    }
}

impl UrlCache {
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            inner: Mutex::new(Inner {
                entries: HashMap::new(),
                order: VecDeque::new(),
            }),
            ttl,
            capacity,
        }
    }

    /// Fetch a live entry; expired entries are evicted on the spot, so a
    /// stale read is impossible.
    pub fn get(&self, url: &str) -> Option<CacheEntry> {
        let mut inner = self.inner.lock().expect("cache lock");

        let expired = match inner.entries.get(url) {
            Some(stamped) => stamped.inserted_at.elapsed() > self.ttl,
            None => return None,
        };

        if expired {
            inner.entries.remove(url);
            inner.order.retain(|u| u != url);
            return None;
        }

        inner.entries.get(url).map(|s| s.entry.clone())
    }

    /// Insert an entry, evicting the FIFO-oldest when full.
    pub fn insert(&self, url: &str, entry: CacheEntry) {
        let mut inner = self.inner.lock().expect("cache lock");

        if inner.entries.contains_key(url) {
            inner.order.retain(|u| u != url);
        } else if inner.entries.len() >= self.capacity {
            if let Some(oldest) = inner.order.pop_front() {
                inner.entries.remove(&oldest);
            }
        }

        inner.order.push_back(url.to_string());
        inner
            .entries
            .insert(url.to_string(), Stamped { entry, inserted_at: Instant::now() });
    }

    /// Number of live entries (expired ones may still be counted until
    /// their next read).
    pub fn len(&self) -> usize {
        self.inner.lock().expect("cache lock").entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
