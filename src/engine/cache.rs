// Fingerprint-keyed store of finished simulation results. Bounded, TTL
// expiring, insertion-order eviction, no negative caching.

use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};

use log::debug;

use crate::models::driver::SimResult;

pub const DEFAULT_CAPACITY: usize = 50;
pub const DEFAULT_TTL: Duration = Duration::from_secs(60);

struct CacheEntry {
    result: SimResult,
    inserted: Instant,
}

pub struct ResultCache {
    entries: HashMap<String, CacheEntry>,
    order: VecDeque<String>,
    capacity: usize,
    ttl: Duration,
}

impl Default for ResultCache {
    fn default() -> Self {
        ResultCache::new()
    }
}

impl ResultCache {
    pub fn new() -> Self {
        ResultCache::with_limits(DEFAULT_CAPACITY, DEFAULT_TTL)
    }

    pub fn with_limits(capacity: usize, ttl: Duration) -> Self {
        ResultCache {
            entries: HashMap::with_capacity(capacity),
            order: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
            ttl,
        }
    }

    /// Fetch a live entry. Expired entries are removed on touch and read as
    /// absent; callers cannot distinguish "never computed" from "expired".
    pub fn get(&mut self, fingerprint: &str) -> Option<SimResult> {
        let expired = match self.entries.get(fingerprint) {
            Some(entry) => entry.inserted.elapsed() > self.ttl,
            None => return None,
        };
        if expired {
            debug!("cache entry expired: {}", fingerprint);
            self.remove(fingerprint);
            return None;
        }
        self.entries.get(fingerprint).map(|e| e.result.clone())
    }

    /// Insert (or refresh) an entry, evicting the oldest insertions above
    /// capacity.
    pub fn insert(&mut self, fingerprint: String, result: SimResult) {
        if self.entries.contains_key(&fingerprint) {
            self.order.retain(|key| key != &fingerprint);
        }
        self.entries.insert(
            fingerprint.clone(),
            CacheEntry {
                result,
                inserted: Instant::now(),
            },
        );
        self.order.push_back(fingerprint);

        while self.entries.len() > self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                debug!("cache evicting oldest entry: {}", oldest);
                self.entries.remove(&oldest);
            } else {
                break;
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn remove(&mut self, fingerprint: &str) {
        self.entries.remove(fingerprint);
        self.order.retain(|key| key != fingerprint);
    }
}
