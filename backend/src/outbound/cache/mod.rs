//! In-process TTL cache for query results.
//!
//! Entries are JSON values keyed by string. Staleness is checked lazily on
//! read; an expired entry is dropped and reported as a miss. The cache is
//! process-local, so a multi-instance deployment only ever serves one
//! instance's writes from each entry.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

use serde_json::Value;

use crate::domain::ports::ResultCache;

struct Entry {
    value: Value,
    stored_at: Instant,
    ttl: Duration,
}

impl Entry {
    fn is_fresh(&self, now: Instant) -> bool {
        now.duration_since(self.stored_at) < self.ttl
    }
}

/// String-keyed TTL cache backed by a `RwLock<HashMap>`.
#[derive(Default)]
pub struct MemoryResultCache {
    entries: RwLock<HashMap<String, Entry>>,
}

impl MemoryResultCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    fn read_fresh(&self, key: &str, now: Instant) -> Option<Value> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        let entry = entries.get(key)?;
        entry.is_fresh(now).then(|| entry.value.clone())
    }
}

impl ResultCache for MemoryResultCache {
    fn get(&self, key: &str) -> Option<Value> {
        let now = Instant::now();
        if let Some(value) = self.read_fresh(key, now) {
            return Some(value);
        }
        // Stale or absent; drop the entry if a stale one is still present.
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        if let Some(entry) = entries.get(key)
            && !entry.is_fresh(now)
        {
            entries.remove(key);
        }
        None
    }

    fn put(&self, key: &str, value: Value, ttl: Duration) {
        let entry = Entry {
            value,
            stored_at: Instant::now(),
            ttl,
        };
        self.entries
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key.to_owned(), entry);
    }

    fn invalidate(&self, key: &str) {
        self.entries
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .remove(key);
    }
}
