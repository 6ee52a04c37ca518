//! Port for the string-keyed result cache.

use std::time::Duration;

use serde_json::Value;

/// Best-effort cache for expensive query results.
///
/// Keys are namespaced strings (e.g. `content:zinc-plating`); values are
/// JSON documents. Staleness is decided on read: an entry older than its
/// TTL counts as a miss. The cache is strictly an optimisation; callers
/// must behave identically when every read misses.
#[cfg_attr(test, mockall::automock)]
pub trait ResultCache: Send + Sync {
    /// Fetch a fresh entry, or `None` on miss or staleness.
    fn get(&self, key: &str) -> Option<Value>;

    /// Store a value under `key` for `ttl`.
    fn put(&self, key: &str, value: Value, ttl: Duration);

    /// Drop an entry if present.
    fn invalidate(&self, key: &str);
}
