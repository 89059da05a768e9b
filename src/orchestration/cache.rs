//! # Response Cache
//!
//! TTL-keyed store of prior successful generation results, keyed by a
//! canonical signature of request kind and parameters.
//!
//! Expiry is lazy: `get` compares the entry age against the caller-supplied
//! ttl at read time and evicts stale entries on the spot. There is no
//! background sweep, so an entry whose key is never read again can sit in
//! memory until `clear()` — an accepted trade-off at this cache's
//! cardinality (a handful of distinct route/opponent signatures per session).

use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::orchestration::types::RequestKind;

/// Cached generation result with its insertion time
#[derive(Debug, Clone)]
struct CacheEntry {
    payload: Value,
    cached_at: Instant,
}

/// In-memory cache of successful generation results
#[derive(Debug, Clone, Default)]
pub struct ResponseCache {
    entries: Arc<RwLock<HashMap<String, CacheEntry>>>,
}

impl ResponseCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a fresh entry, evicting it if older than `ttl`
    pub async fn get(&self, key: &str, ttl: Duration) -> Option<Value> {
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                Some(entry) if entry.cached_at.elapsed() < ttl => {
                    debug!(key = key, "Cache hit");
                    return Some(entry.payload.clone());
                }
                Some(_) => {}
                None => {
                    debug!(key = key, "Cache miss");
                    return None;
                }
            }
        }

        // Stale: evict under the write lock, rechecking age in case a
        // concurrent put refreshed the entry between locks.
        let mut entries = self.entries.write().await;
        if let Some(entry) = entries.get(key) {
            if entry.cached_at.elapsed() < ttl {
                return Some(entry.payload.clone());
            }
            entries.remove(key);
            debug!(key = key, "Evicted stale cache entry");
        }
        None
    }

    /// Store a successful result under the given key
    pub async fn put(&self, key: String, payload: Value) {
        let mut entries = self.entries.write().await;
        debug!(key = key, "Cached generation result");
        entries.insert(
            key,
            CacheEntry {
                payload,
                cached_at: Instant::now(),
            },
        );
    }

    /// Number of entries currently held, stale ones included
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Check whether the cache holds no entries
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Drop all entries
    pub async fn clear(&self) {
        let mut entries = self.entries.write().await;
        entries.clear();
        info!("Cleared response cache");
    }
}

/// Compute the canonical cache key for a request: the kind plus an
/// order-independent serialization of its parameters.
///
/// Two parameter objects that differ only in key order produce the same key;
/// array order is preserved because it is meaningful (e.g. ordered waypoint
/// lists).
pub fn canonical_key(kind: RequestKind, params: &Value) -> String {
    format!("{}:{}", kind.as_str(), canonicalize(params))
}

fn canonicalize(value: &Value) -> String {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            let fields: Vec<String> = keys
                .into_iter()
                .map(|k| {
                    format!(
                        "{}:{}",
                        serde_json::to_string(k).unwrap_or_default(),
                        canonicalize(&map[k])
                    )
                })
                .collect();
            format!("{{{}}}", fields.join(","))
        }
        Value::Array(items) => {
            let rendered: Vec<String> = items.iter().map(canonicalize).collect();
            format!("[{}]", rendered.join(","))
        }
        other => other.to_string(),
    }
}
