//! Short-TTL cache for derived dashboard statistics.
//!
//! The cache only ever holds snapshots that can be recomputed from the
//! ledger, so the write path invalidates unconditionally on every successful
//! scan. No reader/writer coordination beyond the map lock is needed.

use crate::clock::Clock;
use chrono::{DateTime, Duration, Utc};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

struct Entry {
    data: Value,
    stored_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct StatsCache {
    entries: Arc<RwLock<HashMap<String, Entry>>>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
}

impl StatsCache {
    pub fn new(clock: Arc<dyn Clock>, ttl_seconds: u64) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            clock,
            ttl: Duration::seconds(ttl_seconds as i64),
        }
    }

    /// Returns the cached snapshot for `key` if it has not aged out.
    pub async fn get(&self, key: &str) -> Option<Value> {
        let map = self.entries.read().await;
        let entry = map.get(key)?;
        if self.clock.now() - entry.stored_at < self.ttl {
            Some(entry.data.clone())
        } else {
            None
        }
    }

    pub async fn put(&self, key: &str, data: Value) {
        let mut map = self.entries.write().await;
        map.insert(
            key.to_string(),
            Entry {
                data,
                stored_at: self.clock.now(),
            },
        );
    }

    /// Drops a single key, or every snapshot when `key` is `None`.
    pub async fn invalidate(&self, key: Option<&str>) {
        let mut map = self.entries.write().await;
        match key {
            Some(k) => {
                map.remove(k);
            }
            None => map.clear(),
        }
    }
}
