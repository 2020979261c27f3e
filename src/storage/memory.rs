//! In-memory counter store
//!
//! Per-process fallback for deployments without Redis, and the store used by
//! the test suite. Honors the same expiry semantics as the shared store.

use crate::storage::CounterStore;
use crate::utils::error::Result;
use async_trait::async_trait;
use dashmap::DashMap;
use std::time::{Duration, Instant};

struct Entry {
    count: u64,
    expires_at: Instant,
}

/// Counter store backed by a concurrent in-process map
#[derive(Default)]
pub struct InMemoryCounterStore {
    entries: DashMap<String, Entry>,
}

impl InMemoryCounterStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop expired entries. Expiry is already honored lazily on read; this
    /// exists so long-running processes can reclaim memory periodically.
    pub fn purge_expired(&self) {
        let now = Instant::now();
        self.entries.retain(|_, entry| entry.expires_at > now);
    }

    /// Number of live (unexpired) entries
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.entries
            .iter()
            .filter(|entry| entry.expires_at > now)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl CounterStore for InMemoryCounterStore {
    async fn get(&self, key: &str) -> Result<Option<u64>> {
        let now = Instant::now();
        let expired = match self.entries.get(key) {
            Some(entry) if entry.expires_at > now => return Ok(Some(entry.count)),
            Some(_) => true,
            None => false,
        };
        // The read guard is released before touching the map again.
        if expired {
            self.entries.remove_if(key, |_, entry| entry.expires_at <= now);
        }
        Ok(None)
    }

    async fn set(&self, key: &str, value: u64, ttl: Duration) -> Result<()> {
        self.entries.insert(
            key.to_string(),
            Entry {
                count: value,
                expires_at: Instant::now() + ttl,
            },
        );
        Ok(())
    }

    async fn increment(&self, key: &str, ttl: Duration) -> Result<u64> {
        let now = Instant::now();
        let mut entry = self.entries.entry(key.to_string()).or_insert(Entry {
            count: 0,
            expires_at: now + ttl,
        });

        if entry.expires_at <= now {
            entry.count = 0;
            entry.expires_at = now + ttl;
        }
        entry.count += 1;
        Ok(entry.count)
    }
}
