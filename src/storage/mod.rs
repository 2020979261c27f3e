//! Counter storage
//!
//! The per-client request counter lives in a shared key-value store so that
//! every process in front of the protected service sees the same counts. The
//! store is injected into the limiter as a trait object; tests and
//! single-instance deployments use the in-memory implementation.

pub mod memory;
#[cfg(feature = "redis")]
pub mod redis;

pub use memory::InMemoryCounterStore;
#[cfg(feature = "redis")]
pub use redis::RedisCounterStore;

use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

/// Contract over an external key-value store with per-key expiry.
///
/// `get` returns `None` for keys that never existed or whose TTL elapsed;
/// expiry is the only way a counter resets. Connectivity failures surface as
/// errors and are never retried here.
#[async_trait]
pub trait CounterStore: Send + Sync {
    /// Read the counter for `key`, `None` if absent or expired.
    async fn get(&self, key: &str) -> Result<Option<u64>>;

    /// Persist `value` under `key`, overwriting any prior value and expiry.
    async fn set(&self, key: &str, value: u64, ttl: Duration) -> Result<()>;

    /// Atomically increment the counter and return the new value, applying
    /// `ttl` only when the key is created.
    ///
    /// The default implementation composes `get` and `set` for stores without
    /// a native primitive; it carries the same stale-read race as separate
    /// calls and resets the expiry on every write.
    async fn increment(&self, key: &str, ttl: Duration) -> Result<u64> {
        let current = self.get(key).await?.unwrap_or(0);
        let next = current + 1;
        self.set(key, next, ttl).await?;
        Ok(next)
    }
}
