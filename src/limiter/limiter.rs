//! Request limiter orchestration
//!
//! Wires the decision engine to the counter store: reads the client's current
//! count, evaluates policy, and persists the updated count without blocking
//! the request path.

use crate::config::{CounterMode, RateLimitConfig};
use crate::limiter::engine::{QuotaInfo, RateLimitPolicy, Verdict};
use crate::storage::CounterStore;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

/// Outcome handed to the caller for one request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub verdict: Verdict,
    /// Quota headers to attach; absent on rejects and untracked admits
    pub quota: Option<QuotaInfo>,
    /// Backpressure pause to apply before forwarding
    pub delay: Option<Duration>,
}

impl Decision {
    fn untracked_admit() -> Self {
        Self {
            verdict: Verdict::Admit,
            quota: None,
            delay: None,
        }
    }
}

/// Rate limiter over a shared counter store
#[derive(Clone)]
pub struct RateLimiter {
    policy: RateLimitPolicy,
    store: Arc<dyn CounterStore>,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig, store: Arc<dyn CounterStore>) -> Self {
        Self {
            policy: RateLimitPolicy::new(config),
            store,
        }
    }

    pub fn policy(&self) -> &RateLimitPolicy {
        &self.policy
    }

    /// Decide the fate of one request from `identity`.
    ///
    /// Store failures fail open: the request is evaluated as the first of a
    /// fresh window and admitted, because availability of the protected
    /// service outranks strict enforcement. Persistence runs in a background
    /// task; forwarding never waits on it and its failure never changes an
    /// already-admitted verdict.
    pub async fn handle(&self, identity: &str) -> Decision {
        if identity.is_empty() {
            // No fair counter can be kept; the store is not consulted.
            return Decision::untracked_admit();
        }

        let config = self.policy.config();
        let key = config.counter_key(identity);

        match config.mode {
            CounterMode::ReadModifyWrite => self.handle_read_modify_write(identity, key).await,
            CounterMode::AtomicIncrement => self.handle_atomic(identity, key).await,
        }
    }

    async fn handle_read_modify_write(&self, identity: &str, key: String) -> Decision {
        let current = match self.store.get(&key).await {
            Ok(count) => count.unwrap_or(0),
            Err(e) => {
                warn!(identity = %identity, error = %e, "Counter store read failed, failing open");
                0
            }
        };

        let evaluation = self.policy.evaluate(identity, current);

        if let Some(update) = evaluation.update {
            let store = Arc::clone(&self.store);
            let identity = identity.to_string();
            tokio::spawn(async move {
                if let Err(e) = store.set(&key, update.new_count, update.ttl).await {
                    warn!(identity = %identity, error = %e, "Counter persist failed");
                }
            });
        }

        Decision {
            verdict: evaluation.verdict,
            quota: evaluation.quota,
            delay: evaluation.delay,
        }
    }

    async fn handle_atomic(&self, identity: &str, key: String) -> Decision {
        let config = self.policy.config();
        let new_count = match self.store.increment(&key, config.window()).await {
            Ok(count) => count,
            Err(e) => {
                warn!(identity = %identity, error = %e, "Counter store increment failed, failing open");
                1
            }
        };

        // The increment already persisted; evaluate against the count the
        // engine would have read just before it.
        let evaluation = self.policy.evaluate(identity, new_count.saturating_sub(1));

        Decision {
            verdict: evaluation.verdict,
            quota: evaluation.quota,
            delay: evaluation.delay,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::InMemoryCounterStore;
    use crate::utils::error::{Result, ThrottleError};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn config(max: u64, warning: u64, delay_ms: u64) -> RateLimitConfig {
        RateLimitConfig {
            window_secs: 60,
            max_requests: max,
            warning_threshold: warning,
            delay_ms,
            ..Default::default()
        }
    }

    /// Store whose reads always fail and whose writes are counted
    #[derive(Default)]
    struct FailingStore {
        sets_attempted: AtomicUsize,
        set_fails: bool,
    }

    #[async_trait]
    impl CounterStore for FailingStore {
        async fn get(&self, _key: &str) -> Result<Option<u64>> {
            Err(ThrottleError::Store("connection refused".to_string()))
        }

        async fn set(&self, _key: &str, _value: u64, _ttl: Duration) -> Result<()> {
            self.sets_attempted.fetch_add(1, Ordering::SeqCst);
            if self.set_fails {
                Err(ThrottleError::Store("connection refused".to_string()))
            } else {
                Ok(())
            }
        }
    }

    async fn settle() {
        // Let spawned persist tasks run.
        tokio::task::yield_now().await;
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    #[tokio::test]
    async fn test_first_request_admitted_and_persisted() {
        let store = Arc::new(InMemoryCounterStore::new());
        let limiter = RateLimiter::new(config(5, 3, 100), store.clone());

        let decision = limiter.handle("1.2.3.4").await;
        assert_eq!(decision.verdict, Verdict::Admit);
        assert_eq!(decision.quota.unwrap().remaining, 4);

        settle().await;
        assert_eq!(store.get("request_count_1.2.3.4").await.unwrap(), Some(1));
    }

    #[tokio::test]
    async fn test_rejection_leaves_counter_untouched() {
        let store = Arc::new(InMemoryCounterStore::new());
        store
            .set("request_count_1.2.3.4", 5, Duration::from_secs(60))
            .await
            .unwrap();
        let limiter = RateLimiter::new(config(5, 3, 100), store.clone());

        for _ in 0..3 {
            let decision = limiter.handle("1.2.3.4").await;
            assert_eq!(decision.verdict, Verdict::Reject);
            assert_eq!(decision.quota, None);
            assert_eq!(decision.delay, None);
        }

        settle().await;
        assert_eq!(store.get("request_count_1.2.3.4").await.unwrap(), Some(5));
    }

    #[tokio::test]
    async fn test_warning_band_carries_delay() {
        let store = Arc::new(InMemoryCounterStore::new());
        store
            .set("request_count_1.2.3.4", 3, Duration::from_secs(60))
            .await
            .unwrap();
        let limiter = RateLimiter::new(config(5, 3, 100), store.clone());

        let decision = limiter.handle("1.2.3.4").await;
        assert_eq!(decision.verdict, Verdict::AdmitWithWarning);
        assert_eq!(decision.delay, Some(Duration::from_millis(100)));

        settle().await;
        assert_eq!(store.get("request_count_1.2.3.4").await.unwrap(), Some(4));
    }

    #[tokio::test]
    async fn test_empty_identity_never_consults_store() {
        let store = Arc::new(FailingStore::default());
        let limiter = RateLimiter::new(config(5, 3, 100), store.clone());

        let decision = limiter.handle("").await;
        assert_eq!(decision.verdict, Verdict::Admit);
        assert_eq!(decision.quota, None);

        settle().await;
        assert_eq!(store.sets_attempted.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_failed_get_fails_open_and_still_persists() {
        let store = Arc::new(FailingStore::default());
        let limiter = RateLimiter::new(config(5, 3, 100), store.clone());

        let decision = limiter.handle("1.2.3.4").await;
        assert_eq!(decision.verdict, Verdict::Admit);

        settle().await;
        assert_eq!(store.sets_attempted.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_set_does_not_alter_verdict() {
        let store = Arc::new(FailingStore {
            sets_attempted: AtomicUsize::new(0),
            set_fails: true,
        });
        let limiter = RateLimiter::new(config(5, 3, 100), store.clone());

        let decision = limiter.handle("1.2.3.4").await;
        assert_eq!(decision.verdict, Verdict::Admit);

        settle().await;
        assert_eq!(store.sets_attempted.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_atomic_mode_sequence() {
        let mut cfg = config(5, 3, 100);
        cfg.mode = CounterMode::AtomicIncrement;
        let store = Arc::new(InMemoryCounterStore::new());
        let limiter = RateLimiter::new(cfg, store.clone());

        let expected = [
            Verdict::Admit,
            Verdict::Admit,
            Verdict::Admit,
            Verdict::AdmitWithWarning,
            Verdict::AdmitWithWarning,
            Verdict::Reject,
        ];
        for (i, want) in expected.iter().enumerate() {
            let decision = limiter.handle("1.2.3.4").await;
            assert_eq!(decision.verdict, *want, "request {}", i + 1);
        }
    }

    #[tokio::test]
    async fn test_atomic_mode_has_no_stale_read_race() {
        let mut cfg = config(10, 10, 0);
        cfg.mode = CounterMode::AtomicIncrement;
        let store = Arc::new(InMemoryCounterStore::new());
        let limiter = RateLimiter::new(cfg, store.clone());

        let mut tasks = Vec::new();
        for _ in 0..25 {
            let limiter = limiter.clone();
            tasks.push(tokio::spawn(
                async move { limiter.handle("1.2.3.4").await },
            ));
        }

        let mut admitted = 0;
        for task in tasks {
            if task.await.unwrap().verdict != Verdict::Reject {
                admitted += 1;
            }
        }
        assert_eq!(admitted, 10);
    }
}
