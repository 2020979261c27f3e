//! Admission decision engine
//!
//! Pure policy: given a client identity and the current counter value, decide
//! whether the request is admitted, admitted with a warning, or rejected, and
//! what counter value should be persisted. Fixed-window semantics: the window
//! starts when a client's key is created in the store and ends when it
//! expires; it is never aligned to wall-clock boundaries.

use crate::config::RateLimitConfig;
use std::time::Duration;

/// The engine's decision for one request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Forward the request
    Admit,
    /// Forward the request after the configured delay, flagging proximity to
    /// the limit in the response
    AdmitWithWarning,
    /// Do not forward; answer 429 Too Many Requests
    Reject,
}

/// Counter value to persist and the expiry to persist it with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CounterUpdate {
    pub new_count: u64,
    pub ttl: Duration,
}

/// Response metadata attached to non-rejected tracked requests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotaInfo {
    /// Maximum requests per window
    pub limit: u64,
    /// Requests left before the limit, floored at 0
    pub remaining: u64,
    /// Seconds until the counter resets
    pub reset_secs: u64,
}

/// Full evaluation result: verdict plus persistence and response side data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Evaluation {
    pub verdict: Verdict,
    /// Counter persist instruction; `None` on reject and for untracked
    /// (empty-identity) admits
    pub update: Option<CounterUpdate>,
    /// Warning-path backpressure delay
    pub delay: Option<Duration>,
    /// Quota headers; `None` on reject and untracked admits
    pub quota: Option<QuotaInfo>,
}

impl Evaluation {
    fn untracked_admit() -> Self {
        Self {
            verdict: Verdict::Admit,
            update: None,
            delay: None,
            quota: None,
        }
    }

    fn reject() -> Self {
        Self {
            verdict: Verdict::Reject,
            update: None,
            delay: None,
            quota: None,
        }
    }
}

/// Fixed-window admission policy
///
/// Ordering is check-then-increment: the counter only advances on admitted
/// requests. A rejected request leaves the stored value and its expiry
/// untouched, so a saturated client's window is never extended by continued
/// traffic.
#[derive(Debug, Clone)]
pub struct RateLimitPolicy {
    config: RateLimitConfig,
}

impl RateLimitPolicy {
    pub fn new(config: RateLimitConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    /// Decide the fate of one request given the client's current count.
    ///
    /// An empty identity admits unconditionally with no counter update: no
    /// fair counter can be maintained for a client we cannot attribute
    /// requests to.
    pub fn evaluate(&self, identity: &str, current_count: u64) -> Evaluation {
        if identity.is_empty() {
            return Evaluation::untracked_admit();
        }

        if current_count >= self.config.max_requests {
            return Evaluation::reject();
        }

        let new_count = current_count + 1;
        let update = CounterUpdate {
            new_count,
            ttl: self.config.window(),
        };
        let quota = self.quota(new_count);

        if current_count >= self.config.warning_threshold {
            Evaluation {
                verdict: Verdict::AdmitWithWarning,
                update: Some(update),
                delay: Some(self.config.delay()),
                quota: Some(quota),
            }
        } else {
            Evaluation {
                verdict: Verdict::Admit,
                update: Some(update),
                delay: None,
                quota: Some(quota),
            }
        }
    }

    /// Quota metadata for a persisted count
    pub fn quota(&self, new_count: u64) -> QuotaInfo {
        QuotaInfo {
            limit: self.config.max_requests,
            remaining: self.config.max_requests.saturating_sub(new_count),
            reset_secs: self.config.window_secs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(max: u64, warning: u64, delay_ms: u64) -> RateLimitPolicy {
        RateLimitPolicy::new(RateLimitConfig {
            window_secs: 60,
            max_requests: max,
            warning_threshold: warning,
            delay_ms,
            ..Default::default()
        })
    }

    #[test]
    fn test_counts_below_warning_admit_without_delay() {
        let policy = policy(5, 3, 100);
        for count in 0..3 {
            let eval = policy.evaluate("1.2.3.4", count);
            assert_eq!(eval.verdict, Verdict::Admit);
            assert_eq!(eval.update.unwrap().new_count, count + 1);
            assert_eq!(eval.delay, None);
        }
    }

    #[test]
    fn test_counts_in_warning_band_admit_with_delay() {
        let policy = policy(5, 3, 100);
        for count in 3..5 {
            let eval = policy.evaluate("1.2.3.4", count);
            assert_eq!(eval.verdict, Verdict::AdmitWithWarning);
            assert_eq!(eval.update.unwrap().new_count, count + 1);
            assert_eq!(eval.delay, Some(Duration::from_millis(100)));
        }
    }

    #[test]
    fn test_counts_at_or_above_max_reject_without_update() {
        let policy = policy(5, 3, 100);
        for count in [5, 6, 100] {
            let eval = policy.evaluate("1.2.3.4", count);
            assert_eq!(eval.verdict, Verdict::Reject);
            assert_eq!(eval.update, None);
            assert_eq!(eval.quota, None);
        }
    }

    #[test]
    fn test_empty_identity_admits_untracked() {
        let policy = policy(5, 3, 100);
        let eval = policy.evaluate("", 1_000_000);
        assert_eq!(eval.verdict, Verdict::Admit);
        assert_eq!(eval.update, None);
        assert_eq!(eval.quota, None);
        assert_eq!(eval.delay, None);
    }

    #[test]
    fn test_quota_metadata() {
        let policy = policy(5, 3, 100);
        let eval = policy.evaluate("1.2.3.4", 0);
        let quota = eval.quota.unwrap();
        assert_eq!(quota.limit, 5);
        assert_eq!(quota.remaining, 4);
        assert_eq!(quota.reset_secs, 60);
    }

    #[test]
    fn test_remaining_floors_at_zero() {
        let policy = policy(5, 3, 100);
        // Last admissible request: new_count reaches the limit.
        let eval = policy.evaluate("1.2.3.4", 4);
        assert_eq!(eval.quota.unwrap().remaining, 0);
        // saturating_sub guards the arithmetic even past the limit.
        assert_eq!(policy.quota(7).remaining, 0);
    }

    #[test]
    fn test_update_ttl_is_window_length() {
        let policy = policy(5, 3, 100);
        let eval = policy.evaluate("1.2.3.4", 0);
        assert_eq!(eval.update.unwrap().ttl, Duration::from_secs(60));
    }

    #[test]
    fn test_warning_threshold_equal_to_max_never_warns() {
        let policy = policy(5, 5, 100);
        for count in 0..5 {
            assert_eq!(policy.evaluate("1.2.3.4", count).verdict, Verdict::Admit);
        }
        assert_eq!(policy.evaluate("1.2.3.4", 5).verdict, Verdict::Reject);
    }

    #[test]
    fn test_zero_warning_threshold_warns_from_first_request() {
        let policy = policy(5, 0, 100);
        assert_eq!(
            policy.evaluate("1.2.3.4", 0).verdict,
            Verdict::AdmitWithWarning
        );
    }

    #[test]
    fn test_scenario_sequence_within_one_window() {
        // max=5, warning=3: six requests from one client, counts 0..=5.
        let policy = policy(5, 3, 100);
        let expected = [
            Verdict::Admit,
            Verdict::Admit,
            Verdict::Admit,
            Verdict::AdmitWithWarning,
            Verdict::AdmitWithWarning,
            Verdict::Reject,
        ];
        for (count, want) in expected.iter().enumerate() {
            assert_eq!(
                policy.evaluate("1.2.3.4", count as u64).verdict,
                *want,
                "count {}",
                count
            );
        }
    }
}
