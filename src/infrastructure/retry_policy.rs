//! Retry Policy
//!
//! Bounds how long a single player's lookup keeps trying failing providers.

use crate::domain::value_objects::Decision;
use std::time::Duration;

/// Retry configuration for country lookups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum number of attempts per player (`None` = retry forever)
    pub max_attempts: Option<u32>,
    /// Delay before the second attempt; zero retries immediately
    pub base_backoff: Duration,
    /// Upper bound for the doubled delay
    pub max_backoff: Duration,
    /// Decision applied once every attempt has failed
    pub on_exhausted: Decision,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: Some(10),
            base_backoff: Duration::from_millis(250),
            max_backoff: Duration::from_secs(10),
            on_exhausted: Decision::Allow,
        }
    }
}

impl RetryPolicy {
    /// Retry immediately and never give up.
    pub fn unbounded() -> Self {
        Self {
            max_attempts: None,
            base_backoff: Duration::ZERO,
            max_backoff: Duration::ZERO,
            on_exhausted: Decision::Allow,
        }
    }

    /// Whether another attempt is allowed after `attempts` failures.
    pub fn should_retry(&self, attempts: u32) -> bool {
        match self.max_attempts {
            Some(max) => attempts < max,
            None => true,
        }
    }

    /// Delay to wait after failed attempt number `attempt` (1-based).
    ///
    /// Doubles from `base_backoff` and saturates at `max_backoff`.
    pub fn backoff(&self, attempt: u32) -> Duration {
        if self.base_backoff.is_zero() {
            return Duration::ZERO;
        }

        let shift = attempt.saturating_sub(1).min(31);
        let factor = 1u32 << shift;
        self.base_backoff
            .checked_mul(factor)
            .map(|d| d.min(self.max_backoff))
            .unwrap_or(self.max_backoff)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, Some(10));
        assert_eq!(policy.on_exhausted, Decision::Allow);
    }

    #[test]
    fn test_should_retry_bounded() {
        let policy = RetryPolicy {
            max_attempts: Some(3),
            ..RetryPolicy::default()
        };

        assert!(policy.should_retry(1));
        assert!(policy.should_retry(2));
        assert!(!policy.should_retry(3));
        assert!(!policy.should_retry(4));
    }

    #[test]
    fn test_should_retry_unbounded() {
        let policy = RetryPolicy::unbounded();
        assert!(policy.should_retry(1));
        assert!(policy.should_retry(u32::MAX));
    }

    #[test]
    fn test_backoff_doubles() {
        let policy = RetryPolicy {
            base_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_secs(10),
            ..RetryPolicy::default()
        };

        assert_eq!(policy.backoff(1), Duration::from_millis(100));
        assert_eq!(policy.backoff(2), Duration::from_millis(200));
        assert_eq!(policy.backoff(3), Duration::from_millis(400));
        assert_eq!(policy.backoff(4), Duration::from_millis(800));
    }

    #[test]
    fn test_backoff_caps_at_max() {
        let policy = RetryPolicy {
            base_backoff: Duration::from_millis(250),
            max_backoff: Duration::from_secs(1),
            ..RetryPolicy::default()
        };

        assert_eq!(policy.backoff(3), Duration::from_secs(1));
        assert_eq!(policy.backoff(20), Duration::from_secs(1));
        assert_eq!(policy.backoff(u32::MAX), Duration::from_secs(1));
    }

    #[test]
    fn test_unbounded_retries_immediately() {
        let policy = RetryPolicy::unbounded();
        assert_eq!(policy.backoff(1), Duration::ZERO);
        assert_eq!(policy.backoff(100), Duration::ZERO);
    }
}
