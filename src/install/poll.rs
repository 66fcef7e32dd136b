//! Bounded post-install verification

use std::future::Future;
use std::time::Duration;

use crate::config::InstallerConfig;

/// How long to keep re-probing after an install reports success.
///
/// Some installers return before their files land on disk, so a single probe
/// right after the install is not enough.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total checks, always at least one.
    pub attempts: u32,
    /// Pause between consecutive checks.
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(attempts: u32, delay: Duration) -> Self {
        Self {
            attempts: attempts.max(1),
            delay,
        }
    }

    pub fn from_config(config: &InstallerConfig) -> Self {
        Self::new(config.verify_attempts, config.verify_delay)
    }

    /// Upper bound on time spent sleeping between checks.
    pub fn max_wait(&self) -> Duration {
        self.delay * self.attempts.saturating_sub(1)
    }
}

/// Evaluate `check` until it succeeds or the policy is exhausted.
///
/// Returns the 1-based attempt that succeeded, or `None` after
/// `policy.attempts` failed checks. No sleep follows the last check.
pub async fn poll_until<F, Fut>(policy: RetryPolicy, mut check: F) -> Option<u32>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    for attempt in 1..=policy.attempts {
        if check().await {
            return Some(attempt);
        }
        if attempt < policy.attempts {
            log::debug!("Check {attempt}/{} negative, retrying", policy.attempts);
            tokio::time::sleep(policy.delay).await;
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use tokio::time::Instant;

    #[tokio::test(start_paused = true)]
    async fn immediate_success_does_not_sleep() {
        let start = Instant::now();

        let attempt = poll_until(RetryPolicy::new(5, Duration::from_secs(1)), || async { true }).await;

        assert_eq!(attempt, Some(1));
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn succeeds_once_condition_appears() {
        let calls = Cell::new(0);
        let start = Instant::now();

        let attempt = poll_until(RetryPolicy::new(10, Duration::from_secs(1)), || {
            calls.set(calls.get() + 1);
            let ready = calls.get() >= 4;
            async move { ready }
        })
        .await;

        assert_eq!(attempt, Some(4));
        assert_eq!(start.elapsed(), Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn gives_up_after_budget() {
        let calls = Cell::new(0);
        let policy = RetryPolicy::new(3, Duration::from_millis(500));
        let start = Instant::now();

        let attempt = poll_until(policy, || {
            calls.set(calls.get() + 1);
            async { false }
        })
        .await;

        assert_eq!(attempt, None);
        assert_eq!(calls.get(), 3);
        assert_eq!(start.elapsed(), policy.max_wait());
    }

    #[test]
    fn zero_attempts_still_checks_once() {
        assert_eq!(RetryPolicy::new(0, Duration::ZERO).attempts, 1);
    }
}
