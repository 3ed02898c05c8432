//! Retry policy for outbound GitHub calls

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::errors::{GitHubError, Result};

/// Backoff schedule and budget for one logical operation
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum attempts, including the first
    pub max_attempts: u32,
    /// Delay before the second attempt
    pub initial_delay: Duration,
    /// Backoff multiplier
    pub multiplier: f64,
    /// Delay cap
    pub max_delay: Duration,
    /// Per-call timeout
    pub call_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_secs(1),
            multiplier: 4.0,
            max_delay: Duration::from_secs(16),
            call_timeout: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    /// A policy with no waiting, for tests
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            initial_delay: Duration::from_millis(0),
            multiplier: 1.0,
            max_delay: Duration::from_millis(0),
            call_timeout: Duration::from_secs(5),
        }
    }

    /// Delay before attempt `attempt + 1` (0-based failed attempt)
    pub fn delay(&self, attempt: u32) -> Duration {
        let millis =
            (self.initial_delay.as_millis() as f64 * self.multiplier.powi(attempt as i32)) as u64;
        Duration::from_millis(millis).min(self.max_delay)
    }
}

/// Run `op` under the policy: per-call timeout, transient-only retries
///
/// Permanent failures (4xx other than 429) return immediately.
pub async fn with_retry<T, F, Fut>(policy: &RetryPolicy, mut op: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt: u32 = 0;
    loop {
        let outcome = match tokio::time::timeout(policy.call_timeout, op()).await {
            Ok(result) => result,
            Err(_) => Err(GitHubError::Timeout),
        };
        match outcome {
            Ok(value) => return Ok(value),
            Err(err) if err.is_transient() && attempt + 1 < policy.max_attempts => {
                let delay = policy.delay(attempt);
                warn!(attempt = attempt + 1, error = %err, delay_ms = delay.as_millis() as u64,
                      "transient GitHub failure, backing off");
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}
