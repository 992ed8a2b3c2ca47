use crate::config::RetryConfig;
use crate::error::HubError;
use backon::{ExponentialBuilder, Retryable};
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// Attempt budget and starting delay for [`retry_with_backoff`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first one.
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    /// Delays double after each failure: base, 2·base, 4·base, ...
    pub fn backoff(&self) -> ExponentialBuilder {
        ExponentialBuilder::default()
            .with_min_delay(self.base_delay)
            .with_factor(2.0)
            .with_max_delay(Duration::from_secs(300))
            .with_max_times(self.max_attempts.saturating_sub(1) as usize)
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(cfg: &RetryConfig) -> Self {
        Self::new(cfg.max_attempts, Duration::from_millis(cfg.base_delay_ms))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&RetryConfig::default())
    }
}

/// Run `op`, retrying retryable failures with exponential backoff.
///
/// Auth failures surface on the first attempt. Every failed attempt is logged.
pub async fn retry_with_backoff<T, F, Fut>(
    label: &str,
    policy: &RetryPolicy,
    op: F,
) -> Result<T, HubError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, HubError>>,
{
    op.retry(policy.backoff())
        .sleep(tokio::time::sleep)
        .when(|e: &HubError| e.is_retryable())
        .notify(|err: &HubError, dur: Duration| {
            warn!(
                operation = label,
                error = %err,
                "attempt failed, retrying in {:?}",
                dur
            );
        })
        .await
        .inspect_err(|e| {
            warn!(operation = label, error = %e, "operation failed, giving up");
        })
}

/// Bound `fut` by `limit`; an elapsed limit becomes a retryable [`HubError::Timeout`].
pub async fn with_timeout<T, Fut>(limit: Duration, fut: Fut) -> Result<T, HubError>
where
    Fut: Future<Output = Result<T, HubError>>,
{
    tokio::time::timeout(limit, fut)
        .await
        .map_err(|_| HubError::Timeout(limit))?
}
