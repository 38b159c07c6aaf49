/// Retry helper shared by every remote call
///
/// Ledger RPC providers exhibit transient rate-limiting and node-lag
/// failures. Each call site wraps its query in `with_retry`, which absorbs
/// those with a short bounded backoff so business logic stays retry-unaware.

use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::warn;

use crate::core::AnalysisError;

/// Bounded linear-backoff retry settings.
///
/// Attempt `n` (1-based) that fails waits `base_delay * n` before the next
/// attempt. State is local to each invocation, never process-wide.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
        }
    }
}

/// Run `operation` up to `policy.max_attempts` times, sleeping
/// `base_delay * attempt` between failures. The last error is propagated as
/// `AnalysisError::RemoteQuery` once the budget is exhausted.
pub async fn with_retry<T, F, Fut>(
    policy: &RetryPolicy,
    method: &'static str,
    mut operation: F,
) -> Result<T, AnalysisError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = anyhow::Result<T>>,
{
    let mut last_error = None;

    for attempt in 1..=policy.max_attempts {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(e) => {
                if attempt < policy.max_attempts {
                    let delay = policy.base_delay * attempt;
                    warn!(
                        "⚠️ {} attempt {}/{} failed: {} - retrying in {:?}",
                        method, attempt, policy.max_attempts, e, delay
                    );
                    sleep(delay).await;
                }
                last_error = Some(e);
            }
        }
    }

    Err(AnalysisError::RemoteQuery {
        method,
        attempts: policy.max_attempts,
        message: last_error
            .map(|e| e.to_string())
            .unwrap_or_else(|| "unknown RPC failure".to_string()),
    })
}
