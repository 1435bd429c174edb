use std::{fmt, future::Future, time::Duration};

use tracing::{instrument, warn};

use crate::Status;

/// Bounded retry with linear backoff: after failed attempt `i` the caller
/// waits `base_delay * i` before attempt `i + 1`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    /// Delay before the attempt following failed attempt `attempt` (1-based).
    pub fn delay(&self, attempt: u32) -> Duration {
        self.base_delay * attempt
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RetryError {
    /// A non-transient error. Returned as soon as it is seen.
    Failed(Status),

    /// Every attempt failed with a transient error. Carries the last one.
    Exhausted { attempts: u32, last: Status },
}

impl std::error::Error for RetryError {}

impl fmt::Display for RetryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RetryError::Failed(status) => write!(f, "{status}"),
            RetryError::Exhausted { attempts, last } => {
                write!(f, "Still failing after {attempts} attempts: {last}")
            }
        }
    }
}

/// Runs `probe` until it succeeds, fails with a non-transient error, or the
/// policy's attempts are used up. Only `Status::is_transient()` errors are
/// retried.
#[instrument(level = "trace", skip(policy, probe))]
pub async fn check_with_retry<T, F, Fut>(policy: &RetryPolicy, mut probe: F) -> Result<T, RetryError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, Status>>,
{
    let mut attempt = 1;
    loop {
        match probe().await {
            Ok(value) => return Ok(value),
            Err(status) if !status.is_transient() => return Err(RetryError::Failed(status)),
            Err(status) if attempt >= policy.max_attempts => {
                return Err(RetryError::Exhausted {
                    attempts: attempt,
                    last: status,
                })
            }
            Err(status) => {
                let wait = policy.delay(attempt);
                warn!("Attempt {attempt} failed, retrying in {wait:?}: {status}");
                tokio::time::sleep(wait).await;
                attempt += 1;
            }
        }
    }
}
