use std::fmt;
use std::future::Future;
use std::time::Duration;

use crate::{FailureKind, FetchError};

/// Retry strategy for page requests: a fixed delay between attempts and a
/// predicate deciding which failures are worth another attempt.
///
/// There is no attempt limit and no backoff growth. A transient failure is
/// retried until the operation succeeds or fails non-transiently.
#[derive(Clone, Copy)]
pub struct RetryPolicy {
    pub delay: Duration,
    pub is_transient: fn(&FailureKind) -> bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::fixed(Duration::from_secs(5))
    }
}

impl fmt::Debug for RetryPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryPolicy")
            .field("delay", &self.delay)
            .finish_non_exhaustive()
    }
}

impl RetryPolicy {
    /// Fixed delay, retrying the failures [`FailureKind::is_transient`] accepts.
    pub fn fixed(delay: Duration) -> Self {
        Self {
            delay,
            is_transient: FailureKind::is_transient,
        }
    }

    pub fn should_retry(&self, err: &FetchError) -> bool {
        (self.is_transient)(&err.kind)
    }

    /// Runs `operation` until it succeeds or fails with a non-transient error.
    ///
    /// `on_retry` is called with the 1-based retry number and the failure
    /// before each wait.
    pub async fn run<T, F, Fut, R>(
        &self,
        mut operation: F,
        mut on_retry: R,
    ) -> Result<T, FetchError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, FetchError>>,
        R: FnMut(u32, &FetchError),
    {
        let mut attempt: u32 = 0;
        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(err) if self.should_retry(&err) => {
                    attempt = attempt.saturating_add(1);
                    on_retry(attempt, &err);
                    tokio::time::sleep(self.delay).await;
                }
                Err(err) => return Err(err),
            }
        }
    }
}
