//! Retry scheduling for one generation call.

use crate::{RetryConfig, advised_wait, backoff, classify};
use std::future::Future;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;
use storyreel_core::{ProgressEvent, ProgressSink};
use storyreel_error::{GenerationError, GenerationErrorKind, StoryreelError, StoryreelResult};
use tokio_retry2::{Retry, RetryError};
use tracing::{debug, warn};

/// Wraps one generation call with classified retries.
///
/// Unclassified failures propagate immediately. Quota and overload failures
/// are retried with the wait table from [`backoff`] until `max_attempts`
/// attempts have failed, after which a terminal
/// [`GenerationErrorKind::RetriesExhausted`] is raised.
///
/// # Example
///
/// ```rust,ignore
/// let scheduler = RetryScheduler::new(RetryConfig::default());
/// let response = scheduler
///     .run(&progress, || driver.generate(&request))
///     .await?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct RetryScheduler {
    config: RetryConfig,
}

impl RetryScheduler {
    /// Create a scheduler with the given backoff table.
    pub fn new(config: RetryConfig) -> Self {
        Self { config }
    }

    /// The backoff table in use.
    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    /// Run `operation` until it succeeds, fails fatally, or runs out of attempts.
    ///
    /// Every wait is reported to `progress` before the task suspends.
    pub async fn run<F, Fut, T>(&self, progress: &dyn ProgressSink, mut operation: F) -> StoryreelResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = StoryreelResult<T>>,
    {
        let attempts = AtomicU32::new(0);

        // The computed wait is slept inside each failed attempt; the strategy
        // only re-arms immediately and the attempt ceiling is enforced below.
        let strategy = std::iter::repeat(Duration::ZERO);

        Retry::spawn(strategy, || {
            let attempt = attempts.fetch_add(1, Ordering::SeqCst) + 1;
            let call = operation();
            async move {
                match call.await {
                    Ok(value) => {
                        if attempt > 1 {
                            debug!(attempt, "Generation call succeeded after retry");
                        }
                        Ok(value)
                    }
                    Err(err) => Err(self.on_failure(err, attempt, progress).await),
                }
            }
        })
        .await
    }

    /// Classify a failed attempt and, when it will be retried, report and
    /// sleep the backoff before handing it back to the retry loop.
    async fn on_failure(
        &self,
        err: StoryreelError,
        attempt: u32,
        progress: &dyn ProgressSink,
    ) -> RetryError<StoryreelError> {
        let Some(class) = classify(&err) else {
            warn!(error = %err, attempt, "Unclassified generation failure, not retrying");
            return RetryError::Permanent(err);
        };

        if attempt >= self.config.max_attempts {
            warn!(error = %err, attempt, "Retry attempts exhausted");
            return RetryError::Permanent(
                GenerationError::new(GenerationErrorKind::RetriesExhausted {
                    attempts: attempt,
                    last_error: err.diagnostic(),
                })
                .into(),
            );
        }

        let diagnostic = err.diagnostic();
        let wait = backoff(&self.config, class, attempt, advised_wait(&diagnostic));
        warn!(
            error = %diagnostic,
            %class,
            attempt,
            wait_secs = wait.as_secs(),
            "Transient generation failure, will retry"
        );
        progress.report(&ProgressEvent::RetryScheduled {
            attempt,
            max_attempts: self.config.max_attempts,
            class,
            wait,
        });

        tokio::time::sleep(wait).await;

        RetryError::Transient {
            err,
            retry_after: None,
        }
    }
}
