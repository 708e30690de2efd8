//! Informational progress reporting for long-running generation calls.

use std::time::Duration;
use storyreel_error::TransientClass;

/// Something worth telling the user while a generation call is running.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use storyreel_core::ProgressEvent;
///
/// let event = ProgressEvent::CoolingDown { next_batch: 2, wait: Duration::from_secs(5) };
/// assert_eq!(event.to_string(), "Waiting 5s before batch 2");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum ProgressEvent {
    /// A batch request is about to be sent
    #[display(
        "Generating batch {}/{} (scenes {}-{})",
        batch,
        total_batches,
        first_scene,
        last_scene
    )]
    BatchStarted {
        /// 1-based batch index
        batch: usize,
        /// Number of batches in the call
        total_batches: usize,
        /// First scene number requested
        first_scene: u32,
        /// Last scene number requested
        last_scene: u32,
    },
    /// An extension request is about to be sent
    #[display("Extending script with {} scenes from scene {}", count, first_scene)]
    ExtensionStarted {
        /// Number of scenes requested
        count: u32,
        /// First scene number requested
        first_scene: u32,
    },
    /// A transient failure is being waited out
    #[display(
        "{} (attempt {}/{}), retrying in {}s",
        class,
        attempt,
        max_attempts,
        wait.as_secs()
    )]
    RetryScheduled {
        /// Attempt that just failed, starting at 1
        attempt: u32,
        /// Attempt ceiling
        max_attempts: u32,
        /// Why the attempt failed
        class: TransientClass,
        /// How long before the next attempt
        wait: Duration,
    },
    /// Pause between two batches
    #[display("Waiting {}s before batch {}", wait.as_secs(), next_batch)]
    CoolingDown {
        /// Batch that will run after the pause
        next_batch: usize,
        /// Length of the pause
        wait: Duration,
    },
}

/// Receiver for [`ProgressEvent`]s.
///
/// Reporting is purely informational; sinks must not fail. `()` is the no-op
/// sink and any `Fn(&ProgressEvent)` closure is a sink.
pub trait ProgressSink: Send + Sync {
    /// Handle one event.
    fn report(&self, event: &ProgressEvent);
}

impl ProgressSink for () {
    fn report(&self, _event: &ProgressEvent) {}
}

impl<F> ProgressSink for F
where
    F: Fn(&ProgressEvent) + Send + Sync,
{
    fn report(&self, event: &ProgressEvent) {
        self(event)
    }
}
