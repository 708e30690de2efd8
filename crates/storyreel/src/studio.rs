//! License-gated entry point to script generation.

use std::sync::Arc;
use storyreel_core::{ProgressSink, Scene, Script, VideoGenerationOptions};
use storyreel_error::{LicenseError, LicenseErrorKind, StoryreelResult};
use storyreel_interface::{ActivationStore, LicenseAuthority, ScriptDriver};
use storyreel_license::{ActivationState, LicenseGuard, SubmitOutcome};
use storyreel_script::ScriptOrchestrator;
use tracing::{instrument, warn};

/// The API a front end talks to.
///
/// Pairs a shared [`LicenseGuard`] with a [`ScriptOrchestrator`]. New
/// generation and extension calls are refused unless the guard is unlocked;
/// a call already running when the license lapses is allowed to finish.
#[derive(Debug)]
pub struct Studio<A, S, D> {
    guard: Arc<LicenseGuard<A, S>>,
    orchestrator: ScriptOrchestrator<D>,
}

impl<A, S, D> Studio<A, S, D>
where
    A: LicenseAuthority,
    S: ActivationStore,
    D: ScriptDriver,
{
    /// Create a studio.
    pub fn new(guard: Arc<LicenseGuard<A, S>>, orchestrator: ScriptOrchestrator<D>) -> Self {
        Self {
            guard,
            orchestrator,
        }
    }

    /// The activation guard, shared with the expiry sweep.
    pub fn guard(&self) -> &Arc<LicenseGuard<A, S>> {
        &self.guard
    }

    /// The script orchestrator.
    pub fn orchestrator(&self) -> &ScriptOrchestrator<D> {
        &self.orchestrator
    }

    /// Resolve the activation state from the stored key.
    pub async fn check_saved_key(&self) -> ActivationState {
        self.guard.check_saved_key().await
    }

    /// Verify and activate a key typed by the user.
    pub async fn submit_key(&self, raw: &str) -> SubmitOutcome {
        self.guard.submit_key(raw).await
    }

    /// Forget the key and lock.
    pub fn logout(&self) {
        self.guard.logout()
    }

    /// Generate a full script.
    ///
    /// # Errors
    ///
    /// `LicenseErrorKind::Locked` when the guard is not unlocked, otherwise
    /// whatever [`ScriptOrchestrator::generate`] reports.
    #[instrument(skip_all)]
    pub async fn generate_script(
        &self,
        options: &VideoGenerationOptions,
        progress: &dyn ProgressSink,
    ) -> StoryreelResult<Script> {
        self.ensure_unlocked()?;
        self.orchestrator.generate(options, progress).await
    }

    /// Continue a script after `last_scene`.
    ///
    /// # Errors
    ///
    /// `LicenseErrorKind::Locked` when the guard is not unlocked, otherwise
    /// whatever [`ScriptOrchestrator::extend`] reports.
    #[instrument(skip_all, fields(count = count))]
    pub async fn extend_script(
        &self,
        last_scene: &Scene,
        extension_idea: &str,
        count: u32,
        options: &VideoGenerationOptions,
        progress: &dyn ProgressSink,
    ) -> StoryreelResult<Vec<Scene>> {
        self.ensure_unlocked()?;
        self.orchestrator
            .extend(last_scene, extension_idea, count, options, progress)
            .await
    }

    fn ensure_unlocked(&self) -> StoryreelResult<()> {
        if self.guard.is_unlocked() {
            return Ok(());
        }
        warn!(phase = %self.guard.state().phase, "Refusing generation while locked");
        Err(LicenseError::new(LicenseErrorKind::Locked).into())
    }
}
