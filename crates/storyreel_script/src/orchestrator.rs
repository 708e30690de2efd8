//! Batched script generation with continuity threading.

use crate::{BatchContext, RawBatch, batch_prompt, extension_prompt, normalize, parse_batch_response};
use storyreel_core::{
    GenerateRequest, ProgressEvent, ProgressSink, Scene, Script, VideoGenerationOptions,
};
use storyreel_error::{
    BuilderError, BuilderErrorKind, GenerationError, GenerationErrorKind, StoryreelError,
    StoryreelResult,
};
use storyreel_interface::ScriptDriver;
use storyreel_retry::{GenerationConfig, RetryConfig, RetryScheduler, StoryreelConfig};
use tracing::{debug, info, instrument, warn};

/// Drives a [`ScriptDriver`] through batched scene generation.
///
/// A script of `prompt_count` scenes is requested in batches of at most
/// `batch_size` scenes. Each batch prompt carries the story summary from the
/// first batch and the end state of the previous batch, every call goes
/// through the [`RetryScheduler`], and batches are separated by a cool-down.
/// Scenes are renumbered to a contiguous range whatever the model reports.
///
/// Exactly one call should be in flight at a time; nothing here serializes
/// concurrent calls.
#[derive(Debug)]
pub struct ScriptOrchestrator<D> {
    driver: D,
    scheduler: RetryScheduler,
    config: GenerationConfig,
}

impl<D: ScriptDriver> ScriptOrchestrator<D> {
    /// Create an orchestrator.
    pub fn new(driver: D, config: GenerationConfig, retry: RetryConfig) -> Self {
        Self {
            driver,
            scheduler: RetryScheduler::new(retry),
            config,
        }
    }

    /// Create an orchestrator from loaded configuration.
    pub fn from_config(driver: D, config: &StoryreelConfig) -> Self {
        Self::new(driver, config.generation.clone(), config.retry)
    }

    /// The model driver.
    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Batching settings in use.
    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }

    /// Generate a full script.
    ///
    /// Batches are requested until `prompt_count` scenes have been received.
    /// A short batch is topped up by the next one, so the batch count can
    /// exceed the planned `ceil(prompt_count / batch_size)`, but never twice
    /// the plan.
    ///
    /// # Errors
    ///
    /// `BatchFailed` naming the batch when a batch cannot be completed, or
    /// when the batch limit is reached with scenes still missing. Later
    /// batches are not attempted.
    #[instrument(skip_all, fields(prompt_count = options.prompt_count(), provider = self.driver.provider_name()))]
    pub async fn generate(
        &self,
        options: &VideoGenerationOptions,
        progress: &dyn ProgressSink,
    ) -> StoryreelResult<Script> {
        let prompt_count = *options.prompt_count();
        let batch_size = self.config.batch_size.max(1);
        let planned_batches = prompt_count.div_ceil(batch_size) as usize;
        let max_batches = planned_batches * 2;
        info!(planned_batches, batch_size, "Starting script generation");

        let mut context = BatchContext::start();
        let mut scenes: Vec<Scene> = Vec::with_capacity(prompt_count as usize);
        let mut batch = 0;

        while (scenes.len() as u32) < prompt_count {
            batch += 1;
            let remaining = prompt_count - scenes.len() as u32;
            let count = batch_size.min(remaining);
            let total_batches = batch - 1 + remaining.div_ceil(batch_size) as usize;
            let first_scene = context.next_start_index;

            progress.report(&ProgressEvent::BatchStarted {
                batch,
                total_batches,
                first_scene,
                last_scene: first_scene + count - 1,
            });
            info!(batch, total_batches, first_scene, count, "Requesting batch");

            let prompt = batch_prompt(options, &context, count);
            let batch_result = self
                .request_scenes(&prompt, count, progress)
                .await
                .map_err(|e| batch_failed(batch, total_batches, e))?;

            if batch == 1 {
                context.story_summary = batch_result.story_summary.unwrap_or_default();
            }
            if let Some(last) = batch_result.scenes.last() {
                context.previous_context_summary = last.continuity_summary();
            }

            for raw in batch_result.scenes {
                let number = context.next_start_index;
                scenes.push(normalize(
                    &raw.with_index(number),
                    options.style(),
                    *options.dialogue_language(),
                ));
                context.next_start_index += 1;
            }
            debug!(batch, accumulated = scenes.len(), "Batch complete");

            let missing = prompt_count - scenes.len() as u32;
            if missing == 0 {
                break;
            }
            if batch >= max_batches {
                let err: StoryreelError =
                    GenerationError::new(GenerationErrorKind::MalformedResponse(format!(
                        "model returned only {} of {} scenes in {} batches",
                        scenes.len(),
                        prompt_count,
                        batch
                    )))
                    .into();
                return Err(batch_failed(batch, total_batches, err));
            }

            let wait = self.config.cooldown();
            progress.report(&ProgressEvent::CoolingDown {
                next_batch: batch + 1,
                wait,
            });
            tokio::time::sleep(wait).await;
        }

        info!(scenes = scenes.len(), "Script generation complete");
        Ok(Script::new(context.story_summary, scenes))
    }

    /// Continue a script with `count` new scenes after `last_scene`.
    ///
    /// # Errors
    ///
    /// `Builder` error when `count` is zero; otherwise the failure of the
    /// single underlying request.
    #[instrument(skip_all, fields(after = last_scene.scene_number(), count = count))]
    pub async fn extend(
        &self,
        last_scene: &Scene,
        extension_idea: &str,
        count: u32,
        options: &VideoGenerationOptions,
        progress: &dyn ProgressSink,
    ) -> StoryreelResult<Vec<Scene>> {
        if count == 0 {
            return Err(BuilderError::new(BuilderErrorKind::ValidationFailed(
                "extension count must be at least 1".to_string(),
            ))
            .into());
        }

        let first_scene = last_scene.scene_number() + 1;
        progress.report(&ProgressEvent::ExtensionStarted { count, first_scene });
        info!(first_scene, count, "Requesting script extension");

        let prompt = extension_prompt(last_scene, extension_idea, count, options);
        let batch = self.request_scenes(&prompt, count, progress).await?;

        let scenes = batch
            .scenes
            .into_iter()
            .zip(first_scene..)
            .map(|(raw, number)| {
                normalize(&raw.with_index(number), options.style(), *options.dialogue_language())
            })
            .collect();
        Ok(scenes)
    }

    /// One retried request, parsed and trimmed to `count` scenes.
    async fn request_scenes(
        &self,
        prompt: &str,
        count: u32,
        progress: &dyn ProgressSink,
    ) -> StoryreelResult<RawBatch> {
        let request = GenerateRequest::builder()
            .prompt(prompt)
            .model(Some(self.config.model.clone()))
            .build()
            .map_err(|e| BuilderError::new(BuilderErrorKind::ValidationFailed(e.to_string())))?;

        let driver = &self.driver;
        let request = &request;
        let response = self
            .scheduler
            .run(progress, move || driver.generate(request))
            .await?;

        let parsed = parse_batch_response(&response.text)?;
        let received = parsed.scenes.len();
        let mut scenes = parsed.scenes;
        if received > count as usize {
            debug!(received, requested = count, "Dropping surplus scenes");
            scenes.truncate(count as usize);
        } else if received < count as usize {
            warn!(received, requested = count, "Model returned fewer scenes than requested");
        }

        Ok(RawBatch {
            story_summary: parsed.story_summary,
            scenes,
        })
    }
}

fn batch_failed(batch: usize, total_batches: usize, err: StoryreelError) -> StoryreelError {
    warn!(batch, total_batches, error = %err, "Batch failed, aborting generation");
    GenerationError::new(GenerationErrorKind::BatchFailed {
        batch,
        total_batches,
        message: err.diagnostic(),
    })
    .into()
}
