//! Storyreel - license-gated AI shot-list generation
//!
//! Storyreel turns a story idea into an ordered shot-list for short
//! AI-generated videos. Scenes are requested from a language model in
//! batches, threaded together with a running story summary and normalized
//! into three prompt formats. Access is gated by a license key checked
//! against a remote server, with an offline fallback.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use storyreel::{
//!     FileActivationStore, GeminiClient, HttpLicenseAuthority, KeyCodec, LicenseGuard,
//!     ScriptOrchestrator, StoryreelConfig, Studio, VideoGenerationOptions,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = StoryreelConfig::load()?;
//!     let guard = Arc::new(LicenseGuard::new(
//!         HttpLicenseAuthority::new(&config.license)?,
//!         FileActivationStore::default_location(&config.license.namespace)?,
//!         KeyCodec::from_config(&config.license),
//!     ));
//!     let driver = GeminiClient::new(config.generation.model.clone())?;
//!     let studio = Studio::new(guard, ScriptOrchestrator::from_config(driver, &config));
//!
//!     studio.check_saved_key().await;
//!     let options = VideoGenerationOptions::builder()
//!         .idea("A lighthouse keeper befriends a stranded whale")
//!         .style("Pixar-style 3D animation")
//!         .prompt_count(12u32)
//!         .build()?;
//!     let script = studio.generate_script(&options, &()).await?;
//!     println!("{}", script.story_summary());
//!     Ok(())
//! }
//! ```
//!
//! # Cargo Features
//!
//! - `gemini` (default) - Google Gemini driver and the `storyreel` binary
//! - `api` - Enable tests that call the real Gemini API
//!
//! # Architecture
//!
//! - `storyreel_error` - Error types
//! - `storyreel_core` - Options, scenes, requests and progress events
//! - `storyreel_interface` - Driver, authority and store traits
//! - `storyreel_retry` - Failure classification, backoff and configuration
//! - `storyreel_license` - Key codec and activation guard
//! - `storyreel_script` - Batched generation and scene normalization
//! - `storyreel_models` - Model drivers
//!
//! This crate re-exports everything for convenience.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod studio;

pub use studio::Studio;

// Re-export error types
pub use storyreel_error::{
    BuilderError, BuilderErrorKind, ConfigError, GenerationError, GenerationErrorKind, HttpError,
    JsonError, LicenseError, LicenseErrorKind, StorageError, StorageErrorKind, StoryreelError,
    StoryreelErrorKind, StoryreelResult, TransientClass, VerificationError, VerificationErrorKind,
};

// Re-export core types
pub use storyreel_core::{
    DialogueLanguage, GenerateRequest, GenerateRequestBuilder, GenerateResponse, ProgressEvent,
    ProgressSink, ResponseFormat, Scene, Script, VideoGenerationOptions,
    VideoGenerationOptionsBuilder,
};

// Re-export traits
pub use storyreel_interface::{
    ActivationStore, LicenseAuthority, ScriptDriver, VerificationOutcome,
};

// Re-export retry and configuration
pub use storyreel_retry::{
    GenerationConfig, LicenseConfig, RetryConfig, RetryScheduler, StoryreelConfig,
};

// Re-export licensing
pub use storyreel_license::{
    ActivationPhase, ActivationSource, ActivationState, FileActivationStore,
    HttpLicenseAuthority, KeyCodec, KeyExpiry, LicenseGuard, MemoryActivationStore, ParsedKey,
    Remaining, SubmitOutcome,
};

// Re-export script generation
pub use storyreel_script::{ScriptOrchestrator, clean_for_json, normalize};

// Re-export model drivers
#[cfg(feature = "gemini")]
pub use storyreel_models::GeminiClient;
