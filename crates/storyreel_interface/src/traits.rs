//! Trait definitions for external collaborators.

use crate::VerificationOutcome;
use async_trait::async_trait;
use storyreel_core::{GenerateRequest, GenerateResponse};
use storyreel_error::StoryreelResult;

/// A generative text service that turns one prompt into response text.
///
/// Implementations report transient service conditions as
/// `GenerationErrorKind::Http` (with the status code) or as the explicit
/// `QuotaExceeded` / `Overloaded` kinds; the retry scheduler decides what to
/// do with them.
#[async_trait]
pub trait ScriptDriver: Send + Sync {
    /// Send one request and return the raw response text.
    async fn generate(&self, req: &GenerateRequest) -> StoryreelResult<GenerateResponse>;

    /// Provider name (e.g., "gemini").
    fn provider_name(&self) -> &'static str;

    /// Default model identifier.
    fn model_name(&self) -> &str;
}

/// Remote authority that can vouch for (or revoke) a license key.
#[async_trait]
pub trait LicenseAuthority: Send + Sync {
    /// Ask the authority about a normalized key.
    ///
    /// Never fails: transport problems are reported as indeterminate outcomes.
    async fn verify(&self, key: &str) -> VerificationOutcome;
}

/// Durable single-slot storage for the active license key.
pub trait ActivationStore: Send + Sync {
    /// Read the stored key, if any.
    fn get(&self) -> StoryreelResult<Option<String>>;

    /// Replace the stored key.
    fn set(&self, key: &str) -> StoryreelResult<()>;

    /// Remove the stored key.
    fn clear(&self) -> StoryreelResult<()>;
}

#[async_trait]
impl<T: ScriptDriver + ?Sized> ScriptDriver for std::sync::Arc<T> {
    async fn generate(&self, req: &GenerateRequest) -> StoryreelResult<GenerateResponse> {
        (**self).generate(req).await
    }

    fn provider_name(&self) -> &'static str {
        (**self).provider_name()
    }

    fn model_name(&self) -> &str {
        (**self).model_name()
    }
}

#[async_trait]
impl<T: LicenseAuthority + ?Sized> LicenseAuthority for std::sync::Arc<T> {
    async fn verify(&self, key: &str) -> VerificationOutcome {
        (**self).verify(key).await
    }
}

impl<T: ActivationStore + ?Sized> ActivationStore for std::sync::Arc<T> {
    fn get(&self) -> StoryreelResult<Option<String>> {
        (**self).get()
    }

    fn set(&self, key: &str) -> StoryreelResult<()> {
        (**self).set(key)
    }

    fn clear(&self) -> StoryreelResult<()> {
        (**self).clear()
    }
}
