//! Wiring of configuration, guard and driver for CLI commands.

use std::path::Path;
use std::sync::Arc;
use storyreel::{
    FileActivationStore, GeminiClient, HttpLicenseAuthority, KeyCodec, LicenseGuard,
    ScriptOrchestrator, StoryreelConfig, StoryreelResult, Studio,
};
use tracing::debug;

pub type CliGuard = LicenseGuard<HttpLicenseAuthority, FileActivationStore>;
pub type CliStudio = Studio<HttpLicenseAuthority, FileActivationStore, GeminiClient>;

/// Load `path` if given, otherwise the layered configuration.
pub fn load_config(path: Option<&Path>) -> StoryreelResult<StoryreelConfig> {
    match path {
        Some(path) => StoryreelConfig::from_file(path),
        None => StoryreelConfig::load(),
    }
}

/// Guard backed by the license server and the per-user key file.
pub fn build_guard(config: &StoryreelConfig) -> StoryreelResult<Arc<CliGuard>> {
    let store = FileActivationStore::default_location(&config.license.namespace)?;
    debug!(path = %store.path().display(), "Using activation store");
    Ok(Arc::new(LicenseGuard::new(
        HttpLicenseAuthority::new(&config.license)?,
        store,
        KeyCodec::from_config(&config.license),
    )))
}

/// Studio with the Gemini driver. Requires `GEMINI_API_KEY`.
pub fn build_studio(config: &StoryreelConfig) -> StoryreelResult<CliStudio> {
    let guard = build_guard(config)?;
    let driver = GeminiClient::new(config.generation.model.clone())?;
    Ok(Studio::new(
        guard,
        ScriptOrchestrator::from_config(driver, config),
    ))
}
