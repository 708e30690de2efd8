//! Layered TOML configuration.
//!
//! Sources, later ones overriding earlier ones:
//! 1. Bundled defaults (include_str! from storyreel.toml)
//! 2. ~/.config/storyreel/storyreel.toml
//! 3. ./storyreel.toml

use config::{Config, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use storyreel_error::{ConfigError, StoryreelError, StoryreelResult};
use tracing::{debug, instrument};

/// License server and offline key settings.
///
/// ```toml
/// [license]
/// endpoint = "https://license.storyreel.app"
/// timeout_secs = 8
/// key_prefix = "REEL"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct LicenseConfig {
    /// Base URL of the license server (`/api/verify` is appended)
    pub endpoint: String,
    /// Hard timeout for one verification request
    pub timeout_secs: u64,
    /// First segment of every key
    pub key_prefix: String,
    /// Expiry field value meaning "never expires"
    pub unlimited_literal: String,
    /// Secret mixed into offline signatures
    pub signing_secret: String,
    /// Period of the expiry sweep while unlocked
    pub sweep_interval_secs: u64,
    /// Name of the persisted key slot
    pub namespace: String,
}

impl Default for LicenseConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://license.storyreel.app".to_string(),
            timeout_secs: 8,
            key_prefix: "REEL".to_string(),
            unlimited_literal: "UNLIMITED".to_string(),
            signing_secret: "storyreel-offline-fallback-v1".to_string(),
            sweep_interval_secs: 60,
            namespace: "storyreel_license".to_string(),
        }
    }
}

impl LicenseConfig {
    /// Verification timeout as a duration.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Sweep period as a duration.
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }
}

/// Backoff table for transient generation failures.
///
/// ```toml
/// [retry]
/// max_attempts = 10
/// quota_step_secs = 20      # attempt × 20s
/// overload_base_secs = 5    # 5 × 2^(attempt-1)s
/// advised_margin_secs = 3   # added to a service-advised wait
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total attempts, including the first
    pub max_attempts: u32,
    /// Linear step for quota-exhausted failures
    pub quota_step_secs: u64,
    /// Exponential base for overload failures
    pub overload_base_secs: u64,
    /// Margin added to a wait advised by the service
    pub advised_margin_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            quota_step_secs: 20,
            overload_base_secs: 5,
            advised_margin_secs: 3,
        }
    }
}

/// Batching and model settings for script generation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Scenes requested per batch
    pub batch_size: u32,
    /// Pause between batches
    pub cooldown_secs: u64,
    /// Default model identifier
    pub model: String,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            batch_size: 10,
            cooldown_secs: 5,
            model: "gemini-2.5-flash".to_string(),
        }
    }
}

impl GenerationConfig {
    /// Inter-batch pause as a duration.
    pub fn cooldown(&self) -> Duration {
        Duration::from_secs(self.cooldown_secs)
    }
}

/// Top-level Storyreel configuration.
///
/// # Example
///
/// ```no_run
/// use storyreel_retry::StoryreelConfig;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = StoryreelConfig::load()?;
/// println!("batch size: {}", config.generation.batch_size);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, Default)]
pub struct StoryreelConfig {
    /// License settings
    #[serde(default)]
    pub license: LicenseConfig,
    /// Retry settings
    #[serde(default)]
    pub retry: RetryConfig,
    /// Generation settings
    #[serde(default)]
    pub generation: GenerationConfig,
}

impl StoryreelConfig {
    /// Load configuration from a specific file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<std::path::Path>) -> StoryreelResult<Self> {
        debug!("Loading configuration from file");

        let config: Self = Config::builder()
            .add_source(File::from(path.as_ref()))
            .build()
            .map_err(|e| {
                StoryreelError::from(ConfigError::new(format!(
                    "Failed to read configuration from {}: {}",
                    path.as_ref().display(),
                    e
                )))
            })?
            .try_deserialize()
            .map_err(|e| {
                StoryreelError::from(ConfigError::new(format!(
                    "Failed to parse configuration: {}",
                    e
                )))
            })?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration with precedence: current dir > home dir > bundled defaults.
    ///
    /// User config files are optional and silently skipped if not found.
    #[instrument]
    pub fn load() -> StoryreelResult<Self> {
        debug!("Loading configuration with precedence: current dir > home dir > bundled defaults");

        const DEFAULT_CONFIG: &str = include_str!("../../../storyreel.toml");

        let mut builder =
            Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml));

        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".config/storyreel/storyreel.toml");
            builder = builder.add_source(File::from(home_config).required(false));
        }

        builder = builder.add_source(File::with_name("storyreel").required(false));

        let config: Self = builder
            .build()
            .map_err(|e| {
                StoryreelError::from(ConfigError::new(format!(
                    "Failed to build configuration: {}",
                    e
                )))
            })?
            .try_deserialize()
            .map_err(|e| {
                StoryreelError::from(ConfigError::new(format!(
                    "Failed to parse configuration: {}",
                    e
                )))
            })?;

        config.validate()?;
        Ok(config)
    }

    /// Reject values the pipeline cannot run with.
    pub fn validate(&self) -> StoryreelResult<()> {
        if self.generation.batch_size == 0 {
            return Err(ConfigError::new("generation.batch_size must be at least 1").into());
        }
        if self.retry.max_attempts == 0 {
            return Err(ConfigError::new("retry.max_attempts must be at least 1").into());
        }
        if self.license.key_prefix.is_empty() || self.license.key_prefix.contains('-') {
            return Err(ConfigError::new(
                "license.key_prefix must be non-empty and contain no '-'",
            )
            .into());
        }
        if self.license.sweep_interval_secs == 0 {
            return Err(ConfigError::new("license.sweep_interval_secs must be at least 1").into());
        }
        Ok(())
    }
}
