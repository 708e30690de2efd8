//! License activation for Storyreel.
//!
//! - [`KeyCodec`]: offline key format (parse, sign, validate, issue)
//! - [`HttpLicenseAuthority`]: the remote license server
//! - [`MemoryActivationStore`] / [`FileActivationStore`]: the persisted key slot
//! - [`LicenseGuard`]: the state machine gating the app
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use storyreel_license::{FileActivationStore, HttpLicenseAuthority, KeyCodec, LicenseGuard};
//! use storyreel_retry::StoryreelConfig;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = StoryreelConfig::load()?;
//! let guard = Arc::new(LicenseGuard::new(
//!     HttpLicenseAuthority::new(&config.license)?,
//!     FileActivationStore::default_location(&config.license.namespace)?,
//!     KeyCodec::from_config(&config.license),
//! ));
//! guard.check_saved_key().await;
//! let _sweep = guard.spawn_expiry_sweep(config.license.sweep_interval());
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod authority;
mod codec;
mod guard;
mod store;

pub use authority::{HttpLicenseAuthority, classify_verify_response};
pub use codec::{KeyCodec, KeyExpiry, ParsedKey, Remaining};
pub use guard::{ActivationPhase, ActivationSource, ActivationState, LicenseGuard, SubmitOutcome};
pub use store::{FileActivationStore, MemoryActivationStore};
