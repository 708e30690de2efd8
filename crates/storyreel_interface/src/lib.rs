//! Trait definitions for the Storyreel script generator.
//!
//! The pipeline talks to the outside world through three seams:
//! - [`ScriptDriver`]: the generative text service
//! - [`LicenseAuthority`]: the remote license server
//! - [`ActivationStore`]: the durable slot holding the active license key

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod traits;
mod types;

pub use traits::{ActivationStore, LicenseAuthority, ScriptDriver};
pub use types::VerificationOutcome;
