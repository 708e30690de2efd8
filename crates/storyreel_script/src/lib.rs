//! Shot-list generation for Storyreel.
//!
//! [`ScriptOrchestrator`] splits a request into batches, threads the story
//! summary and the previous batch's end state into every prompt, and turns
//! each response into canonical [`Scene`](storyreel_core::Scene)s through the
//! normalizer.
//!
//! # Example
//!
//! ```rust,ignore
//! let orchestrator = ScriptOrchestrator::from_config(driver, &config);
//! let script = orchestrator
//!     .generate(&options, &|event: &ProgressEvent| println!("{}", event))
//!     .await?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod extraction;
mod normalizer;
mod orchestrator;
mod prompt;

pub use extraction::{RawBatch, extract_json, parse_batch_response};
pub use normalizer::{
    RawCamera, RawCharacter, RawDialogue, RawEnvironment, RawScene, clean_attribute,
    clean_for_json, normalize,
};
pub use orchestrator::ScriptOrchestrator;
pub use prompt::{BatchContext, batch_prompt, extension_prompt};
