//! Core data types for the Storyreel script generator.
//!
//! This crate provides the types shared by the generation pipeline and the
//! activation guard: generation options, the script model, the model request
//! contract and progress reporting.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod language;
mod options;
mod progress;
mod request;
mod script;

pub use language::DialogueLanguage;
pub use options::{VideoGenerationOptions, VideoGenerationOptionsBuilder};
pub use progress::{ProgressEvent, ProgressSink};
pub use request::{GenerateRequest, GenerateRequestBuilder, GenerateResponse, ResponseFormat};
pub use script::{Scene, Script};
