//! Retry scheduling and configuration.
//!
//! Generation calls fail transiently when the service quota is exhausted or
//! the model is overloaded. This crate classifies those failures, computes the
//! wait before the next attempt and drives the attempts with `tokio-retry2`.
//! It also owns the layered TOML configuration shared by the workspace.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod classify;
mod config;
mod scheduler;

pub use classify::{advised_wait, backoff, classify, classify_text};
pub use config::{GenerationConfig, LicenseConfig, RetryConfig, StoryreelConfig};
pub use scheduler::RetryScheduler;
