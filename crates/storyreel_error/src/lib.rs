//! Error types for the Storyreel workspace.
//!
//! # Error Hierarchy
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - All constructors use `#[track_caller]` for automatic location capture
//!
//! Every wrapper converts into [`StoryreelError`], so `?` works across crates.
//!
//! # Examples
//!
//! ```
//! use storyreel_error::{StoryreelResult, LicenseError, LicenseErrorKind};
//!
//! fn check() -> StoryreelResult<()> {
//!     Err(LicenseError::new(LicenseErrorKind::Locked))?
//! }
//!
//! match check() {
//!     Ok(()) => println!("unlocked"),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod builder;
mod config;
mod error;
mod generation;
mod http;
mod json;
mod license;
mod storage;
mod verification;

pub use builder::{BuilderError, BuilderErrorKind};
pub use config::ConfigError;
pub use error::{StoryreelError, StoryreelErrorKind, StoryreelResult};
pub use generation::{GenerationError, GenerationErrorKind, TransientClass};
pub use http::HttpError;
pub use json::JsonError;
pub use license::{LicenseError, LicenseErrorKind};
pub use storage::{StorageError, StorageErrorKind};
pub use verification::{VerificationError, VerificationErrorKind};
