//! Model drivers for Storyreel.
//!
//! Each provider sits behind its own feature flag.
//!
//! # Available Providers
//!
//! - **Gemini** (Google) - Enable with `gemini` feature (on by default)
//!
//! # Example
//!
//! ```no_run
//! # #[cfg(feature = "gemini")]
//! # {
//! use storyreel_core::GenerateRequest;
//! use storyreel_interface::ScriptDriver;
//! use storyreel_models::GeminiClient;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let client = GeminiClient::new("gemini-2.5-flash")?;
//! let request = GenerateRequest::builder().prompt("Write one scene as JSON").build()?;
//! let response = client.generate(&request).await?;
//! println!("{}", response.text);
//! # Ok(())
//! # }
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

#[cfg(feature = "gemini")]
mod gemini;

#[cfg(feature = "gemini")]
pub use gemini::GeminiClient;
