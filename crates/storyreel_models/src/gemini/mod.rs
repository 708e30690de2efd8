//! Google Gemini REST driver.
//!
//! Talks to `models/{model}:generateContent` directly over `reqwest` and asks
//! for a JSON response body. Failures keep their HTTP status so the retry
//! scheduler can tell quota exhaustion (429) from overload (503).

mod client;
mod conversion;

pub use client::GeminiClient;
