//! Request and response types for one model call.

use derive_getters::Getters;
use serde::{Deserialize, Serialize};

/// Response shape the model is asked to produce.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseFormat {
    /// Free-form text
    Text,
    /// A JSON document
    #[default]
    Json,
}

/// One composed prompt sent to the generative text service.
///
/// # Examples
///
/// ```
/// use storyreel_core::{GenerateRequest, ResponseFormat};
///
/// let request = GenerateRequest::builder()
///     .prompt("Write 3 scenes as JSON")
///     .build()
///     .unwrap();
///
/// assert_eq!(*request.response_format(), ResponseFormat::Json);
/// assert!(request.model().is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters, derive_builder::Builder)]
#[builder(setter(into))]
pub struct GenerateRequest {
    /// The full natural-language prompt
    prompt: String,
    /// Requested response shape
    #[builder(default)]
    response_format: ResponseFormat,
    /// Model override (driver default when `None`)
    #[builder(default)]
    model: Option<String>,
    /// Sampling temperature
    #[builder(default)]
    temperature: Option<f32>,
}

impl GenerateRequest {
    /// Start building a request.
    pub fn builder() -> GenerateRequestBuilder {
        GenerateRequestBuilder::default()
    }
}

/// Text returned by the generative text service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateResponse {
    /// Raw response text (expected to contain JSON)
    pub text: String,
}

impl GenerateResponse {
    /// Wrap response text.
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}
