//! Gemini REST client.

use super::conversion::{GeminiResponse, from_gemini_response, to_gemini_request};
use async_trait::async_trait;
use reqwest::Client;
use storyreel_core::{GenerateRequest, GenerateResponse};
use storyreel_error::{GenerationError, GenerationErrorKind, StoryreelResult};
use storyreel_interface::ScriptDriver;
use tracing::{debug, instrument};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Google Gemini client implementing [`ScriptDriver`].
///
/// No request timeout is set; slow or failing calls are bounded by the retry
/// scheduler's attempt ceiling.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

impl GeminiClient {
    /// Creates a client using `GEMINI_API_KEY` from the environment.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The API key is not set in the environment
    /// - The HTTP client cannot be initialized
    #[instrument(skip_all)]
    pub fn new(model: impl Into<String>) -> StoryreelResult<Self> {
        let api_key = std::env::var("GEMINI_API_KEY")
            .map_err(|_| GenerationError::new(GenerationErrorKind::MissingApiKey))?;
        Self::with_api_key(api_key, model)
    }

    /// Creates a client with a specific API key.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    #[instrument(skip_all)]
    pub fn with_api_key(api_key: impl Into<String>, model: impl Into<String>) -> StoryreelResult<Self> {
        let client = Client::builder().build().map_err(|e| {
            GenerationError::new(GenerationErrorKind::ClientCreation(e.to_string()))
        })?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: model.into(),
        })
    }

    /// Point the client at another API root (proxies, test servers).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/models/{}:generateContent", self.base_url, model)
    }
}

#[async_trait]
impl ScriptDriver for GeminiClient {
    #[instrument(skip(self, req), fields(model))]
    async fn generate(&self, req: &GenerateRequest) -> StoryreelResult<GenerateResponse> {
        let model = req.model().as_deref().unwrap_or(&self.model);
        tracing::Span::current().record("model", model);

        let url = self.endpoint(model);
        debug!(url = %url, prompt_length = req.prompt().len(), "Sending Gemini request");

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&to_gemini_request(req))
            .send()
            .await
            .map_err(|e| {
                GenerationError::new(GenerationErrorKind::Transport(format!(
                    "Request failed: {}",
                    e
                )))
            })?;

        if !response.status().is_success() {
            let status_code = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            debug!(status_code, "Gemini returned an error status");
            return Err(GenerationError::new(GenerationErrorKind::Http {
                status_code,
                message,
            })
            .into());
        }

        let body: GeminiResponse = response.json().await.map_err(|e| {
            GenerationError::new(GenerationErrorKind::MalformedResponse(format!(
                "Failed to parse Gemini response: {}",
                e
            )))
        })?;

        from_gemini_response(&body)
    }

    fn provider_name(&self) -> &'static str {
        "gemini"
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
