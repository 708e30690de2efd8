//! Wire types for the Gemini `generateContent` endpoint.

use serde::{Deserialize, Serialize};
use storyreel_core::{GenerateRequest, GenerateResponse, ResponseFormat};
use storyreel_error::{GenerationError, GenerationErrorKind, StoryreelResult};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GeminiRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GeminiGenerationConfig>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

/// Convert a Storyreel request to the Gemini wire format.
pub(crate) fn to_gemini_request(req: &GenerateRequest) -> GeminiRequest {
    let response_mime_type = match req.response_format() {
        ResponseFormat::Json => Some("application/json"),
        ResponseFormat::Text => None,
    };
    let generation_config = (response_mime_type.is_some() || req.temperature().is_some())
        .then(|| GeminiGenerationConfig {
            response_mime_type,
            temperature: *req.temperature(),
        });

    GeminiRequest {
        contents: vec![Content {
            role: Some("user".to_string()),
            parts: vec![Part {
                text: Some(req.prompt().clone()),
            }],
        }],
        generation_config,
    }
}

/// Concatenate the text parts of the first candidate.
///
/// # Errors
///
/// `MalformedResponse` when the prompt was blocked or no candidate carries text.
pub(crate) fn from_gemini_response(response: &GeminiResponse) -> StoryreelResult<GenerateResponse> {
    if let Some(reason) = response
        .prompt_feedback
        .as_ref()
        .and_then(|f| f.block_reason.as_ref())
    {
        return Err(GenerationError::new(GenerationErrorKind::MalformedResponse(format!(
            "prompt blocked: {}",
            reason
        )))
        .into());
    }

    let candidate = response.candidates.first().ok_or_else(|| {
        GenerationError::new(GenerationErrorKind::MalformedResponse(
            "response has no candidates".to_string(),
        ))
    })?;

    let text: String = candidate
        .content
        .iter()
        .flat_map(|c| c.parts.iter())
        .filter_map(|p| p.text.as_deref())
        .collect();

    if text.trim().is_empty() {
        return Err(GenerationError::new(GenerationErrorKind::MalformedResponse(format!(
            "empty response (finish reason: {})",
            candidate.finish_reason.as_deref().unwrap_or("unknown")
        )))
        .into());
    }

    Ok(GenerateResponse::new(text))
}
