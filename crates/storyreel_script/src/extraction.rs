//! Pulling the JSON payload out of model responses.
//!
//! Models are asked for bare JSON but still wrap it in markdown fences or
//! surround it with prose now and then.

use crate::RawScene;
use serde_json::Value;
use storyreel_error::{GenerationError, GenerationErrorKind, StoryreelResult};

/// One parsed batch response.
#[derive(Debug, Clone, Default)]
pub struct RawBatch {
    /// Story summary, when the model produced one
    pub story_summary: Option<String>,
    /// Scenes in response order
    pub scenes: Vec<RawScene>,
}

/// Extract the JSON document from a response that may contain markdown or prose.
///
/// Strategies, in order:
/// 1. A fenced code block (```` ```json ```` or a bare fence)
/// 2. The first balanced `{ ... }` or `[ ... ]`, whichever opens first
///
/// # Errors
///
/// `MalformedResponse` when no JSON-looking text is found.
///
/// # Examples
///
/// ```
/// use storyreel_script::extract_json;
///
/// let response = "Here you go:\n```json\n{\"scenes\": []}\n```\nEnjoy!";
/// assert_eq!(extract_json(response).unwrap(), "{\"scenes\": []}");
/// ```
pub fn extract_json(response: &str) -> StoryreelResult<String> {
    if let Some(json) = extract_from_code_block(response) {
        return Ok(json);
    }

    let (first, second) = match (response.find('['), response.find('{')) {
        (Some(bracket), Some(brace)) if bracket < brace => (('[', ']'), ('{', '}')),
        _ => (('{', '}'), ('[', ']')),
    };
    if let Some(json) = extract_balanced(response, first.0, first.1)
        .or_else(|| extract_balanced(response, second.0, second.1))
    {
        return Ok(json);
    }

    tracing::error!(response_length = response.len(), "No JSON found in model response");
    Err(GenerationError::new(GenerationErrorKind::MalformedResponse(format!(
        "no JSON found in response (length: {})",
        response.len()
    )))
    .into())
}

/// Parse a batch response into a summary and tolerant scene records.
///
/// Accepts `{"story_summary": ..., "scenes": [...]}` (with common key
/// aliases), a bare array of scenes, or a single scene object under
/// `scenes`.
///
/// # Errors
///
/// `MalformedResponse` when the text holds no JSON, the JSON does not parse,
/// or it contains no scenes.
pub fn parse_batch_response(response: &str) -> StoryreelResult<RawBatch> {
    let json = extract_json(response)?;
    let value: Value = serde_json::from_str(&json).map_err(|e| {
        let preview: String = json.chars().take(100).collect();
        tracing::error!(error = %e, json_preview = %preview, "Model JSON did not parse");
        GenerationError::new(GenerationErrorKind::MalformedResponse(format!(
            "invalid JSON: {}",
            e
        )))
    })?;

    let (story_summary, scenes) = match &value {
        Value::Array(items) => (None, items.clone()),
        Value::Object(object) => {
            let summary = ["story_summary", "storySummary", "summary"]
                .iter()
                .find_map(|key| object.get(*key))
                .and_then(Value::as_str)
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty());
            let scenes = ["scenes", "prompts", "shots"]
                .iter()
                .find_map(|key| object.get(*key))
                .map(|scenes| match scenes {
                    Value::Array(items) => items.clone(),
                    other => vec![other.clone()],
                })
                .unwrap_or_default();
            (summary, scenes)
        }
        _ => (None, Vec::new()),
    };

    let scenes: Vec<RawScene> = scenes
        .iter()
        .filter(|item| item.is_object())
        .enumerate()
        .map(|(i, item)| RawScene::from_value(item, i as u32 + 1))
        .collect();

    if scenes.is_empty() {
        tracing::error!("Model response contained no scenes");
        return Err(GenerationError::new(GenerationErrorKind::MalformedResponse(
            "response contains no scenes".to_string(),
        ))
        .into());
    }

    Ok(RawBatch {
        story_summary,
        scenes,
    })
}

fn extract_from_code_block(response: &str) -> Option<String> {
    if let Some(start) = response.find("```json") {
        let content_start = start + "```json".len();
        let content = match response[content_start..].find("```") {
            Some(end) => &response[content_start..content_start + end],
            // Truncated response, take the rest
            None => &response[content_start..],
        };
        return Some(content.trim().to_string());
    }

    let start = response.find("```")?;
    let content_start = start + 3;
    // Skip an optional language tag
    let skip_to = response[content_start..]
        .find('\n')
        .map(|n| content_start + n + 1)
        .unwrap_or(content_start);
    let content = match response[skip_to..].find("```") {
        Some(end) => &response[skip_to..skip_to + end],
        None => &response[skip_to..],
    };
    Some(content.trim().to_string())
}

/// First `open ... close` span with matching nesting, ignoring delimiters inside strings.
fn extract_balanced(response: &str, open: char, close: char) -> Option<String> {
    let start = response.find(open)?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escape_next = false;

    for (i, ch) in response[start..].char_indices() {
        if escape_next {
            escape_next = false;
            continue;
        }
        match ch {
            '\\' if in_string => escape_next = true,
            '"' => in_string = !in_string,
            c if c == open && !in_string => depth += 1,
            c if c == close && !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some(response[start..start + i + c.len_utf8()].to_string());
                }
            }
            _ => {}
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_bare_fence() {
        let response = "```\n[{\"scene\": 1}]\n```";
        assert_eq!(extract_json(response).unwrap(), "[{\"scene\": 1}]");
    }

    #[test]
    fn test_extract_from_prose() {
        let response = r#"Sure! {"scenes": [{"note": "a } inside"}]} Hope this helps."#;
        assert_eq!(
            extract_json(response).unwrap(),
            r#"{"scenes": [{"note": "a } inside"}]}"#
        );
    }

    #[test]
    fn test_truncated_fence_takes_rest() {
        let response = "```json\n{\"scenes\": []}";
        assert_eq!(extract_json(response).unwrap(), "{\"scenes\": []}");
    }

    #[test]
    fn test_no_json_is_malformed() {
        let err = extract_json("I cannot help with that.").unwrap_err();
        assert!(matches!(
            err.generation_kind(),
            Some(GenerationErrorKind::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_parse_batch_aliases() {
        let batch = parse_batch_response(
            r#"{"storySummary": " A fox learns to fly. ", "shots": [{"sceneNumber": 4}, {"scene": 9}]}"#,
        )
        .unwrap();
        assert_eq!(batch.story_summary.as_deref(), Some("A fox learns to fly."));
        assert_eq!(batch.scenes.len(), 2);
    }

    #[test]
    fn test_parse_bare_array() {
        let batch = parse_batch_response(r#"[{"environment": "beach"}]"#).unwrap();
        assert!(batch.story_summary.is_none());
        assert_eq!(batch.scenes.len(), 1);
    }

    #[test]
    fn test_empty_scenes_is_malformed() {
        let err = parse_batch_response(r#"{"story_summary": "x", "scenes": []}"#).unwrap_err();
        assert!(matches!(
            err.generation_kind(),
            Some(GenerationErrorKind::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_invalid_json_is_malformed() {
        let err = parse_batch_response(r#"{"scenes": [1, 2,"#).unwrap_err();
        assert!(matches!(
            err.generation_kind(),
            Some(GenerationErrorKind::MalformedResponse(_))
        ));
    }
}
