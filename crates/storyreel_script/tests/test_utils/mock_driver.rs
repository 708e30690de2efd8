//! Mock script driver for testing.

use async_trait::async_trait;
use std::sync::Mutex;
use storyreel_core::{GenerateRequest, GenerateResponse};
use storyreel_error::{GenerationError, GenerationErrorKind, StoryreelResult};
use storyreel_interface::ScriptDriver;

/// A single mock response (success or error).
#[derive(Debug, Clone)]
#[allow(dead_code)]
pub enum MockResponse {
    Success(String),
    Error(GenerationErrorKind),
}

/// Driver that plays back a fixed sequence of responses and records prompts.
pub struct MockDriver {
    responses: Vec<MockResponse>,
    prompts: Mutex<Vec<String>>,
}

#[allow(dead_code)]
impl MockDriver {
    /// Create a driver with a sequence of responses.
    pub fn new_sequence(responses: Vec<MockResponse>) -> Self {
        Self {
            responses,
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Number of times generate() was called.
    pub fn call_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    /// Prompts received, in order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl ScriptDriver for MockDriver {
    async fn generate(&self, req: &GenerateRequest) -> StoryreelResult<GenerateResponse> {
        let call = {
            let mut prompts = self.prompts.lock().unwrap();
            prompts.push(req.prompt().clone());
            prompts.len() - 1
        };

        match self.responses.get(call) {
            Some(MockResponse::Success(text)) => Ok(GenerateResponse::new(text.clone())),
            Some(MockResponse::Error(kind)) => Err(GenerationError::new(kind.clone()).into()),
            None => Err(GenerationError::new(GenerationErrorKind::Transport(format!(
                "Mock sequence exhausted (call {} beyond {} responses)",
                call + 1,
                self.responses.len()
            )))
            .into()),
        }
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }

    fn model_name(&self) -> &str {
        "mock-model"
    }
}
