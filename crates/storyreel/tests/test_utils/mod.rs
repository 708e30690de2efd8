//! Shared test helpers for facade tests.

use async_trait::async_trait;
use serde_json::json;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use storyreel::{
    GenerateRequest, GenerateResponse, KeyCodec, LicenseAuthority, ScriptDriver,
    StoryreelResult, VerificationOutcome,
};

/// Codec shared by tests that issue keys.
#[allow(dead_code)]
pub fn test_codec() -> KeyCodec {
    KeyCodec::new("REEL", "UNLIMITED", "studio-test-secret")
}

/// Authority with a fixed answer.
pub struct FixedAuthority {
    outcome: Mutex<VerificationOutcome>,
}

impl FixedAuthority {
    /// Authority answering `outcome` to every key.
    pub fn new(outcome: VerificationOutcome) -> Self {
        Self {
            outcome: Mutex::new(outcome),
        }
    }
}

#[async_trait]
impl LicenseAuthority for FixedAuthority {
    async fn verify(&self, _key: &str) -> VerificationOutcome {
        self.outcome.lock().unwrap().clone()
    }
}

/// Driver returning `scenes`-sized batches and counting calls.
pub struct CountingDriver {
    scenes: usize,
    calls: AtomicUsize,
}

#[allow(dead_code)]
impl CountingDriver {
    /// Driver answering every request with `scenes` scenes.
    pub fn new(scenes: usize) -> Self {
        Self {
            scenes,
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of generate calls made.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ScriptDriver for CountingDriver {
    async fn generate(&self, _req: &GenerateRequest) -> StoryreelResult<GenerateResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let scenes: Vec<_> = (0..self.scenes)
            .map(|i| {
                json!({
                    "scene_number": i + 1,
                    "environment": {"location": format!("street {}", i + 1)},
                    "characters": [{"name": "Linh", "body_movement": "walking"}]
                })
            })
            .collect();
        Ok(GenerateResponse::new(
            json!({"story_summary": "Linh walks home.", "scenes": scenes}).to_string(),
        ))
    }

    fn provider_name(&self) -> &'static str {
        "counting"
    }

    fn model_name(&self) -> &str {
        "counting-model"
    }
}
