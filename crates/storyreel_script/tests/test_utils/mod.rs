//! Shared test helpers for script generation tests.

mod mock_driver;

pub use mock_driver::{MockDriver, MockResponse};

use serde_json::json;

/// A batch response with `count` scenes, all reporting `reported_number`.
#[allow(dead_code)]
pub fn batch_response(summary: &str, count: usize, reported_number: u32) -> String {
    let scenes: Vec<_> = (0..count)
        .map(|i| {
            json!({
                "scene_number": reported_number,
                "time_window": [0, 5],
                "environment": {"location": format!("location {}", i + 1), "time_of_day": "dusk"},
                "characters": [{"name": "Mai", "outfit": "yellow raincoat", "body_movement": format!("step {}", i + 1)}],
                "camera": {"shot": "wide", "movement": "slow pan"},
                "dialogue": [{"speaker": "Mai", "line": "Where does this go?"}]
            })
        })
        .collect();
    format!(
        "```json\n{}\n```",
        json!({"story_summary": summary, "scenes": scenes})
    )
}
