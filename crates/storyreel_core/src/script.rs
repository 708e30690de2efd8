//! The script model: a story summary and its ordered scenes.

use derive_getters::Getters;
use serde::{Deserialize, Serialize};

/// One normalized script unit.
///
/// `json_prompt` and `generation_prompt` never contain line breaks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct Scene {
    /// Position in the script, starting at 1
    scene_number: u32,
    /// Human-readable, pipe-joined description
    script_description: String,
    /// Canonical nested JSON prompt serialized on one line
    json_prompt: String,
    /// Plain-text prompt for a video model, on one line
    generation_prompt: String,
}

impl Scene {
    /// Create a scene.
    pub fn new(
        scene_number: u32,
        script_description: impl Into<String>,
        json_prompt: impl Into<String>,
        generation_prompt: impl Into<String>,
    ) -> Self {
        Self {
            scene_number,
            script_description: script_description.into(),
            json_prompt: json_prompt.into(),
            generation_prompt: generation_prompt.into(),
        }
    }

    /// Move the scene to another position.
    ///
    /// The scene number embedded in `json_prompt` is rewritten as well so the
    /// two never disagree.
    pub fn renumber(&mut self, scene_number: u32) {
        self.scene_number = scene_number;
        if let Ok(mut value) = serde_json::from_str::<serde_json::Value>(&self.json_prompt)
            && let Some(object) = value.as_object_mut()
        {
            object.insert("scene".to_string(), serde_json::Value::from(scene_number));
            if let Ok(line) = serde_json::to_string(&value) {
                self.json_prompt = line;
            }
        }
    }
}

/// An assembled shot-list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct Script {
    /// Story summary produced with the first batch
    story_summary: String,
    /// Scenes in order, numbered 1..=n
    scenes: Vec<Scene>,
}

impl Script {
    /// Create a script.
    pub fn new(story_summary: impl Into<String>, scenes: Vec<Scene>) -> Self {
        Self {
            story_summary: story_summary.into(),
            scenes,
        }
    }

    /// The final scene, if any.
    pub fn last_scene(&self) -> Option<&Scene> {
        self.scenes.last()
    }

    /// Append scenes produced by an extension call.
    pub fn append(&mut self, scenes: impl IntoIterator<Item = Scene>) {
        self.scenes.extend(scenes);
    }

    /// Consume the script, returning its scenes.
    pub fn into_scenes(self) -> Vec<Scene> {
        self.scenes
    }
}
