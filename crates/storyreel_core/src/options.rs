//! User-supplied generation options.

use crate::DialogueLanguage;
use derive_getters::Getters;
use serde::{Deserialize, Serialize};

/// What the user asked for: the story idea and how the shot-list should look.
///
/// # Examples
///
/// ```
/// use storyreel_core::{DialogueLanguage, VideoGenerationOptions};
///
/// let options = VideoGenerationOptions::builder()
///     .idea("A lighthouse keeper befriends a stranded whale")
///     .style("Pixar-style 3D animation")
///     .prompt_count(23u32)
///     .dialogue_language(DialogueLanguage::English)
///     .build()
///     .unwrap();
///
/// assert_eq!(*options.prompt_count(), 23);
/// assert!(options.prompt_type().is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, derive_builder::Builder)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct VideoGenerationOptions {
    /// Story idea in the user's own words
    idea: String,
    /// Visual style applied to every scene
    style: String,
    /// Number of scenes to generate (at least 1)
    prompt_count: u32,
    /// Language of spoken lines
    #[builder(default)]
    #[serde(default)]
    dialogue_language: DialogueLanguage,
    /// Optional target prompt flavour (e.g. a video model name)
    #[builder(default, setter(into, strip_option))]
    #[serde(default)]
    prompt_type: Option<String>,
}

impl VideoGenerationOptions {
    /// Start building options.
    pub fn builder() -> VideoGenerationOptionsBuilder {
        VideoGenerationOptionsBuilder::default()
    }
}

impl VideoGenerationOptionsBuilder {
    fn validate(&self) -> Result<(), String> {
        if let Some(0) = self.prompt_count {
            return Err("prompt_count must be at least 1".to_string());
        }
        if let Some(idea) = &self.idea
            && idea.trim().is_empty()
        {
            return Err("idea must not be empty".to_string());
        }
        Ok(())
    }
}
