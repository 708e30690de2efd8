//! Prompt composition for batch and extension requests.

use storyreel_core::{Scene, VideoGenerationOptions};

/// Rolling context carried from one batch to the next.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchContext {
    /// Summary produced by the first batch
    pub story_summary: String,
    /// End state of the previous batch's last scene
    pub previous_context_summary: String,
    /// Number of the first scene the next batch must produce
    pub next_start_index: u32,
}

impl BatchContext {
    /// Context for the first batch.
    pub fn start() -> Self {
        Self {
            next_start_index: 1,
            ..Self::default()
        }
    }
}

const RESPONSE_SCHEMA: &str = r#"{
  "story_summary": "two or three sentences covering the whole story",
  "scenes": [
    {
      "scene_number": 1,
      "time_window": [0, 5],
      "continuity_note": "how this scene follows the previous one",
      "environment": { "location": "", "time_of_day": "", "weather": "", "lighting": "", "details": "" },
      "characters": [
        { "name": "", "appearance": "", "outfit": "", "body_movement": "", "expression": "" }
      ],
      "camera": { "shot": "", "angle": "", "movement": "" },
      "style": "",
      "dialogue": [ { "speaker": "", "line": "" } ]
    }
  ]
}"#;

fn dialogue_rule(options: &VideoGenerationOptions) -> String {
    let language = options.dialogue_language();
    if language.has_dialogue() {
        format!(
            "Write every dialogue line in {}. Keep lines short enough to speak within the scene's time window.",
            language.prompt_name()
        )
    } else {
        "Scenes have no spoken dialogue: leave every \"dialogue\" array empty.".to_string()
    }
}

fn prompt_type_rule(options: &VideoGenerationOptions) -> String {
    match options.prompt_type() {
        Some(kind) if !kind.trim().is_empty() => {
            format!("Shape every scene so it works as a prompt for {}.\n", kind.trim())
        }
        _ => String::new(),
    }
}

/// Prompt for one batch of `count` scenes.
///
/// The first batch is told to start the story and write a summary. Later
/// batches get the summary and a note on where the previous batch ended.
pub fn batch_prompt(options: &VideoGenerationOptions, context: &BatchContext, count: u32) -> String {
    let first = context.next_start_index;
    let last = first + count.saturating_sub(1);

    let story = if first == 1 {
        format!(
            "Start the story from the beginning. The full story runs {} scenes; plan it so it can be told completely in that length, and write a short \"story_summary\" of the whole plot.",
            options.prompt_count()
        )
    } else {
        let mut text = format!(
            "Continue the story. Story so far: {}\nThe full story runs {} scenes; do not end it early.",
            if context.story_summary.is_empty() {
                "(no summary available)"
            } else {
                context.story_summary.as_str()
            },
            options.prompt_count()
        );
        if !context.previous_context_summary.is_empty() {
            text.push_str(&format!(
                "\nContinuity: {} Open scene {} from exactly that state.",
                context.previous_context_summary, first
            ));
        }
        text
    };

    format!(
        "You are a storyboard writer for short AI-generated videos.\n\
         Story idea: {idea}\n\
         Visual style: {style}\n\
         {story}\n\n\
         Write exactly {count} scenes, numbered {first} to {last}. Each scene lasts about 5 seconds.\n\
         Keep characters' names, appearance and outfits identical across scenes.\n\
         {dialogue}\n\
         {prompt_type}\
         Respond with JSON only, in this shape:\n{schema}",
        idea = options.idea().trim(),
        style = options.style().trim(),
        story = story,
        count = count,
        first = first,
        last = last,
        dialogue = dialogue_rule(options),
        prompt_type = prompt_type_rule(options),
        schema = RESPONSE_SCHEMA,
    )
}

/// Prompt continuing an existing script after `last_scene`.
pub fn extension_prompt(
    last_scene: &Scene,
    extension_idea: &str,
    count: u32,
    options: &VideoGenerationOptions,
) -> String {
    let first = last_scene.scene_number() + 1;
    let last = first + count.saturating_sub(1);
    let direction = if extension_idea.trim().is_empty() {
        "Continue naturally from where the story left off.".to_string()
    } else {
        format!("Where the story goes next: {}", extension_idea.trim())
    };

    format!(
        "You are a storyboard writer extending an existing AI video script.\n\
         Original story idea: {idea}\n\
         Visual style: {style}\n\
         The script currently ends with scene {previous}: {description}\n\
         {direction}\n\n\
         Write exactly {count} new scenes, numbered {first} to {last}, that pick up directly from scene {previous}.\n\
         Keep characters' names, appearance and outfits identical to the existing script.\n\
         {dialogue}\n\
         {prompt_type}\
         Respond with JSON only, in this shape:\n{schema}",
        idea = options.idea().trim(),
        style = options.style().trim(),
        previous = last_scene.scene_number(),
        description = last_scene.script_description(),
        direction = direction,
        count = count,
        first = first,
        last = last,
        dialogue = dialogue_rule(options),
        prompt_type = prompt_type_rule(options),
        schema = RESPONSE_SCHEMA,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use storyreel_core::DialogueLanguage;

    fn options(language: DialogueLanguage) -> VideoGenerationOptions {
        VideoGenerationOptions::builder()
            .idea("A paper boat sails across a flooded city")
            .style("watercolor")
            .prompt_count(23u32)
            .dialogue_language(language)
            .build()
            .unwrap()
    }

    #[test]
    fn test_first_batch_starts_story() {
        let prompt = batch_prompt(&options(DialogueLanguage::English), &BatchContext::start(), 10);
        assert!(prompt.contains("Start the story"));
        assert!(prompt.contains("numbered 1 to 10"));
        assert!(prompt.contains("in English"));
        assert!(!prompt.contains("Continuity:"));
    }

    #[test]
    fn test_later_batch_carries_context() {
        let context = BatchContext {
            story_summary: "A boat finds its way home.".to_string(),
            previous_context_summary: "The previous scene ended at the bridge.".to_string(),
            next_start_index: 21,
        };
        let prompt = batch_prompt(&options(DialogueLanguage::Vietnamese), &context, 3);
        assert!(prompt.contains("Story so far: A boat finds its way home."));
        assert!(prompt.contains("Continuity: The previous scene ended at the bridge."));
        assert!(prompt.contains("numbered 21 to 23"));
        assert!(prompt.contains("in Vietnamese"));
    }

    #[test]
    fn test_no_dialogue_rule() {
        let prompt = batch_prompt(&options(DialogueLanguage::NoDialogue), &BatchContext::start(), 1);
        assert!(prompt.contains("no spoken dialogue"));
    }

    #[test]
    fn test_extension_prompt_embeds_last_scene() {
        let scene = Scene::new(23, "Scene 23 (0s-5s) | Setting: harbor", "{}", "harbor");
        let prompt = extension_prompt(&scene, "a storm arrives", 5, &options(DialogueLanguage::English));
        assert!(prompt.contains("ends with scene 23: Scene 23 (0s-5s) | Setting: harbor"));
        assert!(prompt.contains("numbered 24 to 28"));
        assert!(prompt.contains("a storm arrives"));
    }
}
