//! Script generation command handlers.

use super::commands::OutputFormat;
use super::setup::{CliStudio, build_studio};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use storyreel::{
    BuilderError, BuilderErrorKind, DialogueLanguage, JsonError, ProgressEvent, Script,
    StorageError, StorageErrorKind, StoryreelConfig, StoryreelResult, VideoGenerationOptions,
};
use tracing::{info, warn};

/// A script together with the options it was generated from.
///
/// This is the JSON file format read by `extend`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedScript {
    /// Options the script was generated with
    pub options: VideoGenerationOptions,
    /// The generated script
    pub script: Script,
}

impl SavedScript {
    /// Read a saved script from disk.
    pub fn load(path: &Path) -> StoryreelResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            StorageError::new(StorageErrorKind::FileRead(format!("{}: {}", path.display(), e)))
        })?;
        serde_json::from_str(&text).map_err(|e| {
            JsonError::new(format!("Invalid script file {}: {}", path.display(), e)).into()
        })
    }

    /// Render in the requested format.
    pub fn render(&self, format: OutputFormat) -> StoryreelResult<String> {
        let scenes = self.script.scenes();
        let text = match format {
            OutputFormat::Json => serde_json::to_string_pretty(self)
                .map_err(|e| JsonError::new(format!("Failed to serialize script: {}", e)))?,
            OutputFormat::Human => {
                let mut text = format!("Story: {}\n", self.script.story_summary());
                for scene in scenes {
                    text.push_str(&format!("\n{}\n", scene.script_description()));
                }
                text
            }
            OutputFormat::Prompts => scenes
                .iter()
                .map(|s| s.generation_prompt().as_str())
                .collect::<Vec<_>>()
                .join("\n"),
            OutputFormat::JsonPrompts => scenes
                .iter()
                .map(|s| s.json_prompt().as_str())
                .collect::<Vec<_>>()
                .join("\n"),
        };
        Ok(text)
    }
}

/// Arguments of the `generate` command.
#[derive(Debug)]
pub struct GenerateArgs {
    /// Story idea
    pub idea: String,
    /// Visual style
    pub style: String,
    /// Number of scenes
    pub count: u32,
    /// Dialogue language
    pub language: DialogueLanguage,
    /// Target prompt flavour
    pub prompt_type: Option<String>,
    /// Output file
    pub output: Option<PathBuf>,
    /// Output format
    pub format: OutputFormat,
}

fn print_progress(event: &ProgressEvent) {
    eprintln!("… {}", event);
}

fn write_output(text: &str, output: Option<&Path>) -> StoryreelResult<()> {
    match output {
        Some(path) => {
            std::fs::write(path, text).map_err(|e| {
                StorageError::new(StorageErrorKind::FileWrite(format!(
                    "{}: {}",
                    path.display(),
                    e
                )))
            })?;
            info!(path = %path.display(), "Script written");
        }
        None => println!("{}", text),
    }
    Ok(())
}

/// Check the stored key and keep the expiry sweep running for the session.
async fn unlocked_studio(config: &StoryreelConfig) -> StoryreelResult<CliStudio> {
    let studio = build_studio(config)?;
    let state = studio.check_saved_key().await;
    if let Some(error) = &state.error {
        warn!(%error, "License check failed");
    }
    // Detached; ends with the guard
    let _sweep = studio
        .guard()
        .spawn_expiry_sweep(config.license.sweep_interval());
    Ok(studio)
}

/// Generate a script and write it out.
pub async fn handle_generate(config: &StoryreelConfig, args: GenerateArgs) -> StoryreelResult<()> {
    let mut builder = VideoGenerationOptions::builder();
    builder
        .idea(args.idea)
        .style(args.style)
        .prompt_count(args.count)
        .dialogue_language(args.language);
    if let Some(prompt_type) = args.prompt_type {
        builder.prompt_type(prompt_type);
    }
    let options = builder
        .build()
        .map_err(|e| BuilderError::new(BuilderErrorKind::ValidationFailed(e.to_string())))?;

    let studio = unlocked_studio(config).await?;
    let script = studio.generate_script(&options, &print_progress).await?;
    info!(scenes = script.scenes().len(), "Script generated");

    let saved = SavedScript { options, script };
    write_output(&saved.render(args.format)?, args.output.as_deref())
}

/// Append scenes to a saved script.
pub async fn handle_extend(
    config: &StoryreelConfig,
    path: &Path,
    idea: &str,
    count: u32,
    output: Option<&Path>,
) -> StoryreelResult<()> {
    let mut saved = SavedScript::load(path)?;
    let last_scene = saved.script.last_scene().cloned().ok_or_else(|| {
        BuilderError::new(BuilderErrorKind::ValidationFailed(format!(
            "{} contains no scenes",
            path.display()
        )))
    })?;

    let studio = unlocked_studio(config).await?;
    let scenes = studio
        .extend_script(&last_scene, idea, count, &saved.options, &print_progress)
        .await?;
    info!(added = scenes.len(), "Script extended");
    saved.script.append(scenes);

    write_output(
        &saved.render(OutputFormat::Json)?,
        Some(output.unwrap_or(path)),
    )
}
