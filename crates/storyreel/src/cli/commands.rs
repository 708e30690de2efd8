//! CLI command definitions.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use storyreel::DialogueLanguage;

/// Storyreel - turn a story idea into a shot-list of AI video prompts
#[derive(Parser, Debug)]
#[command(name = "storyreel")]
#[command(about = "Turn a story idea into a shot-list of AI video prompts", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Read configuration from this file only
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Verify a license key and store it
    Activate {
        /// License key, e.g. REEL-UNLIMITED-PRO-1A2B3C
        key: String,
    },

    /// Show the activation state of the stored key
    Status,

    /// Forget the stored key
    Logout,

    /// Generate a new script
    Generate {
        /// Story idea
        #[arg(long)]
        idea: String,

        /// Visual style applied to every scene
        #[arg(long, default_value = "cinematic, photorealistic")]
        style: String,

        /// Number of scenes
        #[arg(short = 'n', long, default_value = "10")]
        count: u32,

        /// Dialogue language (english, vietnamese, ..., no_dialogue)
        #[arg(long, default_value = "english")]
        language: DialogueLanguage,

        /// Target prompt flavour, e.g. a video model name
        #[arg(long)]
        prompt_type: Option<String>,

        /// Write the script to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format
        #[arg(long, default_value = "json")]
        format: OutputFormat,
    },

    /// Append scenes to a saved script
    Extend {
        /// Script file written by `generate --format json`
        script: PathBuf,

        /// Where the story should go next
        #[arg(long, default_value = "")]
        idea: String,

        /// Number of scenes to add
        #[arg(short = 'n', long, default_value = "5")]
        count: u32,

        /// Write the extended script here instead of overwriting the input
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Issue an offline-verifiable license key
    Keygen {
        /// Days until the key expires; omit for an unlimited key
        #[arg(long)]
        days: Option<u32>,

        /// License type code
        #[arg(long = "type", default_value = "PRO")]
        type_code: String,
    },
}

/// Output format options
#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum OutputFormat {
    /// Options and script as JSON, reloadable by `extend`
    Json,
    /// Numbered scene descriptions
    Human,
    /// One video generation prompt per line
    Prompts,
    /// One JSON prompt per line
    JsonPrompts,
}
