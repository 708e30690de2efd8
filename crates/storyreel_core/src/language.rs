//! Dialogue language selection.

use serde::{Deserialize, Serialize};

/// Language spoken in generated dialogue.
///
/// # Examples
///
/// ```
/// use std::str::FromStr;
/// use storyreel_core::DialogueLanguage;
///
/// let lang = DialogueLanguage::from_str("vietnamese").unwrap();
/// assert_eq!(lang, DialogueLanguage::Vietnamese);
/// assert_eq!(lang.to_string(), "vietnamese");
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum DialogueLanguage {
    /// English
    #[default]
    English,
    /// Vietnamese
    Vietnamese,
    /// Spanish
    Spanish,
    /// French
    French,
    /// German
    German,
    /// Japanese
    Japanese,
    /// Korean
    Korean,
    /// Mandarin Chinese
    Chinese,
    /// Scenes carry no spoken lines
    #[strum(serialize = "none")]
    #[serde(rename = "none")]
    NoDialogue,
}

impl DialogueLanguage {
    /// Name used inside prompts.
    pub fn prompt_name(&self) -> &'static str {
        match self {
            DialogueLanguage::English => "English",
            DialogueLanguage::Vietnamese => "Vietnamese",
            DialogueLanguage::Spanish => "Spanish",
            DialogueLanguage::French => "French",
            DialogueLanguage::German => "German",
            DialogueLanguage::Japanese => "Japanese",
            DialogueLanguage::Korean => "Korean",
            DialogueLanguage::Chinese => "Mandarin Chinese",
            DialogueLanguage::NoDialogue => "no dialogue",
        }
    }

    /// Whether scenes should contain spoken lines at all.
    pub fn has_dialogue(&self) -> bool {
        !matches!(self, DialogueLanguage::NoDialogue)
    }
}
