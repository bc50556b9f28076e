//! The [`Prompt`] record and the built-in default prompt.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::PromptParseError;
use crate::lenient;

/// Id of the built-in fallback prompt.
pub const DEFAULT_PROMPT_ID: &str = "default_english_learning";

/// Id given to prompts synthesized from a [`UserProfile`](crate::profile::UserProfile).
pub const PROFILE_PROMPT_ID: &str = "profile_based_prompt";

/// Id given to prompts created with [`Prompt::custom`].
pub const CUSTOM_PROMPT_ID: &str = "custom_prompt";

/// Content of the built-in fallback prompt.
pub const DEFAULT_PROMPT_CONTENT: &str = "\
You are a friendly English vocabulary tutor.

Help the learner understand and remember English words:
1. Explain meanings in clear, simple English.
2. Give one or two natural example sentences for every word you introduce.
3. Mention part of speech, common collocations and useful synonyms.
4. Correct the learner's mistakes kindly and show the right form.
5. Keep answers concise and invite the learner to try using the word.";

/// Where a prompt came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", try_from = "String")]
pub enum PromptType {
    /// Built in or synthesized by the app.
    Default,
    /// Authored by the user or an operator.
    Custom,
}

impl PromptType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PromptType::Default => "DEFAULT",
            PromptType::Custom => "CUSTOM",
        }
    }
}

impl FromStr for PromptType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "DEFAULT" => Ok(PromptType::Default),
            "CUSTOM" => Ok(PromptType::Custom),
            _ => Err(format!("unknown prompt type '{s}'")),
        }
    }
}

impl TryFrom<String> for PromptType {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for PromptType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A system prompt candidate.
///
/// Stored custom prompts use the same JSON shape as everything else:
/// `{"id", "content", "type", "isActive", "order"}`. Only `content` is
/// required; a missing `type` reads as `CUSTOM` and a missing `isActive` as
/// `true`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prompt {
    #[serde(default, deserialize_with = "lenient::string_or_default")]
    pub id: String,
    #[serde(deserialize_with = "lenient::string_or_default")]
    pub content: String,
    #[serde(rename = "type", default = "custom_type")]
    pub prompt_type: PromptType,
    #[serde(default = "active", deserialize_with = "lenient::bool_or_true")]
    pub is_active: bool,
    /// Tie-break hint for multi-prompt setups; carried through untouched.
    #[serde(default, deserialize_with = "lenient::i32_or_default")]
    pub order: i32,
}

fn custom_type() -> PromptType {
    PromptType::Custom
}

fn active() -> bool {
    true
}

impl Prompt {
    /// The built-in fallback prompt.
    pub fn default_prompt() -> Self {
        Self {
            id: DEFAULT_PROMPT_ID.to_string(),
            content: DEFAULT_PROMPT_CONTENT.to_string(),
            prompt_type: PromptType::Default,
            is_active: true,
            order: 0,
        }
    }

    /// An active user-authored prompt.
    pub fn custom(content: impl Into<String>) -> Self {
        Self {
            id: CUSTOM_PROMPT_ID.to_string(),
            content: content.into(),
            prompt_type: PromptType::Custom,
            is_active: true,
            order: 0,
        }
    }

    pub fn with_active(mut self, is_active: bool) -> Self {
        self.is_active = is_active;
        self
    }

    pub fn is_default(&self) -> bool {
        self.id == DEFAULT_PROMPT_ID
    }

    /// Whether this record may override profile-based synthesis.
    pub fn is_usable(&self) -> bool {
        self.is_active && !self.content.trim().is_empty()
    }

    /// Parse a stored prompt blob. Blank content is rejected here so a
    /// usable record never carries an empty prompt.
    pub fn from_json(blob: &str) -> Result<Self, PromptParseError> {
        let prompt: Prompt = serde_json::from_str(blob)?;
        if prompt.content.trim().is_empty() {
            return Err(PromptParseError::BlankContent { id: prompt.id });
        }
        Ok(prompt)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
