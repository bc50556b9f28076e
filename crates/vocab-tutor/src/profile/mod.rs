//! Learner profile gathered by the onboarding questionnaire.
//!
//! A [`UserProfile`] is persisted as a single JSON object (camelCase keys,
//! `SCREAMING_SNAKE_CASE` enum values) and loaded once per
//! [`PromptManager`](crate::prompt::PromptManager) session. Parsing is
//! lenient: unknown keys are ignored, enum names match case-insensitively,
//! and scalar fields accept the coercions described in [`crate::lenient`].

mod choices;

pub use choices::{LearningGoal, LearningStyle, ProficiencyLevel, ReadingInterest};

use chrono::{DateTime, SubsecRound, Utc};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use crate::lenient;

/// Questionnaire answers that drive prompt personalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(default, deserialize_with = "lenient::string_or_default")]
    pub id: String,
    pub learning_goal: LearningGoal,
    /// Interests in the order the learner picked them. May be empty.
    #[serde(default)]
    pub reading_interests: IndexSet<ReadingInterest>,
    pub proficiency_level: ProficiencyLevel,
    /// Words the learner asked to practice, in entry order.
    #[serde(default)]
    pub custom_words: Vec<String>,
    pub learning_style: LearningStyle,
    #[serde(
        default = "epoch",
        deserialize_with = "lenient::millis_or_epoch",
        serialize_with = "lenient::serialize_millis"
    )]
    pub last_updated: DateTime<Utc>,
}

fn epoch() -> DateTime<Utc> {
    DateTime::<Utc>::UNIX_EPOCH
}

/// Current time at the millisecond precision `lastUpdated` is stored with.
fn now_millis() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

impl UserProfile {
    /// Create a profile with no interests or custom words, stamped now.
    pub fn new(
        id: impl Into<String>,
        learning_goal: LearningGoal,
        proficiency_level: ProficiencyLevel,
        learning_style: LearningStyle,
    ) -> Self {
        Self {
            id: id.into(),
            learning_goal,
            reading_interests: IndexSet::new(),
            proficiency_level,
            custom_words: Vec::new(),
            learning_style,
            last_updated: now_millis(),
        }
    }

    /// Builder-style interest append. Re-adding an interest keeps its
    /// original position.
    pub fn with_interest(mut self, interest: ReadingInterest) -> Self {
        self.reading_interests.insert(interest);
        self
    }

    /// Add a practice word. Blank input and exact duplicates are ignored.
    /// Returns whether the word was added.
    pub fn add_custom_word(&mut self, word: &str) -> bool {
        let word = word.trim();
        if word.is_empty() || self.custom_words.iter().any(|w| w == word) {
            return false;
        }
        self.custom_words.push(word.to_string());
        true
    }

    /// Refresh `last_updated` to the current time.
    pub fn touch(&mut self) {
        self.last_updated = now_millis();
    }

    /// Parse a stored profile blob.
    pub fn from_json(blob: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(blob)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
