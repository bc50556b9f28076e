//! Closed answer sets for each questionnaire question.
//!
//! Serialization writes the canonical `SCREAMING_SNAKE_CASE` name.
//! Deserialization goes through [`FromStr`], which ignores case and treats
//! `-` and `_` alike, so `"ai-explain"` reads as [`LearningStyle::AiExplain`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Normalize a user- or storage-supplied enum name for matching.
fn normalize(raw: &str) -> String {
    raw.trim().to_ascii_uppercase().replace(['-', ' '], "_")
}

/// Why the learner is studying vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", try_from = "String")]
pub enum LearningGoal {
    Exam,
    Abroad,
    Work,
    Interest,
}

impl LearningGoal {
    pub const ALL: [LearningGoal; 4] = [
        LearningGoal::Exam,
        LearningGoal::Abroad,
        LearningGoal::Work,
        LearningGoal::Interest,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LearningGoal::Exam => "EXAM",
            LearningGoal::Abroad => "ABROAD",
            LearningGoal::Work => "WORK",
            LearningGoal::Interest => "INTEREST",
        }
    }
}

impl FromStr for LearningGoal {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "EXAM" => Ok(LearningGoal::Exam),
            "ABROAD" => Ok(LearningGoal::Abroad),
            "WORK" => Ok(LearningGoal::Work),
            "INTEREST" => Ok(LearningGoal::Interest),
            _ => Err(format!(
                "unknown learning goal '{s}' (expected exam, abroad, work or interest)"
            )),
        }
    }
}

/// Reading topics the learner enjoys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", try_from = "String")]
pub enum ReadingInterest {
    Novel,
    Tech,
    Business,
    Game,
}

impl ReadingInterest {
    pub const ALL: [ReadingInterest; 4] = [
        ReadingInterest::Novel,
        ReadingInterest::Tech,
        ReadingInterest::Business,
        ReadingInterest::Game,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReadingInterest::Novel => "NOVEL",
            ReadingInterest::Tech => "TECH",
            ReadingInterest::Business => "BUSINESS",
            ReadingInterest::Game => "GAME",
        }
    }

    /// Human-readable topic name used inside prompts.
    pub fn label(&self) -> &'static str {
        match self {
            ReadingInterest::Novel => "novels and literature",
            ReadingInterest::Tech => "technology",
            ReadingInterest::Business => "business",
            ReadingInterest::Game => "gaming",
        }
    }
}

impl FromStr for ReadingInterest {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "NOVEL" => Ok(ReadingInterest::Novel),
            "TECH" => Ok(ReadingInterest::Tech),
            "BUSINESS" => Ok(ReadingInterest::Business),
            "GAME" => Ok(ReadingInterest::Game),
            _ => Err(format!(
                "unknown reading interest '{s}' (expected novel, tech, business or game)"
            )),
        }
    }
}

/// Self-assessed vocabulary level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", try_from = "String")]
pub enum ProficiencyLevel {
    Beginner,
    Intermediate,
    Advanced,
}

impl ProficiencyLevel {
    pub const ALL: [ProficiencyLevel; 3] = [
        ProficiencyLevel::Beginner,
        ProficiencyLevel::Intermediate,
        ProficiencyLevel::Advanced,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProficiencyLevel::Beginner => "BEGINNER",
            ProficiencyLevel::Intermediate => "INTERMEDIATE",
            ProficiencyLevel::Advanced => "ADVANCED",
        }
    }
}

impl FromStr for ProficiencyLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "BEGINNER" => Ok(ProficiencyLevel::Beginner),
            "INTERMEDIATE" => Ok(ProficiencyLevel::Intermediate),
            "ADVANCED" => Ok(ProficiencyLevel::Advanced),
            _ => Err(format!(
                "unknown proficiency level '{s}' (expected beginner, intermediate or advanced)"
            )),
        }
    }
}

/// How the learner prefers to be taught.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", try_from = "String")]
pub enum LearningStyle {
    Practice,
    AiExplain,
    Conversation,
}

impl LearningStyle {
    pub const ALL: [LearningStyle; 3] = [
        LearningStyle::Practice,
        LearningStyle::AiExplain,
        LearningStyle::Conversation,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LearningStyle::Practice => "PRACTICE",
            LearningStyle::AiExplain => "AI_EXPLAIN",
            LearningStyle::Conversation => "CONVERSATION",
        }
    }
}

impl FromStr for LearningStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "PRACTICE" => Ok(LearningStyle::Practice),
            "AI_EXPLAIN" => Ok(LearningStyle::AiExplain),
            "CONVERSATION" => Ok(LearningStyle::Conversation),
            _ => Err(format!(
                "unknown learning style '{s}' (expected practice, ai-explain or conversation)"
            )),
        }
    }
}

macro_rules! string_conversions {
    ($($ty:ty),+) => {$(
        impl TryFrom<String> for $ty {
            type Error = String;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                value.parse()
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    )+};
}

string_conversions!(LearningGoal, ReadingInterest, ProficiencyLevel, LearningStyle);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_matches_serialized_name() {
        for style in LearningStyle::ALL {
            let json = serde_json::to_string(&style).unwrap();
            assert_eq!(json, format!("\"{style}\""));
        }
        for goal in LearningGoal::ALL {
            let json = serde_json::to_string(&goal).unwrap();
            assert_eq!(json, format!("\"{goal}\""));
        }
    }

    #[test]
    fn parse_ignores_case_and_separators() {
        assert_eq!("ai-explain".parse::<LearningStyle>(), Ok(LearningStyle::AiExplain));
        assert_eq!("Ai Explain".parse::<LearningStyle>(), Ok(LearningStyle::AiExplain));
        assert_eq!(" exam ".parse::<LearningGoal>(), Ok(LearningGoal::Exam));
        assert_eq!("Tech".parse::<ReadingInterest>(), Ok(ReadingInterest::Tech));
        assert_eq!(
            "intermediate".parse::<ProficiencyLevel>(),
            Ok(ProficiencyLevel::Intermediate)
        );
    }

    #[test]
    fn parse_rejects_unknown_names() {
        let err = "expert".parse::<ProficiencyLevel>().unwrap_err();
        assert!(err.contains("expert"));
        assert!("".parse::<LearningGoal>().is_err());
    }

    #[test]
    fn every_name_roundtrips_through_parse() {
        for interest in ReadingInterest::ALL {
            assert_eq!(interest.as_str().parse::<ReadingInterest>(), Ok(interest));
        }
        for level in ProficiencyLevel::ALL {
            assert_eq!(level.as_str().parse::<ProficiencyLevel>(), Ok(level));
        }
    }
}
