//! Selects the active system prompt from the available sources.
//!
//! Precedence, highest first:
//!
//! 1. an active custom prompt with non-blank content,
//! 2. a prompt synthesized from the learner's [`UserProfile`],
//! 3. the built-in [`Prompt::default_prompt`].
//!
//! Resolution is total. Every profile answer maps to a fixed descriptor
//! clause through an exhaustive `match`, so adding an answer to one of the
//! questionnaire enums fails to compile until it has a clause here.

use crate::profile::{LearningGoal, LearningStyle, ProficiencyLevel, ReadingInterest, UserProfile};

use super::record::{PROFILE_PROMPT_ID, Prompt, PromptType};

/// Joins interest labels inside the reading clause.
const INTEREST_SEPARATOR: &str = ", ";

/// Which precedence tier produced a resolved prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptSource {
    Custom,
    Profile,
    Default,
}

impl std::fmt::Display for PromptSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PromptSource::Custom => write!(f, "custom"),
            PromptSource::Profile => write!(f, "profile"),
            PromptSource::Default => write!(f, "default"),
        }
    }
}

/// Resolve the active prompt. See the module docs for precedence.
pub fn resolve(custom: Option<&Prompt>, profile: Option<&UserProfile>) -> Prompt {
    resolve_with_source(custom, profile).0
}

/// Like [`resolve`], also reporting which tier won.
pub fn resolve_with_source(
    custom: Option<&Prompt>,
    profile: Option<&UserProfile>,
) -> (Prompt, PromptSource) {
    if let Some(custom) = custom.filter(|p| p.is_usable()) {
        return (custom.clone(), PromptSource::Custom);
    }
    match profile {
        Some(profile) => (profile_prompt(profile), PromptSource::Profile),
        None => (Prompt::default_prompt(), PromptSource::Default),
    }
}

/// Synthesize the personalized prompt for `profile`.
pub fn profile_prompt(profile: &UserProfile) -> Prompt {
    Prompt {
        id: PROFILE_PROMPT_ID.to_string(),
        content: render_profile_prompt(profile),
        prompt_type: PromptType::Default,
        is_active: true,
        order: 0,
    }
}

fn render_profile_prompt(profile: &UserProfile) -> String {
    let level = proficiency_clause(profile.proficiency_level);
    let goal = goal_clause(profile.learning_goal);
    let reading = interests_clause(profile.reading_interests.iter());
    let style = style_clause(profile.learning_style);

    format!(
        "\
You are a patient and encouraging English vocabulary tutor. Adapt every reply to this learner:
- {level}.
- {goal}.
- Their reading practice {reading}.
- {style}.

When you respond:
1. Pitch explanations and examples at the learner's level described above.
2. Connect new words to the learner's goal and reading topics whenever it fits naturally.
3. For each new word give its meaning, part of speech and one example sentence.
4. Point out mistakes in the learner's English gently and show the corrected form.
5. Keep replies short and end with a question or small task that keeps the learner practicing.
6. Reply in English unless the learner explicitly asks for a translation."
    )
}

pub(crate) fn proficiency_clause(level: ProficiencyLevel) -> &'static str {
    match level {
        ProficiencyLevel::Beginner => {
            "The learner is a beginner who needs simple words, short sentences and plenty of everyday examples"
        }
        ProficiencyLevel::Intermediate => {
            "The learner is at an intermediate level and is ready for common idioms, collocations and longer sentences"
        }
        ProficiencyLevel::Advanced => {
            "The learner is advanced and benefits from nuanced vocabulary, formal registers and subtle differences between near-synonyms"
        }
    }
}

pub(crate) fn goal_clause(goal: LearningGoal) -> &'static str {
    match goal {
        LearningGoal::Exam => {
            "They are preparing for an English exam, so prioritize high-frequency test vocabulary and exam-style usage"
        }
        LearningGoal::Abroad => {
            "They plan to study or live abroad, so prioritize words for daily life, travel and campus situations"
        }
        LearningGoal::Work => {
            "They need English for work, so prioritize professional vocabulary for emails, meetings and presentations"
        }
        LearningGoal::Interest => {
            "They are learning out of personal interest, so keep sessions relaxed and explore words they find curious"
        }
    }
}

/// Interests are listed in the order given; an empty iterator yields the
/// general-vocabulary clause.
pub(crate) fn interests_clause<'a>(interests: impl Iterator<Item = &'a ReadingInterest>) -> String {
    let labels: Vec<&str> = interests.map(ReadingInterest::label).collect();
    if labels.is_empty() {
        "covers general vocabulary across domains".to_string()
    } else {
        format!("focuses on {}", labels.join(INTEREST_SEPARATOR))
    }
}

pub(crate) fn style_clause(style: LearningStyle) -> &'static str {
    match style {
        LearningStyle::Practice => {
            "They learn best through practice, so favor exercises, quizzes and fill-in-the-blank drills"
        }
        LearningStyle::AiExplain => {
            "They prefer detailed explanations, so explain word origins, usage rules and common pitfalls"
        }
        LearningStyle::Conversation => {
            "They learn best through conversation, so weave new words into a natural back-and-forth dialogue"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::record::DEFAULT_PROMPT_ID;

    fn profile(
        level: ProficiencyLevel,
        goal: LearningGoal,
        interests: &[ReadingInterest],
        style: LearningStyle,
    ) -> UserProfile {
        interests.iter().fold(
            UserProfile::new("u1", goal, level, style),
            |p, &i| p.with_interest(i),
        )
    }

    fn beginner_exam_practice() -> UserProfile {
        profile(
            ProficiencyLevel::Beginner,
            LearningGoal::Exam,
            &[],
            LearningStyle::Practice,
        )
    }

    /// Every subset of interests, each in declaration order.
    fn interest_subsets() -> Vec<Vec<ReadingInterest>> {
        (0u8..16)
            .map(|mask| {
                ReadingInterest::ALL
                    .iter()
                    .enumerate()
                    .filter(|(i, _)| mask & (1 << i) != 0)
                    .map(|(_, &interest)| interest)
                    .collect()
            })
            .collect()
    }

    #[test]
    fn every_profile_yields_active_default_type_prompt() {
        let mut seen = 0;
        for level in ProficiencyLevel::ALL {
            for goal in LearningGoal::ALL {
                for style in LearningStyle::ALL {
                    for interests in interest_subsets() {
                        let p = profile(level, goal, &interests, style);
                        let prompt = resolve(None, Some(&p));
                        assert!(!prompt.content.trim().is_empty());
                        assert_eq!(prompt.prompt_type, PromptType::Default);
                        assert!(prompt.is_active);
                        assert_eq!(prompt.id, PROFILE_PROMPT_ID);
                        assert_eq!(prompt.order, 0);
                        seen += 1;
                    }
                }
            }
        }
        assert_eq!(seen, 3 * 4 * 3 * 16);
    }

    #[test]
    fn no_sources_yields_default_prompt() {
        let (prompt, source) = resolve_with_source(None, None);
        assert_eq!(prompt, Prompt::default_prompt());
        assert_eq!(prompt.id, DEFAULT_PROMPT_ID);
        assert_eq!(source, PromptSource::Default);
    }

    #[test]
    fn active_custom_prompt_wins_unchanged() {
        let custom = Prompt {
            id: "mine".into(),
            content: "Only teach me phrasal verbs.".into(),
            prompt_type: PromptType::Custom,
            is_active: true,
            order: 7,
        };
        let p = beginner_exam_practice();
        assert_eq!(resolve(Some(&custom), Some(&p)), custom);
        assert_eq!(resolve(Some(&custom), None), custom);
        assert_eq!(
            resolve_with_source(Some(&custom), None).1,
            PromptSource::Custom
        );
    }

    #[test]
    fn inactive_custom_prompt_falls_through_to_profile() {
        let custom = Prompt::custom("Ignore me.").with_active(false);
        let p = beginner_exam_practice();
        let resolved = resolve(Some(&custom), Some(&p));
        assert_eq!(resolved, profile_prompt(&p));
        assert_ne!(resolved.content, custom.content);
    }

    #[test]
    fn inactive_custom_prompt_without_profile_falls_to_default() {
        let custom = Prompt::custom("Ignore me.").with_active(false);
        assert_eq!(resolve(Some(&custom), None), Prompt::default_prompt());
    }

    #[test]
    fn blank_active_custom_prompt_is_skipped() {
        let custom = Prompt::custom("   ");
        assert_eq!(resolve(Some(&custom), None), Prompt::default_prompt());
    }

    #[test]
    fn beginner_exam_empty_practice_clauses_once_in_order() {
        let content = resolve(None, Some(&beginner_exam_practice())).content;
        let clauses = [
            proficiency_clause(ProficiencyLevel::Beginner),
            goal_clause(LearningGoal::Exam),
            "covers general vocabulary across domains",
            style_clause(LearningStyle::Practice),
        ];
        let mut last = 0;
        for clause in clauses {
            assert_eq!(content.matches(clause).count(), 1, "clause: {clause}");
            let at = content.find(clause).unwrap();
            assert!(at >= last, "clause out of order: {clause}");
            last = at;
        }
    }

    #[test]
    fn interests_listed_in_supplied_order() {
        let p = profile(
            ProficiencyLevel::Advanced,
            LearningGoal::Work,
            &[ReadingInterest::Game, ReadingInterest::Business, ReadingInterest::Novel],
            LearningStyle::Conversation,
        );
        let content = profile_prompt(&p).content;
        assert!(content.contains("focuses on gaming, business, novels and literature"));
        assert!(!content.contains("general vocabulary across domains"));
    }

    #[test]
    fn template_has_six_numbered_directives() {
        let content = profile_prompt(&beginner_exam_practice()).content;
        for n in 1..=6 {
            assert!(content.contains(&format!("\n{n}. ")), "missing directive {n}");
        }
        assert!(!content.contains("\n7. "));
    }

    #[test]
    fn clauses_are_distinct_per_answer() {
        let levels: std::collections::HashSet<_> =
            ProficiencyLevel::ALL.iter().map(|&l| proficiency_clause(l)).collect();
        let goals: std::collections::HashSet<_> =
            LearningGoal::ALL.iter().map(|&g| goal_clause(g)).collect();
        let styles: std::collections::HashSet<_> =
            LearningStyle::ALL.iter().map(|&s| style_clause(s)).collect();
        assert_eq!(levels.len(), 3);
        assert_eq!(goals.len(), 4);
        assert_eq!(styles.len(), 3);
    }

    #[test]
    fn resolution_is_deterministic() {
        let p = beginner_exam_practice().with_interest(ReadingInterest::Tech);
        assert_eq!(profile_prompt(&p), profile_prompt(&p));
    }
}
