//! Profile and prompt commands behind the `vocab-chat` subcommands.
//!
//! Each function returns the text to print, or an error message. They take
//! any [`ProfileStore`] so tests can run them against an in-memory store.

use std::sync::Arc;

use vocab_tutor::prelude::*;

/// Answers collected by `vocab-chat profile set`.
#[derive(Debug, Clone)]
pub struct ProfileAnswers {
    pub id: String,
    pub goal: LearningGoal,
    pub level: ProficiencyLevel,
    pub style: LearningStyle,
    pub interests: Vec<ReadingInterest>,
    pub words: Vec<String>,
}

impl ProfileAnswers {
    pub fn into_profile(self) -> UserProfile {
        let mut profile = self
            .interests
            .into_iter()
            .fold(
                UserProfile::new(self.id, self.goal, self.level, self.style),
                UserProfile::with_interest,
            );
        for word in &self.words {
            profile.add_custom_word(word);
        }
        profile
    }
}

/// Render a profile for the terminal.
pub fn format_profile(profile: &UserProfile) -> String {
    let interests = if profile.reading_interests.is_empty() {
        "(none)".to_string()
    } else {
        profile
            .reading_interests
            .iter()
            .map(|i| i.label())
            .collect::<Vec<_>>()
            .join(", ")
    };
    let words = if profile.custom_words.is_empty() {
        "(none)".to_string()
    } else {
        profile.custom_words.join(", ")
    };
    format!(
        "id:          {}\n\
         goal:        {}\n\
         level:       {}\n\
         style:       {}\n\
         interests:   {interests}\n\
         words:       {words}\n\
         updated:     {}",
        profile.id,
        profile.learning_goal,
        profile.proficiency_level,
        profile.learning_style,
        profile.last_updated.to_rfc3339(),
    )
}

/// Render a prompt with its provenance.
pub fn format_prompt(prompt: &Prompt, source: PromptSource) -> String {
    format!(
        "id:     {}\ntype:   {}\nsource: {source}\nactive: {}\norder:  {}\n\n{}",
        prompt.id, prompt.prompt_type, prompt.is_active, prompt.order, prompt.content
    )
}

pub async fn show_profile(store: &dyn ProfileStore) -> Result<String, String> {
    let blob = store
        .load_profile_blob()
        .await
        .map_err(|e| format!("failed to read profile: {e}"))?;
    match blob {
        None => Ok("No profile saved. Run `vocab-chat profile set` to create one.".to_string()),
        Some(blob) => {
            let profile = UserProfile::from_json(&blob)
                .map_err(|e| format!("stored profile is unreadable: {e}"))?;
            Ok(format_profile(&profile))
        }
    }
}

/// Save the answers and report the prompt they now resolve to.
pub async fn set_profile(
    store: Arc<dyn ProfileStore>,
    answers: ProfileAnswers,
) -> Result<String, String> {
    let profile = answers.into_profile();
    store
        .save_profile(&profile)
        .await
        .map_err(|e| format!("failed to save profile: {e}"))?;

    let manager = PromptManager::new(store);
    manager.initialize().await;
    manager.update_with_profile(profile.clone()).await;

    Ok(format!(
        "Saved profile.\n\n{}\n\nActive prompt source: {}",
        format_profile(&profile),
        manager.current_source()
    ))
}

pub async fn clear_profile(store: &dyn ProfileStore) -> Result<String, String> {
    store
        .clear_profile()
        .await
        .map_err(|e| format!("failed to clear profile: {e}"))?;
    Ok("Profile cleared.".to_string())
}

pub async fn show_prompt(store: Arc<dyn ProfileStore>) -> Result<String, String> {
    let manager = PromptManager::new(store);
    manager.initialize().await;
    Ok(format_prompt(
        &manager.current_prompt(),
        manager.current_source(),
    ))
}

pub fn show_default_prompt() -> String {
    format_prompt(&Prompt::default_prompt(), PromptSource::Default)
}

pub async fn set_custom_prompt(
    store: &dyn ProfileStore,
    content: &str,
    active: bool,
    order: i32,
) -> Result<String, String> {
    if content.trim().is_empty() {
        return Err("custom prompt content must not be empty".to_string());
    }
    let prompt = Prompt {
        order,
        ..Prompt::custom(content.trim()).with_active(active)
    };
    store
        .save_custom_prompt(&prompt)
        .await
        .map_err(|e| format!("failed to save custom prompt: {e}"))?;
    Ok(if active {
        "Custom prompt saved and active.".to_string()
    } else {
        "Custom prompt saved (inactive; profile or default prompt stays in effect).".to_string()
    })
}

pub async fn clear_custom_prompt(store: &dyn ProfileStore) -> Result<String, String> {
    store
        .clear_custom_prompt()
        .await
        .map_err(|e| format!("failed to clear custom prompt: {e}"))?;
    Ok("Custom prompt cleared.".to_string())
}
