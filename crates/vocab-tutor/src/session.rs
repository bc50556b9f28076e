//! Conversation state for one tutoring chat.
//!
//! A [`TutorSession`] prepends the manager's current prompt as the system
//! message on every request, so a profile update mid-conversation takes
//! effect on the next turn. History is bounded to the most recent
//! `max_turns` exchanges.

use std::sync::Arc;

use tracing::debug;

use crate::error::ChatError;
use crate::prompt::PromptManager;
use crate::{ChatBackend, ChatRequest, DEFAULT_MODEL, Message};

/// Generation settings for a session.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatSettings {
    /// Model identifier. Default: [`DEFAULT_MODEL`].
    pub model: String,
    /// Sampling temperature. Default: `0.7`.
    pub temperature: f32,
    /// Maximum tokens per reply. Default: `1024`.
    pub max_tokens: u32,
    /// User/assistant exchanges kept in history. Default: `20`.
    pub max_turns: usize,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.7,
            max_tokens: 1024,
            max_turns: 20,
        }
    }
}

pub struct TutorSession {
    manager: Arc<PromptManager>,
    settings: ChatSettings,
    history: Vec<Message>,
}

impl TutorSession {
    pub fn new(manager: Arc<PromptManager>, settings: ChatSettings) -> Self {
        Self {
            manager,
            settings,
            history: Vec::new(),
        }
    }

    pub fn settings(&self) -> &ChatSettings {
        &self.settings
    }

    pub fn history(&self) -> &[Message] {
        &self.history
    }

    /// Forget the conversation. The prompt is unaffected.
    pub fn reset(&mut self) {
        self.history.clear();
    }

    /// Build the request for the next user message without sending it.
    pub fn build_request(&self, user: &str) -> ChatRequest {
        let prompt = self.manager.current_prompt_shared();
        let mut messages = Vec::with_capacity(self.history.len() + 2);
        messages.push(Message::system(prompt.content.as_str()));
        messages.extend(self.history.iter().cloned());
        messages.push(Message::user(user));
        ChatRequest {
            model: self.settings.model.clone(),
            messages,
            max_tokens: self.settings.max_tokens,
            temperature: self.settings.temperature,
        }
    }

    /// Send one user message and record the exchange if the model replied.
    ///
    /// On error the history is left as it was, so the message can be retried.
    pub async fn send(
        &mut self,
        backend: &dyn ChatBackend,
        user: &str,
    ) -> Result<String, ChatError> {
        let request = self.build_request(user);
        let reply = backend.complete(&request).await?;
        self.record_exchange(user, &reply.content);
        Ok(reply.content)
    }

    fn record_exchange(&mut self, user: &str, reply: &str) {
        self.history.push(Message::user(user));
        self.history.push(Message::assistant(reply));

        let limit = self.settings.max_turns.saturating_mul(2);
        if self.history.len() > limit {
            let excess = self.history.len() - limit;
            self.history.drain(..excess);
            debug!("Dropped {excess} old message(s) from chat history");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::{LearningGoal, LearningStyle, ProficiencyLevel, UserProfile};
    use crate::prompt::DEFAULT_PROMPT_CONTENT;
    use crate::store::MemoryProfileStore;
    use crate::{ChatFuture, ChatReply, MessageRole};
    use std::sync::Mutex;

    /// Echoes the user message and remembers every request it saw.
    #[derive(Default)]
    struct EchoBackend {
        seen: Mutex<Vec<ChatRequest>>,
        fail: bool,
    }

    impl ChatBackend for EchoBackend {
        fn complete<'a>(&'a self, request: &'a ChatRequest) -> ChatFuture<'a> {
            self.seen.lock().unwrap().push(request.clone());
            let result = if self.fail {
                Err(ChatError::EmptyReply)
            } else {
                let last = request.messages.last().map(|m| m.content.clone());
                Ok(ChatReply {
                    content: format!("echo: {}", last.unwrap_or_default()),
                    usage: None,
                    finish_reason: Some("stop".into()),
                })
            };
            Box::pin(async move { result })
        }
    }

    fn session(max_turns: usize) -> (TutorSession, Arc<PromptManager>) {
        let manager = Arc::new(PromptManager::new(Arc::new(MemoryProfileStore::new())));
        let settings = ChatSettings {
            max_turns,
            ..Default::default()
        };
        (TutorSession::new(manager.clone(), settings), manager)
    }

    #[test]
    fn request_starts_with_current_prompt() {
        let (s, _) = session(5);
        let req = s.build_request("hello");
        assert_eq!(req.messages.len(), 2);
        assert_eq!(req.messages[0].role, MessageRole::System);
        assert_eq!(req.messages[0].content, DEFAULT_PROMPT_CONTENT);
        assert_eq!(req.messages[1], Message::user("hello"));
        assert_eq!(req.model, DEFAULT_MODEL);
    }

    #[tokio::test]
    async fn send_records_exchange_and_replays_history() {
        let (mut s, _) = session(5);
        let backend = EchoBackend::default();

        let reply = s.send(&backend, "first").await.unwrap();
        assert_eq!(reply, "echo: first");
        s.send(&backend, "second").await.unwrap();

        let seen = backend.seen.lock().unwrap();
        let last = &seen[1];
        let roles: Vec<_> = last.messages.iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            vec![
                MessageRole::System,
                MessageRole::User,
                MessageRole::Assistant,
                MessageRole::User
            ]
        );
        assert_eq!(s.history().len(), 4);
    }

    #[tokio::test]
    async fn failed_send_leaves_history_untouched() {
        let (mut s, _) = session(5);
        let backend = EchoBackend {
            fail: true,
            ..Default::default()
        };
        assert!(s.send(&backend, "hi").await.is_err());
        assert!(s.history().is_empty());
    }

    #[tokio::test]
    async fn history_is_bounded_to_recent_turns() {
        let (mut s, _) = session(2);
        let backend = EchoBackend::default();
        for word in ["one", "two", "three"] {
            s.send(&backend, word).await.unwrap();
        }
        assert_eq!(s.history().len(), 4);
        assert_eq!(s.history()[0], Message::user("two"));
        assert_eq!(s.history()[3], Message::assistant("echo: three"));
    }

    #[tokio::test]
    async fn profile_update_changes_next_system_message() {
        let (mut s, manager) = session(5);
        let backend = EchoBackend::default();
        s.send(&backend, "before").await.unwrap();

        manager
            .update_with_profile(UserProfile::new(
                "u",
                LearningGoal::Work,
                ProficiencyLevel::Advanced,
                LearningStyle::AiExplain,
            ))
            .await;
        s.send(&backend, "after").await.unwrap();

        let seen = backend.seen.lock().unwrap();
        assert_eq!(seen[0].messages[0].content, DEFAULT_PROMPT_CONTENT);
        assert_ne!(seen[1].messages[0].content, DEFAULT_PROMPT_CONTENT);
        assert!(seen[1].messages[0].content.contains("English for work"));
    }

    #[test]
    fn reset_clears_history() {
        let (mut s, _) = session(5);
        s.record_exchange("q", "a");
        s.reset();
        assert!(s.history().is_empty());
    }
}
