//! Personalized system prompts and a chat client for a vocabulary tutor.
//!
//! `vocab-tutor` turns a learner's questionnaire answers into the system
//! prompt that steers a remote chat model. The pieces, leaf to root:
//!
//! - [`store::ProfileStore`] persists the [`UserProfile`](profile::UserProfile)
//!   and an optional custom [`Prompt`](prompt::Prompt) as JSON blobs.
//! - [`prompt::resolve`] picks the active prompt: an active custom prompt,
//!   else one synthesized from the profile, else the built-in default.
//! - [`prompt::PromptManager`] loads both records, caches the resolved prompt
//!   and re-resolves when the profile changes. It never returns an error;
//!   a broken store only means falling back to the default prompt.
//! - [`ChatClient`] sends the cached prompt plus conversation history to an
//!   OpenAI-compatible chat completions endpoint, and
//!   [`session::TutorSession`] keeps that history.
//!
//! # Getting started
//!
//! ```ignore
//! use std::sync::Arc;
//! use vocab_tutor::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), ChatError> {
//!     let store = Arc::new(FileProfileStore::new("./data"));
//!     let manager = Arc::new(PromptManager::new(store));
//!     manager.initialize().await;
//!
//!     let client = ChatClient::from_env()?;
//!     let mut session = TutorSession::new(manager, ChatSettings::default());
//!     let reply = session.send(&client, "What does 'meticulous' mean?").await?;
//!     println!("{reply}");
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod prelude;
pub mod profile;
pub mod prompt;
pub mod session;
pub mod store;

mod lenient;

use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;
use std::time::{Duration, Instant};
use tracing::{debug, trace};

pub use error::{ChatError, PromptParseError, StoreError};

// ── Constants ──────────────────────────────────────────────────────

pub const CHAT_COMPLETIONS_URL: &str = "https://openrouter.ai/api/v1/chat/completions";

/// Default model for tutor conversations.
pub const DEFAULT_MODEL: &str = "openai/gpt-4o-mini";

/// Environment variable holding the chat API key.
pub const API_KEY_ENV: &str = "VOCAB_TUTOR_API_KEY";

/// Connect and read timeout for chat requests. No retries are attempted.
pub const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

// ── Message types ──────────────────────────────────────────────────

/// Role of a message in the conversation.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

impl std::fmt::Display for MessageRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MessageRole::System => write!(f, "system"),
            MessageRole::User => write!(f, "user"),
            MessageRole::Assistant => write!(f, "assistant"),
        }
    }
}

/// A message in the conversation.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }
}

// ── Request / response types ───────────────────────────────────────

/// Chat completion request body.
#[derive(Serialize, Debug, Default, Clone)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<Message>,
    #[serde(skip_serializing_if = "is_zero_u32")]
    pub max_tokens: u32,
    pub temperature: f32,
}

fn is_zero_u32(v: &u32) -> bool {
    *v == 0
}

#[derive(Deserialize, Debug)]
struct RawChatResponse {
    choices: Option<Vec<RawChoice>>,
    error: Option<ApiErrorResponse>,
    #[serde(default)]
    usage: Option<UsageInfo>,
}

#[derive(Deserialize, Debug)]
struct RawChoice {
    message: RawResponseMessage,
    finish_reason: Option<String>,
}

#[derive(Deserialize, Debug)]
struct RawResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize, Debug)]
struct ApiErrorResponse {
    message: String,
}

/// Token usage statistics.
#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct UsageInfo {
    pub prompt_tokens: Option<u32>,
    pub completion_tokens: Option<u32>,
    pub total_tokens: Option<u32>,
}

/// The assistant's reply to one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatReply {
    pub content: String,
    pub usage: Option<UsageInfo>,
    pub finish_reason: Option<String>,
}

/// Interpret a response body. Split out from [`ChatClient::chat`] so the
/// parsing rules can be tested without a server.
fn parse_chat_response(text: &str) -> Result<ChatReply, ChatError> {
    let parsed: RawChatResponse = serde_json::from_str(text).map_err(ChatError::Parse)?;

    if let Some(err) = parsed.error {
        return Err(ChatError::Api(err.message));
    }

    if let Some(ref usage) = parsed.usage {
        debug!(
            "Token usage: prompt={}, completion={}, total={}",
            usage.prompt_tokens.unwrap_or(0),
            usage.completion_tokens.unwrap_or(0),
            usage.total_tokens.unwrap_or(0),
        );
    }

    let choice = parsed
        .choices
        .and_then(|c| c.into_iter().next())
        .ok_or(ChatError::EmptyReply)?;
    let content = choice
        .message
        .content
        .filter(|c| !c.trim().is_empty())
        .ok_or(ChatError::EmptyReply)?;
    debug!("LLM output: {} chars", content.len());

    Ok(ChatReply {
        content,
        usage: parsed.usage,
        finish_reason: choice.finish_reason,
    })
}

// ── Client ─────────────────────────────────────────────────────────

/// Boxed future returned by [`ChatBackend::complete`].
pub type ChatFuture<'a> = Pin<Box<dyn Future<Output = Result<ChatReply, ChatError>> + Send + 'a>>;

/// Anything that can answer a [`ChatRequest`].
///
/// [`ChatClient`] is the HTTP implementation; tests and embedders can
/// supply their own.
pub trait ChatBackend: Send + Sync {
    fn complete<'a>(&'a self, request: &'a ChatRequest) -> ChatFuture<'a>;
}

/// Async HTTP client for an OpenAI-compatible chat completions endpoint.
pub struct ChatClient {
    client: reqwest::Client,
    api_key: String,
    endpoint: String,
}

impl std::fmt::Debug for ChatClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatClient")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

impl ChatClient {
    /// Create a client for the default endpoint.
    pub fn new(api_key: impl Into<String>) -> Result<Self, ChatError> {
        Self::with_endpoint(api_key, CHAT_COMPLETIONS_URL)
    }

    /// Create a client using the key from [`API_KEY_ENV`].
    pub fn from_env() -> Result<Self, ChatError> {
        let api_key =
            std::env::var(API_KEY_ENV).map_err(|_| ChatError::MissingApiKey(API_KEY_ENV))?;
        Self::new(api_key)
    }

    /// Create a client for a custom endpoint URL.
    pub fn with_endpoint(
        api_key: impl Into<String>,
        endpoint: impl Into<String>,
    ) -> Result<Self, ChatError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(ChatError::MissingApiKey(API_KEY_ENV));
        }
        let client = reqwest::Client::builder()
            .user_agent(concat!("vocab-tutor/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(HTTP_TIMEOUT)
            .read_timeout(HTTP_TIMEOUT)
            .build()
            .map_err(ChatError::Client)?;
        Ok(Self {
            client,
            api_key,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Send a chat completion request and return the first choice's text.
    pub async fn chat(&self, body: &ChatRequest) -> Result<ChatReply, ChatError> {
        debug!(
            "LLM request: model={}, messages={}, max_tokens={}, temp={}",
            body.model,
            body.messages.len(),
            body.max_tokens,
            body.temperature,
        );
        trace!(
            "Request payload size: {} bytes",
            serde_json::to_string(body).map_or(0, |s| s.len())
        );

        let start = Instant::now();

        let resp = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await
            .map_err(ChatError::Http)?;

        let status = resp.status();
        let text = resp.text().await.map_err(ChatError::Http)?;

        debug!(
            "LLM response: HTTP {} in {:.1}s ({} bytes)",
            status,
            start.elapsed().as_secs_f64(),
            text.len()
        );

        if !status.is_success() {
            return Err(ChatError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        parse_chat_response(&text)
    }
}

impl ChatBackend for ChatClient {
    fn complete<'a>(&'a self, request: &'a ChatRequest) -> ChatFuture<'a> {
        Box::pin(self.chat(request))
    }
}
