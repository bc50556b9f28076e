//! Tutor configuration with sensible defaults.
//!
//! [`TutorConfig`] captures what the command-line tutor needs and converts
//! it into vocab-tutor types via [`chat_settings`](TutorConfig::chat_settings),
//! [`build_store`](TutorConfig::build_store) and
//! [`build_client`](TutorConfig::build_client).

use std::path::PathBuf;
use std::sync::Arc;

use vocab_tutor::session::ChatSettings;
use vocab_tutor::store::FileProfileStore;
use vocab_tutor::{API_KEY_ENV, CHAT_COMPLETIONS_URL, ChatClient, ChatError, DEFAULT_MODEL};

/// Directory name used when no platform data directory is available.
const FALLBACK_DATA_DIR: &str = ".vocab-tutor";

/// Configuration for a tutor session.
#[derive(Debug, Clone, PartialEq)]
pub struct TutorConfig {
    /// Model identifier. Default: [`DEFAULT_MODEL`].
    pub model: String,
    /// Chat completions URL. Default: [`CHAT_COMPLETIONS_URL`].
    pub endpoint: String,
    /// Sampling temperature. Default: `0.7`.
    pub temperature: f32,
    /// Maximum tokens per reply. Default: `1024`.
    pub max_tokens: u32,
    /// Exchanges kept in chat history. Default: `20`.
    pub max_turns: usize,
    /// Where `profile.json` and `custom_prompt.json` live.
    /// Default: the platform data directory for `vocab-tutor`.
    pub data_dir: PathBuf,
}

impl Default for TutorConfig {
    fn default() -> Self {
        let chat = ChatSettings::default();
        Self {
            model: DEFAULT_MODEL.to_string(),
            endpoint: CHAT_COMPLETIONS_URL.to_string(),
            temperature: chat.temperature,
            max_tokens: chat.max_tokens,
            max_turns: chat.max_turns,
            data_dir: default_data_dir(),
        }
    }
}

/// Platform data directory (e.g. `~/.local/share/vocab-tutor`), or
/// `./.vocab-tutor` when the home directory cannot be determined.
pub fn default_data_dir() -> PathBuf {
    directories::ProjectDirs::from("", "", "vocab-tutor")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from(FALLBACK_DATA_DIR))
}

impl TutorConfig {
    pub fn chat_settings(&self) -> ChatSettings {
        ChatSettings {
            model: self.model.clone(),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            max_turns: self.max_turns,
        }
    }

    pub fn build_store(&self) -> Arc<FileProfileStore> {
        Arc::new(FileProfileStore::new(&self.data_dir))
    }

    /// Build a chat client, reading the key from [`API_KEY_ENV`].
    pub fn build_client(&self) -> Result<ChatClient, ChatError> {
        let api_key =
            std::env::var(API_KEY_ENV).map_err(|_| ChatError::MissingApiKey(API_KEY_ENV))?;
        self.build_client_with_key(api_key)
    }

    pub fn build_client_with_key(&self, api_key: String) -> Result<ChatClient, ChatError> {
        ChatClient::with_endpoint(api_key, &self.endpoint)
    }
}
