//! Error types for the store and chat layers.
//!
//! [`StoreError`] never escapes [`PromptManager`](crate::prompt::PromptManager):
//! store failures are logged there and treated as "no record". It does reach
//! direct callers of a [`ProfileStore`](crate::store::ProfileStore).
//! [`ChatError`] is returned by [`ChatClient`](crate::ChatClient) and
//! [`TutorSession::send`](crate::session::TutorSession::send).

use thiserror::Error;

/// Failure reading or writing a persisted blob.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The underlying filesystem (or host store) failed.
    #[error("store I/O failed for {key}: {source}")]
    Io {
        key: &'static str,
        #[source]
        source: std::io::Error,
    },

    /// A record could not be serialized for writing.
    #[error("failed to serialize {key}: {source}")]
    Serialize {
        key: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// Host-provided store reported a failure of its own.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Failure talking to the chat-completion endpoint.
#[derive(Error, Debug)]
pub enum ChatError {
    #[error("API key not set (expected in {0})")]
    MissingApiKey(&'static str),

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("request failed: {0}")]
    Http(#[source] reqwest::Error),

    #[error("chat API HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("failed to parse response: {0}")]
    Parse(#[source] serde_json::Error),

    #[error("chat API error: {0}")]
    Api(String),

    #[error("empty reply from model")]
    EmptyReply,
}

/// A stored custom prompt blob that cannot be used.
#[derive(Error, Debug)]
pub enum PromptParseError {
    #[error("malformed prompt JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("prompt '{id}' has blank content")]
    BlankContent { id: String },
}
