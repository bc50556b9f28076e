//! Convenience re-exports for common usage.
//!
//! ```ignore
//! use vocab_tutor::prelude::*;
//! ```

// Chat client and message types.
pub use crate::{
    API_KEY_ENV, CHAT_COMPLETIONS_URL, ChatBackend, ChatClient, ChatReply, ChatRequest,
    DEFAULT_MODEL, Message, MessageRole,
};

// Errors.
pub use crate::error::{ChatError, PromptParseError, StoreError};

// Profile.
pub use crate::profile::{
    LearningGoal, LearningStyle, ProficiencyLevel, ReadingInterest, UserProfile,
};

// Prompt selection.
pub use crate::prompt::{ManagerState, Prompt, PromptManager, PromptSource, PromptType, resolve};

// Session.
pub use crate::session::{ChatSettings, TutorSession};

// Storage.
pub use crate::store::{FileProfileStore, MemoryProfileStore, ProfileStore};
