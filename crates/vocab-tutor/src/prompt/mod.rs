//! System prompt selection: the record type, the resolver and the manager.
//!
//! - [`Prompt`]: a prompt candidate as stored or synthesized.
//! - [`resolve`]: pure precedence rules (custom, then profile, then default).
//! - [`PromptManager`]: loads records from a
//!   [`ProfileStore`](crate::store::ProfileStore), caches the resolved prompt
//!   and re-resolves on profile updates.

pub mod manager;
pub mod record;
pub mod resolver;

pub use manager::{ManagerState, PromptManager};
pub use record::{
    CUSTOM_PROMPT_ID, DEFAULT_PROMPT_CONTENT, DEFAULT_PROMPT_ID, PROFILE_PROMPT_ID, Prompt,
    PromptType,
};
pub use resolver::{PromptSource, profile_prompt, resolve, resolve_with_source};
