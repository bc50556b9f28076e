//! Persistence of the learner profile and the custom prompt.
//!
//! A [`ProfileStore`] holds two independent JSON blobs. Loading returns the
//! raw text; parsing is left to the caller so a corrupt record can be
//! logged and skipped without failing the other one. Two implementations
//! ship with the crate: [`FileProfileStore`] (one file per record) and
//! [`MemoryProfileStore`] (in-process, with injectable read failures).

mod file;
mod memory;

pub use file::FileProfileStore;
pub use memory::MemoryProfileStore;

use std::future::Future;
use std::pin::Pin;

use crate::error::StoreError;
use crate::profile::UserProfile;
use crate::prompt::Prompt;

/// Record key for the learner profile.
pub const PROFILE_KEY: &str = "profile";

/// Record key for the custom prompt.
pub const CUSTOM_PROMPT_KEY: &str = "custom_prompt";

/// Boxed future returned by [`ProfileStore`] methods.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + Send + 'a>>;

/// Blob storage for the two persisted records.
///
/// `Ok(None)` means the record does not exist. Implementations should not
/// parse blobs; [`PromptManager`](crate::prompt::PromptManager) does that so
/// it can degrade per record.
pub trait ProfileStore: Send + Sync {
    fn load_profile_blob(&self) -> StoreFuture<'_, Option<String>>;

    fn load_custom_prompt_blob(&self) -> StoreFuture<'_, Option<String>>;

    fn save_profile_blob(&self, blob: String) -> StoreFuture<'_, ()>;

    fn save_custom_prompt_blob(&self, blob: String) -> StoreFuture<'_, ()>;

    fn clear_profile(&self) -> StoreFuture<'_, ()>;

    fn clear_custom_prompt(&self) -> StoreFuture<'_, ()>;

    /// Serialize and persist a profile.
    fn save_profile(&self, profile: &UserProfile) -> StoreFuture<'_, ()> {
        match profile.to_json() {
            Ok(blob) => self.save_profile_blob(blob),
            Err(source) => Box::pin(async move {
                Err(StoreError::Serialize {
                    key: PROFILE_KEY,
                    source,
                })
            }),
        }
    }

    /// Serialize and persist a custom prompt.
    fn save_custom_prompt(&self, prompt: &Prompt) -> StoreFuture<'_, ()> {
        match prompt.to_json() {
            Ok(blob) => self.save_custom_prompt_blob(blob),
            Err(source) => Box::pin(async move {
                Err(StoreError::Serialize {
                    key: CUSTOM_PROMPT_KEY,
                    source,
                })
            }),
        }
    }
}
