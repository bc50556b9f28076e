//! Session-scoped owner of the current system prompt.
//!
//! [`PromptManager`] loads the stored profile and custom prompt once, runs
//! them through the [resolver](super::resolver), and caches the winner.
//! Readers call [`current_prompt`](PromptManager::current_prompt) without
//! awaiting; writers ([`initialize`](PromptManager::initialize) and
//! [`update_with_profile`](PromptManager::update_with_profile)) are
//! serialized by an async mutex so two resolutions never interleave.
//!
//! Nothing here fails outward. A store read error or a corrupt blob is
//! logged and treated as "no record", which drops resolution to the next
//! precedence tier. The worst case is the built-in default prompt.

use std::sync::{Arc, PoisonError, RwLock};

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::record::Prompt;
use super::resolver::{PromptSource, resolve_with_source};
use crate::profile::UserProfile;
use crate::store::ProfileStore;

/// Lifecycle of a [`PromptManager`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManagerState {
    Uninitialized,
    Initializing,
    Ready,
}

/// Everything a reader can observe, swapped as one unit.
#[derive(Debug, Clone)]
struct Snapshot {
    state: ManagerState,
    prompt: Arc<Prompt>,
    source: PromptSource,
    user_profile: Option<Arc<UserProfile>>,
}

/// Loads, resolves and caches the active system prompt.
///
/// Share one instance per session behind an [`Arc`]. The cached prompt
/// starts as the built-in default until [`initialize`](Self::initialize)
/// completes.
pub struct PromptManager {
    store: Arc<dyn ProfileStore>,
    snapshot: RwLock<Snapshot>,
    /// Writer lock. Holds the last custom prompt that parsed, active or not.
    custom_prompt: Mutex<Option<Prompt>>,
}

impl std::fmt::Debug for PromptManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let snapshot = self.read();
        f.debug_struct("PromptManager")
            .field("state", &snapshot.state)
            .field("source", &snapshot.source)
            .field("prompt_id", &snapshot.prompt.id)
            .finish()
    }
}

impl PromptManager {
    pub fn new(store: Arc<dyn ProfileStore>) -> Self {
        Self {
            store,
            snapshot: RwLock::new(Snapshot {
                state: ManagerState::Uninitialized,
                prompt: Arc::new(Prompt::default_prompt()),
                source: PromptSource::Default,
                user_profile: None,
            }),
            custom_prompt: Mutex::new(None),
        }
    }

    /// Load both records from the store and resolve the current prompt.
    ///
    /// Safe to call again; with unchanged storage the result is the same.
    /// If the returned future is dropped before completion the previously
    /// cached state is kept.
    pub async fn initialize(&self) {
        let mut custom_slot = self.custom_prompt.lock().await;
        let mut pending = PendingState::enter(&self.snapshot);

        let profile = self.load_profile().await;
        let custom = self.load_custom_prompt().await;
        let (prompt, source) = resolve_with_source(custom.as_ref(), profile.as_ref());

        *custom_slot = custom;
        pending.commit(Snapshot {
            state: ManagerState::Ready,
            prompt: Arc::new(prompt),
            source,
            user_profile: profile.map(Arc::new),
        });
        info!("Prompt manager ready (source: {source})");
    }

    /// Replace the profile and re-resolve against the last loaded custom
    /// prompt. The store is not read again.
    pub async fn update_with_profile(&self, profile: UserProfile) {
        let custom_slot = self.custom_prompt.lock().await;
        let (prompt, source) = resolve_with_source(custom_slot.as_ref(), Some(&profile));
        debug!(
            "Profile updated: goal={}, level={}, style={}, interests={}",
            profile.learning_goal,
            profile.proficiency_level,
            profile.learning_style,
            profile.reading_interests.len()
        );
        self.write(Snapshot {
            state: ManagerState::Ready,
            prompt: Arc::new(prompt),
            source,
            user_profile: Some(Arc::new(profile)),
        });
        info!("Prompt re-resolved after profile update (source: {source})");
    }

    /// The cached prompt. Never performs I/O.
    pub fn current_prompt(&self) -> Prompt {
        self.read().prompt.as_ref().clone()
    }

    /// Shared handle to the cached prompt, without copying its content.
    pub fn current_prompt_shared(&self) -> Arc<Prompt> {
        Arc::clone(&self.read().prompt)
    }

    /// Which precedence tier produced the cached prompt.
    pub fn current_source(&self) -> PromptSource {
        self.read().source
    }

    /// The built-in default, regardless of the cache.
    pub fn default_prompt(&self) -> Prompt {
        Prompt::default_prompt()
    }

    pub fn user_profile(&self) -> Option<UserProfile> {
        self.read().user_profile.as_deref().cloned()
    }

    pub fn state(&self) -> ManagerState {
        self.read().state
    }

    async fn load_profile(&self) -> Option<UserProfile> {
        let blob = match self.store.load_profile_blob().await {
            Ok(Some(blob)) if !blob.trim().is_empty() => blob,
            Ok(_) => {
                debug!("No stored profile");
                return None;
            }
            Err(e) => {
                warn!("Failed to read stored profile, continuing without it: {e}");
                return None;
            }
        };
        match UserProfile::from_json(&blob) {
            Ok(profile) => Some(profile),
            Err(e) => {
                warn!("Ignoring unparsable stored profile: {e}");
                None
            }
        }
    }

    async fn load_custom_prompt(&self) -> Option<Prompt> {
        let blob = match self.store.load_custom_prompt_blob().await {
            Ok(Some(blob)) if !blob.trim().is_empty() => blob,
            Ok(_) => {
                debug!("No stored custom prompt");
                return None;
            }
            Err(e) => {
                warn!("Failed to read custom prompt, continuing without it: {e}");
                return None;
            }
        };
        match Prompt::from_json(&blob) {
            Ok(prompt) => {
                if !prompt.is_active {
                    debug!("Stored custom prompt '{}' is inactive", prompt.id);
                }
                Some(prompt)
            }
            Err(e) => {
                warn!("Ignoring unusable custom prompt: {e}");
                None
            }
        }
    }

    fn read(&self) -> Snapshot {
        self.snapshot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn write(&self, snapshot: Snapshot) {
        *self
            .snapshot
            .write()
            .unwrap_or_else(PoisonError::into_inner) = snapshot;
    }
}

/// Marks the manager `Initializing` for the duration of a load and puts the
/// previous state back if the load is abandoned before [`commit`](Self::commit).
struct PendingState<'a> {
    snapshot: &'a RwLock<Snapshot>,
    previous: Option<ManagerState>,
}

impl<'a> PendingState<'a> {
    fn enter(snapshot: &'a RwLock<Snapshot>) -> Self {
        let mut guard = snapshot.write().unwrap_or_else(PoisonError::into_inner);
        let previous = guard.state;
        guard.state = ManagerState::Initializing;
        Self {
            snapshot,
            previous: Some(previous),
        }
    }

    fn commit(&mut self, next: Snapshot) {
        *self
            .snapshot
            .write()
            .unwrap_or_else(PoisonError::into_inner) = next;
        self.previous = None;
    }
}

impl Drop for PendingState<'_> {
    fn drop(&mut self) {
        if let Some(previous) = self.previous.take() {
            self.snapshot
                .write()
                .unwrap_or_else(PoisonError::into_inner)
                .state = previous;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::{LearningGoal, LearningStyle, ProficiencyLevel, ReadingInterest};
    use crate::prompt::record::{DEFAULT_PROMPT_ID, PROFILE_PROMPT_ID, PromptType};
    use crate::store::{MemoryProfileStore, StoreFuture};

    fn beginner() -> UserProfile {
        UserProfile::new(
            "u1",
            LearningGoal::Exam,
            ProficiencyLevel::Beginner,
            LearningStyle::Practice,
        )
    }

    fn manager(store: MemoryProfileStore) -> (PromptManager, Arc<MemoryProfileStore>) {
        let store = Arc::new(store);
        (PromptManager::new(store.clone()), store)
    }

    #[test]
    fn starts_uninitialized_with_default_prompt() {
        let (m, _) = manager(MemoryProfileStore::new());
        assert_eq!(m.state(), ManagerState::Uninitialized);
        assert_eq!(m.current_prompt().id, DEFAULT_PROMPT_ID);
        assert_eq!(m.current_source(), PromptSource::Default);
        assert!(m.user_profile().is_none());
    }

    #[tokio::test]
    async fn initialize_with_empty_store_keeps_default() {
        let (m, store) = manager(MemoryProfileStore::new());
        m.initialize().await;
        assert_eq!(m.state(), ManagerState::Ready);
        assert_eq!(m.current_prompt(), Prompt::default_prompt());
        assert_eq!(store.reads(), 2);
    }

    #[tokio::test]
    async fn initialize_uses_stored_profile() {
        let blob = beginner().to_json().unwrap();
        let (m, _) = manager(MemoryProfileStore::new().with_profile_blob(blob));
        m.initialize().await;
        assert_eq!(m.current_prompt().id, PROFILE_PROMPT_ID);
        assert_eq!(m.current_source(), PromptSource::Profile);
        assert_eq!(m.user_profile().unwrap().id, "u1");
    }

    #[tokio::test]
    async fn active_custom_prompt_beats_profile() {
        let store = MemoryProfileStore::new()
            .with_profile_blob(beginner().to_json().unwrap())
            .with_custom_prompt_blob(r#"{"id":"c","content":"Only slang.","type":"CUSTOM","isActive":true,"order":2}"#);
        let (m, _) = manager(store);
        m.initialize().await;
        let prompt = m.current_prompt();
        assert_eq!(prompt.content, "Only slang.");
        assert_eq!(prompt.prompt_type, PromptType::Custom);
        assert_eq!(prompt.order, 2);
        assert_eq!(m.current_source(), PromptSource::Custom);
    }

    #[tokio::test]
    async fn initialize_twice_is_stable() {
        let store = MemoryProfileStore::new()
            .with_profile_blob(beginner().with_interest(ReadingInterest::Novel).to_json().unwrap());
        let (m, _) = manager(store);
        m.initialize().await;
        let first = m.current_prompt();
        m.initialize().await;
        assert_eq!(m.current_prompt(), first);
    }

    #[tokio::test]
    async fn malformed_custom_blob_falls_back_but_keeps_profile() {
        let store = MemoryProfileStore::new()
            .with_profile_blob(beginner().to_json().unwrap())
            .with_custom_prompt_blob(r#"{"id":"c","content":"Only sl"#);
        let (m, _) = manager(store);
        m.initialize().await;
        assert_eq!(m.current_prompt().id, PROFILE_PROMPT_ID);
        assert!(m.user_profile().is_some());
    }

    #[tokio::test]
    async fn read_failures_degrade_to_default() {
        let store = MemoryProfileStore::new()
            .with_profile_blob(beginner().to_json().unwrap())
            .with_custom_prompt_blob(Prompt::custom("x").to_json().unwrap());
        store.fail_profile_reads(true);
        store.fail_custom_prompt_reads(true);
        let (m, _) = manager(store);
        m.initialize().await;
        assert_eq!(m.state(), ManagerState::Ready);
        assert_eq!(m.current_prompt(), Prompt::default_prompt());
    }

    #[tokio::test]
    async fn update_after_empty_initialize_switches_to_profile_prompt() {
        let (m, store) = manager(MemoryProfileStore::new());
        m.initialize().await;
        assert!(m.current_prompt().is_default());

        m.update_with_profile(beginner()).await;
        assert_eq!(m.current_prompt().id, PROFILE_PROMPT_ID);
        assert_eq!(m.user_profile().unwrap().learning_goal, LearningGoal::Exam);
        // Re-resolution does not touch the store.
        assert_eq!(store.reads(), 2);
    }

    #[tokio::test]
    async fn update_honors_still_active_custom_prompt() {
        let store = MemoryProfileStore::new()
            .with_custom_prompt_blob(Prompt::custom("Keep me.").to_json().unwrap());
        let (m, _) = manager(store);
        m.initialize().await;
        m.update_with_profile(beginner()).await;
        assert_eq!(m.current_prompt().content, "Keep me.");
        assert_eq!(m.user_profile().unwrap().id, "u1");
    }

    #[tokio::test]
    async fn update_with_inactive_custom_uses_profile() {
        let store = MemoryProfileStore::new().with_custom_prompt_blob(
            Prompt::custom("Skip me.").with_active(false).to_json().unwrap(),
        );
        let (m, _) = manager(store);
        m.initialize().await;
        assert!(m.current_prompt().is_default());
        m.update_with_profile(beginner()).await;
        assert_eq!(m.current_source(), PromptSource::Profile);
    }

    #[tokio::test]
    async fn repeated_updates_track_latest_profile() {
        let (m, _) = manager(MemoryProfileStore::new());
        m.initialize().await;
        let mut previous = String::new();
        for level in ProficiencyLevel::ALL {
            let mut p = beginner();
            p.proficiency_level = level;
            m.update_with_profile(p).await;
            let content = m.current_prompt().content;
            assert!(!content.is_empty());
            assert_ne!(content, previous);
            previous = content;
        }
        assert_eq!(
            m.user_profile().unwrap().proficiency_level,
            ProficiencyLevel::Advanced
        );
    }

    /// Profile reads never complete; everything else is empty.
    struct StalledStore;

    impl ProfileStore for StalledStore {
        fn load_profile_blob(&self) -> StoreFuture<'_, Option<String>> {
            Box::pin(std::future::pending())
        }
        fn load_custom_prompt_blob(&self) -> StoreFuture<'_, Option<String>> {
            Box::pin(async { Ok(None) })
        }
        fn save_profile_blob(&self, _blob: String) -> StoreFuture<'_, ()> {
            Box::pin(async { Ok(()) })
        }
        fn save_custom_prompt_blob(&self, _blob: String) -> StoreFuture<'_, ()> {
            Box::pin(async { Ok(()) })
        }
        fn clear_profile(&self) -> StoreFuture<'_, ()> {
            Box::pin(async { Ok(()) })
        }
        fn clear_custom_prompt(&self) -> StoreFuture<'_, ()> {
            Box::pin(async { Ok(()) })
        }
    }

    #[tokio::test]
    async fn abandoned_initialize_leaves_state_untouched() {
        let m = PromptManager::new(Arc::new(StalledStore));
        let timed_out =
            tokio::time::timeout(std::time::Duration::from_millis(20), m.initialize()).await;
        assert!(timed_out.is_err());
        assert_eq!(m.state(), ManagerState::Uninitialized);
        assert!(m.current_prompt().is_default());

        // A later update still works once the stalled load is gone.
        m.update_with_profile(beginner()).await;
        assert_eq!(m.state(), ManagerState::Ready);
        assert_eq!(m.current_source(), PromptSource::Profile);
    }

    #[test]
    fn default_prompt_ignores_cache() {
        let (m, _) = manager(MemoryProfileStore::new());
        assert_eq!(m.default_prompt(), Prompt::default_prompt());
    }
}
