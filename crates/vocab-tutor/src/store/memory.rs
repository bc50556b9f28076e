//! In-process store for hosts that persist records themselves, and for tests.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::{CUSTOM_PROMPT_KEY, PROFILE_KEY, ProfileStore, StoreFuture};
use crate::error::StoreError;

#[derive(Debug, Clone, Copy)]
enum Record {
    Profile,
    CustomPrompt,
}

impl Record {
    fn key(self) -> &'static str {
        match self {
            Record::Profile => PROFILE_KEY,
            Record::CustomPrompt => CUSTOM_PROMPT_KEY,
        }
    }
}

#[derive(Debug, Default)]
struct Records {
    profile: Option<String>,
    custom_prompt: Option<String>,
    fail_profile_reads: bool,
    fail_custom_prompt_reads: bool,
}

/// Holds both blobs in memory.
///
/// Read failures can be switched on per record to exercise fallback paths.
#[derive(Debug, Default)]
pub struct MemoryProfileStore {
    records: Mutex<Records>,
    reads: AtomicUsize,
}

impl MemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_profile_blob(self, blob: impl Into<String>) -> Self {
        self.lock().profile = Some(blob.into());
        self
    }

    pub fn with_custom_prompt_blob(self, blob: impl Into<String>) -> Self {
        self.lock().custom_prompt = Some(blob.into());
        self
    }

    /// Make subsequent profile reads fail with [`StoreError::Unavailable`].
    pub fn fail_profile_reads(&self, fail: bool) {
        self.lock().fail_profile_reads = fail;
    }

    /// Make subsequent custom-prompt reads fail with [`StoreError::Unavailable`].
    pub fn fail_custom_prompt_reads(&self, fail: bool) {
        self.lock().fail_custom_prompt_reads = fail;
    }

    /// Number of load calls served so far, successful or not.
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Records> {
        self.records
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn load(&self, record: Record) -> Result<Option<String>, StoreError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        let records = self.lock();
        let (failing, blob) = match record {
            Record::Profile => (records.fail_profile_reads, &records.profile),
            Record::CustomPrompt => (records.fail_custom_prompt_reads, &records.custom_prompt),
        };
        if failing {
            return Err(StoreError::Unavailable(format!(
                "{} read disabled",
                record.key()
            )));
        }
        Ok(blob.clone())
    }

    fn store(&self, record: Record, blob: Option<String>) {
        let mut records = self.lock();
        match record {
            Record::Profile => records.profile = blob,
            Record::CustomPrompt => records.custom_prompt = blob,
        }
    }
}

impl ProfileStore for MemoryProfileStore {
    fn load_profile_blob(&self) -> StoreFuture<'_, Option<String>> {
        let result = self.load(Record::Profile);
        Box::pin(async move { result })
    }

    fn load_custom_prompt_blob(&self) -> StoreFuture<'_, Option<String>> {
        let result = self.load(Record::CustomPrompt);
        Box::pin(async move { result })
    }

    fn save_profile_blob(&self, blob: String) -> StoreFuture<'_, ()> {
        self.store(Record::Profile, Some(blob));
        Box::pin(async { Ok(()) })
    }

    fn save_custom_prompt_blob(&self, blob: String) -> StoreFuture<'_, ()> {
        self.store(Record::CustomPrompt, Some(blob));
        Box::pin(async { Ok(()) })
    }

    fn clear_profile(&self) -> StoreFuture<'_, ()> {
        self.store(Record::Profile, None);
        Box::pin(async { Ok(()) })
    }

    fn clear_custom_prompt(&self) -> StoreFuture<'_, ()> {
        self.store(Record::CustomPrompt, None);
        Box::pin(async { Ok(()) })
    }
}
