//! One JSON file per record inside a data directory.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::{CUSTOM_PROMPT_KEY, PROFILE_KEY, ProfileStore, StoreFuture};
use crate::error::StoreError;

const PROFILE_FILE: &str = "profile.json";
const CUSTOM_PROMPT_FILE: &str = "custom_prompt.json";

/// Stores `profile.json` and `custom_prompt.json` under `dir`.
///
/// The directory is created on first write. Writes go through a temp file
/// and a rename so a reader never sees a half-written record.
#[derive(Debug, Clone)]
pub struct FileProfileStore {
    dir: PathBuf,
}

impl FileProfileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn profile_path(&self) -> PathBuf {
        self.dir.join(PROFILE_FILE)
    }

    pub fn custom_prompt_path(&self) -> PathBuf {
        self.dir.join(CUSTOM_PROMPT_FILE)
    }

    async fn read(key: &'static str, path: PathBuf) -> Result<Option<String>, StoreError> {
        match tokio::fs::read_to_string(&path).await {
            Ok(blob) => {
                debug!("Read {key} record from {} ({} bytes)", path.display(), blob.len());
                Ok(Some(blob))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No {key} record at {}", path.display());
                Ok(None)
            }
            Err(source) => Err(StoreError::Io { key, source }),
        }
    }

    async fn write(
        key: &'static str,
        dir: PathBuf,
        path: PathBuf,
        blob: String,
    ) -> Result<(), StoreError> {
        let io = |source| StoreError::Io { key, source };
        tokio::fs::create_dir_all(&dir).await.map_err(io)?;
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, blob.as_bytes()).await.map_err(io)?;
        tokio::fs::rename(&tmp, &path).await.map_err(io)?;
        debug!("Wrote {key} record to {}", path.display());
        Ok(())
    }

    async fn remove(key: &'static str, path: PathBuf) -> Result<(), StoreError> {
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                debug!("Removed {key} record at {}", path.display());
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StoreError::Io { key, source }),
        }
    }
}

impl ProfileStore for FileProfileStore {
    fn load_profile_blob(&self) -> StoreFuture<'_, Option<String>> {
        Box::pin(Self::read(PROFILE_KEY, self.profile_path()))
    }

    fn load_custom_prompt_blob(&self) -> StoreFuture<'_, Option<String>> {
        Box::pin(Self::read(CUSTOM_PROMPT_KEY, self.custom_prompt_path()))
    }

    fn save_profile_blob(&self, blob: String) -> StoreFuture<'_, ()> {
        Box::pin(Self::write(
            PROFILE_KEY,
            self.dir.clone(),
            self.profile_path(),
            blob,
        ))
    }

    fn save_custom_prompt_blob(&self, blob: String) -> StoreFuture<'_, ()> {
        Box::pin(Self::write(
            CUSTOM_PROMPT_KEY,
            self.dir.clone(),
            self.custom_prompt_path(),
            blob,
        ))
    }

    fn clear_profile(&self) -> StoreFuture<'_, ()> {
        Box::pin(Self::remove(PROFILE_KEY, self.profile_path()))
    }

    fn clear_custom_prompt(&self) -> StoreFuture<'_, ()> {
        Box::pin(Self::remove(CUSTOM_PROMPT_KEY, self.custom_prompt_path()))
    }
}
