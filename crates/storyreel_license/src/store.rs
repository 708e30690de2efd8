//! Activation key persistence.

use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use storyreel_error::{JsonError, StorageError, StorageErrorKind, StoryreelResult};
use storyreel_interface::ActivationStore;
use tracing::debug;

/// In-process store. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryActivationStore {
    slot: Mutex<Option<String>>,
}

impl MemoryActivationStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store already holding `key`.
    pub fn with_key(key: impl Into<String>) -> Self {
        Self {
            slot: Mutex::new(Some(key.into())),
        }
    }

    fn lock(&self) -> StoryreelResult<std::sync::MutexGuard<'_, Option<String>>> {
        self.slot.lock().map_err(|e| {
            StorageError::new(StorageErrorKind::FileRead(format!("store lock poisoned: {}", e)))
                .into()
        })
    }
}

impl ActivationStore for MemoryActivationStore {
    fn get(&self) -> StoryreelResult<Option<String>> {
        Ok(self.lock()?.clone())
    }

    fn set(&self, key: &str) -> StoryreelResult<()> {
        *self.lock()? = Some(key.to_string());
        Ok(())
    }

    fn clear(&self) -> StoryreelResult<()> {
        *self.lock()? = None;
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredActivation {
    key: String,
}

/// Store backed by one JSON file, `<dir>/<namespace>.json`.
#[derive(Debug, Clone, Getters)]
pub struct FileActivationStore {
    /// Full path of the JSON file
    path: PathBuf,
}

impl FileActivationStore {
    /// Creates a store under `dir`, creating the directory if needed.
    pub fn new(dir: impl AsRef<Path>, namespace: &str) -> StoryreelResult<Self> {
        let dir = dir.as_ref();
        if namespace.is_empty() || namespace.contains(['/', '\\']) {
            return Err(StorageError::new(StorageErrorKind::InvalidPath(format!(
                "namespace '{}' is not a plain file name",
                namespace
            )))
            .into());
        }

        if !dir.exists() {
            std::fs::create_dir_all(dir).map_err(|e| {
                StorageError::new(StorageErrorKind::DirectoryCreation(format!(
                    "{}: {}",
                    dir.display(),
                    e
                )))
            })?;
        }

        let path = dir.join(format!("{}.json", namespace));
        debug!(path = %path.display(), "Initialized activation store");
        Ok(Self { path })
    }

    /// Creates a store in the platform config directory (`~/.config/storyreel` on Linux).
    pub fn default_location(namespace: &str) -> StoryreelResult<Self> {
        let base = dirs::config_dir().ok_or_else(|| {
            StorageError::new(StorageErrorKind::InvalidPath(
                "no config directory for this platform".to_string(),
            ))
        })?;
        Self::new(base.join("storyreel"), namespace)
    }
}

impl ActivationStore for FileActivationStore {
    fn get(&self) -> StoryreelResult<Option<String>> {
        if !self.path.exists() {
            debug!("No stored activation");
            return Ok(None);
        }

        let contents = std::fs::read_to_string(&self.path).map_err(|e| {
            StorageError::new(StorageErrorKind::FileRead(format!(
                "{}: {}",
                self.path.display(),
                e
            )))
        })?;

        let stored: StoredActivation = serde_json::from_str(&contents)
            .map_err(|e| JsonError::new(format!("Failed to parse activation file: {}", e)))?;

        Ok(Some(stored.key))
    }

    fn set(&self, key: &str) -> StoryreelResult<()> {
        let contents = serde_json::to_string_pretty(&StoredActivation {
            key: key.to_string(),
        })
        .map_err(|e| JsonError::new(format!("Failed to serialize activation: {}", e)))?;

        std::fs::write(&self.path, contents).map_err(|e| {
            StorageError::new(StorageErrorKind::FileWrite(format!(
                "{}: {}",
                self.path.display(),
                e
            )))
        })?;

        debug!(path = %self.path.display(), "Saved activation");
        Ok(())
    }

    fn clear(&self) -> StoryreelResult<()> {
        if self.path.exists() {
            std::fs::remove_file(&self.path).map_err(|e| {
                StorageError::new(StorageErrorKind::FileDelete(format!(
                    "{}: {}",
                    self.path.display(),
                    e
                )))
            })?;
            debug!(path = %self.path.display(), "Cleared activation");
        }
        Ok(())
    }
}
