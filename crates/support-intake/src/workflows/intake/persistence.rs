use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tracing::{debug, warn};

use super::snapshot::{FormSnapshot, SnapshotError};

/// Fixed storage key for the in-progress application.
pub const STORAGE_KEY: &str = "social_support_form_data";

/// Durable key-value backend so the adapter can be exercised without touching disk.
pub trait SnapshotStore: Send + Sync {
    fn read(&self, key: &str) -> Result<Option<String>, PersistenceError>;
    fn write(&self, key: &str, value: &str) -> Result<(), PersistenceError>;
    fn remove(&self, key: &str) -> Result<(), PersistenceError>;
}

/// Storage failures. None of these are fatal to the wizard.
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("storage quota exceeded ({needed} bytes requested, {available} available)")]
    QuotaExceeded { needed: usize, available: usize },
    #[error("storage io failure: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// One `<key>.json` file per key under a root directory.
#[derive(Debug, Clone)]
pub struct FileSnapshotStore {
    root: PathBuf,
}

impl FileSnapshotStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.json"))
    }
}

impl SnapshotStore for FileSnapshotStore {
    fn read(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(raw) => Ok(Some(raw)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn write(&self, key: &str, value: &str) -> Result<(), PersistenceError> {
        fs::create_dir_all(&self.root)?;
        let path = self.path_for(key);
        let staging = path.with_extension("json.tmp");
        fs::write(&staging, value)?;
        fs::rename(&staging, &path)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), PersistenceError> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

/// Process-local store; an optional byte quota mirrors browser storage limits.
#[derive(Debug, Default, Clone)]
pub struct MemorySnapshotStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
    quota: Option<usize>,
}

impl MemorySnapshotStore {
    pub fn with_quota(bytes: usize) -> Self {
        Self {
            entries: Arc::default(),
            quota: Some(bytes),
        }
    }

    /// Write a value without quota checks, e.g. to seed corrupt content.
    pub fn insert_raw(&self, key: &str, value: &str) -> Result<(), PersistenceError> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>, PersistenceError> {
        self.entries
            .lock()
            .map_err(|_| PersistenceError::Unavailable("snapshot store lock poisoned".to_string()))
    }
}

impl SnapshotStore for MemorySnapshotStore {
    fn read(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<(), PersistenceError> {
        let mut entries = self.lock()?;
        if let Some(quota) = self.quota {
            let used: usize = entries
                .iter()
                .filter(|(existing, _)| existing.as_str() != key)
                .map(|(existing, stored)| existing.len() + stored.len())
                .sum();
            let needed = key.len() + value.len();
            let available = quota.saturating_sub(used);
            if needed > available {
                return Err(PersistenceError::QuotaExceeded { needed, available });
            }
        }
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), PersistenceError> {
        self.lock()?.remove(key);
        Ok(())
    }
}

/// Snapshot adapter bound to a single storage key.
#[derive(Debug)]
pub struct SnapshotPersistence<S> {
    store: Arc<S>,
    key: String,
}

impl<S> Clone for SnapshotPersistence<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            key: self.key.clone(),
        }
    }
}

impl<S> SnapshotPersistence<S>
where
    S: SnapshotStore,
{
    pub fn new(store: Arc<S>) -> Self {
        Self::with_key(store, STORAGE_KEY)
    }

    pub fn with_key(store: Arc<S>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Overwrite the stored snapshot.
    pub fn save(&self, snapshot: &FormSnapshot) -> Result<(), PersistenceError> {
        let raw = snapshot.to_json()?;
        self.store.write(&self.key, &raw)?;
        debug!(key = %self.key, bytes = raw.len(), "form snapshot saved");
        Ok(())
    }

    /// Stored snapshot, or `None` when missing, unreadable, or corrupt.
    pub fn load(&self) -> Option<FormSnapshot> {
        match self.load_checked() {
            Ok(snapshot) => snapshot,
            Err(err) => {
                warn!(key = %self.key, error = %err, "ignoring unusable form snapshot");
                None
            }
        }
    }

    /// Like [`Self::load`] but hands the corruption or storage failure back to the caller.
    pub fn load_checked(&self) -> Result<Option<FormSnapshot>, PersistenceError> {
        match self.store.read(&self.key)? {
            Some(raw) => Ok(Some(FormSnapshot::from_json(&raw)?)),
            None => Ok(None),
        }
    }

    pub fn clear(&self) -> Result<(), PersistenceError> {
        self.store.remove(&self.key)?;
        debug!(key = %self.key, "form snapshot cleared");
        Ok(())
    }
}
