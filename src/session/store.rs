//! Session persistence over an external key-value collaborator.
//!
//! One fixed key holds the whole serialized session; saves are atomic
//! whole-blob writes. [`SessionStore::save`] swallows backend failures into
//! a boolean so callers decide user feedback instead of handling errors.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::fs;

use crate::error::StoreError;
use crate::session::SessionState;

/// The single key under which the session blob is stored.
pub const SESSION_KEY: &str = "session";

/// External key-value persistence collaborator.
///
/// Absence of a key means "no saved value". Implementations must make
/// `put` atomic per key; partial writes are not tolerated.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    async fn put(&self, key: &str, value: &str) -> Result<(), StoreError>;
    async fn remove(&self, key: &str) -> Result<(), StoreError>;

    async fn contains(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.get(key).await?.is_some())
    }
}

/// File-backed key-value store: one file per key inside a data directory.
///
/// Writes go to a temp file first and are renamed into place, so a crash
/// mid-write never leaves a truncated blob under the real key.
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        match fs::read_to_string(self.path_for(key)).await {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::Read(e.to_string())),
        }
    }

    async fn put(&self, key: &str, value: &str) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| StoreError::Write(e.to_string()))?;
        let path = self.path_for(key);
        let tmp = self.dir.join(format!(".{key}.tmp"));
        fs::write(&tmp, value)
            .await
            .map_err(|e| StoreError::Write(e.to_string()))?;
        fs::rename(&tmp, &path)
            .await
            .map_err(|e| StoreError::Write(e.to_string()))?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        match fs::remove_file(self.path_for(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::Write(e.to_string())),
        }
    }
}

/// In-memory key-value store, mainly for tests.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
    fail_writes: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose writes always fail, for exercising the save-returns-
    /// false path.
    pub fn failing() -> Self {
        Self {
            entries: Mutex::new(BTreeMap::new()),
            fail_writes: true,
        }
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.lock().expect("store lock poisoned").get(key).cloned())
    }

    async fn put(&self, key: &str, value: &str) -> Result<(), StoreError> {
        if self.fail_writes {
            return Err(StoreError::Write("simulated backend failure".to_string()));
        }
        self.entries
            .lock()
            .expect("store lock poisoned")
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.entries.lock().expect("store lock poisoned").remove(key);
        Ok(())
    }
}

/// The session's durability boundary.
pub struct SessionStore<K: KeyValueStore> {
    backend: K,
}

impl<K: KeyValueStore> SessionStore<K> {
    pub fn new(backend: K) -> Self {
        Self { backend }
    }

    /// Serialize and persist the whole session under [`SESSION_KEY`].
    ///
    /// Stamps `saved_at` on the stored copy. Never fails: backend errors
    /// are logged and reported as `false`.
    pub async fn save(&self, state: &SessionState) -> bool {
        let mut stamped = state.clone();
        stamped.saved_at = Some(chrono::Utc::now());
        let blob = match serde_json::to_string(&stamped) {
            Ok(blob) => blob,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to serialize session, not saved");
                return false;
            }
        };
        match self.backend.put(SESSION_KEY, &blob).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to persist session");
                false
            }
        }
    }

    /// Load the saved session, if any.
    ///
    /// Missing fields in an older blob hydrate to their defaults; a blob
    /// that cannot be parsed at all is treated as absent.
    pub async fn load(&self) -> Option<SessionState> {
        let blob = match self.backend.get(SESSION_KEY).await {
            Ok(Some(blob)) => blob,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read saved session");
                return None;
            }
        };
        match serde_json::from_str(&blob) {
            Ok(state) => Some(state),
            Err(e) => {
                tracing::warn!(error = %e, "Saved session blob is unreadable, ignoring");
                None
            }
        }
    }

    /// Remove the saved session.
    pub async fn clear(&self) -> bool {
        match self.backend.remove(SESSION_KEY).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to clear saved session");
                false
            }
        }
    }

    /// Whether a saved session exists.
    pub async fn has_saved(&self) -> bool {
        self.backend.contains(SESSION_KEY).await.unwrap_or(false)
    }
}
