//! The persistent key-value boundary.
//!
//! The game persists exactly one slot (by default `gameState`) holding the
//! serialized session. Stores offer `get`/`set` with absent-key semantics
//! and nothing beyond last-write-wins.
//!
//! | Store | Backing | Used by |
//! |-------|---------|---------|
//! | [`MemoryStore`] | `BTreeMap` | tests, embedding hosts |
//! | [`FileStore`] | one `<key>.json` file per slot | the engine binary |

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Errors from the storage boundary.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Reading a slot failed for a reason other than absence.
    #[error("failed to read slot {key}: {source}")]
    Read {
        /// The slot key.
        key: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Writing a slot failed.
    #[error("failed to write slot {key}: {source}")]
    Write {
        /// The slot key.
        key: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// A string-keyed slot store.
pub trait KeyValueStore {
    /// Read the value at `key`. `Ok(None)` means the slot was never written.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Read`] if the backing medium fails.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write `value` at `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Write`] if the backing medium fails. The
    /// previous value stays readable in that case.
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// In-memory store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    slots: BTreeMap<String, String>,
}

impl MemoryStore {
    /// Create an empty store.
    pub const fn new() -> Self {
        Self {
            slots: BTreeMap::new(),
        }
    }

    /// Create a store with `value` already written at `key`.
    pub fn with_slot(key: &str, value: &str) -> Self {
        let mut slots = BTreeMap::new();
        slots.insert(key.to_owned(), value.to_owned());
        Self { slots }
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.slots.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.slots.insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}

/// Directory-backed store with one `<key>.json` file per slot.
///
/// Writes go to a sibling temporary file that is then renamed over the slot,
/// so a failed write never truncates the previous save.
#[derive(Debug, Clone)]
pub struct FileStore {
    directory: PathBuf,
}

impl FileStore {
    /// Create a store rooted at `directory`. The directory is created on the
    /// first write.
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    /// The root directory.
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    fn slot_path(&self, key: &str) -> PathBuf {
        self.directory.join(format!("{key}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match std::fs::read_to_string(self.slot_path(key)) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Read {
                key: key.to_owned(),
                source,
            }),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let write_err = |source| StorageError::Write {
            key: key.to_owned(),
            source,
        };
        std::fs::create_dir_all(&self.directory).map_err(write_err)?;
        let target = self.slot_path(key);
        let staging = self.directory.join(format!("{key}.json.tmp"));
        std::fs::write(&staging, value).map_err(write_err)?;
        std::fs::rename(&staging, &target).map_err(write_err)?;
        tracing::debug!(slot = key, bytes = value.len(), path = %target.display(), "Slot written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    static NEXT_DIR: AtomicU32 = AtomicU32::new(0);

    fn scratch_dir() -> PathBuf {
        let n = NEXT_DIR.fetch_add(1, Ordering::Relaxed);
        std::env::temp_dir().join(format!("coinfield-storage-{}-{n}", std::process::id()))
    }

    #[test]
    fn memory_store_absent_then_present() {
        let mut store = MemoryStore::new();
        assert!(matches!(store.get("gameState"), Ok(None)));
        assert!(store.set("gameState", "{}").is_ok());
        assert_eq!(store.get("gameState").ok().flatten().as_deref(), Some("{}"));
    }

    #[test]
    fn memory_store_last_write_wins() {
        let mut store = MemoryStore::with_slot("gameState", "old");
        assert!(store.set("gameState", "new").is_ok());
        assert_eq!(store.get("gameState").ok().flatten().as_deref(), Some("new"));
    }

    #[test]
    fn file_store_missing_slot_is_absent() {
        let store = FileStore::new(scratch_dir());
        assert!(matches!(store.get("gameState"), Ok(None)));
    }

    #[test]
    fn file_store_round_trips_and_overwrites() {
        let dir = scratch_dir();
        let mut store = FileStore::new(&dir);
        assert!(store.set("gameState", "first").is_ok());
        assert!(store.set("gameState", "second").is_ok());

        let reopened = FileStore::new(&dir);
        assert_eq!(reopened.get("gameState").ok().flatten().as_deref(), Some("second"));
        assert!(!dir.join("gameState.json.tmp").exists());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn file_store_write_failure_is_reported() {
        // A regular file where the directory should be makes every write fail.
        let blocker = scratch_dir();
        assert!(std::fs::write(&blocker, "not a directory").is_ok());
        let mut store = FileStore::new(&blocker);
        assert!(matches!(
            store.set("gameState", "{}"),
            Err(StorageError::Write { .. })
        ));
        let _ = std::fs::remove_file(&blocker);
    }
}
