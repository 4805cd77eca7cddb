use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Could not replace slot file: {0}")]
    Persist(#[from] tempfile::PersistError),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Named slots of persisted text, one value per slot.
pub trait Storage: Send + Sync {
    /// Returns `None` when nothing has been written to `slot` yet.
    fn read(&self, slot: &str) -> Result<Option<String>, StorageError>;

    /// Replaces the whole content of `slot`.
    fn write(&self, slot: &str, value: &str) -> Result<(), StorageError>;
}

/// Slot storage backed by one JSON file per slot in a directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn slot_path(&self, slot: &str) -> PathBuf {
        self.dir.join(format!("{slot}.json"))
    }
}

impl Storage for FileStorage {
    fn read(&self, slot: &str) -> Result<Option<String>, StorageError> {
        match std::fs::read_to_string(self.slot_path(slot)) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, slot: &str, value: &str) -> Result<(), StorageError> {
        std::fs::create_dir_all(&self.dir)?;
        // Write next to the target and rename so readers never see a torn file
        let mut tmp = tempfile::NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(value.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(self.slot_path(slot))?;
        tracing::trace!(slot, bytes = value.len(), "Slot written");
        Ok(())
    }
}

#[cfg(test)]
pub mod testing {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    /// In-memory storage that can be told to fail writes.
    #[derive(Default)]
    pub struct MemoryStorage {
        slots: Mutex<HashMap<String, String>>,
        pub fail_writes: AtomicBool,
        pub writes: AtomicUsize,
    }

    impl MemoryStorage {
        pub fn with_slot(slot: &str, value: &str) -> Self {
            let storage = Self::default();
            storage
                .slots
                .lock()
                .unwrap()
                .insert(slot.to_string(), value.to_string());
            storage
        }

        pub fn get(&self, slot: &str) -> Option<String> {
            self.slots.lock().unwrap().get(slot).cloned()
        }

        pub fn set_fail_writes(&self, fail: bool) {
            self.fail_writes.store(fail, Ordering::SeqCst);
        }

        pub fn write_count(&self) -> usize {
            self.writes.load(Ordering::SeqCst)
        }
    }

    impl Storage for MemoryStorage {
        fn read(&self, slot: &str) -> Result<Option<String>, StorageError> {
            Ok(self.get(slot))
        }

        fn write(&self, slot: &str, value: &str) -> Result<(), StorageError> {
            if self.fail_writes.load(Ordering::SeqCst) {
                return Err(std::io::Error::other("disk full").into());
            }
            self.writes.fetch_add(1, Ordering::SeqCst);
            self.slots
                .lock()
                .unwrap()
                .insert(slot.to_string(), value.to_string());
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_slot_reads_none() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path());
        assert!(storage.read("filmflux_watchlist").unwrap().is_none());
    }

    #[test]
    fn test_write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("nested"));

        storage.write("filmflux_theme", "\"light\"").unwrap();
        assert_eq!(
            storage.read("filmflux_theme").unwrap().as_deref(),
            Some("\"light\"")
        );
        assert!(storage.slot_path("filmflux_theme").exists());
    }

    #[test]
    fn test_write_overwrites_slot() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path());

        storage.write("slot", "[1,2,3]").unwrap();
        storage.write("slot", "[]").unwrap();
        assert_eq!(storage.read("slot").unwrap().as_deref(), Some("[]"));

        // Only the slot file remains; temp files are renamed away
        let files: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(files.len(), 1);
    }

    #[test]
    fn test_slots_are_independent() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path());

        storage.write("a", "1").unwrap();
        storage.write("b", "2").unwrap();
        assert_eq!(storage.read("a").unwrap().as_deref(), Some("1"));
        assert_eq!(storage.read("b").unwrap().as_deref(), Some("2"));
    }
}
