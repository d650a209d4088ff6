//! In-memory implementation of the HistoryStore trait.
//!
//! Histories are kept in rendered text form, so every load goes through
//! the same parser the filesystem backend uses.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::error::{Result, StoreError};
use crate::format::HistoryFile;
use crate::fs::check_relative;
use crate::traits::HistoryStore;

/// In-memory history store.
///
/// All data is lost when the store is dropped. Thread-safe via RwLock.
#[derive(Debug)]
pub struct MemoryHistoryStore {
    inner: RwLock<MemoryStoreInner>,
}

#[derive(Debug, Default)]
struct MemoryStoreInner {
    /// Rendered history text by content path.
    histories: HashMap<String, String>,

    /// Live content by content path.
    live: HashMap<String, String>,
}

impl MemoryHistoryStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(MemoryStoreInner::default()),
        }
    }

    /// Replace the live content without touching history.
    pub fn set_live(&self, path: &str, content: &str) -> Result<()> {
        self.write_live(path, content)
    }

    /// Remove the live content, as if the file had been deleted.
    pub fn remove_live(&self, path: &str) -> Result<()> {
        let mut inner = self.inner.write().map_err(|_| StoreError::LockPoisoned)?;
        inner.live.remove(path);
        Ok(())
    }

    /// The stored history text, exactly as it would be written to disk.
    pub fn raw_history(&self, path: &str) -> Result<Option<String>> {
        let inner = self.inner.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(inner.histories.get(path).cloned())
    }

    /// Overwrite the stored history text without parsing it.
    pub fn set_raw_history(&self, path: &str, text: &str) -> Result<()> {
        let mut inner = self.inner.write().map_err(|_| StoreError::LockPoisoned)?;
        inner.histories.insert(path.to_string(), text.to_string());
        Ok(())
    }
}

impl Default for MemoryHistoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl HistoryStore for MemoryHistoryStore {
    fn load(&self, path: &str) -> Result<Option<HistoryFile>> {
        let inner = self.inner.read().map_err(|_| StoreError::LockPoisoned)?;
        let Some(text) = inner.histories.get(path) else {
            return Ok(None);
        };
        let history = HistoryFile::parse(text)?;
        if history.canonical_file != path {
            return Err(StoreError::Corrupt(format!(
                "history for {path:?} tracks {:?}",
                history.canonical_file
            )));
        }
        Ok(Some(history))
    }

    fn save(&self, path: &str, history: &HistoryFile) -> Result<()> {
        check_relative(path)?;
        let text = history.render();
        let mut inner = self.inner.write().map_err(|_| StoreError::LockPoisoned)?;
        inner.histories.insert(path.to_string(), text);
        Ok(())
    }

    fn exists(&self, path: &str) -> Result<bool> {
        let inner = self.inner.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(inner.histories.contains_key(path))
    }

    fn read_live(&self, path: &str) -> Result<Option<String>> {
        let inner = self.inner.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(inner.live.get(path).cloned())
    }

    fn write_live(&self, path: &str, content: &str) -> Result<()> {
        let mut inner = self.inner.write().map_err(|_| StoreError::LockPoisoned)?;
        inner.live.insert(path.to_string(), content.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::VersionEntry;
    use scribe_core::ContentHash;

    #[test]
    fn test_memory_store_basic() {
        let store = MemoryHistoryStore::new();
        assert!(store.load("a.md").unwrap().is_none());
        assert!(!store.exists("a.md").unwrap());

        let history = HistoryFile::new(
            "a.md",
            VersionEntry::root(ContentHash::of(b"x\n"), "t", "x\n"),
        );
        store.save("a.md", &history).unwrap();
        assert!(store.exists("a.md").unwrap());
        assert_eq!(store.load("a.md").unwrap(), Some(history.clone()));
        assert_eq!(store.raw_history("a.md").unwrap(), Some(history.render()));
    }

    #[test]
    fn test_memory_store_rejects_mismatched_history() {
        let store = MemoryHistoryStore::new();
        let history = HistoryFile::new(
            "b.md",
            VersionEntry::root(ContentHash::of(b"x\n"), "t", "x\n"),
        );
        store.set_raw_history("a.md", &history.render()).unwrap();
        assert!(matches!(store.load("a.md"), Err(StoreError::Corrupt(_))));
    }

    #[test]
    fn test_memory_store_rejects_bad_paths() {
        let store = MemoryHistoryStore::new();
        for bad in ["", "../a.md", "a.md\nPARENT=none"] {
            let history = HistoryFile::new(
                bad,
                VersionEntry::root(ContentHash::of(b"x\n"), "t", "x\n"),
            );
            assert!(
                matches!(store.save(bad, &history), Err(StoreError::InvalidPath(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_memory_store_live() {
        let store = MemoryHistoryStore::new();
        assert!(store.read_live("a.md").unwrap().is_none());
        store.write_live("a.md", "one\n").unwrap();
        store.set_live("a.md", "two\n").unwrap();
        assert_eq!(store.read_live("a.md").unwrap().as_deref(), Some("two\n"));
        store.remove_live("a.md").unwrap();
        assert!(store.read_live("a.md").unwrap().is_none());
    }

    #[test]
    fn test_memory_store_parses_on_load() {
        let store = MemoryHistoryStore::new();
        store.set_raw_history("a.md", "garbage").unwrap();
        assert!(matches!(store.load("a.md"), Err(StoreError::Parse { .. })));
    }
}
