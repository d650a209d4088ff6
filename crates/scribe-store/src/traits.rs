//! HistoryStore trait: where history files and live content are kept.
//!
//! The version log only needs four primitives, so backends stay small.
//! The filesystem backend is the real one; the memory backend exists for
//! tests and for callers that keep content somewhere other than disk.

use crate::error::Result;
use crate::format::HistoryFile;

/// Persistence for history files and the live canonical files they track.
///
/// `path` is always the content path relative to the content root
/// (e.g. `posts/hello.md`), never the history file's own path.
pub trait HistoryStore: Send + Sync {
    // ─────────────────────────────────────────────────────────────────────────
    // History Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Load and parse the history for `path`, if one exists.
    ///
    /// Implementations return it unvalidated; the log validates.
    fn load(&self, path: &str) -> Result<Option<HistoryFile>>;

    /// Persist the history for `path`, replacing any previous one.
    ///
    /// Must be atomic: a reader sees either the old or the new history.
    fn save(&self, path: &str, history: &HistoryFile) -> Result<()>;

    /// Whether a history exists for `path`.
    fn exists(&self, path: &str) -> Result<bool> {
        Ok(self.load(path)?.is_some())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Live Content Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Read the live content at `path`, if present.
    fn read_live(&self, path: &str) -> Result<Option<String>>;

    /// Overwrite the live content at `path`.
    fn write_live(&self, path: &str, content: &str) -> Result<()>;
}
