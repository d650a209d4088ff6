//! Error types for the store module.

use scribe_core::ContentHash;
use thiserror::Error;

/// Errors that can occur during history operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// History text does not follow the file format.
    #[error("history parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    /// History parsed but violates a structural invariant.
    #[error("corrupt history: {0}")]
    Corrupt(String),

    /// Neither reconstruction strategy reached the requested version.
    #[error("version not found: {0}")]
    VersionNotFound(ContentHash),

    /// A diff failed to parse or apply.
    #[error("reconstruction failed: {0}")]
    Reconstruction(String),

    /// Refused to initialize over an existing history.
    #[error("history already exists for {0}")]
    HistoryExists(String),

    /// No history has been initialized for this file.
    #[error("no history for {0}")]
    HistoryMissing(String),

    /// The content path escapes the content root or is otherwise unusable.
    #[error("invalid content path: {0}")]
    InvalidPath(String),

    /// A lock was poisoned by a panicking writer.
    #[error("store lock poisoned")]
    LockPoisoned,
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
