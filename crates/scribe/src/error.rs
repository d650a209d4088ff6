//! Error types for Scribe.

use scribe_core::CoreError;
use scribe_store::StoreError;
use thiserror::Error;

/// Errors that can occur during Scribe operations.
#[derive(Debug, Error)]
pub enum ScribeError {
    /// Key, hash or signature error.
    #[error("core error: {0}")]
    Core(#[from] CoreError),

    /// History storage error.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    /// I/O error outside the history store (key files, config files).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration could not be loaded or is inconsistent.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Result type for Scribe operations.
pub type Result<T> = std::result::Result<T, ScribeError>;
