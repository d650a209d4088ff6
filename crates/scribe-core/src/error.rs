//! Error types for Scribe Core.

use thiserror::Error;

/// Core errors that can occur while encoding, decoding, signing or verifying.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Key bytes do not parse (wrong PEM type, truncated wire fields, wrong key size).
    #[error("malformed key: {0}")]
    MalformedKey(String),

    /// Signing failed, typically because the private key did not decode.
    #[error("signing failed: {0}")]
    Signing(String),

    /// The signature container is malformed or unparseable.
    ///
    /// A container that parses but does not match the content is not an
    /// error; verification reports it as `false`.
    #[error("unverifiable signature: {0}")]
    Verification(String),

    /// The operating system random source could not be read.
    #[error("entropy source unavailable: {0}")]
    Entropy(String),

    /// A content hash string is not of the form `sha256:<64 lowercase hex>`.
    #[error("invalid content hash: {0}")]
    InvalidHash(String),
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
