//! # Scribe
//!
//! The unified API for Scribe: publish text that is signed by its author,
//! addressed by its hash, and recoverable at every past revision.
//!
//! ## Overview
//!
//! Publishing a file runs one pipeline:
//!
//! - **Canonicalize**: normalize line endings and whitespace
//! - **Hash**: `sha256:<hex>` of the canonical bytes
//! - **Sign**: an `SSH SIGNATURE` any `ssh-keygen -Y verify` accepts
//! - **Record**: append a diff to the file's version history
//!
//! Reading runs the other way: any recorded hash can be turned back into
//! the exact canonical bytes it names, and any third party holding the
//! author's public key can check a copy of the content.
//!
//! ## Usage
//!
//! ```rust
//! use scribe::{KeyPair, Scribe, ScribeConfig, VerificationStatus};
//! use scribe::store::MemoryHistoryStore;
//!
//! let scribe = Scribe::new(
//!     KeyPair::from_seed(&[3u8; 32]),
//!     MemoryHistoryStore::new(),
//!     ScribeConfig::default(),
//! );
//!
//! let first = scribe.publish("posts/hello.md", "Hello\r\n").unwrap();
//! let second = scribe.publish("posts/hello.md", "Hello\nWorld\n").unwrap();
//!
//! let old = scribe.show_version("posts/hello.md", &first.hash).unwrap();
//! assert_eq!(old.as_str(), "Hello\n");
//!
//! let status = scribe.verify_remote(
//!     "Hello\nWorld\n\n",
//!     Some(&scribe.public_key_line()),
//!     Some(&second.signature),
//! );
//! assert_eq!(status, VerificationStatus::Valid);
//! ```
//!
//! ## Re-exports
//!
//! - `scribe::core` - Canonical content, hashes, keys and signatures
//! - `scribe::store` - Version history storage and reconstruction

pub mod config;
pub mod error;
pub mod keystore;
pub mod scribe;

// Re-export component crates
pub use scribe_core as core;
pub use scribe_store as store;

// Re-export main types for convenience
pub use crate::config::ScribeConfig;
pub use crate::error::{Result, ScribeError};
pub use crate::keystore::KeyStore;
pub use crate::scribe::{
    now_timestamp, EntryKind, EntrySummary, PublishOutcome, PublishReceipt, Scribe,
};

// Re-export commonly used core types
pub use scribe_core::{
    canonicalize, CanonicalContent, ContentHash, KeyPair, PublicKey, SshSignature,
    VerificationStatus,
};
pub use scribe_store::{FsHistoryStore, HistoryStore, MemoryHistoryStore};
