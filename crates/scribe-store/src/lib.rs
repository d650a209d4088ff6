//! # Scribe Store
//!
//! Version history for Scribe content. Every published file gets a history
//! file holding the full text of its first revision and a unified diff per
//! later revision, each keyed by the revision's content hash.
//!
//! ## Key Types
//!
//! - [`HistoryFile`] / [`VersionEntry`] - Typed form of the history text format
//! - [`VersionGraph`] - Parent/child index over the entries of one history
//! - [`HistoryStore`] - Where history files and live content are kept
//! - [`FsHistoryStore`] - Filesystem backend with atomic writes
//! - [`MemoryHistoryStore`] - In-memory backend for tests
//! - [`VersionLog`] - Init, append and reconstruct on top of a store
//!
//! ## Usage
//!
//! ```rust
//! use scribe_core::canonicalize;
//! use scribe_store::{MemoryHistoryStore, VersionLog};
//!
//! let log = VersionLog::new(MemoryHistoryStore::new());
//! let v0 = canonicalize("Hello");
//! let v1 = canonicalize("Hello\nWorld");
//!
//! log.init_history("post.md", v0.content_hash(), &v0, "2024-01-01T00:00:00Z").unwrap();
//! log.append_version("post.md", v1.content_hash(), &v1, "2024-01-02T00:00:00Z").unwrap();
//!
//! let old = log.reconstruct("post.md", &v0.content_hash()).unwrap();
//! assert_eq!(old, v0);
//! assert_eq!(log.current_hash("post.md").unwrap(), v1.content_hash());
//! ```
//!
//! ## Design Notes
//!
//! - **Append only**: Entries are never mutated or removed
//! - **First match wins**: A hash that appears twice resolves to its first entry
//! - **Two strategies**: Reconstruction walks back from the live file when it
//!   can and replays forward from the root when it cannot

pub mod error;
pub mod format;
pub mod fs;
pub mod graph;
pub mod log;
pub mod memory;
pub mod patch;
pub mod traits;

pub use error::{Result, StoreError};
pub use format::{EntryBody, HistoryFile, VersionEntry, FORMAT_VERSION};
pub use fs::{write_atomic, write_private, FsHistoryStore, DEFAULT_EXTENSION};
pub use graph::VersionGraph;
pub use log::{AppendOutcome, VersionLog};
pub use memory::MemoryHistoryStore;
pub use traits::HistoryStore;
