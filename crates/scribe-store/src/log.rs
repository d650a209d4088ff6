//! The version log: init, append and reconstruct.
//!
//! Reconstruction has two strategies. Backward starts from the live file,
//! which must hash to the head, and undoes diffs toward the target; it
//! touches only the entries newer than the target. Forward starts from the
//! root's full content and replays diffs along the shortest path to the
//! target; it needs nothing but the history file. Backward is tried first
//! and forward is the fallback.

use scribe_core::{canonicalize, CanonicalContent, ContentHash};

use crate::error::{Result, StoreError};
use crate::format::{EntryBody, HistoryFile, VersionEntry};
use crate::graph::VersionGraph;
use crate::patch::{apply_forward, apply_reverse, make_diff};
use crate::traits::HistoryStore;

/// Result of appending a version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppendOutcome {
    /// A new entry was appended on top of `parent`.
    Appended {
        parent: ContentHash,
        /// The body is textually identical to the parent's.
        diff_empty: bool,
    },
    /// The hash is already the current version; nothing was written.
    Unchanged,
}

/// Version history operations on top of a [`HistoryStore`].
///
/// Appends are read-modify-write without locking. Callers must not append
/// to the same path from two places at once.
#[derive(Debug)]
pub struct VersionLog<S> {
    store: S,
}

impl<S: HistoryStore> VersionLog<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// The underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Whether `path` has a history.
    pub fn exists(&self, path: &str) -> Result<bool> {
        self.store.exists(path)
    }

    /// Load and validate the history for `path`.
    pub fn load(&self, path: &str) -> Result<HistoryFile> {
        let history = self
            .store
            .load(path)?
            .ok_or_else(|| StoreError::HistoryMissing(path.to_string()))?;
        history.validate()?;
        Ok(history)
    }

    /// Start the history of `path` with its first version.
    pub fn init_history(
        &self,
        path: &str,
        hash: ContentHash,
        content: &CanonicalContent,
        timestamp: &str,
    ) -> Result<()> {
        if self.store.exists(path)? {
            return Err(StoreError::HistoryExists(path.to_string()));
        }
        let history = HistoryFile::new(path, VersionEntry::root(hash, timestamp, content.as_str()));
        self.store.save(path, &history)?;
        tracing::debug!(path, %hash, "initialized history");
        Ok(())
    }

    /// Record a new version of `path`.
    ///
    /// The diff is taken against the current head as rebuilt from the
    /// history alone, so the live file may already hold the new content.
    pub fn append_version(
        &self,
        path: &str,
        hash: ContentHash,
        content: &CanonicalContent,
        timestamp: &str,
    ) -> Result<AppendOutcome> {
        let mut history = self.load(path)?;
        let parent = history.current_hash;
        if hash == parent {
            tracing::debug!(path, %hash, "version already current");
            return Ok(AppendOutcome::Unchanged);
        }

        let previous = {
            let graph = VersionGraph::new(&history);
            replay_forward(&graph, &parent)?
        };
        let diff = make_diff(previous.as_str(), content.as_str());
        let diff_empty = diff.is_empty();

        history.push(VersionEntry::revision(hash, timestamp, parent, diff));
        self.store.save(path, &history)?;
        tracing::debug!(path, %hash, %parent, diff_empty, "appended version");
        Ok(AppendOutcome::Appended { parent, diff_empty })
    }

    /// The current version of `path`.
    pub fn current_hash(&self, path: &str) -> Result<ContentHash> {
        Ok(self.load(path)?.current_hash)
    }

    /// All entries of `path`, in file order.
    pub fn entries(&self, path: &str) -> Result<Vec<VersionEntry>> {
        Ok(self.load(path)?.entries)
    }

    /// Rebuild the canonical content of `path` at version `target`.
    pub fn reconstruct(&self, path: &str, target: &ContentHash) -> Result<CanonicalContent> {
        let history = self.load(path)?;
        let graph = VersionGraph::new(&history);

        let entry = graph
            .get(target)
            .ok_or(StoreError::VersionNotFound(*target))?;
        if let EntryBody::FullContent(content) = &entry.body {
            return as_canonical(content.clone());
        }

        match self.walk_backward(path, &history, &graph, target) {
            Ok(content) => return Ok(content),
            Err(e) => tracing::warn!(
                path,
                %target,
                error = %e,
                "backward reconstruction failed, replaying from root"
            ),
        }
        replay_forward(&graph, target)
    }

    /// Rebuild `target` from the live file only.
    pub fn reconstruct_backward(
        &self,
        path: &str,
        target: &ContentHash,
    ) -> Result<CanonicalContent> {
        let history = self.load(path)?;
        let graph = VersionGraph::new(&history);
        self.walk_backward(path, &history, &graph, target)
    }

    /// Rebuild `target` from the root's full content only.
    pub fn reconstruct_forward(&self, path: &str, target: &ContentHash) -> Result<CanonicalContent> {
        let history = self.load(path)?;
        let graph = VersionGraph::new(&history);
        replay_forward(&graph, target)
    }

    fn walk_backward(
        &self,
        path: &str,
        history: &HistoryFile,
        graph: &VersionGraph<'_>,
        target: &ContentHash,
    ) -> Result<CanonicalContent> {
        let live = self
            .store
            .read_live(path)?
            .ok_or_else(|| StoreError::Reconstruction(format!("live file {path} is missing")))?;
        let walk = graph
            .ancestry(&history.current_hash, target)
            .ok_or_else(|| {
                StoreError::Reconstruction(format!(
                    "{target} is not an ancestor of {}",
                    history.current_hash
                ))
            })?;

        let live = canonicalize(&live);
        if live.content_hash() != history.current_hash {
            return Err(StoreError::Reconstruction(format!(
                "live file {path} does not match {}",
                history.current_hash
            )));
        }

        let mut content = live.into_string();
        for entry in walk {
            content = apply_reverse(&content, diff_of(entry)?)?;
        }
        as_canonical(content)
    }
}

/// Replay diffs from the root along the shortest path to `target`.
fn replay_forward(graph: &VersionGraph<'_>, target: &ContentHash) -> Result<CanonicalContent> {
    let root = graph
        .root()
        .ok_or_else(|| StoreError::Corrupt("history has no root".into()))?;
    let EntryBody::FullContent(base) = &root.body else {
        return Err(StoreError::Corrupt("root does not store full content".into()));
    };
    let path = graph
        .path_from_root(target)
        .ok_or(StoreError::VersionNotFound(*target))?;

    let mut content = base.clone();
    for entry in path {
        content = apply_forward(&content, diff_of(entry)?)?;
    }
    as_canonical(content)
}

fn diff_of(entry: &VersionEntry) -> Result<&str> {
    entry.diff().ok_or_else(|| {
        StoreError::Corrupt(format!("{} stores full content but has a parent", entry.hash))
    })
}

fn as_canonical(content: String) -> Result<CanonicalContent> {
    CanonicalContent::from_canonical(content)
        .ok_or_else(|| StoreError::Reconstruction("rebuilt content is not canonical".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryHistoryStore;
    use proptest::prelude::*;

    const PATH: &str = "posts/hello.md";

    fn log() -> VersionLog<MemoryHistoryStore> {
        VersionLog::new(MemoryHistoryStore::new())
    }

    /// Publish the way the pipeline does: history first, then live file.
    fn publish(log: &VersionLog<MemoryHistoryStore>, text: &str, ts: &str) -> ContentHash {
        let content = canonicalize(text);
        let hash = content.content_hash();
        if log.exists(PATH).unwrap() {
            log.append_version(PATH, hash, &content, ts).unwrap();
        } else {
            log.init_history(PATH, hash, &content, ts).unwrap();
        }
        log.store().write_live(PATH, content.as_str()).unwrap();
        hash
    }

    #[test]
    fn test_hello_world_scenario() {
        let log = log();
        let h0 = publish(&log, "Hello\n", "2024-01-01T00:00:00Z");
        let h1 = publish(&log, "Hello\nWorld\n", "2024-01-02T00:00:00Z");

        assert_eq!(log.current_hash(PATH).unwrap(), h1);
        assert_eq!(log.reconstruct(PATH, &h0).unwrap().as_str(), "Hello\n");
        assert_eq!(log.reconstruct(PATH, &h1).unwrap().as_str(), "Hello\nWorld\n");

        let entries = log.entries(PATH).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].parent, Some(h0));
        assert!(entries[1].diff().unwrap().contains("+World"));
    }

    #[test]
    fn test_init_refuses_overwrite() {
        let log = log();
        publish(&log, "one\n", "t0");
        let content = canonicalize("two\n");
        let err = log
            .init_history(PATH, content.content_hash(), &content, "t1")
            .unwrap_err();
        assert!(matches!(err, StoreError::HistoryExists(_)));
    }

    #[test]
    fn test_append_without_history() {
        let log = log();
        let content = canonicalize("x");
        let err = log
            .append_version(PATH, content.content_hash(), &content, "t")
            .unwrap_err();
        assert!(matches!(err, StoreError::HistoryMissing(_)));
    }

    #[test]
    fn test_append_same_hash_is_unchanged() {
        let log = log();
        let h0 = publish(&log, "same\n", "t0");
        let content = canonicalize("same\n");
        assert_eq!(
            log.append_version(PATH, h0, &content, "t1").unwrap(),
            AppendOutcome::Unchanged
        );
        assert_eq!(log.entries(PATH).unwrap().len(), 1);
    }

    #[test]
    fn test_metadata_only_change_appends_empty_diff() {
        let log = log();
        let h0 = publish(&log, "body\n", "t0");
        let content = canonicalize("body\n");
        // Same body, different hash: something outside the body changed.
        let h1 = ContentHash::of(b"body\nwith other metadata");
        assert_eq!(
            log.append_version(PATH, h1, &content, "t1").unwrap(),
            AppendOutcome::Appended {
                parent: h0,
                diff_empty: true
            }
        );
        assert_eq!(log.reconstruct(PATH, &h0).unwrap().as_str(), "body\n");
        assert_eq!(log.reconstruct_forward(PATH, &h1).unwrap().as_str(), "body\n");
    }

    #[test]
    fn test_unknown_version() {
        let log = log();
        publish(&log, "a\n", "t0");
        publish(&log, "b\n", "t1");
        let missing = ContentHash::of(b"never\n");
        assert!(matches!(
            log.reconstruct(PATH, &missing),
            Err(StoreError::VersionNotFound(h)) if h == missing
        ));
    }

    #[test]
    fn test_missing_live_falls_back_to_forward() {
        let log = log();
        let h0 = publish(&log, "a\nb\nc\n", "t0");
        let h1 = publish(&log, "a\nB\nc\n", "t1");
        publish(&log, "a\nB\nc\nd\n", "t2");
        log.store().remove_live(PATH).unwrap();

        assert!(log.reconstruct_backward(PATH, &h1).is_err());
        assert_eq!(log.reconstruct(PATH, &h1).unwrap().as_str(), "a\nB\nc\n");
        assert_eq!(log.reconstruct(PATH, &h0).unwrap().as_str(), "a\nb\nc\n");
    }

    #[test]
    fn test_desynced_live_falls_back_to_forward() {
        let log = log();
        let h0 = publish(&log, "first line\nsecond line\n", "t0");
        publish(&log, "first line\nsecond line\nthird line\n", "t1");
        log.store()
            .set_live(PATH, "something\nentirely\ndifferent\n")
            .unwrap();

        assert!(matches!(
            log.reconstruct_backward(PATH, &h0),
            Err(StoreError::Reconstruction(_))
        ));
        assert_eq!(
            log.reconstruct(PATH, &h0).unwrap().as_str(),
            "first line\nsecond line\n"
        );
    }

    #[test]
    fn test_partially_edited_live_falls_back_to_forward() {
        let log = log();
        publish(&log, "a\nb\nc\nd\ne\nf\ng\nh\n", "t0");
        let h1 = publish(&log, "a\nb\nc\nd\ne\nf\ng\nH\n", "t1");
        publish(&log, "a\nb\nc\nd\ne\nf\nG\nH\n", "t2");
        // The edited line is outside every hunk, so reverse patches would apply.
        log.store()
            .set_live(PATH, "EDITED\nb\nc\nd\ne\nf\nG\nH\n")
            .unwrap();

        assert!(matches!(
            log.reconstruct_backward(PATH, &h1),
            Err(StoreError::Reconstruction(_))
        ));
        assert_eq!(
            log.reconstruct(PATH, &h1).unwrap().as_str(),
            "a\nb\nc\nd\ne\nf\ng\nH\n"
        );
    }

    #[test]
    fn test_backward_walks_through_revert() {
        let log = log();
        let h0 = publish(&log, "v1\n", "t0");
        let h1 = publish(&log, "v2\n", "t1");
        publish(&log, "v1\n", "t2");
        let h3 = publish(&log, "v1\nv3\n", "t3");
        assert_eq!(log.reconstruct_backward(PATH, &h1).unwrap().as_str(), "v2\n");
        assert_eq!(log.reconstruct_backward(PATH, &h0).unwrap().as_str(), "v1\n");
        assert_eq!(log.reconstruct_backward(PATH, &h3).unwrap().as_str(), "v1\nv3\n");
    }

    #[test]
    fn test_append_ignores_overwritten_live_file() {
        let log = log();
        let h0 = publish(&log, "one\n", "t0");
        // Live file already replaced by something unrelated before the append.
        log.store().set_live(PATH, "unrelated\n").unwrap();
        let content = canonicalize("one\ntwo\n");
        let h1 = content.content_hash();
        log.append_version(PATH, h1, &content, "t1").unwrap();
        assert_eq!(log.reconstruct_forward(PATH, &h1).unwrap(), content);
        assert_eq!(log.reconstruct_forward(PATH, &h0).unwrap().as_str(), "one\n");
    }

    #[test]
    fn test_revert_creates_duplicate_hash() {
        let log = log();
        let h0 = publish(&log, "v1\n", "t0");
        let h1 = publish(&log, "v2\n", "t1");
        let h2 = publish(&log, "v1\n", "t2");
        assert_eq!(h2, h0);
        assert_eq!(log.current_hash(PATH).unwrap(), h0);
        assert_eq!(log.entries(PATH).unwrap().len(), 3);
        assert_eq!(log.reconstruct(PATH, &h0).unwrap().as_str(), "v1\n");
        assert_eq!(log.reconstruct(PATH, &h1).unwrap().as_str(), "v2\n");

        // Appending after the revert diffs against the reverted content.
        let h3 = publish(&log, "v1\nv3\n", "t3");
        assert_eq!(log.reconstruct(PATH, &h3).unwrap().as_str(), "v1\nv3\n");
    }

    #[test]
    fn test_corrupt_history_rejected_on_load() {
        let log = log();
        publish(&log, "a\n", "t0");
        let text = log.store().raw_history(PATH).unwrap().unwrap();
        let broken = text.replace("PARENT=none", &format!("PARENT={}", ContentHash::of(b"x")));
        log.store().set_raw_history(PATH, &broken).unwrap();
        assert!(matches!(log.load(PATH), Err(StoreError::Corrupt(_))));
    }

    #[test]
    fn test_bad_diff_is_reconstruction_error() {
        let log = log();
        publish(&log, "a\nb\n", "t0");
        let h1 = publish(&log, "a\nc\n", "t1");
        log.store().remove_live(PATH).unwrap();
        let text = log.store().raw_history(PATH).unwrap().unwrap();
        log.store()
            .set_raw_history(PATH, &text.replace("-b\n", "-zzz\n"))
            .unwrap();
        // Head requested directly: forward replay hits the bad hunk.
        assert!(matches!(
            log.reconstruct(PATH, &h1),
            Err(StoreError::Reconstruction(_))
        ));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(48))]

        #[test]
        fn test_chain_roundtrip_and_strategies_agree(
            revisions in prop::collection::vec(
                prop::collection::vec("[a-d]{0,4}", 1..8),
                1..8,
            ),
        ) {
            let log = log();
            let mut published = Vec::new();
            for (i, lines) in revisions.iter().enumerate() {
                let text = lines.join("\n");
                let content = canonicalize(&text);
                let hash = publish(&log, &text, &format!("t{i}"));
                published.push((hash, content));
            }

            let head = published.last().map(|(h, _)| *h).unwrap();
            prop_assert_eq!(log.current_hash(PATH).unwrap(), head);

            for (hash, content) in &published {
                let rebuilt = log.reconstruct(PATH, hash).unwrap();
                prop_assert_eq!(&rebuilt, content);
                prop_assert_eq!(&log.reconstruct_forward(PATH, hash).unwrap(), content);
                prop_assert_eq!(&log.reconstruct_backward(PATH, hash).unwrap(), content);
            }
        }
    }
}
