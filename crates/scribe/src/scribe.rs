//! The main Scribe implementation.

use chrono::{SecondsFormat, Utc};
use serde::Serialize;

use scribe_core::{
    canonicalize, signer, CanonicalContent, ContentHash, KeyPair, PublicKey, VerificationStatus,
};
use scribe_store::{AppendOutcome, EntryBody, FsHistoryStore, HistoryStore, VersionLog};

use crate::config::ScribeConfig;
use crate::error::Result;

/// Current time as an RFC 3339 UTC timestamp with second precision.
pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// What publishing did to the file's history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum PublishOutcome {
    /// First publish: the history was created.
    Created,
    /// A new version was appended on top of `parent`.
    Appended { parent: ContentHash, diff_empty: bool },
    /// The content was already the current version.
    Unchanged,
}

/// Everything a publish produced.
#[derive(Debug, Clone)]
pub struct PublishReceipt {
    pub path: String,
    pub hash: ContentHash,
    pub content: CanonicalContent,
    /// Armored `SSH SIGNATURE` over the canonical content.
    pub signature: String,
    pub timestamp: String,
    pub outcome: PublishOutcome,
}

/// How an entry stores its content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    FullContent,
    Diff,
}

/// One line of a file's history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntrySummary {
    pub hash: ContentHash,
    pub parent: Option<ContentHash>,
    pub timestamp: String,
    pub kind: EntryKind,
    pub is_current: bool,
}

/// The main Scribe struct.
///
/// Holds the author's key, the version log, and the configuration. All
/// state is owned here; nothing is global.
pub struct Scribe<S: HistoryStore> {
    /// The author's signing key.
    keypair: KeyPair,
    /// History of every published file.
    log: VersionLog<S>,
    /// Configuration.
    config: ScribeConfig,
}

impl Scribe<FsHistoryStore> {
    /// Open a filesystem-backed Scribe, generating a key if none exists.
    pub fn open(config: ScribeConfig) -> Result<Self> {
        let (keypair, created) = config.key_store().load_or_generate(&config.key_comment)?;
        if created {
            tracing::info!(
                fingerprint = %keypair.public_key().fingerprint(),
                "using newly generated key"
            );
        }
        let store = config.history_store();
        Ok(Self::new(keypair, store, config))
    }
}

impl<S: HistoryStore> Scribe<S> {
    /// Create a new Scribe instance.
    pub fn new(keypair: KeyPair, store: S, config: ScribeConfig) -> Self {
        Self {
            keypair,
            log: VersionLog::new(store),
            config,
        }
    }

    /// Get the author's public key.
    pub fn public_key(&self) -> PublicKey {
        self.keypair.public_key()
    }

    /// The author's public key in one-line OpenSSH form.
    pub fn public_key_line(&self) -> String {
        self.keypair.public_key().to_openssh(&self.config.key_comment)
    }

    /// Get the version log.
    pub fn log(&self) -> &VersionLog<S> {
        &self.log
    }

    /// Get the store reference.
    pub fn store(&self) -> &S {
        self.log.store()
    }

    pub fn config(&self) -> &ScribeConfig {
        &self.config
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Publishing
    // ─────────────────────────────────────────────────────────────────────────

    /// Canonicalize, hash and sign `text` without recording anything.
    pub fn sign_content(&self, text: &str) -> (CanonicalContent, ContentHash, String) {
        let content = canonicalize(text);
        let hash = content.content_hash();
        let signature = signer::sign_with(&self.keypair, content.as_bytes()).to_pem();
        (content, hash, signature)
    }

    /// Publish `text` as the new version of `path`, timestamped now.
    pub fn publish(&self, path: &str, text: &str) -> Result<PublishReceipt> {
        self.publish_at(path, text, &now_timestamp())
    }

    /// Publish with an explicit timestamp.
    ///
    /// Records the history first, then writes the live file. If the history
    /// step fails nothing on disk has changed.
    pub fn publish_at(&self, path: &str, text: &str, timestamp: &str) -> Result<PublishReceipt> {
        let (content, hash, signature) = self.sign_content(text);

        let outcome = if self.log.exists(path)? {
            match self.log.append_version(path, hash, &content, timestamp)? {
                AppendOutcome::Appended { parent, diff_empty } => {
                    PublishOutcome::Appended { parent, diff_empty }
                }
                AppendOutcome::Unchanged => PublishOutcome::Unchanged,
            }
        } else {
            self.log.init_history(path, hash, &content, timestamp)?;
            PublishOutcome::Created
        };
        self.log.store().write_live(path, content.as_str())?;

        tracing::debug!(path, %hash, ?outcome, "published");
        Ok(PublishReceipt {
            path: path.to_string(),
            hash,
            content,
            signature,
            timestamp: timestamp.to_string(),
            outcome,
        })
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Verification
    // ─────────────────────────────────────────────────────────────────────────

    /// Check content fetched from elsewhere.
    ///
    /// The text is canonicalized first, so copies that differ only in line
    /// endings or trailing whitespace verify the same.
    pub fn verify_remote(
        &self,
        text: &str,
        public_key_line: Option<&str>,
        signature_pem: Option<&str>,
    ) -> VerificationStatus {
        let content = canonicalize(text);
        let status = signer::check(content.as_bytes(), public_key_line, signature_pem);
        if let VerificationStatus::Unverifiable(reason) = &status {
            tracing::warn!(%reason, "remote content is unverifiable");
        }
        status
    }

    /// Check content against this author's own key.
    pub fn verify_own(&self, text: &str, signature_pem: &str) -> VerificationStatus {
        self.verify_remote(text, Some(&self.public_key_line()), Some(signature_pem))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // History
    // ─────────────────────────────────────────────────────────────────────────

    /// The exact canonical content of `path` at version `hash`.
    pub fn show_version(&self, path: &str, hash: &ContentHash) -> Result<CanonicalContent> {
        Ok(self.log.reconstruct(path, hash)?)
    }

    /// The current version of `path`.
    pub fn current_hash(&self, path: &str) -> Result<ContentHash> {
        Ok(self.log.current_hash(path)?)
    }

    /// Every recorded version of `path`, oldest first.
    pub fn history(&self, path: &str) -> Result<Vec<EntrySummary>> {
        let history = self.log.load(path)?;
        let current = history.current_hash;
        let mut marked = false;
        Ok(history
            .entries
            .into_iter()
            .map(|entry| {
                // Only the first entry with the current hash is the head.
                let is_current = !marked && entry.hash == current;
                marked |= is_current;
                EntrySummary {
                    hash: entry.hash,
                    parent: entry.parent,
                    timestamp: entry.timestamp,
                    kind: match entry.body {
                        EntryBody::FullContent(_) => EntryKind::FullContent,
                        EntryBody::Diff(_) => EntryKind::Diff,
                    },
                    is_current,
                }
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scribe_store::{MemoryHistoryStore, StoreError};

    use crate::error::ScribeError;

    fn scribe() -> Scribe<MemoryHistoryStore> {
        Scribe::new(
            KeyPair::from_seed(&[0x42; 32]),
            MemoryHistoryStore::new(),
            ScribeConfig::default(),
        )
    }

    #[test]
    fn test_timestamp_format() {
        let ts = now_timestamp();
        assert_eq!(ts.len(), "2024-01-01T00:00:00Z".len());
        assert!(ts.ends_with('Z'));
        assert!(chrono::DateTime::parse_from_rfc3339(&ts).is_ok());
    }

    #[test]
    fn test_publish_lifecycle() {
        let scribe = scribe();
        let first = scribe.publish_at("a.md", "Hello", "t0").unwrap();
        assert_eq!(first.outcome, PublishOutcome::Created);
        assert_eq!(first.content.as_str(), "Hello\n");

        let second = scribe.publish_at("a.md", "Hello\nWorld", "t1").unwrap();
        assert_eq!(
            second.outcome,
            PublishOutcome::Appended {
                parent: first.hash,
                diff_empty: false
            }
        );

        let third = scribe.publish_at("a.md", "Hello\nWorld\n\n", "t2").unwrap();
        assert_eq!(third.outcome, PublishOutcome::Unchanged);
        assert_eq!(third.hash, second.hash);

        assert_eq!(scribe.current_hash("a.md").unwrap(), second.hash);
        assert_eq!(
            scribe.store().read_live("a.md").unwrap().as_deref(),
            Some("Hello\nWorld\n")
        );
    }

    #[test]
    fn test_failed_append_leaves_live_file_untouched() {
        let scribe = scribe();
        scribe.publish_at("a.md", "a\nb\n", "t0").unwrap();
        let head = scribe.publish_at("a.md", "a\nc\n", "t1").unwrap();
        let text = scribe.store().raw_history("a.md").unwrap().unwrap();
        scribe
            .store()
            .set_raw_history("a.md", &text.replace("-b\n", "-zzz\n"))
            .unwrap();

        let err = scribe.publish_at("a.md", "a\nd\n", "t2").unwrap_err();
        assert!(matches!(
            err,
            ScribeError::Store(StoreError::Reconstruction(_))
        ));
        assert_eq!(
            scribe.store().read_live("a.md").unwrap().as_deref(),
            Some("a\nc\n")
        );
        assert_eq!(scribe.current_hash("a.md").unwrap(), head.hash);
        assert_eq!(scribe.history("a.md").unwrap().len(), 2);
    }

    #[test]
    fn test_invalid_path_writes_nothing() {
        let scribe = scribe();
        let err = scribe.publish_at("../a.md", "x", "t0").unwrap_err();
        assert!(matches!(err, ScribeError::Store(StoreError::InvalidPath(_))));
        assert!(scribe.store().read_live("../a.md").unwrap().is_none());
    }

    #[test]
    fn test_signature_matches_golden() {
        let scribe = scribe();
        let receipt = scribe.publish_at("a.md", "Hello\n", "t0").unwrap();
        assert_eq!(
            receipt.hash.to_string(),
            "sha256:66a045b452102c59d840ec097d59d9467e13a3f34f6494e539ffd32c1bb35f18"
        );
        assert!(receipt.signature.starts_with("-----BEGIN SSH SIGNATURE-----\n"));
        assert_eq!(scribe.verify_own("Hello\r\n", &receipt.signature), VerificationStatus::Valid);
    }

    #[test]
    fn test_verify_remote_outcomes() {
        let scribe = scribe();
        let receipt = scribe.publish_at("a.md", "post body", "t0").unwrap();
        let key = scribe.public_key_line();

        assert_eq!(
            scribe.verify_remote("post body\n\n", Some(&key), Some(&receipt.signature)),
            VerificationStatus::Valid
        );
        assert_eq!(
            scribe.verify_remote("post body!", Some(&key), Some(&receipt.signature)),
            VerificationStatus::Invalid
        );
        assert!(matches!(
            scribe.verify_remote("post body", None, Some(&receipt.signature)),
            VerificationStatus::Unverifiable(_)
        ));
        assert!(matches!(
            scribe.verify_remote("post body", Some(&key), Some("garbage")),
            VerificationStatus::Unverifiable(_)
        ));
    }

    #[test]
    fn test_history_summary() {
        let scribe = scribe();
        let a = scribe.publish_at("a.md", "one", "t0").unwrap();
        let b = scribe.publish_at("a.md", "two", "t1").unwrap();
        let history = scribe.history("a.md").unwrap();

        assert_eq!(history.len(), 2);
        assert_eq!(history[0].hash, a.hash);
        assert_eq!(history[0].kind, EntryKind::FullContent);
        assert!(!history[0].is_current);
        assert_eq!(history[1].parent, Some(a.hash));
        assert_eq!(history[1].kind, EntryKind::Diff);
        assert!(history[1].is_current);
        assert_eq!(history[1].hash, b.hash);
    }

    #[test]
    fn test_show_unknown_version() {
        let scribe = scribe();
        scribe.publish_at("a.md", "one", "t0").unwrap();
        let err = scribe
            .show_version("a.md", &ContentHash::of(b"nope"))
            .unwrap_err();
        assert!(matches!(
            err,
            ScribeError::Store(StoreError::VersionNotFound(_))
        ));
    }

    #[test]
    fn test_history_of_unpublished_file() {
        let scribe = scribe();
        assert!(matches!(
            scribe.history("never.md"),
            Err(ScribeError::Store(StoreError::HistoryMissing(_)))
        ));
    }

    #[test]
    fn test_public_key_line_uses_comment() {
        let scribe = Scribe::new(
            KeyPair::from_seed(&[0x42; 32]),
            MemoryHistoryStore::new(),
            ScribeConfig {
                key_comment: "author@example".into(),
                ..ScribeConfig::default()
            },
        );
        assert!(scribe.public_key_line().ends_with(" author@example"));
    }

    #[test]
    fn test_outcome_serializes() {
        let json = serde_json::to_string(&PublishOutcome::Created).unwrap();
        assert_eq!(json, r#"{"kind":"created"}"#);
    }
}
