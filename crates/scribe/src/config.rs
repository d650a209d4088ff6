//! Scribe configuration.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use scribe_store::{FsHistoryStore, DEFAULT_EXTENSION};

use crate::error::{Result, ScribeError};
use crate::keystore::KeyStore;

/// Configuration for a Scribe instance.
///
/// Missing fields in a JSON file take their defaults. Relative paths are
/// resolved against the process working directory unless the config is
/// re-rooted with [`ScribeConfig::rooted_at`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScribeConfig {
    /// Directory holding the live canonical files.
    pub content_root: PathBuf,
    /// Directory holding one history file per content file.
    pub history_root: PathBuf,
    /// Extension appended to a content path to name its history file.
    pub history_extension: String,
    /// Directory holding the signing key.
    pub key_dir: PathBuf,
    /// File name of the private key; the public key gets `.pub` appended.
    pub key_name: String,
    /// Comment written after the public key.
    pub key_comment: String,
}

impl Default for ScribeConfig {
    fn default() -> Self {
        Self {
            content_root: PathBuf::from("content"),
            history_root: PathBuf::from(".scribe/history"),
            history_extension: DEFAULT_EXTENSION.to_string(),
            key_dir: PathBuf::from(".scribe/keys"),
            key_name: "id_ed25519".to_string(),
            key_comment: String::new(),
        }
    }
}

impl ScribeConfig {
    /// Parse a JSON configuration.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(text).map_err(|e| ScribeError::Config(e.to_string()))?;
        config.check()?;
        Ok(config)
    }

    /// Load a JSON configuration file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text).map_err(|e| match e {
            ScribeError::Config(msg) => ScribeError::Config(format!("{}: {msg}", path.display())),
            other => other,
        })
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| ScribeError::Config(e.to_string()))
    }

    /// Resolve every relative directory against `base`.
    pub fn rooted_at(mut self, base: impl AsRef<Path>) -> Self {
        let base = base.as_ref();
        for dir in [&mut self.content_root, &mut self.history_root, &mut self.key_dir] {
            if dir.is_relative() {
                *dir = base.join(&*dir);
            }
        }
        self
    }

    /// The filesystem history store this config describes.
    pub fn history_store(&self) -> FsHistoryStore {
        FsHistoryStore::new(
            &self.content_root,
            &self.history_root,
            &self.history_extension,
        )
    }

    /// The key store this config describes.
    pub fn key_store(&self) -> KeyStore {
        KeyStore::new(&self.key_dir, &self.key_name)
    }

    fn check(&self) -> Result<()> {
        if self.history_extension.is_empty() || self.history_extension.contains(['/', '\\']) {
            return Err(ScribeError::Config(format!(
                "invalid history extension {:?}",
                self.history_extension
            )));
        }
        if self.key_name.is_empty() || self.key_name.contains(['/', '\\']) {
            return Err(ScribeError::Config(format!(
                "invalid key name {:?}",
                self.key_name
            )));
        }
        if self.key_comment.contains(['\n', '\r']) {
            return Err(ScribeError::Config("key comment must be a single line".into()));
        }
        Ok(())
    }
}
