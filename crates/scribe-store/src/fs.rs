//! Filesystem implementation of the HistoryStore trait.
//!
//! Layout, for content path `posts/hello.md` and extension `versions`:
//!
//! ```text
//! <content_root>/posts/hello.md            live canonical file
//! <history_root>/posts/hello.md.versions   history file
//! ```
//!
//! Every write goes to a temporary file in the target directory and is then
//! renamed over the target, so a crash leaves either the old or the new
//! file, never a partial one.

use std::fs;
use std::io::{self, Write};
use std::path::{Component, Path, PathBuf};

use crate::error::{Result, StoreError};
use crate::format::HistoryFile;
use crate::traits::HistoryStore;

/// Default history file extension.
pub const DEFAULT_EXTENSION: &str = "versions";

const PUBLIC_MODE: u32 = 0o644;
const PRIVATE_MODE: u32 = 0o600;

/// Atomically replace `path` with `bytes` (mode 0644 on Unix).
pub fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    write_atomic_with_mode(path, bytes, PUBLIC_MODE)
}

/// Atomically replace `path` with `bytes`, readable by the owner only.
pub fn write_private(path: &Path, bytes: &[u8]) -> io::Result<()> {
    write_atomic_with_mode(path, bytes, PRIVATE_MODE)
}

/// The mode only applies on Unix.
fn write_atomic_with_mode(path: &Path, bytes: &[u8], mode: u32) -> io::Result<()> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tmp.as_file()
            .set_permissions(fs::Permissions::from_mode(mode))?;
    }
    #[cfg(not(unix))]
    let _ = mode;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// History store backed by two directory trees.
#[derive(Debug, Clone)]
pub struct FsHistoryStore {
    content_root: PathBuf,
    history_root: PathBuf,
    extension: String,
}

impl FsHistoryStore {
    /// Create a store. Directories are created lazily on first write.
    pub fn new(
        content_root: impl Into<PathBuf>,
        history_root: impl Into<PathBuf>,
        extension: impl Into<String>,
    ) -> Self {
        Self {
            content_root: content_root.into(),
            history_root: history_root.into(),
            extension: extension.into(),
        }
    }

    /// Store with the default `versions` extension.
    pub fn with_default_extension(
        content_root: impl Into<PathBuf>,
        history_root: impl Into<PathBuf>,
    ) -> Self {
        Self::new(content_root, history_root, DEFAULT_EXTENSION)
    }

    pub fn content_root(&self) -> &Path {
        &self.content_root
    }

    pub fn history_root(&self) -> &Path {
        &self.history_root
    }

    /// Where the live file for `path` lives.
    pub fn live_path(&self, path: &str) -> Result<PathBuf> {
        check_relative(path)?;
        Ok(self.content_root.join(path))
    }

    /// Where the history file for `path` lives.
    pub fn history_path(&self, path: &str) -> Result<PathBuf> {
        check_relative(path)?;
        Ok(self
            .history_root
            .join(format!("{path}.{}", self.extension)))
    }
}

/// Content paths must stay inside the root they are joined to, and must fit
/// on the one-line `CANONICAL_FILE` header.
pub(crate) fn check_relative(path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(StoreError::InvalidPath("empty path".into()));
    }
    if path.chars().any(char::is_control) {
        return Err(StoreError::InvalidPath(format!(
            "{path:?} contains control characters"
        )));
    }
    let escapes = Path::new(path).components().any(|c| {
        matches!(
            c,
            Component::ParentDir | Component::RootDir | Component::Prefix(_)
        )
    });
    if escapes {
        return Err(StoreError::InvalidPath(format!(
            "{path:?} must be relative and stay inside the content root"
        )));
    }
    Ok(())
}

fn read_optional(path: &Path) -> Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(text) => Ok(Some(text)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn write_with_dirs(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    write_atomic(path, bytes)?;
    Ok(())
}

impl HistoryStore for FsHistoryStore {
    fn load(&self, path: &str) -> Result<Option<HistoryFile>> {
        let history_path = self.history_path(path)?;
        let Some(text) = read_optional(&history_path)? else {
            return Ok(None);
        };
        let history = HistoryFile::parse(&text)?;
        if history.canonical_file != path {
            return Err(StoreError::Corrupt(format!(
                "{} tracks {:?}, expected {path:?}",
                history_path.display(),
                history.canonical_file
            )));
        }
        Ok(Some(history))
    }

    fn save(&self, path: &str, history: &HistoryFile) -> Result<()> {
        let history_path = self.history_path(path)?;
        write_with_dirs(&history_path, history.render().as_bytes())?;
        tracing::debug!(path, file = %history_path.display(), "saved history");
        Ok(())
    }

    fn exists(&self, path: &str) -> Result<bool> {
        Ok(self.history_path(path)?.is_file())
    }

    fn read_live(&self, path: &str) -> Result<Option<String>> {
        read_optional(&self.live_path(path)?)
    }

    fn write_live(&self, path: &str, content: &str) -> Result<()> {
        write_with_dirs(&self.live_path(path)?, content.as_bytes())
    }
}
