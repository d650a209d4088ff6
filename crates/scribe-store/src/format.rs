//! The history file text format.
//!
//! ```text
//! # VERSION_FILE_FORMAT=1.0
//! # CANONICAL_FILE=posts/hello.md
//! # CURRENT_HASH=sha256:<hex>
//!
//! [VERSION sha256:<hex>]
//! TIMESTAMP=2024-01-01T00:00:00Z
//! PARENT=none
//! FULL_CONTENT_START
//! <canonical bytes of the root revision>
//! FULL_CONTENT_END
//!
//! [VERSION sha256:<hex>]
//! TIMESTAMP=2024-01-02T00:00:00Z
//! PARENT=sha256:<hex>
//! DIFF_START
//! <unified diff against the parent>
//! DIFF_END
//!
//! ```
//!
//! Section bodies are copied byte for byte. Canonical content is empty or
//! ends in `\n`, so an end marker always starts its own line, and only the
//! end marker matching the open section closes it.

use std::collections::HashSet;

use scribe_core::ContentHash;

use crate::error::{Result, StoreError};

/// The only format version this crate reads and writes.
pub const FORMAT_VERSION: &str = "1.0";

const FORMAT_KEY: &str = "VERSION_FILE_FORMAT";
const FILE_KEY: &str = "CANONICAL_FILE";
const CURRENT_KEY: &str = "CURRENT_HASH";

const VERSION_OPEN: &str = "[VERSION ";
const TIMESTAMP_KEY: &str = "TIMESTAMP=";
const PARENT_KEY: &str = "PARENT=";
const NO_PARENT: &str = "none";

const FULL_START: &str = "FULL_CONTENT_START";
const FULL_END: &str = "FULL_CONTENT_END";
const DIFF_START: &str = "DIFF_START";
const DIFF_END: &str = "DIFF_END";

/// Payload of a version entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryBody {
    /// Complete canonical content. Only the root carries this.
    FullContent(String),
    /// Unified diff from the parent's content to this entry's content.
    Diff(String),
}

/// One revision of a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionEntry {
    pub hash: ContentHash,
    pub timestamp: String,
    pub parent: Option<ContentHash>,
    pub body: EntryBody,
}

impl VersionEntry {
    /// The first revision, stored in full.
    pub fn root(hash: ContentHash, timestamp: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            hash,
            timestamp: timestamp.into(),
            parent: None,
            body: EntryBody::FullContent(content.into()),
        }
    }

    /// A later revision, stored as a diff against `parent`.
    pub fn revision(
        hash: ContentHash,
        timestamp: impl Into<String>,
        parent: ContentHash,
        diff: impl Into<String>,
    ) -> Self {
        Self {
            hash,
            timestamp: timestamp.into(),
            parent: Some(parent),
            body: EntryBody::Diff(diff.into()),
        }
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// The diff text, if this entry stores one.
    pub fn diff(&self) -> Option<&str> {
        match &self.body {
            EntryBody::Diff(diff) => Some(diff),
            EntryBody::FullContent(_) => None,
        }
    }
}

/// The full history of one canonical file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryFile {
    pub format_version: String,
    /// Path of the live file, relative to the content root.
    pub canonical_file: String,
    pub current_hash: ContentHash,
    /// Entries in file (append) order.
    pub entries: Vec<VersionEntry>,
}

impl HistoryFile {
    /// Start a history from its root entry.
    pub fn new(canonical_file: impl Into<String>, root: VersionEntry) -> Self {
        Self {
            format_version: FORMAT_VERSION.to_string(),
            canonical_file: canonical_file.into(),
            current_hash: root.hash,
            entries: vec![root],
        }
    }

    /// Append an entry and make it the current version.
    pub fn push(&mut self, entry: VersionEntry) {
        self.current_hash = entry.hash;
        self.entries.push(entry);
    }

    /// The root entry, if any.
    pub fn root(&self) -> Option<&VersionEntry> {
        self.entries.iter().find(|e| e.is_root())
    }

    /// First entry with this hash, in file order.
    pub fn entry(&self, hash: &ContentHash) -> Option<&VersionEntry> {
        self.entries.iter().find(|e| e.hash == *hash)
    }

    /// The entry `current_hash` points at.
    pub fn head(&self) -> Option<&VersionEntry> {
        self.entry(&self.current_hash)
    }

    /// Check structural invariants.
    ///
    /// Exactly one root, which alone stores full content; `current_hash`
    /// names an entry; every parent resolves and every entry's ancestry
    /// ends at the root.
    pub fn validate(&self) -> Result<()> {
        let roots = self.entries.iter().filter(|e| e.is_root()).count();
        if roots != 1 {
            return Err(StoreError::Corrupt(format!(
                "expected exactly one root entry, found {roots}"
            )));
        }

        for entry in &self.entries {
            match (&entry.parent, &entry.body) {
                (None, EntryBody::FullContent(_)) | (Some(_), EntryBody::Diff(_)) => {}
                (None, EntryBody::Diff(_)) => {
                    return Err(StoreError::Corrupt(format!(
                        "root {} stores a diff instead of full content",
                        entry.hash
                    )))
                }
                (Some(_), EntryBody::FullContent(_)) => {
                    return Err(StoreError::Corrupt(format!(
                        "non-root {} stores full content",
                        entry.hash
                    )))
                }
            }
            if let Some(parent) = &entry.parent {
                if self.entry(parent).is_none() {
                    return Err(StoreError::Corrupt(format!(
                        "{} has unknown parent {parent}",
                        entry.hash
                    )));
                }
            }
        }

        if self.head().is_none() {
            return Err(StoreError::Corrupt(format!(
                "current hash {} has no entry",
                self.current_hash
            )));
        }

        for entry in &self.entries {
            let mut seen = HashSet::new();
            let mut cursor = entry;
            while let Some(parent) = &cursor.parent {
                if !seen.insert(cursor.hash) {
                    return Err(StoreError::Corrupt(format!(
                        "parent cycle through {}",
                        cursor.hash
                    )));
                }
                // Resolvable, checked above.
                match self.entry(parent) {
                    Some(next) => cursor = next,
                    None => break,
                }
            }
        }

        Ok(())
    }

    /// Render to the on-disk text form.
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("# {FORMAT_KEY}={}\n", self.format_version));
        out.push_str(&format!("# {FILE_KEY}={}\n", self.canonical_file));
        out.push_str(&format!("# {CURRENT_KEY}={}\n", self.current_hash));
        out.push('\n');

        for entry in &self.entries {
            out.push_str(&format!("{VERSION_OPEN}{}]\n", entry.hash));
            out.push_str(&format!("{TIMESTAMP_KEY}{}\n", entry.timestamp));
            match &entry.parent {
                Some(parent) => out.push_str(&format!("{PARENT_KEY}{parent}\n")),
                None => out.push_str(&format!("{PARENT_KEY}{NO_PARENT}\n")),
            }
            let (start, body, end) = match &entry.body {
                EntryBody::FullContent(content) => (FULL_START, content, FULL_END),
                EntryBody::Diff(diff) => (DIFF_START, diff, DIFF_END),
            };
            out.push_str(start);
            out.push('\n');
            out.push_str(body);
            out.push_str(end);
            out.push_str("\n\n");
        }
        out
    }

    /// Parse the on-disk text form.
    ///
    /// This checks syntax only; call [`HistoryFile::validate`] for the
    /// structural invariants.
    pub fn parse(text: &str) -> Result<Self> {
        let total_lines = text.lines().count().max(1);
        let mut lines = text
            .split_inclusive('\n')
            .enumerate()
            .map(|(i, line)| (i + 1, line))
            .peekable();

        let mut format_version = None;
        let mut canonical_file = None;
        let mut current_hash = None;

        while let Some(&(n, raw)) = lines.peek() {
            let line = strip_eol(raw);
            if line.starts_with(VERSION_OPEN) {
                break;
            }
            lines.next();
            if line.trim().is_empty() {
                continue;
            }
            let (key, value) = line
                .strip_prefix("# ")
                .and_then(|rest| rest.split_once('='))
                .ok_or_else(|| parse_error(n, format!("unexpected header line {line:?}")))?;
            match key {
                FORMAT_KEY => format_version = Some(value.to_string()),
                FILE_KEY => canonical_file = Some(value.to_string()),
                CURRENT_KEY => current_hash = Some(parse_hash(n, value)?),
                _ => tracing::debug!(key, "ignoring unknown history header"),
            }
        }

        let format_version =
            format_version.ok_or_else(|| parse_error(1, format!("missing {FORMAT_KEY}")))?;
        if format_version != FORMAT_VERSION {
            return Err(parse_error(
                1,
                format!("unsupported format version {format_version:?}"),
            ));
        }
        let canonical_file =
            canonical_file.ok_or_else(|| parse_error(1, format!("missing {FILE_KEY}")))?;
        let current_hash =
            current_hash.ok_or_else(|| parse_error(1, format!("missing {CURRENT_KEY}")))?;

        let mut entries = Vec::new();
        while let Some((n, raw)) = lines.next() {
            let line = strip_eol(raw);
            if line.trim().is_empty() {
                continue;
            }
            let hash_text = line
                .strip_prefix(VERSION_OPEN)
                .and_then(|rest| rest.strip_suffix(']'))
                .ok_or_else(|| parse_error(n, format!("expected version marker, found {line:?}")))?;
            let hash = parse_hash(n, hash_text)?;

            let mut timestamp = None;
            let mut parent = None;
            let body = loop {
                let (n, raw) = lines
                    .next()
                    .ok_or_else(|| parse_error(total_lines, format!("entry {hash} has no body")))?;
                let line = strip_eol(raw);
                if let Some(value) = line.strip_prefix(TIMESTAMP_KEY) {
                    timestamp = Some(value.to_string());
                } else if let Some(value) = line.strip_prefix(PARENT_KEY) {
                    parent = Some(if value == NO_PARENT {
                        None
                    } else {
                        Some(parse_hash(n, value)?)
                    });
                } else if line == FULL_START {
                    break EntryBody::FullContent(read_section(&mut lines, FULL_END, n)?);
                } else if line == DIFF_START {
                    break EntryBody::Diff(read_section(&mut lines, DIFF_END, n)?);
                } else {
                    return Err(parse_error(n, format!("unexpected line {line:?} in entry")));
                }
            };

            entries.push(VersionEntry {
                hash,
                timestamp: timestamp
                    .ok_or_else(|| parse_error(n, format!("entry {hash} has no TIMESTAMP")))?,
                parent: parent
                    .ok_or_else(|| parse_error(n, format!("entry {hash} has no PARENT")))?,
                body,
            });
        }

        Ok(Self {
            format_version,
            canonical_file,
            current_hash,
            entries,
        })
    }
}

/// Collect section lines verbatim up to the matching end marker.
fn read_section<'a>(
    lines: &mut impl Iterator<Item = (usize, &'a str)>,
    end: &str,
    start_line: usize,
) -> Result<String> {
    let mut body = String::new();
    for (_, raw) in lines.by_ref() {
        if strip_eol(raw) == end {
            return Ok(body);
        }
        body.push_str(raw);
    }
    Err(parse_error(
        start_line,
        format!("section is not closed by {end}"),
    ))
}

fn strip_eol(line: &str) -> &str {
    let line = line.strip_suffix('\n').unwrap_or(line);
    line.strip_suffix('\r').unwrap_or(line)
}

fn parse_hash(line: usize, text: &str) -> Result<ContentHash> {
    ContentHash::parse(text).map_err(|e| parse_error(line, e.to_string()))
}

fn parse_error(line: usize, message: impl Into<String>) -> StoreError {
    StoreError::Parse {
        line,
        message: message.into(),
    }
}
