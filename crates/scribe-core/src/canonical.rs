//! Canonical text form.
//!
//! Every hash and signature in Scribe covers canonical content, so two
//! renderings of the same post that differ only in line endings or stray
//! whitespace address and verify identically. The rules, applied in order:
//!
//! 1. CRLF and lone CR become LF
//! 2. Leading blank lines are dropped
//! 3. Spaces, tabs and CRs are trimmed from the end of every line
//! 4. Trailing blank lines are dropped
//! 5. Non-empty output ends with exactly one `\n`; empty output is zero bytes
//!
//! **CRITICAL**: These rules are FROZEN. Changing them changes every content
//! hash and invalidates every published signature.

use std::fmt;
use std::ops::Deref;

use crate::hash::ContentHash;

/// Text in canonical form.
///
/// The only way to build one is [`canonicalize`] (or
/// [`CanonicalContent::from_canonical`], which checks), so holding a
/// `CanonicalContent` means the invariants above hold.
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct CanonicalContent(String);

impl CanonicalContent {
    /// Accept `text` only if it is already canonical.
    pub fn from_canonical(text: String) -> Option<Self> {
        if is_canonical(&text) {
            Some(Self(text))
        } else {
            None
        }
    }

    /// The canonical text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The canonical bytes (what gets hashed and signed).
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    /// Unwrap into the underlying string.
    pub fn into_string(self) -> String {
        self.0
    }

    /// Content hash of these bytes.
    pub fn content_hash(&self) -> ContentHash {
        ContentHash::of(self.as_bytes())
    }
}

impl Deref for CanonicalContent {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl AsRef<[u8]> for CanonicalContent {
    fn as_ref(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl AsRef<str> for CanonicalContent {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for CanonicalContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CanonicalContent({} bytes)", self.0.len())
    }
}

impl fmt::Display for CanonicalContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<CanonicalContent> for String {
    fn from(content: CanonicalContent) -> Self {
        content.0
    }
}

/// Canonicalize arbitrary text.
pub fn canonicalize(text: &str) -> CanonicalContent {
    let normalized = text.replace("\r\n", "\n").replace('\r', "\n");
    let lines: Vec<&str> = normalized
        .split('\n')
        .map(|line| line.trim_end_matches([' ', '\t', '\r']))
        .collect();

    // Right-trimming first makes whitespace-only lines empty, so "blank"
    // reduces to `is_empty` for both the leading and trailing cut.
    let first = lines.iter().position(|line| !line.is_empty());
    let last = lines.iter().rposition(|line| !line.is_empty());

    match (first, last) {
        (Some(first), Some(last)) => {
            let mut out = lines[first..=last].join("\n");
            out.push('\n');
            CanonicalContent(out)
        }
        _ => CanonicalContent::default(),
    }
}

/// Whether `text` is already in canonical form.
pub fn is_canonical(text: &str) -> bool {
    canonicalize(text).as_str() == text
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_line_endings_normalized() {
        assert_eq!(canonicalize("a\r\nb\rc\n"), canonicalize("a\nb\nc\n"));
        assert_eq!(canonicalize("a\r\nb\rc\n").as_str(), "a\nb\nc\n");
    }

    #[test]
    fn test_cr_before_crlf() {
        // "\r\r\n" is a lone CR followed by CRLF: two line breaks.
        assert_eq!(canonicalize("a\r\r\nb").as_str(), "a\n\nb\n");
    }

    #[test]
    fn test_leading_and_trailing_blank_lines() {
        assert_eq!(canonicalize("\n\n  \t\nbody\n\n \n").as_str(), "body\n");
    }

    #[test]
    fn test_inner_blank_lines_kept() {
        assert_eq!(canonicalize("a\n\n\nb").as_str(), "a\n\n\nb\n");
        assert_eq!(canonicalize("a\n \t \nb").as_str(), "a\n\nb\n");
    }

    #[test]
    fn test_trailing_whitespace_trimmed() {
        assert_eq!(canonicalize("title  \nbody\t\t\n").as_str(), "title\nbody\n");
    }

    #[test]
    fn test_leading_indentation_kept() {
        assert_eq!(canonicalize("\n    code\n").as_str(), "    code\n");
    }

    #[test]
    fn test_empty_and_blank_inputs() {
        assert_eq!(canonicalize("").as_bytes(), b"");
        assert_eq!(canonicalize("\n\r\n \t \r").as_bytes(), b"");
    }

    #[test]
    fn test_exactly_one_trailing_newline() {
        assert_eq!(canonicalize("x").as_str(), "x\n");
        assert_eq!(canonicalize("x\n").as_str(), "x\n");
        assert_eq!(canonicalize("x\n\n\n").as_str(), "x\n");
    }

    #[test]
    fn test_from_canonical() {
        assert!(CanonicalContent::from_canonical("Hello\n".into()).is_some());
        assert!(CanonicalContent::from_canonical("Hello".into()).is_none());
        assert!(CanonicalContent::from_canonical("Hello \n".into()).is_none());
        assert!(CanonicalContent::from_canonical(String::new()).is_some());
    }

    proptest! {
        #[test]
        fn test_idempotent(text in "[a-z \t\r\n]{0,200}") {
            let once = canonicalize(&text);
            let twice = canonicalize(once.as_str());
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn test_idempotent_any_unicode(text in any::<String>()) {
            let once = canonicalize(&text);
            prop_assert!(is_canonical(once.as_str()));
        }

        #[test]
        fn test_output_invariants(text in "[ab \t\r\n]{0,120}") {
            let out = canonicalize(&text);
            let s = out.as_str();
            prop_assert!(!s.contains('\r'));
            if !s.is_empty() {
                prop_assert!(s.ends_with('\n'));
                prop_assert!(!s.ends_with("\n\n"));
                prop_assert!(!s.starts_with('\n'));
                for line in s.lines() {
                    prop_assert!(!line.ends_with(' ') && !line.ends_with('\t'));
                }
            }
        }
    }
}
