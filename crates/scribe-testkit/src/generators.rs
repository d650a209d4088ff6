//! Proptest generators for property-based testing.

use proptest::prelude::*;

use scribe_core::{canonicalize, CanonicalContent, KeyPair};

/// Generate a random keypair.
pub fn keypair() -> impl Strategy<Value = KeyPair> {
    any::<[u8; 32]>().prop_map(|seed| KeyPair::from_seed(&seed))
}

/// A line of text without line breaks.
pub fn line() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 #*_.,-]{0,24}"
}

/// Text with the kinds of noise canonicalization removes: mixed line
/// endings, trailing spaces and tabs, blank lines at either end.
pub fn messy_text() -> impl Strategy<Value = String> {
    let ending = prop_oneof![Just("\n"), Just("\r\n"), Just("\r")];
    let trailing = prop_oneof![Just(""), Just(" "), Just("\t"), Just("  \t ")];
    prop::collection::vec((line(), trailing, ending), 0..16).prop_map(|parts| {
        parts
            .into_iter()
            .map(|(line, trailing, ending)| format!("{line}{trailing}{ending}"))
            .collect::<String>()
    })
}

/// Text that is already canonical.
pub fn canonical_text() -> impl Strategy<Value = CanonicalContent> {
    messy_text().prop_map(|text| canonicalize(&text))
}

/// A sequence of revisions of one document, each a small edit of the last.
pub fn revision_chain(max_len: usize) -> impl Strategy<Value = Vec<String>> {
    let edit = prop_oneof![
        (any::<prop::sample::Index>(), line()).prop_map(|(at, l)| Edit::Insert(at, l)),
        any::<prop::sample::Index>().prop_map(Edit::Delete),
        (any::<prop::sample::Index>(), line()).prop_map(|(at, l)| Edit::Replace(at, l)),
    ];
    (
        prop::collection::vec(line(), 1..8),
        prop::collection::vec(prop::collection::vec(edit, 1..4), 0..max_len),
    )
        .prop_map(|(initial, rounds)| {
            let mut lines = initial;
            let mut revisions = vec![lines.join("\n")];
            for round in rounds {
                for edit in round {
                    edit.apply(&mut lines);
                }
                revisions.push(lines.join("\n"));
            }
            revisions
        })
}

#[derive(Debug, Clone)]
enum Edit {
    Insert(prop::sample::Index, String),
    Delete(prop::sample::Index),
    Replace(prop::sample::Index, String),
}

impl Edit {
    fn apply(self, lines: &mut Vec<String>) {
        match self {
            Edit::Insert(at, line) => {
                let pos = at.index(lines.len() + 1);
                lines.insert(pos, line);
            }
            Edit::Delete(at) => {
                if !lines.is_empty() {
                    let pos = at.index(lines.len());
                    lines.remove(pos);
                }
            }
            Edit::Replace(at, line) => {
                if lines.is_empty() {
                    lines.push(line);
                } else {
                    let pos = at.index(lines.len());
                    lines[pos] = line;
                }
            }
        }
    }
}
