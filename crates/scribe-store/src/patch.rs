//! Unified diffs between revisions.
//!
//! An empty diff text stands for "no textual change" and applies as the
//! identity in both directions.

use diffy::Patch;

use crate::error::{Result, StoreError};

/// Diff `old` into `new`. Identical inputs produce an empty string.
pub fn make_diff(old: &str, new: &str) -> String {
    if old == new {
        return String::new();
    }
    diffy::create_patch(old, new).to_string()
}

/// Apply `diff` to the parent's content, producing the child's.
pub fn apply_forward(base: &str, diff: &str) -> Result<String> {
    if diff.is_empty() {
        return Ok(base.to_string());
    }
    let patch = parse(diff)?;
    diffy::apply(base, &patch)
        .map_err(|e| StoreError::Reconstruction(format!("forward apply failed: {e}")))
}

/// Undo `diff` on the child's content, producing the parent's.
pub fn apply_reverse(current: &str, diff: &str) -> Result<String> {
    if diff.is_empty() {
        return Ok(current.to_string());
    }
    let forward = parse(diff)?;
    let patch = forward.reverse();
    diffy::apply(current, &patch)
        .map_err(|e| StoreError::Reconstruction(format!("reverse apply failed: {e}")))
}

fn parse(diff: &str) -> Result<Patch<'_, str>> {
    Patch::from_str(diff).map_err(|e| StoreError::Reconstruction(format!("bad diff: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_identical_is_empty() {
        assert_eq!(make_diff("a\nb\n", "a\nb\n"), "");
        assert_eq!(apply_forward("a\n", "").unwrap(), "a\n");
        assert_eq!(apply_reverse("a\n", "").unwrap(), "a\n");
    }

    #[test]
    fn test_append_line() {
        let diff = make_diff("Hello\n", "Hello\nWorld\n");
        assert!(diff.contains("+World"));
        assert_eq!(apply_forward("Hello\n", &diff).unwrap(), "Hello\nWorld\n");
        assert_eq!(apply_reverse("Hello\nWorld\n", &diff).unwrap(), "Hello\n");
    }

    #[test]
    fn test_from_and_to_empty() {
        let diff = make_diff("", "x\ny\n");
        assert_eq!(apply_forward("", &diff).unwrap(), "x\ny\n");
        assert_eq!(apply_reverse("x\ny\n", &diff).unwrap(), "");

        let diff = make_diff("x\ny\n", "");
        assert_eq!(apply_forward("x\ny\n", &diff).unwrap(), "");
    }

    #[test]
    fn test_context_mismatch_is_error() {
        let diff = make_diff("one\ntwo\nthree\n", "one\n2\nthree\n");
        let err = apply_forward("alpha\nbeta\n", &diff).unwrap_err();
        assert!(matches!(err, StoreError::Reconstruction(_)));
        assert!(apply_reverse("alpha\nbeta\n", &diff).is_err());
    }

    #[test]
    fn test_garbage_diff_is_error() {
        assert!(matches!(
            apply_forward("a\n", "@@ this is not a hunk\n"),
            Err(StoreError::Reconstruction(_))
        ));
    }

    proptest! {
        #[test]
        fn test_diff_roundtrip(
            old in prop::collection::vec("[a-c]{0,3}", 0..12),
            new in prop::collection::vec("[a-c]{0,3}", 0..12),
        ) {
            let old: String = old.iter().map(|l| format!("{l}\n")).collect();
            let new: String = new.iter().map(|l| format!("{l}\n")).collect();
            let diff = make_diff(&old, &new);
            prop_assert_eq!(apply_forward(&old, &diff).unwrap(), new.clone());
            prop_assert_eq!(apply_reverse(&new, &diff).unwrap(), old);
        }
    }
}
