//! PEM armoring as written by OpenSSH.
//!
//! OpenSSH wraps base64 at 70 columns for both private keys and signatures
//! and ends the armor with a newline. Parsing is tolerant of surrounding
//! whitespace and of any line width, but the label must match exactly.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use thiserror::Error;

/// Base64 column width used by `ssh-keygen`.
pub const LINE_WIDTH: usize = 70;

/// Errors raised while removing PEM armor.
#[derive(Debug, Error)]
pub enum PemError {
    #[error("no PEM BEGIN line")]
    MissingBegin,

    #[error("expected PEM type {expected:?}, found {found:?}")]
    WrongLabel { expected: String, found: String },

    #[error("no PEM END line for {0:?}")]
    MissingEnd(String),

    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),
}

/// Wrap `data` in a PEM block with the given label.
pub fn armor(label: &str, data: &[u8]) -> String {
    let encoded = BASE64.encode(data);
    let mut out = String::with_capacity(encoded.len() + encoded.len() / LINE_WIDTH + 64);
    out.push_str("-----BEGIN ");
    out.push_str(label);
    out.push_str("-----\n");
    // Base64 output is ASCII, so byte chunks are valid str boundaries.
    for chunk in encoded.as_bytes().chunks(LINE_WIDTH) {
        out.push_str(&String::from_utf8_lossy(chunk));
        out.push('\n');
    }
    out.push_str("-----END ");
    out.push_str(label);
    out.push_str("-----\n");
    out
}

/// Return the label of the first PEM block in `text`, if any.
pub fn label_of(text: &str) -> Option<&str> {
    text.lines().map(str::trim).find_map(begin_label)
}

/// Strip PEM armor, requiring the block to carry `label`.
pub fn dearmor(label: &str, text: &str) -> Result<Vec<u8>, PemError> {
    let mut lines = text.lines().map(str::trim);

    let found = lines
        .by_ref()
        .find_map(begin_label)
        .ok_or(PemError::MissingBegin)?;
    if found != label {
        return Err(PemError::WrongLabel {
            expected: label.to_string(),
            found: found.to_string(),
        });
    }

    let end = format!("-----END {label}-----");
    let mut payload = String::new();
    for line in lines {
        if line == end {
            return Ok(BASE64.decode(payload.as_bytes())?);
        }
        payload.push_str(line);
    }
    Err(PemError::MissingEnd(label.to_string()))
}

fn begin_label(line: &str) -> Option<&str> {
    line.strip_prefix("-----BEGIN ")?.strip_suffix("-----")
}
