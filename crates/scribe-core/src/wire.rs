//! SSH wire encoding (RFC 4251 §5).
//!
//! Only the two shapes the key and signature formats use are needed:
//! `uint32` (big-endian) and `string` (a `uint32` length followed by that
//! many bytes). Readers borrow from the input and never copy.

use bytes::{Buf, BufMut, BytesMut};
use thiserror::Error;

/// Errors raised while reading SSH wire data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WireError {
    #[error("truncated {field}: need {needed} bytes, {remaining} remaining")]
    Truncated {
        field: &'static str,
        needed: usize,
        remaining: usize,
    },

    #[error("missing {0} magic")]
    BadMagic(&'static str),

    #[error("{0} is not valid UTF-8")]
    InvalidUtf8(&'static str),

    #[error("{0} unexpected trailing bytes")]
    TrailingBytes(usize),
}

/// Append an SSH `string` (length-prefixed byte string).
pub fn put_string(buf: &mut BytesMut, data: &[u8]) {
    buf.put_u32(data.len() as u32);
    buf.put_slice(data);
}

/// Encode a single SSH `string` into a fresh buffer.
pub fn encode_string(data: &[u8]) -> Vec<u8> {
    let mut buf = BytesMut::with_capacity(4 + data.len());
    put_string(&mut buf, data);
    buf.to_vec()
}

/// A cursor over SSH wire data.
#[derive(Debug, Clone)]
pub struct WireReader<'a> {
    buf: &'a [u8],
}

impl<'a> WireReader<'a> {
    /// Start reading at the beginning of `buf`.
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf }
    }

    /// Bytes not yet consumed.
    pub fn remaining(&self) -> usize {
        self.buf.len()
    }

    /// Consume a literal (unprefixed) magic value.
    pub fn expect_magic(&mut self, magic: &[u8], name: &'static str) -> Result<(), WireError> {
        match self.buf.strip_prefix(magic) {
            Some(rest) => {
                self.buf = rest;
                Ok(())
            }
            None => Err(WireError::BadMagic(name)),
        }
    }

    /// Read a big-endian `uint32`.
    pub fn read_u32(&mut self, field: &'static str) -> Result<u32, WireError> {
        if self.buf.remaining() < 4 {
            return Err(WireError::Truncated {
                field,
                needed: 4,
                remaining: self.buf.remaining(),
            });
        }
        Ok(self.buf.get_u32())
    }

    /// Read an SSH `string` as raw bytes.
    pub fn read_string(&mut self, field: &'static str) -> Result<&'a [u8], WireError> {
        let len = self.read_u32(field)? as usize;
        if len > self.buf.len() {
            return Err(WireError::Truncated {
                field,
                needed: len,
                remaining: self.buf.len(),
            });
        }
        let (head, tail) = self.buf.split_at(len);
        self.buf = tail;
        Ok(head)
    }

    /// Read an SSH `string` that must be UTF-8 text.
    pub fn read_str(&mut self, field: &'static str) -> Result<&'a str, WireError> {
        let bytes = self.read_string(field)?;
        std::str::from_utf8(bytes).map_err(|_| WireError::InvalidUtf8(field))
    }

    /// Everything not yet consumed.
    pub fn rest(&self) -> &'a [u8] {
        self.buf
    }

    /// Require that all input has been consumed.
    pub fn finish(self) -> Result<(), WireError> {
        if self.buf.is_empty() {
            Ok(())
        } else {
            Err(WireError::TrailingBytes(self.buf.len()))
        }
    }
}
