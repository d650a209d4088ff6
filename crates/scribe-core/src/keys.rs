//! Ed25519 keys in OpenSSH formats.
//!
//! Private keys use the `openssh-key-v1` container, unencrypted:
//!
//! ```text
//! "openssh-key-v1\0"
//! string  ciphername      "none"
//! string  kdfname         "none"
//! string  kdfoptions      ""
//! uint32  number of keys  1
//! string  public key blob
//! string  private section:
//!     uint32 check, uint32 check   (same random value twice)
//!     string "ssh-ed25519"
//!     string public key  (32 bytes)
//!     string private key (64 bytes: seed || public)
//!     string comment
//!     padding 1, 2, 3, ... up to a multiple of 8
//! ```
//!
//! wrapped in PEM `OPENSSH PRIVATE KEY`. Public keys are a single line,
//! `ssh-ed25519 <base64 blob> [comment]`.

use base64::engine::general_purpose::{STANDARD as BASE64, STANDARD_NO_PAD};
use base64::Engine;
use bytes::{BufMut, BytesMut};
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};
use std::fmt;

use crate::error::{CoreError, Result};
use crate::pem;
use crate::wire::{put_string, WireReader};

/// SSH key type name for Ed25519.
pub const KEY_TYPE: &str = "ssh-ed25519";

/// PEM label of an OpenSSH private key.
pub const PRIVATE_KEY_LABEL: &str = "OPENSSH PRIVATE KEY";

const AUTH_MAGIC: &[u8] = b"openssh-key-v1\0";
const CIPHER_NONE: &str = "none";
const KDF_NONE: &str = "none";
const BLOCK_SIZE: usize = 8;

fn malformed(e: impl fmt::Display) -> CoreError {
    CoreError::MalformedKey(e.to_string())
}

/// A 32-byte Ed25519 public key.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct PublicKey(pub [u8; 32]);

impl PublicKey {
    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Convert to hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// SSH public key blob: `string "ssh-ed25519" || string key`.
    pub fn to_blob(&self) -> Vec<u8> {
        let mut buf = BytesMut::with_capacity(4 + KEY_TYPE.len() + 4 + 32);
        put_string(&mut buf, KEY_TYPE.as_bytes());
        put_string(&mut buf, &self.0);
        buf.to_vec()
    }

    /// Parse an SSH public key blob.
    pub fn from_blob(blob: &[u8]) -> Result<Self> {
        let mut reader = WireReader::new(blob);
        let key_type = reader.read_str("key type").map_err(malformed)?;
        if key_type != KEY_TYPE {
            return Err(CoreError::MalformedKey(format!(
                "unsupported key type {key_type:?}"
            )));
        }
        let key = reader.read_string("public key").map_err(malformed)?;
        reader.finish().map_err(malformed)?;
        Self::from_slice(key)
    }

    fn from_slice(key: &[u8]) -> Result<Self> {
        let bytes: [u8; 32] = key.try_into().map_err(|_| {
            CoreError::MalformedKey(format!("public key is {} bytes, expected 32", key.len()))
        })?;
        VerifyingKey::from_bytes(&bytes)
            .map_err(|_| CoreError::MalformedKey("public key is not a valid Ed25519 point".into()))?;
        Ok(Self(bytes))
    }

    /// One-line OpenSSH format. The comment is omitted when empty.
    pub fn to_openssh(&self, comment: &str) -> String {
        let encoded = BASE64.encode(self.to_blob());
        if comment.is_empty() {
            format!("{KEY_TYPE} {encoded}")
        } else {
            format!("{KEY_TYPE} {encoded} {comment}")
        }
    }

    /// Parse the one-line OpenSSH format. Any comment is ignored.
    pub fn from_openssh(line: &str) -> Result<Self> {
        let mut tokens = line.split_whitespace();
        let key_type = tokens
            .next()
            .ok_or_else(|| CoreError::MalformedKey("empty public key".into()))?;
        if key_type != KEY_TYPE {
            return Err(CoreError::MalformedKey(format!(
                "unsupported key type {key_type:?}"
            )));
        }
        let encoded = tokens
            .next()
            .ok_or_else(|| CoreError::MalformedKey("missing key data".into()))?;
        let blob = BASE64.decode(encoded).map_err(malformed)?;
        Self::from_blob(&blob)
    }

    /// OpenSSH fingerprint, as printed by `ssh-keygen -l`.
    pub fn fingerprint(&self) -> String {
        let digest = Sha256::digest(self.to_blob());
        format!("SHA256:{}", STANDARD_NO_PAD.encode(digest))
    }

    /// Check a raw Ed25519 signature over `message`.
    pub fn verify(&self, message: &[u8], signature: &[u8; 64]) -> bool {
        let Ok(verifying_key) = VerifyingKey::from_bytes(&self.0) else {
            return false;
        };
        verifying_key
            .verify(message, &Signature::from_bytes(signature))
            .is_ok()
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", &self.to_hex()[..16])
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_openssh(""))
    }
}

impl AsRef<[u8]> for PublicKey {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// An Ed25519 signing key pair.
///
/// This wraps ed25519-dalek's SigningKey.
#[derive(Clone)]
pub struct KeyPair {
    signing_key: SigningKey,
}

impl KeyPair {
    /// Generate a new key pair from the operating system's random source.
    pub fn generate() -> Result<Self> {
        let mut seed = [0u8; 32];
        OsRng
            .try_fill_bytes(&mut seed)
            .map_err(|e| CoreError::Entropy(e.to_string()))?;
        Ok(Self::from_seed(&seed))
    }

    /// Create from a 32-byte seed.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(seed),
        }
    }

    /// Get the public key.
    pub fn public_key(&self) -> PublicKey {
        PublicKey(self.signing_key.verifying_key().to_bytes())
    }

    /// Get the raw seed bytes (secret key material).
    pub fn seed(&self) -> [u8; 32] {
        self.signing_key.to_bytes()
    }

    /// Sign a message, returning the raw 64-byte signature.
    pub fn sign(&self, message: &[u8]) -> [u8; 64] {
        self.signing_key.sign(message).to_bytes()
    }

    /// Encode as an OpenSSH private key with a random check value.
    pub fn to_openssh(&self) -> Result<String> {
        let mut check = [0u8; 4];
        OsRng
            .try_fill_bytes(&mut check)
            .map_err(|e| CoreError::Entropy(e.to_string()))?;
        Ok(self.to_openssh_with_check(u32::from_be_bytes(check)))
    }

    /// Encode as an OpenSSH private key with an explicit check value.
    ///
    /// The check value only guards against decrypting with the wrong
    /// passphrase; a fixed one makes the output reproducible.
    pub fn to_openssh_with_check(&self, check: u32) -> String {
        let public = self.public_key();

        let mut private = BytesMut::new();
        private.put_u32(check);
        private.put_u32(check);
        put_string(&mut private, KEY_TYPE.as_bytes());
        put_string(&mut private, public.as_bytes());
        put_string(&mut private, &self.signing_key.to_keypair_bytes());
        put_string(&mut private, b"");
        let mut pad = 1u8;
        while private.len() % BLOCK_SIZE != 0 {
            private.put_u8(pad);
            pad += 1;
        }

        let mut out = BytesMut::new();
        out.put_slice(AUTH_MAGIC);
        put_string(&mut out, CIPHER_NONE.as_bytes());
        put_string(&mut out, KDF_NONE.as_bytes());
        put_string(&mut out, b"");
        out.put_u32(1);
        put_string(&mut out, &public.to_blob());
        put_string(&mut out, &private);

        pem::armor(PRIVATE_KEY_LABEL, &out)
    }

    /// Decode an unencrypted OpenSSH private key.
    pub fn from_openssh(text: &str) -> Result<Self> {
        let data = pem::dearmor(PRIVATE_KEY_LABEL, text).map_err(malformed)?;
        let mut reader = WireReader::new(&data);

        reader.expect_magic(AUTH_MAGIC, "openssh-key-v1").map_err(malformed)?;
        let cipher = reader.read_str("cipher name").map_err(malformed)?;
        let kdf = reader.read_str("kdf name").map_err(malformed)?;
        if cipher != CIPHER_NONE || kdf != KDF_NONE {
            return Err(CoreError::MalformedKey(format!(
                "encrypted keys are not supported (cipher {cipher:?}, kdf {kdf:?})"
            )));
        }
        reader.read_string("kdf options").map_err(malformed)?;
        let count = reader.read_u32("key count").map_err(malformed)?;
        if count != 1 {
            return Err(CoreError::MalformedKey(format!(
                "expected exactly one key, found {count}"
            )));
        }
        let public = PublicKey::from_blob(reader.read_string("public key").map_err(malformed)?)?;
        let section = reader.read_string("private section").map_err(malformed)?;
        if section.len() % BLOCK_SIZE != 0 {
            return Err(CoreError::MalformedKey(
                "private section is not block aligned".into(),
            ));
        }

        let mut private = WireReader::new(section);
        let check1 = private.read_u32("check").map_err(malformed)?;
        let check2 = private.read_u32("check").map_err(malformed)?;
        if check1 != check2 {
            return Err(CoreError::MalformedKey("check values differ".into()));
        }
        let key_type = private.read_str("key type").map_err(malformed)?;
        if key_type != KEY_TYPE {
            return Err(CoreError::MalformedKey(format!(
                "unsupported key type {key_type:?}"
            )));
        }
        let inner_public = private.read_string("public key").map_err(malformed)?;
        let secret = private.read_string("private key").map_err(malformed)?;
        let secret: &[u8; 64] = secret.try_into().map_err(|_| {
            CoreError::MalformedKey(format!("private key is {} bytes, expected 64", secret.len()))
        })?;
        private.read_string("comment").map_err(malformed)?;

        let padding_ok = private
            .rest()
            .iter()
            .enumerate()
            .all(|(i, &b)| usize::from(b) == i + 1);
        if !padding_ok {
            return Err(CoreError::MalformedKey("invalid padding".into()));
        }
        if inner_public != public.as_bytes() {
            return Err(CoreError::MalformedKey(
                "private section public key does not match header".into(),
            ));
        }

        let signing_key = SigningKey::from_keypair_bytes(secret).map_err(|_| {
            CoreError::MalformedKey("private key does not match its public half".into())
        })?;
        Ok(Self { signing_key })
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KeyPair({:?})", self.public_key())
    }
}
