//! The SSHSIG signature format (`ssh-keygen -Y sign`).
//!
//! The Ed25519 signature is not computed over the content itself but over
//! a signing blob:
//!
//! ```text
//! "SSHSIG" || string namespace || string "" || string hash_alg || string H(content)
//! ```
//!
//! The armored container carries the signer's public key alongside it:
//!
//! ```text
//! "SSHSIG" || uint32 1 || string pubkey_blob || string namespace
//!          || string "" || string hash_alg
//!          || string (string "ssh-ed25519" || string sig64)
//! ```

use bytes::{BufMut, BytesMut};
use sha2::{Digest, Sha256, Sha512};
use std::fmt;

use crate::error::{CoreError, Result};
use crate::keys::{PublicKey, KEY_TYPE};
use crate::pem;
use crate::wire::{put_string, WireReader};

/// Magic preamble of both the signing blob and the container.
pub const SIG_MAGIC: &[u8] = b"SSHSIG";

/// Container version.
pub const SIG_VERSION: u32 = 1;

/// PEM label of an armored signature.
pub const SIGNATURE_LABEL: &str = "SSH SIGNATURE";

/// Namespace used for every Scribe signature.
pub const NAMESPACE: &str = "file";

/// Digest applied to the content before signing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HashAlgorithm {
    Sha256,
    #[default]
    Sha512,
}

impl HashAlgorithm {
    /// Wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sha256 => "sha256",
            Self::Sha512 => "sha512",
        }
    }

    /// Parse a wire name.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "sha256" => Some(Self::Sha256),
            "sha512" => Some(Self::Sha512),
            _ => None,
        }
    }

    /// Digest `data`.
    pub fn digest(&self, data: &[u8]) -> Vec<u8> {
        match self {
            Self::Sha256 => Sha256::digest(data).to_vec(),
            Self::Sha512 => Sha512::digest(data).to_vec(),
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Build the bytes that actually get signed.
pub fn signing_blob(namespace: &str, algorithm: HashAlgorithm, content: &[u8]) -> Vec<u8> {
    let mut buf = BytesMut::new();
    buf.put_slice(SIG_MAGIC);
    put_string(&mut buf, namespace.as_bytes());
    put_string(&mut buf, b"");
    put_string(&mut buf, algorithm.as_str().as_bytes());
    put_string(&mut buf, &algorithm.digest(content));
    buf.to_vec()
}

fn unverifiable(e: impl fmt::Display) -> CoreError {
    CoreError::Verification(e.to_string())
}

/// A decoded SSHSIG container.
#[derive(Clone, PartialEq, Eq)]
pub struct SshSignature {
    pub public_key: PublicKey,
    pub namespace: String,
    pub hash_algorithm: HashAlgorithm,
    pub signature: [u8; 64],
}

impl SshSignature {
    /// Serialize the container (without armor).
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut inner = BytesMut::with_capacity(4 + KEY_TYPE.len() + 4 + 64);
        put_string(&mut inner, KEY_TYPE.as_bytes());
        put_string(&mut inner, &self.signature);

        let mut buf = BytesMut::new();
        buf.put_slice(SIG_MAGIC);
        buf.put_u32(SIG_VERSION);
        put_string(&mut buf, &self.public_key.to_blob());
        put_string(&mut buf, self.namespace.as_bytes());
        put_string(&mut buf, b"");
        put_string(&mut buf, self.hash_algorithm.as_str().as_bytes());
        put_string(&mut buf, &inner);
        buf.to_vec()
    }

    /// Parse a container. Any structural problem is a `Verification` error.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let mut reader = WireReader::new(data);
        reader.expect_magic(SIG_MAGIC, "SSHSIG").map_err(unverifiable)?;
        let version = reader.read_u32("version").map_err(unverifiable)?;
        if version != SIG_VERSION {
            return Err(CoreError::Verification(format!(
                "unsupported signature version {version}"
            )));
        }

        let public_key = PublicKey::from_blob(reader.read_string("public key").map_err(unverifiable)?)
            .map_err(unverifiable)?;
        let namespace = reader.read_str("namespace").map_err(unverifiable)?.to_string();
        reader.read_string("reserved").map_err(unverifiable)?;
        let alg_name = reader.read_str("hash algorithm").map_err(unverifiable)?;
        let hash_algorithm = HashAlgorithm::parse(alg_name).ok_or_else(|| {
            CoreError::Verification(format!("unsupported hash algorithm {alg_name:?}"))
        })?;
        let inner = reader.read_string("signature").map_err(unverifiable)?;
        reader.finish().map_err(unverifiable)?;

        let mut inner = WireReader::new(inner);
        let sig_type = inner.read_str("signature type").map_err(unverifiable)?;
        if sig_type != KEY_TYPE {
            return Err(CoreError::Verification(format!(
                "unsupported signature type {sig_type:?}"
            )));
        }
        let raw = inner.read_string("signature bytes").map_err(unverifiable)?;
        inner.finish().map_err(unverifiable)?;
        let signature: [u8; 64] = raw.try_into().map_err(|_| {
            CoreError::Verification(format!("signature is {} bytes, expected 64", raw.len()))
        })?;

        Ok(Self {
            public_key,
            namespace,
            hash_algorithm,
            signature,
        })
    }

    /// Armor as `SSH SIGNATURE` PEM.
    pub fn to_pem(&self) -> String {
        pem::armor(SIGNATURE_LABEL, &self.to_bytes())
    }

    /// Parse an armored signature.
    pub fn from_pem(text: &str) -> Result<Self> {
        let data = pem::dearmor(SIGNATURE_LABEL, text).map_err(unverifiable)?;
        Self::from_bytes(&data)
    }
}

impl fmt::Debug for SshSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SshSignature")
            .field("public_key", &self.public_key)
            .field("namespace", &self.namespace)
            .field("hash_algorithm", &self.hash_algorithm)
            .field("signature", &format_args!("{}...", &hex::encode(&self.signature[..8])))
            .finish()
    }
}
