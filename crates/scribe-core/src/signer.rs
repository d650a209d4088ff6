//! Signing and verification of canonical content.
//!
//! The string-level entry points ([`sign`], [`verify`]) take the same
//! artifacts a user handles on disk: an OpenSSH private key PEM, a public
//! key line, and an `SSH SIGNATURE` PEM. The typed entry points
//! ([`sign_with`], [`verify_with`]) skip the parsing.

use std::fmt;

use crate::error::{CoreError, Result};
use crate::keys::{KeyPair, PublicKey};
use crate::sshsig::{signing_blob, HashAlgorithm, SshSignature, NAMESPACE};

/// Sign `content` with a parsed key pair.
///
/// Always uses namespace `file` and `sha512`, the `ssh-keygen` defaults.
pub fn sign_with(keypair: &KeyPair, content: &[u8]) -> SshSignature {
    let algorithm = HashAlgorithm::Sha512;
    let blob = signing_blob(NAMESPACE, algorithm, content);
    SshSignature {
        public_key: keypair.public_key(),
        namespace: NAMESPACE.to_string(),
        hash_algorithm: algorithm,
        signature: keypair.sign(&blob),
    }
}

/// Sign `content` with an OpenSSH private key, returning the armored signature.
pub fn sign(content: &[u8], private_key_pem: &str) -> Result<String> {
    let keypair = KeyPair::from_openssh(private_key_pem)
        .map_err(|e| CoreError::Signing(e.to_string()))?;
    Ok(sign_with(&keypair, content).to_pem())
}

/// Check a parsed signature against `content` and an expected public key.
///
/// Returns `false` when the namespace is not `file`, when the embedded key
/// differs from `public_key`, or when the signature does not verify.
pub fn verify_with(public_key: &PublicKey, content: &[u8], signature: &SshSignature) -> bool {
    if signature.namespace != NAMESPACE {
        tracing::debug!(namespace = %signature.namespace, "signature namespace mismatch");
        return false;
    }
    if signature.public_key != *public_key {
        tracing::debug!("signature made by a different key");
        return false;
    }
    let blob = signing_blob(&signature.namespace, signature.hash_algorithm, content);
    public_key.verify(&blob, &signature.signature)
}

/// Verify an armored signature over `content` against a one-line public key.
///
/// `Ok(false)` means the inputs parsed but the signature does not hold.
/// An `Err` means one of them could not be parsed at all.
pub fn verify(content: &[u8], public_key_line: &str, signature_pem: &str) -> Result<bool> {
    let public_key = PublicKey::from_openssh(public_key_line)
        .map_err(|e| CoreError::Verification(e.to_string()))?;
    let signature = SshSignature::from_pem(signature_pem)?;
    Ok(verify_with(&public_key, content, &signature))
}

/// Outcome of checking remote content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationStatus {
    /// The signature holds for this content and key.
    Valid,
    /// Everything parsed, but the signature does not hold.
    Invalid,
    /// The check could not be performed.
    Unverifiable(String),
}

impl VerificationStatus {
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }
}

impl fmt::Display for VerificationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Valid => f.write_str("valid"),
            Self::Invalid => f.write_str("invalid"),
            Self::Unverifiable(reason) => write!(f, "unverifiable: {reason}"),
        }
    }
}

/// Check content that may or may not come with key and signature.
///
/// Missing inputs and parse failures are reported as `Unverifiable`
/// rather than errors.
pub fn check(
    content: &[u8],
    public_key_line: Option<&str>,
    signature_pem: Option<&str>,
) -> VerificationStatus {
    let (Some(public_key_line), Some(signature_pem)) = (public_key_line, signature_pem) else {
        return VerificationStatus::Unverifiable("missing public key or signature".into());
    };
    match verify(content, public_key_line, signature_pem) {
        Ok(true) => VerificationStatus::Valid,
        Ok(false) => VerificationStatus::Invalid,
        Err(e) => VerificationStatus::Unverifiable(e.to_string()),
    }
}
