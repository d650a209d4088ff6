//! # Scribe Core
//!
//! Pure primitives for Scribe: canonical content, content hashes, OpenSSH
//! key encoding and SSH signatures.
//!
//! This crate contains no file I/O and no history bookkeeping. It is pure
//! computation over text and key material.
//!
//! ## Key Types
//!
//! - [`CanonicalContent`] - The normalized text form every hash and signature covers
//! - [`ContentHash`] - Content-addressed identifier (`sha256:<hex>`)
//! - [`KeyPair`] / [`PublicKey`] - Ed25519 keys in OpenSSH formats
//! - [`SshSignature`] - The `SSH SIGNATURE` container produced by `ssh-keygen -Y sign`
//! - [`VerificationStatus`] - Valid / invalid / unverifiable outcome of a check
//!
//! ## Signing
//!
//! Signatures are computed over an SSHSIG signing blob (namespace `file`,
//! hash algorithm `sha512`), never over the raw content. The resulting PEM
//! verifies with:
//!
//! ```text
//! ssh-keygen -Y verify -f allowed_signers -I author -n file -s post.md.sig < post.md
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use scribe_core::{canonicalize, signer, KeyPair};
//!
//! let keypair = KeyPair::from_seed(&[7u8; 32]);
//! let content = canonicalize("Hello  \r\nWorld\r\n\r\n");
//! assert_eq!(content.as_str(), "Hello\nWorld\n");
//!
//! let signature = signer::sign_with(&keypair, content.as_bytes()).to_pem();
//! let public = keypair.public_key().to_openssh("");
//! assert!(signer::verify(content.as_bytes(), &public, &signature).unwrap());
//! ```

pub mod canonical;
pub mod error;
pub mod hash;
pub mod keys;
pub mod pem;
pub mod signer;
pub mod sshsig;
pub mod wire;

pub use canonical::{canonicalize, is_canonical, CanonicalContent};
pub use error::{CoreError, Result};
pub use hash::ContentHash;
pub use keys::{KeyPair, PublicKey, KEY_TYPE};
pub use signer::{check, sign, sign_with, verify, verify_with, VerificationStatus};
pub use sshsig::{signing_blob, HashAlgorithm, SshSignature, NAMESPACE};
