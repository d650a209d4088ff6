//! # Scribe Testkit
//!
//! Testing utilities for Scribe.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Golden vectors**: Keys, signatures and hashes checked against `ssh-keygen`
//! - **Generators**: Proptest strategies for messy text and revision chains
//! - **Fixtures**: Deterministic keys and ready-made Scribe instances
//!
//! ## Golden Vectors
//!
//! ```rust
//! use scribe_testkit::vectors::{all_vectors, verify_vector};
//!
//! for vector in all_vectors() {
//!     verify_vector(&vector).unwrap();
//! }
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use scribe_core::canonicalize;
//! use scribe_testkit::generators::messy_text;
//!
//! proptest! {
//!     #[test]
//!     fn canonical_is_idempotent(text in messy_text()) {
//!         let once = canonicalize(&text);
//!         prop_assert_eq!(canonicalize(once.as_str()), once);
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust
//! use scribe_testkit::fixtures::TestFixture;
//!
//! let fixture = TestFixture::with_seed([0x42; 32]);
//! let scribe = fixture.memory_scribe();
//! let receipt = scribe.publish("posts/a.md", "Hello").unwrap();
//! assert_eq!(receipt.content.as_str(), "Hello\n");
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{init_test_tracing, multi_party_fixtures, TestFixture};
pub use generators::{canonical_text, keypair, messy_text, revision_chain};
pub use vectors::{all_vectors, verify_all_vectors, verify_vector, GoldenVector};
