//! Test fixtures and helpers.
//!
//! Common setup code for integration tests.

use std::sync::Once;

use scribe::{Scribe, ScribeConfig};
use scribe_core::{KeyPair, PublicKey};
use scribe_store::{FsHistoryStore, MemoryHistoryStore};
use tempfile::TempDir;

/// A test fixture with a deterministic keypair.
pub struct TestFixture {
    pub seed: [u8; 32],
    pub keypair: KeyPair,
}

impl TestFixture {
    /// Create a new test fixture with a random keypair.
    pub fn new() -> Self {
        let keypair = KeyPair::generate().expect("OS entropy unavailable");
        Self {
            seed: keypair.seed(),
            keypair,
        }
    }

    /// Create with a deterministic keypair from seed.
    pub fn with_seed(seed: [u8; 32]) -> Self {
        Self {
            seed,
            keypair: KeyPair::from_seed(&seed),
        }
    }

    /// Get the keypair's public key.
    pub fn public_key(&self) -> PublicKey {
        self.keypair.public_key()
    }

    /// The public key as an OpenSSH line.
    pub fn public_key_line(&self) -> String {
        self.keypair.public_key().to_openssh("")
    }

    /// A Scribe backed by memory.
    pub fn memory_scribe(&self) -> Scribe<MemoryHistoryStore> {
        Scribe::new(
            self.keypair.clone(),
            MemoryHistoryStore::new(),
            ScribeConfig::default(),
        )
    }

    /// A Scribe backed by a fresh temporary directory.
    ///
    /// Keep the `TempDir` alive for as long as the Scribe is used.
    pub fn temp_scribe(&self) -> (TempDir, Scribe<FsHistoryStore>) {
        let dir = TempDir::new().expect("failed to create temp dir");
        let config = ScribeConfig::default().rooted_at(dir.path());
        let store = config.history_store();
        let scribe = Scribe::new(self.keypair.clone(), store, config);
        (dir, scribe)
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Create multiple test fixtures for multi-party tests.
pub fn multi_party_fixtures(count: usize) -> Vec<TestFixture> {
    (0..count)
        .map(|i| {
            let mut seed = [0u8; 32];
            seed[..8].copy_from_slice(&(i as u64).to_le_bytes());
            seed[31] = 0xa5;
            TestFixture::with_seed(seed)
        })
        .collect()
}

static TRACING: Once = Once::new();

/// Install a test-friendly tracing subscriber once per process.
///
/// Honors `RUST_LOG`; defaults to `warn`.
pub fn init_test_tracing() {
    TRACING.call_once(|| {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}
