//! On-disk storage of the author's signing key.
//!
//! Keys live where `ssh-keygen` would put them: an unencrypted OpenSSH
//! private key at `<dir>/<name>` (mode 0600) and the one-line public key at
//! `<dir>/<name>.pub`.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use scribe_core::{CoreError, KeyPair, PublicKey};
use scribe_store::{write_atomic, write_private};

use crate::error::Result;

/// Location of a key pair on disk.
#[derive(Debug, Clone)]
pub struct KeyStore {
    dir: PathBuf,
    name: String,
}

impl KeyStore {
    pub fn new(dir: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            name: name.into(),
        }
    }

    pub fn private_key_path(&self) -> PathBuf {
        self.dir.join(&self.name)
    }

    pub fn public_key_path(&self) -> PathBuf {
        self.dir.join(format!("{}.pub", self.name))
    }

    /// Whether a private key is present.
    pub fn exists(&self) -> bool {
        self.private_key_path().is_file()
    }

    /// Write both key files, replacing any existing ones.
    pub fn save(&self, keypair: &KeyPair, comment: &str) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        let private = keypair.to_openssh()?;
        write_private(&self.private_key_path(), private.as_bytes())?;

        let mut public = keypair.public_key().to_openssh(comment);
        public.push('\n');
        write_atomic(&self.public_key_path(), public.as_bytes())?;

        tracing::debug!(
            path = %self.private_key_path().display(),
            fingerprint = %keypair.public_key().fingerprint(),
            "saved signing key"
        );
        Ok(())
    }

    /// Read the private key.
    ///
    /// If the public key file is present it must describe the same key.
    pub fn load(&self) -> Result<KeyPair> {
        let text = fs::read_to_string(self.private_key_path())?;
        let keypair = KeyPair::from_openssh(&text)?;

        match fs::read_to_string(self.public_key_path()) {
            Ok(line) => {
                let public = PublicKey::from_openssh(&line)?;
                if public != keypair.public_key() {
                    return Err(CoreError::MalformedKey(format!(
                        "{} does not match the private key",
                        self.public_key_path().display()
                    ))
                    .into());
                }
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        Ok(keypair)
    }

    /// Load the key, generating and saving a new one if none exists.
    ///
    /// The flag is `true` when a key was generated.
    pub fn load_or_generate(&self, comment: &str) -> Result<(KeyPair, bool)> {
        if self.exists() {
            return Ok((self.load()?, false));
        }
        let keypair = KeyPair::generate()?;
        self.save(&keypair, comment)?;
        tracing::info!(
            path = %self.private_key_path().display(),
            "generated new signing key"
        );
        Ok((keypair, true))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}
