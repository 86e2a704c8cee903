// Cryptographic utilities for generating session and CSRF tokens

use std::fs::File;
use std::io::Read;
use std::path::PathBuf;

use sha2::{Digest, Sha256};

use crate::settings::SessionSettings;

/// Length of a minted token in hexadecimal characters (a SHA-256 digest).
pub const TOKEN_LENGTH: usize = 64;

/// Mints high-entropy tokens from a designated entropy source.
///
/// Each token is the SHA-256 digest of a fresh read from the entropy file,
/// hex-encoded to [`TOKEN_LENGTH`] characters. The source is read for every
/// token; there is no caching, no reuse and no fallback to weaker
/// randomness.
#[derive(Debug, Clone)]
pub struct TokenMinter {
    entropy_file: PathBuf,
    entropy_length: usize,
}

impl TokenMinter {
    #[must_use]
    pub fn new(settings: &SessionSettings) -> Self {
        Self {
            entropy_file: PathBuf::from(&settings.entropy_file),
            entropy_length: settings.entropy_length,
        }
    }

    /// Mint one token.
    ///
    /// # Errors
    ///
    /// Returns an error if the entropy source cannot be opened or does not
    /// yield the configured number of bytes. The error is fatal for the
    /// operation requesting the token; it is never papered over with a
    /// weaker source.
    pub fn mint(&self) -> std::io::Result<String> {
        let mut source = File::open(&self.entropy_file)?;
        let mut entropy = vec![0u8; self.entropy_length];
        source.read_exact(&mut entropy)?;

        Ok(hex::encode(Sha256::digest(&entropy)))
    }
}
