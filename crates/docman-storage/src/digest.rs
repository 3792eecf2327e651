//! Content digests.
//!
//! A digest is the SHA-256 of the payload bytes rendered as 64 lowercase
//! hex characters. It depends on nothing but the bytes.

use std::fmt;

use sha2::{Digest, Sha256};

use docman_core::{AppError, AppResult};

/// Length of a hex-encoded digest.
pub const DIGEST_HEX_LEN: usize = 64;

/// A validated SHA-256 content digest.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContentDigest(String);

impl ContentDigest {
    /// Digest a complete payload.
    pub fn compute(bytes: &[u8]) -> Self {
        let mut hasher = Sha256Hasher::new();
        hasher.update(bytes);
        hasher.finalize()
    }

    /// Parse a hex digest, accepting either case.
    pub fn parse(hex_digest: &str) -> AppResult<Self> {
        if hex_digest.len() != DIGEST_HEX_LEN
            || !hex_digest.bytes().all(|b| b.is_ascii_hexdigit())
        {
            return Err(AppError::validation(format!(
                "Invalid digest '{hex_digest}': expected {DIGEST_HEX_LEN} hex characters"
            )));
        }
        Ok(Self(hex_digest.to_ascii_lowercase()))
    }

    /// Check that `bytes` hash to this digest.
    pub fn verify(&self, bytes: &[u8]) -> bool {
        Self::compute(bytes) == *self
    }

    /// The lowercase hex form.
    pub fn as_str(&self) -> &str {
        &self.0
    }

}

impl fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Incremental SHA-256 over a payload delivered in chunks.
#[derive(Debug, Clone, Default)]
pub struct Sha256Hasher {
    inner: Sha256,
    len: u64,
}

impl Sha256Hasher {
    /// Start a new digest.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the next chunk.
    pub fn update(&mut self, chunk: &[u8]) {
        self.inner.update(chunk);
        self.len += chunk.len() as u64;
    }

    /// Bytes hashed so far.
    pub fn len(&self) -> u64 {
        self.len
    }

    /// Whether nothing has been hashed yet.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Finish and return the digest.
    pub fn finalize(self) -> ContentDigest {
        ContentDigest(hex::encode(self.inner.finalize()))
    }
}
