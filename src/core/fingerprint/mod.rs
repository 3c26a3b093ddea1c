//! # Fingerprint Module
//!
//! Exact-content identity for duplicate detection.
//!
//! A fingerprint is the pair `(size, SHA-256)`. Files are read whole; two
//! files with equal fingerprints are treated as byte-identical.

use crate::error::FingerprintError;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Composite content key
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fingerprint {
    pub size: u64,
    /// Lowercase hex SHA-256 of the full content
    pub hash: String,
}

impl Fingerprint {
    /// Fingerprint content that is already in memory
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            size: bytes.len() as u64,
            hash: hex::encode(Sha256::digest(bytes)),
        }
    }
}

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.size, &self.hash[..self.hash.len().min(12)])
    }
}

/// Read `path` and fingerprint it, keeping the size the caller already knows.
pub fn fingerprint_file(path: &Path, size: u64) -> Result<Fingerprint, FingerprintError> {
    let bytes = fs::read(path).map_err(|source| FingerprintError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Fingerprint {
        size,
        hash: hex::encode(Sha256::digest(&bytes)),
    })
}

/// First-seen path per fingerprint for one planning pass
#[derive(Debug, Default)]
pub struct FingerprintIndex {
    first_seen: HashMap<Fingerprint, PathBuf>,
}

impl FingerprintIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `path` under `fingerprint`.
    ///
    /// Returns the canonical path when the fingerprint was already seen; the
    /// canonical entry itself is never replaced.
    pub fn observe(&mut self, fingerprint: &Fingerprint, path: &Path) -> Option<PathBuf> {
        match self.first_seen.get(fingerprint) {
            Some(canonical) => Some(canonical.clone()),
            None => {
                self.first_seen
                    .insert(fingerprint.clone(), path.to_path_buf());
                None
            }
        }
    }

    pub fn len(&self) -> usize {
        self.first_seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.first_seen.is_empty()
    }
}
