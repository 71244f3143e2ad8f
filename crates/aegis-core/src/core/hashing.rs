// crates/aegis-core/src/core/hashing.rs
// ============================================================================
// Module: Aegis Canonical Hashing
// Description: RFC 8785 JSON canonicalization, SHA-256 helpers, and hex codecs.
// Purpose: Provide deterministic hashes for records, addresses, and commitments.
// Dependencies: hex, serde, serde_jcs, sha2
// ============================================================================

//! ## Overview
//! Aegis hashes canonical JSON using RFC 8785 (JCS) so audit events can bind
//! to a stable digest of the record they describe. Record addresses and
//! secret commitments are raw SHA-256 digests over tagged byte parts.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use sha2::Digest;
use sha2::Sha256;
use thiserror::Error;

// ============================================================================
// SECTION: Hash Algorithm
// ============================================================================

/// Supported hash algorithms for Aegis records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HashAlgorithm {
    /// SHA-256 hashing (FIPS-friendly default).
    Sha256,
}

impl HashAlgorithm {
    /// Returns the canonical label for the algorithm.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Sha256 => "sha256",
        }
    }

    /// Parses a canonical algorithm label.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "sha256" => Some(Self::Sha256),
            _ => None,
        }
    }
}

/// Default hash algorithm for Aegis.
pub const DEFAULT_HASH_ALGORITHM: HashAlgorithm = HashAlgorithm::Sha256;

// ============================================================================
// SECTION: Hash Digest
// ============================================================================

/// Deterministic content hash representation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashDigest {
    /// Hash algorithm identifier.
    pub algorithm: HashAlgorithm,
    /// Lowercase hex-encoded digest bytes.
    pub value: String,
}

impl HashDigest {
    /// Creates a new digest from raw bytes.
    #[must_use]
    pub fn new(algorithm: HashAlgorithm, bytes: &[u8]) -> Self {
        Self {
            algorithm,
            value: hex_encode(bytes),
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised when computing canonical hashes.
#[derive(Debug, Error)]
pub enum HashError {
    /// JSON canonicalization failed.
    #[error("failed to canonicalize json: {0}")]
    Canonicalization(String),
}

/// Errors raised when decoding hex strings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HexError {
    /// Input length did not match the expected byte length.
    #[error("expected {expected} hex characters, got {actual}")]
    Length {
        /// Expected number of hex characters.
        expected: usize,
        /// Actual number of characters.
        actual: usize,
    },
    /// Input contained a non-hex character.
    #[error("invalid hex character at offset {0}")]
    InvalidCharacter(usize),
}

// ============================================================================
// SECTION: Hashing Helpers
// ============================================================================

/// Returns canonical JSON bytes for a serializable value using RFC 8785.
///
/// # Errors
///
/// Returns [`HashError::Canonicalization`] when serialization fails.
pub fn canonical_json_bytes<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, HashError> {
    serde_jcs::to_vec(value).map_err(|err| HashError::Canonicalization(err.to_string()))
}

/// Hashes canonical JSON using the provided algorithm.
///
/// # Errors
///
/// Returns [`HashError::Canonicalization`] when serialization fails.
pub fn hash_canonical_json<T: Serialize + ?Sized>(
    algorithm: HashAlgorithm,
    value: &T,
) -> Result<HashDigest, HashError> {
    let bytes = canonical_json_bytes(value)?;
    Ok(hash_bytes(algorithm, &bytes))
}

/// Hashes raw bytes using the provided algorithm.
#[must_use]
pub fn hash_bytes(algorithm: HashAlgorithm, bytes: &[u8]) -> HashDigest {
    match algorithm {
        HashAlgorithm::Sha256 => HashDigest::new(HashAlgorithm::Sha256, &sha256(bytes)),
    }
}

/// Returns the raw SHA-256 digest of a byte slice.
#[must_use]
pub fn sha256(bytes: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hasher.finalize().into()
}

/// Returns the SHA-256 digest over a domain tag followed by byte parts.
///
/// Parts are concatenated without framing, matching seed-based address
/// derivation where every part except the last has a fixed width.
#[must_use]
pub fn sha256_parts(tag: &[u8], parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(tag);
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize().into()
}

// ============================================================================
// SECTION: Hex Encoding
// ============================================================================

/// Encodes bytes as a lowercase hex string.
#[must_use]
pub fn hex_encode(bytes: &[u8]) -> String {
    hex::encode(bytes)
}

/// Decodes a hex string (either case) into a fixed-width byte array.
///
/// # Errors
///
/// Returns [`HexError`] when the length or characters are invalid.
pub fn hex_decode_32(text: &str) -> Result<[u8; 32], HexError> {
    if text.len() != 64 {
        return Err(HexError::Length {
            expected: 64,
            actual: text.len(),
        });
    }
    let mut out = [0_u8; 32];
    hex::decode_to_slice(text, &mut out).map_err(|err| match err {
        hex::FromHexError::InvalidHexCharacter {
            index,
            ..
        } => HexError::InvalidCharacter(index),
        _ => HexError::Length {
            expected: 64,
            actual: text.len(),
        },
    })?;
    Ok(out)
}
