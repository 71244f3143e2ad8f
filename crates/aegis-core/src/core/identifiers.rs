// crates/aegis-core/src/core/identifiers.rs
// ============================================================================
// Module: Aegis Identifiers
// Description: Fixed-width 32-byte values, record addresses, and principals.
// Purpose: Provide strongly typed, serializable identifiers with stable wire forms.
// Dependencies: serde, subtle, crate::core::hashing
// ============================================================================

//! ## Overview
//! Every 32-byte value (dataset ids, commitments, identity hashes, secrets,
//! attestation hashes, record addresses) is a distinct newtype so that a
//! commitment can never be passed where an identity hash is expected. On the
//! wire they serialize as 64-character lowercase hex strings and reject any
//! other length at the deserialization boundary.
//!
//! Record addresses are content-derived: a rule lives at
//! `SHA-256("rule" || dataset_id)` and a certificate at
//! `SHA-256("certificate" || rule_address || requester)`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde::Serializer;
use serde::de;
use subtle::ConstantTimeEq;

use crate::core::hashing::hex_decode_32;
use crate::core::hashing::hex_encode;
use crate::core::hashing::sha256_parts;

// ============================================================================
// SECTION: Fixed-Width Values
// ============================================================================

/// Declares a 32-byte newtype with hex serde.
///
/// Public values also get `Display` and ordering; the `secret` form gets
/// neither, leaving redacted `Debug` and constant-time equality to the caller.
macro_rules! fixed_bytes {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name([u8; 32]);

        fixed_bytes!(@common $name);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.to_hex())
            }
        }
    };
    (secret $(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy)]
        pub struct $name([u8; 32]);

        fixed_bytes!(@common $name);
    };
    (@common $name:ident) => {
        impl $name {
            /// Wraps raw bytes.
            #[must_use]
            pub const fn new(bytes: [u8; 32]) -> Self {
                Self(bytes)
            }

            /// Returns the raw bytes.
            #[must_use]
            pub const fn as_bytes(&self) -> &[u8; 32] {
                &self.0
            }

            /// Returns the lowercase hex form.
            #[must_use]
            pub fn to_hex(&self) -> String {
                hex_encode(&self.0)
            }

            /// Parses a 64-character hex string.
            ///
            /// # Errors
            ///
            /// Returns [`crate::core::hashing::HexError`] when the input is malformed.
            pub fn from_hex(text: &str) -> Result<Self, crate::core::hashing::HexError> {
                hex_decode_32(text).map(Self)
            }

            /// Right-pads a label with zero bytes, as legacy fixtures encode names.
            ///
            /// Labels longer than 32 bytes are truncated.
            #[must_use]
            pub fn from_padded_label(label: &str) -> Self {
                let mut bytes = [0_u8; 32];
                let source = label.as_bytes();
                let len = source.len().min(32);
                bytes[.. len].copy_from_slice(&source[.. len]);
                Self(bytes)
            }
        }

        impl From<[u8; 32]> for $name {
            fn from(value: [u8; 32]) -> Self {
                Self(value)
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(&self.to_hex())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let text = String::deserialize(deserializer)?;
                hex_decode_32(&text).map(Self).map_err(de::Error::custom)
            }
        }
    };
}

fixed_bytes! {
    /// Opaque dataset identifier gated by an access rule.
    DatasetId
}

fixed_bytes! {
    /// Binding value a requester's secret must match.
    Commitment
}

fixed_bytes! {
    /// Hash of an approved requester identity.
    IdentityHash
}

fixed_bytes! {
    /// Hash binding a certificate to one external proof or computation result.
    AttestationHash
}

fixed_bytes! {
    /// Content-derived address of a rule or certificate record.
    RecordAddress
}

fixed_bytes! {
    secret
    /// Secret submitted by a requester.
    ///
    /// # Invariants
    /// - No `Display`; `Debug` output never reveals the bytes.
    /// - Equality runs in constant time; there is no ordering.
    ///
    /// ```compile_fail
    /// let secret = aegis_core::Secret::new([0; 32]);
    /// let _ = format!("{secret}");
    /// ```
    Secret
}

impl fmt::Debug for DatasetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DatasetId({self})")
    }
}

impl fmt::Debug for Commitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Commitment({self})")
    }
}

impl fmt::Debug for IdentityHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IdentityHash({self})")
    }
}

impl fmt::Debug for AttestationHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AttestationHash({self})")
    }
}

impl fmt::Debug for RecordAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RecordAddress({self})")
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(<redacted>)")
    }
}

impl PartialEq for Secret {
    fn eq(&self, other: &Self) -> bool {
        self.0.as_slice().ct_eq(other.0.as_slice()).into()
    }
}

impl Eq for Secret {}

// ============================================================================
// SECTION: Principals
// ============================================================================

/// Identity of a principal acting on the engine (owner, requester, consumer).
///
/// # Invariants
/// - Opaque UTF-8 string; emptiness is rejected at the request boundary.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrincipalId(String);

impl PrincipalId {
    /// Creates a new principal identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PrincipalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for PrincipalId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for PrincipalId {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// External attestation identifier (proof id or confidential-compute job id).
///
/// # Invariants
/// - Opaque UTF-8 string; length is bounded at the request boundary.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttestationId(String);

impl AttestationId {
    /// Creates a new attestation identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AttestationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for AttestationId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

// ============================================================================
// SECTION: Address Derivation
// ============================================================================

/// Address namespace tag for rules.
const RULE_SEED: &[u8] = b"rule";
/// Address namespace tag for certificates.
const CERTIFICATE_SEED: &[u8] = b"certificate";

impl RecordAddress {
    /// Derives the address of the rule gating `dataset_id`.
    #[must_use]
    pub fn for_rule(dataset_id: &DatasetId) -> Self {
        Self(sha256_parts(RULE_SEED, &[dataset_id.as_bytes()]))
    }

    /// Derives the address of the certificate held by `requester` under a rule.
    #[must_use]
    pub fn for_certificate(rule: &Self, requester: &PrincipalId) -> Self {
        Self(sha256_parts(CERTIFICATE_SEED, &[rule.as_bytes(), requester.as_str().as_bytes()]))
    }
}
