// crates/aegis-core/src/core/certificate.rs
// ============================================================================
// Module: Aegis Access Certificates
// Description: Single-use certificates and their optional attestation binding.
// Purpose: Record a time-bounded authorization derived from a rule.
// Dependencies: serde, crate::core::{attestation, identifiers, time}
// ============================================================================

//! ## Overview
//! An [`AccessCertificate`] is minted once per (rule, requester) and consumed
//! once. Certificates issued on the attestation path carry an
//! [`AttestationBinding`] naming the external proof or computation they rely on.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

use crate::core::attestation::AttestationSource;
use crate::core::identifiers::AttestationHash;
use crate::core::identifiers::AttestationId;
use crate::core::identifiers::DatasetId;
use crate::core::identifiers::PrincipalId;
use crate::core::identifiers::RecordAddress;
use crate::core::time::Timestamp;

// ============================================================================
// SECTION: Certificate State
// ============================================================================

/// Observable state of the certificate slot for a (rule, requester) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CertificateState {
    /// No certificate has been issued.
    NonExistent,
    /// Issued and not yet consumed.
    Issued,
    /// Consumed; terminal.
    Used,
}

impl CertificateState {
    /// Derives the slot state from an optional stored certificate.
    #[must_use]
    pub fn of(certificate: Option<&AccessCertificate>) -> Self {
        match certificate {
            None => Self::NonExistent,
            Some(cert) if cert.is_used => Self::Used,
            Some(_) => Self::Issued,
        }
    }
}

impl fmt::Display for CertificateState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::NonExistent => "non_existent",
            Self::Issued => "issued",
            Self::Used => "used",
        })
    }
}

// ============================================================================
// SECTION: Certificate Record
// ============================================================================

/// External attestation a certificate was issued against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttestationBinding {
    /// Collaborator that produced the attestation.
    pub source: AttestationSource,
    /// Proof or job identifier.
    pub attestation_id: AttestationId,
    /// Hash of the proof or computation result.
    pub attestation_hash: AttestationHash,
}

/// Single-use access certificate.
///
/// # Invariants
/// - `rule_ref` never changes after issuance.
/// - `is_used` moves from false to true exactly once; `used_at` and
///   `outcome` are set in the same write.
/// - `address == RecordAddress::for_certificate(&rule_ref, &requester)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessCertificate {
    /// Address the certificate is stored at.
    pub address: RecordAddress,
    /// Rule the certificate was issued under.
    pub rule_ref: RecordAddress,
    /// Dataset gated by the rule.
    pub dataset_id: DatasetId,
    /// Principal that obtained the certificate.
    pub requester: PrincipalId,
    /// Issuance time.
    pub issued_at: Timestamp,
    /// First second at which the certificate can no longer be used.
    pub expires_at: Timestamp,
    /// Whether the certificate has been consumed.
    pub is_used: bool,
    /// Consumption time.
    pub used_at: Option<Timestamp>,
    /// Outcome reported by the consumer, recorded for audit only.
    pub outcome: Option<bool>,
    /// Attestation binding for certificates issued on the attestation path.
    pub attestation: Option<AttestationBinding>,
    /// Write counter, starting at 1 on issuance.
    pub revision: u64,
}

impl AccessCertificate {
    /// Returns the certificate's lifecycle state.
    #[must_use]
    pub fn state(&self) -> CertificateState {
        CertificateState::of(Some(self))
    }
}
