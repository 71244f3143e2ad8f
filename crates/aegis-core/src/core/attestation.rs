// crates/aegis-core/src/core/attestation.rs
// ============================================================================
// Module: Aegis Attestation Contract
// Description: Inputs accepted from external proof and confidential-compute systems.
// Purpose: Describe pre-verified compliance results consumed by the issuer.
// Dependencies: serde, crate::core::{hashing, identifiers}
// ============================================================================

//! ## Overview
//! The engine never runs proof verification or confidential computation. It
//! consumes an [`Attestation`]: an identifier, a binding hash, and the
//! collaborator's pass/fail verdict covering the secret and threshold checks.
//!
//! - Zero-knowledge proofs are bound by `SHA-256(proof_bytes)`.
//! - Confidential-compute jobs are bound by the oracle's computation hash.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

use crate::core::hashing::sha256;
use crate::core::identifiers::AttestationHash;
use crate::core::identifiers::AttestationId;

// ============================================================================
// SECTION: Attestation Types
// ============================================================================

/// Collaborator that produced an attestation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttestationSource {
    /// Zero-knowledge proof of threshold compliance.
    ZeroKnowledgeProof,
    /// Confidential multi-party computation oracle.
    ConfidentialCompute,
}

impl fmt::Display for AttestationSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::ZeroKnowledgeProof => "zero_knowledge_proof",
            Self::ConfidentialCompute => "confidential_compute",
        })
    }
}

/// Pre-verified compliance result supplied in place of a raw secret.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Attestation {
    /// Collaborator that produced the attestation.
    pub source: AttestationSource,
    /// Proof or job identifier.
    pub attestation_id: AttestationId,
    /// Hash binding the certificate to this specific result.
    pub attestation_hash: AttestationHash,
    /// Collaborator verdict for the secret and threshold checks.
    pub verified: bool,
}

/// Result returned by the confidential-compute oracle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComputeJobResult {
    /// Oracle job identifier.
    pub job_id: String,
    /// Hash of the computation transcript.
    pub computation_hash: AttestationHash,
    /// Whether the private policy check passed.
    pub verified: bool,
}

impl Attestation {
    /// Builds an attestation from a zero-knowledge proof blob.
    #[must_use]
    pub fn from_proof(proof_id: impl Into<String>, proof: &[u8], verified: bool) -> Self {
        Self {
            source: AttestationSource::ZeroKnowledgeProof,
            attestation_id: AttestationId::new(proof_id),
            attestation_hash: AttestationHash::new(sha256(proof)),
            verified,
        }
    }

    /// Builds an attestation from a confidential-compute job result.
    #[must_use]
    pub fn from_compute_job(result: ComputeJobResult) -> Self {
        Self {
            source: AttestationSource::ConfidentialCompute,
            attestation_id: AttestationId::new(result.job_id),
            attestation_hash: result.computation_hash,
            verified: result.verified,
        }
    }
}
