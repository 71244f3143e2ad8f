// crates/aegis-core/src/core/request.rs
// ============================================================================
// Module: Aegis Request Payloads
// Description: Tagged request variants and the boundary envelope.
// Purpose: Reject malformed or incomplete requests before any state is read.
// Dependencies: serde, serde_json, thiserror, crate::core::{attestation, identifiers, rule, time}
// ============================================================================

//! ## Overview
//! Every engine operation has exactly one [`AccessRequest`] variant carrying
//! exactly the fields it needs. Deserialization rejects unknown fields,
//! missing fields, and 32-byte values that are not 64 hex characters, so the
//! state machine only ever sees well-formed input.
//!
//! Security posture: request payloads are untrusted and size-limited.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::core::attestation::Attestation;
use crate::core::attestation::AttestationSource;
use crate::core::identifiers::AttestationHash;
use crate::core::identifiers::AttestationId;
use crate::core::identifiers::Commitment;
use crate::core::identifiers::DatasetId;
use crate::core::identifiers::IdentityHash;
use crate::core::identifiers::PrincipalId;
use crate::core::identifiers::RecordAddress;
use crate::core::identifiers::Secret;
use crate::core::rule::RuleParams;
use crate::core::time::Timestamp;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Maximum size of a JSON request envelope in bytes.
pub const MAX_REQUEST_BYTES: usize = 64 * 1024;
/// Maximum length of a principal identifier in bytes.
pub const MAX_PRINCIPAL_ID_BYTES: usize = 256;
/// Maximum length of an attestation identifier in bytes.
pub const MAX_ATTESTATION_ID_BYTES: usize = 128;

// ============================================================================
// SECTION: Requests
// ============================================================================

/// One engine operation with its payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "operation", rename_all = "snake_case", deny_unknown_fields)]
pub enum AccessRequest {
    /// Publish a new rule owned by the caller.
    CreateRule {
        /// Dataset gated by the rule.
        dataset_id: DatasetId,
        /// Commitment the requester's secret must match.
        secret_commitment: Commitment,
        /// Minimum acceptable value.
        threshold: u64,
        /// Approved identity hashes.
        approved_identities: Vec<IdentityHash>,
        /// First second at which requests may succeed.
        valid_from: Timestamp,
        /// First second at which requests stop succeeding.
        valid_until: Timestamp,
    },
    /// Pause an active rule.
    PauseRule {
        /// Rule address.
        rule: RecordAddress,
    },
    /// Resume a paused rule.
    ResumeRule {
        /// Rule address.
        rule: RecordAddress,
    },
    /// Revoke a rule permanently.
    RevokeRule {
        /// Rule address.
        rule: RecordAddress,
    },
    /// Request a certificate by presenting the secret.
    RequestAccess {
        /// Rule address.
        rule: RecordAddress,
        /// Secret whose commitment the rule stores.
        secret: Secret,
        /// Value compared against the threshold.
        value: u64,
        /// Requester identity hash.
        identity: IdentityHash,
    },
    /// Request a certificate backed by an external attestation.
    RequestAccessWithAttestation {
        /// Rule address.
        rule: RecordAddress,
        /// Collaborator that produced the attestation.
        source: AttestationSource,
        /// Proof or job identifier.
        attestation_id: AttestationId,
        /// Hash of the proof or computation result.
        attestation_hash: AttestationHash,
        /// Collaborator verdict for the secret and threshold checks.
        verified: bool,
        /// Value compared against the threshold.
        value: u64,
        /// Requester identity hash.
        identity: IdentityHash,
    },
    /// Consume a certificate.
    UseCertificate {
        /// Certificate address.
        certificate: RecordAddress,
        /// Outcome reported by the consumer.
        outcome: bool,
    },
}

impl AccessRequest {
    /// Returns the canonical operation label.
    #[must_use]
    pub const fn operation(&self) -> &'static str {
        match self {
            Self::CreateRule {
                ..
            } => "create_rule",
            Self::PauseRule {
                ..
            } => "pause_rule",
            Self::ResumeRule {
                ..
            } => "resume_rule",
            Self::RevokeRule {
                ..
            } => "revoke_rule",
            Self::RequestAccess {
                ..
            } => "request_access",
            Self::RequestAccessWithAttestation {
                ..
            } => "request_access_with_attestation",
            Self::UseCertificate {
                ..
            } => "use_certificate",
        }
    }

    /// Builds a create-rule request from rule parameters.
    #[must_use]
    pub fn create_rule(params: RuleParams) -> Self {
        Self::CreateRule {
            dataset_id: params.dataset_id,
            secret_commitment: params.secret_commitment,
            threshold: params.threshold,
            approved_identities: params.approved_identities,
            valid_from: params.valid_from,
            valid_until: params.valid_until,
        }
    }

    /// Builds an attestation-backed access request.
    #[must_use]
    pub fn with_attestation(
        rule: RecordAddress,
        attestation: Attestation,
        value: u64,
        identity: IdentityHash,
    ) -> Self {
        Self::RequestAccessWithAttestation {
            rule,
            source: attestation.source,
            attestation_id: attestation.attestation_id,
            attestation_hash: attestation.attestation_hash,
            verified: attestation.verified,
            value,
            identity,
        }
    }

    /// Validates field-level bounds that serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError`] when a field is out of bounds.
    pub fn validate(&self) -> Result<(), RequestError> {
        if let Self::RequestAccessWithAttestation {
            attestation_id,
            ..
        } = self
        {
            validate_attestation_id(attestation_id)?;
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Envelope
// ============================================================================

/// Request as delivered by the host: caller identity, clock value, operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RequestEnvelope {
    /// Authenticated caller identity supplied by the host.
    pub caller: PrincipalId,
    /// Host clock value for this request.
    pub now: Timestamp,
    /// Operation to perform.
    pub request: AccessRequest,
}

impl RequestEnvelope {
    /// Parses and validates a JSON envelope.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError`] when the payload is oversized, malformed, or
    /// fails field validation.
    pub fn from_json_slice(bytes: &[u8]) -> Result<Self, RequestError> {
        if bytes.len() > MAX_REQUEST_BYTES {
            return Err(RequestError::TooLarge {
                max_bytes: MAX_REQUEST_BYTES,
                actual_bytes: bytes.len(),
            });
        }
        let envelope: Self = serde_json::from_slice(bytes)
            .map_err(|err| RequestError::Malformed(err.to_string()))?;
        envelope.validate()?;
        Ok(envelope)
    }

    /// Validates the envelope and its request.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError`] when a field is out of bounds.
    pub fn validate(&self) -> Result<(), RequestError> {
        validate_principal(&self.caller)?;
        self.request.validate()
    }
}

/// Validates a principal identifier.
///
/// # Errors
///
/// Returns [`RequestError::Invalid`] when the identifier is empty or too long.
pub fn validate_principal(principal: &PrincipalId) -> Result<(), RequestError> {
    let len = principal.as_str().len();
    if len == 0 {
        return Err(RequestError::Invalid("principal id must not be empty".to_string()));
    }
    if len > MAX_PRINCIPAL_ID_BYTES {
        return Err(RequestError::Invalid(format!(
            "principal id exceeds {MAX_PRINCIPAL_ID_BYTES} bytes"
        )));
    }
    Ok(())
}

/// Validates an attestation identifier.
///
/// # Errors
///
/// Returns [`RequestError::Invalid`] when the identifier is empty or too long.
pub fn validate_attestation_id(attestation_id: &AttestationId) -> Result<(), RequestError> {
    let len = attestation_id.as_str().len();
    if len == 0 {
        return Err(RequestError::Invalid("attestation_id must not be empty".to_string()));
    }
    if len > MAX_ATTESTATION_ID_BYTES {
        return Err(RequestError::Invalid(format!(
            "attestation_id exceeds {MAX_ATTESTATION_ID_BYTES} bytes"
        )));
    }
    Ok(())
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Request boundary errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    /// Payload exceeded the size limit.
    #[error("request too large: {actual_bytes} bytes (max {max_bytes})")]
    TooLarge {
        /// Maximum allowed bytes.
        max_bytes: usize,
        /// Actual payload size in bytes.
        actual_bytes: usize,
    },
    /// Payload failed to deserialize.
    #[error("malformed request: {0}")]
    Malformed(String),
    /// A field is out of bounds.
    #[error("invalid request: {0}")]
    Invalid(String),
}
