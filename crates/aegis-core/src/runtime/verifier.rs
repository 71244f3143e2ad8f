// crates/aegis-core/src/runtime/verifier.rs
// ============================================================================
// Module: Aegis Commitment Verifier
// Description: Ordered, side-effect-free checks for access requests.
// Purpose: Decide whether a request satisfies a rule and name the first failure.
// Dependencies: serde, subtle, crate::core
// ============================================================================

//! ## Overview
//! The verifier evaluates a request against a rule in a fixed order and stops
//! at the first failing check:
//!
//! 1. rule status is active
//! 2. `now` lies inside `[valid_from, valid_until)`
//! 3. the secret matches the commitment, or the attestation reports success
//! 4. the submitted value meets the threshold
//! 5. the identity hash is approved
//!
//! Every check reads only its own inputs, so violating exactly one of them
//! yields exactly that check's [`DenialReason`].
//!
//! Security posture: secret comparison is constant time.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use subtle::ConstantTimeEq;

use crate::core::AccessRule;
use crate::core::Attestation;
use crate::core::Commitment;
use crate::core::DenialReason;
use crate::core::IdentityHash;
use crate::core::RuleStatus;
use crate::core::Secret;
use crate::core::Timestamp;
use crate::core::WindowPosition;
use crate::core::hashing::sha256;

// ============================================================================
// SECTION: Commitment Schemes
// ============================================================================

/// How a stored commitment is derived from the secret.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommitmentScheme {
    /// Commitment is `SHA-256(secret)`.
    #[default]
    Sha256,
    /// Commitment is the secret itself.
    Plain,
}

impl CommitmentScheme {
    /// Returns the canonical label for the scheme.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Sha256 => "sha256",
            Self::Plain => "plain",
        }
    }

    /// Computes the commitment for a secret.
    #[must_use]
    pub fn commit(self, secret: &Secret) -> Commitment {
        match self {
            Self::Sha256 => Commitment::new(sha256(secret.as_bytes())),
            Self::Plain => Commitment::new(*secret.as_bytes()),
        }
    }

    /// Returns true when `secret` opens `commitment`.
    #[must_use]
    pub fn opens(self, commitment: &Commitment, secret: &Secret) -> bool {
        let candidate = self.commit(secret);
        candidate.as_bytes().as_slice().ct_eq(commitment.as_bytes().as_slice()).into()
    }
}

// ============================================================================
// SECTION: Verification
// ============================================================================

/// Evidence offered for the secret check.
#[derive(Debug, Clone, Copy)]
pub enum SecretEvidence<'a> {
    /// Raw secret checked against the rule's commitment.
    Secret {
        /// Scheme used to derive the commitment.
        scheme: CommitmentScheme,
        /// Submitted secret.
        secret: &'a Secret,
    },
    /// External attestation whose verdict replaces the secret check.
    Attestation(&'a Attestation),
}

/// Checks rule status and validity window.
///
/// # Errors
///
/// Returns [`DenialReason::RuleNotActive`], [`DenialReason::RuleNotYetValid`],
/// or [`DenialReason::RuleExpired`].
pub fn check_rule_gate(rule: &AccessRule, now: Timestamp) -> Result<(), DenialReason> {
    if rule.status != RuleStatus::Active {
        return Err(DenialReason::RuleNotActive);
    }
    match rule.window().position(now) {
        WindowPosition::Before => Err(DenialReason::RuleNotYetValid),
        WindowPosition::Within => Ok(()),
        WindowPosition::After => Err(DenialReason::RuleExpired),
    }
}

/// Checks the secret or attestation against the rule.
///
/// # Errors
///
/// Returns [`DenialReason::InvalidSecret`] or [`DenialReason::AttestationRejected`].
pub fn check_secret(rule: &AccessRule, evidence: SecretEvidence<'_>) -> Result<(), DenialReason> {
    match evidence {
        SecretEvidence::Secret {
            scheme,
            secret,
        } => {
            if scheme.opens(&rule.secret_commitment, secret) {
                Ok(())
            } else {
                Err(DenialReason::InvalidSecret)
            }
        }
        SecretEvidence::Attestation(attestation) => {
            if attestation.verified {
                Ok(())
            } else {
                Err(DenialReason::AttestationRejected)
            }
        }
    }
}

/// Runs every check in order against a request.
///
/// # Errors
///
/// Returns the [`DenialReason`] of the first failing check.
pub fn verify(
    rule: &AccessRule,
    now: Timestamp,
    evidence: SecretEvidence<'_>,
    value: u64,
    identity: &IdentityHash,
) -> Result<(), DenialReason> {
    check_rule_gate(rule, now)?;
    check_secret(rule, evidence)?;
    if value < rule.threshold {
        return Err(DenialReason::InsufficientAmount);
    }
    if !rule.approves(identity) {
        return Err(DenialReason::IdentityNotApproved);
    }
    Ok(())
}
