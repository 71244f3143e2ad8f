// crates/aegis-core/src/core/denial.rs
// ============================================================================
// Module: Aegis Denial Reasons
// Description: Observable reasons an access request is refused.
// Purpose: Give each verifier check a distinct, stable failure label.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Denial reasons are listed in verifier check order. A request that fails
//! several checks reports only the first one in this order.

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

/// Reason an access request was denied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DenialReason {
    /// The rule is paused or revoked.
    RuleNotActive,
    /// The request precedes the rule's validity window.
    RuleNotYetValid,
    /// The request is at or past the end of the rule's validity window.
    RuleExpired,
    /// The submitted secret does not match the commitment.
    InvalidSecret,
    /// The external attestation reported a failed policy check.
    AttestationRejected,
    /// The submitted value is below the rule threshold.
    InsufficientAmount,
    /// The submitted identity is not in the approved set.
    IdentityNotApproved,
}

impl DenialReason {
    /// Returns the canonical label for the reason.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::RuleNotActive => "rule_not_active",
            Self::RuleNotYetValid => "rule_not_yet_valid",
            Self::RuleExpired => "rule_expired",
            Self::InvalidSecret => "invalid_secret",
            Self::AttestationRejected => "attestation_rejected",
            Self::InsufficientAmount => "insufficient_amount",
            Self::IdentityNotApproved => "identity_not_approved",
        }
    }
}

impl fmt::Display for DenialReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
