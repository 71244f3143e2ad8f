// crates/aegis-core/src/core/rule.rs
// ============================================================================
// Module: Aegis Access Rules
// Description: Access rule records and their lifecycle status.
// Purpose: Describe the published policy gating a dataset.
// Dependencies: serde, crate::core::{identifiers, time}
// ============================================================================

//! ## Overview
//! An [`AccessRule`] binds a dataset to a secret commitment, a numeric
//! threshold, a set of approved identity hashes, and a validity window. Rules
//! are never deleted; [`RuleStatus::Revoked`] is a terminal marker.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::fmt;

use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::Commitment;
use crate::core::identifiers::DatasetId;
use crate::core::identifiers::IdentityHash;
use crate::core::identifiers::PrincipalId;
use crate::core::identifiers::RecordAddress;
use crate::core::time::Timestamp;
use crate::core::time::ValidityWindow;

// ============================================================================
// SECTION: Rule Status
// ============================================================================

/// Lifecycle status of an access rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleStatus {
    /// Requests may succeed.
    Active,
    /// Temporarily suspended by the owner.
    Paused,
    /// Permanently disabled.
    Revoked,
}

impl RuleStatus {
    /// Returns the canonical label for the status.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Paused => "paused",
            Self::Revoked => "revoked",
        }
    }

    /// Returns true when no further transition is possible.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Revoked)
    }
}

impl fmt::Display for RuleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ============================================================================
// SECTION: Rule Record
// ============================================================================

/// Published access rule gating one dataset.
///
/// # Invariants
/// - `valid_from < valid_until`.
/// - `address == RecordAddress::for_rule(&dataset_id)`.
/// - Only `status` and `revision` change after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessRule {
    /// Address the rule is stored at.
    pub address: RecordAddress,
    /// Dataset gated by this rule.
    pub dataset_id: DatasetId,
    /// Commitment the requester's secret must match.
    pub secret_commitment: Commitment,
    /// Minimum acceptable value for the gated quantity.
    pub threshold: u64,
    /// Identity hashes allowed to obtain certificates.
    pub approved_identities: BTreeSet<IdentityHash>,
    /// First second at which requests may succeed.
    pub valid_from: Timestamp,
    /// First second at which requests stop succeeding.
    pub valid_until: Timestamp,
    /// Sole principal allowed to change the lifecycle status.
    pub owner: PrincipalId,
    /// Current lifecycle status.
    pub status: RuleStatus,
    /// Creation time.
    pub created_at: Timestamp,
    /// Write counter, starting at 1 on creation.
    pub revision: u64,
}

impl AccessRule {
    /// Returns the rule's validity window.
    #[must_use]
    pub const fn window(&self) -> ValidityWindow {
        ValidityWindow {
            starts_at: self.valid_from,
            ends_at: self.valid_until,
        }
    }

    /// Returns true when `identity` is approved by this rule.
    #[must_use]
    pub fn approves(&self, identity: &IdentityHash) -> bool {
        self.approved_identities.contains(identity)
    }
}

/// Owner-supplied parameters for a new rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleParams {
    /// Dataset gated by the rule.
    pub dataset_id: DatasetId,
    /// Commitment the requester's secret must match.
    pub secret_commitment: Commitment,
    /// Minimum acceptable value.
    pub threshold: u64,
    /// Approved identity hashes; duplicates are rejected.
    pub approved_identities: Vec<IdentityHash>,
    /// First second at which requests may succeed.
    pub valid_from: Timestamp,
    /// First second at which requests stop succeeding.
    pub valid_until: Timestamp,
}
