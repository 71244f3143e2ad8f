// crates/aegis-core/src/runtime/policy.rs
// ============================================================================
// Module: Aegis Policy Store
// Description: Rule creation and owner-only lifecycle transitions.
// Purpose: Own the AccessRule record from creation to revocation.
// Dependencies: thiserror, crate::{core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! Rules are created once per dataset and never deleted. Only the owner may
//! move a rule through its lifecycle. Checks run in this order: the rule
//! exists, the caller owns it, the transition is permitted.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;

use thiserror::Error;

use crate::core::AccessRule;
use crate::core::AuditEvent;
use crate::core::AuditEventKind;
use crate::core::IdentityHash;
use crate::core::PrincipalId;
use crate::core::RecordAddress;
use crate::core::RuleParams;
use crate::core::RuleStatus;
use crate::core::Timestamp;
use crate::interfaces::LedgerTransaction;
use crate::interfaces::StoreError;
use crate::runtime::audit::committed_event;
use crate::runtime::engine::EngineConfig;
use crate::runtime::engine::EngineError;
use crate::runtime::engine::RecordKind;
use crate::runtime::lifecycle::LifecycleAction;
use crate::runtime::lifecycle::transition;

// ============================================================================
// SECTION: Validation
// ============================================================================

/// Reason rule parameters were rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleViolation {
    /// `valid_until` does not follow `valid_from`.
    #[error("valid_until {valid_until} must be after valid_from {valid_from}")]
    InvalidTimeRange {
        /// Submitted window start.
        valid_from: Timestamp,
        /// Submitted window end.
        valid_until: Timestamp,
    },
    /// Threshold of zero admits every value.
    #[error("threshold must be greater than zero")]
    ZeroThreshold,
    /// More approved identities than configured.
    #[error("{count} approved identities exceeds maximum {max}")]
    TooManyIdentities {
        /// Submitted identity count.
        count: usize,
        /// Configured maximum.
        max: usize,
    },
    /// The same identity hash appears twice.
    #[error("duplicate approved identity {0}")]
    DuplicateIdentity(IdentityHash),
}

impl RuleViolation {
    /// Returns the canonical label for the violation.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::InvalidTimeRange {
                ..
            } => "invalid_time_range",
            Self::ZeroThreshold => "zero_threshold",
            Self::TooManyIdentities {
                ..
            } => "too_many_identities",
            Self::DuplicateIdentity(_) => "duplicate_identity",
        }
    }
}

/// Validates rule parameters and returns the approved identity set.
///
/// # Errors
///
/// Returns the first [`RuleViolation`] found.
pub fn validate_rule_params(
    params: &RuleParams,
    max_approved_identities: usize,
) -> Result<BTreeSet<IdentityHash>, RuleViolation> {
    if params.valid_until <= params.valid_from {
        return Err(RuleViolation::InvalidTimeRange {
            valid_from: params.valid_from,
            valid_until: params.valid_until,
        });
    }
    if params.threshold == 0 {
        return Err(RuleViolation::ZeroThreshold);
    }
    if params.approved_identities.len() > max_approved_identities {
        return Err(RuleViolation::TooManyIdentities {
            count: params.approved_identities.len(),
            max: max_approved_identities,
        });
    }
    let mut identities = BTreeSet::new();
    for identity in &params.approved_identities {
        if !identities.insert(*identity) {
            return Err(RuleViolation::DuplicateIdentity(*identity));
        }
    }
    Ok(identities)
}

// ============================================================================
// SECTION: Transaction Bodies
// ============================================================================

/// Creates a rule owned by `owner` inside a transaction.
pub(crate) fn create_rule(
    txn: &mut dyn LedgerTransaction,
    config: &EngineConfig,
    owner: &PrincipalId,
    now: Timestamp,
    params: RuleParams,
) -> Result<(AccessRule, AuditEvent), EngineError> {
    let address = RecordAddress::for_rule(&params.dataset_id);
    if txn.rule(&address)?.is_some() {
        return Err(EngineError::AlreadyExists {
            address,
        });
    }
    let approved_identities = validate_rule_params(&params, config.max_approved_identities)
        .map_err(|violation| EngineError::InvalidRule {
            address,
            violation,
        })?;
    let rule = AccessRule {
        address,
        dataset_id: params.dataset_id,
        secret_commitment: params.secret_commitment,
        threshold: params.threshold,
        approved_identities,
        valid_from: params.valid_from,
        valid_until: params.valid_until,
        owner: owner.clone(),
        status: RuleStatus::Active,
        created_at: now,
        revision: 1,
    };
    txn.insert_rule(&rule).map_err(|err| conflict_as_exists(err, address))?;
    let event = committed_event(
        AuditEventKind::RuleCreated {
            dataset_id: rule.dataset_id,
            threshold: rule.threshold,
            identity_count: rule.approved_identities.len(),
        },
        address,
        owner,
        now,
        &rule,
        config.hash_algorithm,
    )?;
    Ok((rule, event))
}

/// Applies an owner-initiated lifecycle action inside a transaction.
pub(crate) fn apply_lifecycle(
    txn: &mut dyn LedgerTransaction,
    config: &EngineConfig,
    caller: &PrincipalId,
    now: Timestamp,
    address: RecordAddress,
    action: LifecycleAction,
) -> Result<(AccessRule, AuditEvent), EngineError> {
    let Some(mut rule) = txn.rule(&address)? else {
        return Err(EngineError::NotFound {
            address,
            record: RecordKind::Rule,
        });
    };
    if rule.owner != *caller {
        return Err(EngineError::Unauthorized {
            address,
            caller: caller.clone(),
        });
    }
    let previous = rule.status;
    rule.status = transition(previous, action).map_err(|transition| EngineError::InvalidState {
        address,
        transition,
    })?;
    rule.revision = next_revision(rule.revision, address)?;
    txn.update_rule(&rule)?;
    let event = committed_event(
        action.event_kind(previous),
        address,
        caller,
        now,
        &rule,
        config.hash_algorithm,
    )?;
    Ok((rule, event))
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Maps a duplicate-insert conflict onto the idempotency error.
pub(crate) fn conflict_as_exists(error: StoreError, address: RecordAddress) -> EngineError {
    match error {
        StoreError::Conflict(_) => EngineError::AlreadyExists {
            address,
        },
        other => EngineError::Store(other),
    }
}

/// Returns the revision following `current`.
pub(crate) fn next_revision(current: u64, address: RecordAddress) -> Result<u64, EngineError> {
    current.checked_add(1).ok_or_else(|| {
        EngineError::Store(StoreError::Corrupt(format!("revision overflow for {address}")))
    })
}
