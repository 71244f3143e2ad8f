// crates/aegis-core/src/core/events.rs
// ============================================================================
// Module: Aegis Audit Events
// Description: Structured, append-only events for every state transition.
// Purpose: Provide the event stream consumed by external audit pipelines.
// Dependencies: serde, crate::core::{certificate, denial, hashing, identifiers, rule, time}
// ============================================================================

//! ## Overview
//! Each successful transition produces exactly one [`AuditEvent`]. Events carry
//! the affected record address, the acting principal, the request timestamp,
//! and the canonical hash of the record as written, so an indexer can detect
//! tampering without storing the record itself.
//!
//! Denials may produce an [`AuditEventKind::AccessDenied`] event; those carry
//! no record hash because nothing was written.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::certificate::AttestationBinding;
use crate::core::denial::DenialReason;
use crate::core::hashing::HashDigest;
use crate::core::identifiers::DatasetId;
use crate::core::identifiers::PrincipalId;
use crate::core::identifiers::RecordAddress;
use crate::core::rule::RuleStatus;
use crate::core::time::Timestamp;

// ============================================================================
// SECTION: Events
// ============================================================================

/// Kind-specific event payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum AuditEventKind {
    /// A rule was published.
    RuleCreated {
        /// Dataset gated by the rule.
        dataset_id: DatasetId,
        /// Rule threshold.
        threshold: u64,
        /// Number of approved identities.
        identity_count: usize,
    },
    /// A rule moved from active to paused.
    RulePaused,
    /// A rule moved from paused to active.
    RuleResumed,
    /// A rule was revoked.
    RuleRevoked {
        /// Status held before revocation.
        previous_status: RuleStatus,
    },
    /// A certificate was issued.
    AccessGranted {
        /// Rule the certificate was issued under.
        rule: RecordAddress,
        /// Dataset gated by the rule.
        dataset_id: DatasetId,
        /// Certificate expiry.
        expires_at: Timestamp,
        /// Attestation binding when issued on the attestation path.
        attestation: Option<AttestationBinding>,
    },
    /// A request was refused.
    AccessDenied {
        /// Rule the request targeted.
        rule: RecordAddress,
        /// First failed check.
        reason: DenialReason,
    },
    /// A certificate was consumed.
    CertificateUsed {
        /// Rule the certificate was issued under.
        rule: RecordAddress,
        /// Outcome reported by the consumer.
        outcome: bool,
    },
}

impl AuditEventKind {
    /// Returns the canonical label for the event kind.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::RuleCreated {
                ..
            } => "rule_created",
            Self::RulePaused => "rule_paused",
            Self::RuleResumed => "rule_resumed",
            Self::RuleRevoked {
                ..
            } => "rule_revoked",
            Self::AccessGranted {
                ..
            } => "access_granted",
            Self::AccessDenied {
                ..
            } => "access_denied",
            Self::CertificateUsed {
                ..
            } => "certificate_used",
        }
    }
}

/// Structured audit event.
///
/// # Invariants
/// - `record_hash` is present for every event describing a committed write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEvent {
    /// Kind-specific payload.
    #[serde(flatten)]
    pub kind: AuditEventKind,
    /// Address of the affected record.
    pub address: RecordAddress,
    /// Principal that caused the event.
    pub actor: PrincipalId,
    /// Request timestamp.
    pub timestamp: Timestamp,
    /// Canonical hash of the record after the transition.
    pub record_hash: Option<HashDigest>,
}
