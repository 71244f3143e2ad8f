// crates/aegis-core/src/runtime/issuer.rs
// ============================================================================
// Module: Aegis Certificate Issuer
// Description: Certificate minting and single-use consumption.
// Purpose: Enforce one certificate per (rule, requester) and one use per certificate.
// Dependencies: crate::{core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! Issuance checks run in this order: the rule exists, no certificate exists
//! for the (rule, requester) pair, then the verifier's ordered checks. The
//! certificate address is derived from the pair, so a second request for the
//! same pair fails [`EngineError::AlreadyExists`] whatever its inputs.
//!
//! Consumption checks run in this order: the certificate exists, it is unused,
//! it has not expired, the caller is its requester or an authorized consumer.
//! The consumer's `outcome` is recorded but never affects the transition.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::core::AccessCertificate;
use crate::core::Attestation;
use crate::core::AttestationBinding;
use crate::core::AuditEvent;
use crate::core::AuditEventKind;
use crate::core::IdentityHash;
use crate::core::PrincipalId;
use crate::core::RecordAddress;
use crate::core::Secret;
use crate::core::Timestamp;
use crate::interfaces::LedgerTransaction;
use crate::runtime::audit::committed_event;
use crate::runtime::engine::EngineConfig;
use crate::runtime::engine::EngineError;
use crate::runtime::engine::RecordKind;
use crate::runtime::policy::conflict_as_exists;
use crate::runtime::policy::next_revision;
use crate::runtime::verifier::SecretEvidence;
use crate::runtime::verifier::verify;

// ============================================================================
// SECTION: Issuance
// ============================================================================

/// Proof of secret knowledge submitted with an access request.
#[derive(Debug, Clone, Copy)]
pub(crate) enum IssueEvidence<'a> {
    /// Raw secret path.
    Secret(&'a Secret),
    /// Attestation path.
    Attestation(&'a Attestation),
}

/// Inputs common to both issuance paths.
pub(crate) struct IssueRequest<'a> {
    /// Requesting principal.
    pub requester: &'a PrincipalId,
    /// Request time.
    pub now: Timestamp,
    /// Rule address.
    pub rule: RecordAddress,
    /// Secret or attestation.
    pub evidence: IssueEvidence<'a>,
    /// Value compared against the threshold.
    pub value: u64,
    /// Requester identity hash.
    pub identity: &'a IdentityHash,
}

/// Mints a certificate inside a transaction.
pub(crate) fn issue_certificate(
    txn: &mut dyn LedgerTransaction,
    config: &EngineConfig,
    request: &IssueRequest<'_>,
) -> Result<(AccessCertificate, AuditEvent), EngineError> {
    let Some(rule) = txn.rule(&request.rule)? else {
        return Err(EngineError::NotFound {
            address: request.rule,
            record: RecordKind::Rule,
        });
    };
    let address = RecordAddress::for_certificate(&rule.address, request.requester);
    if txn.certificate(&address)?.is_some() {
        return Err(EngineError::AlreadyExists {
            address,
        });
    }
    let evidence = match request.evidence {
        IssueEvidence::Secret(secret) => SecretEvidence::Secret {
            scheme: config.commitment_scheme,
            secret,
        },
        IssueEvidence::Attestation(attestation) => SecretEvidence::Attestation(attestation),
    };
    verify(&rule, request.now, evidence, request.value, request.identity).map_err(|reason| {
        EngineError::Denied {
            address: rule.address,
            reason,
            events: Vec::new(),
        }
    })?;
    let attestation = match request.evidence {
        IssueEvidence::Secret(_) => None,
        IssueEvidence::Attestation(attestation) => Some(AttestationBinding {
            source: attestation.source,
            attestation_id: attestation.attestation_id.clone(),
            attestation_hash: attestation.attestation_hash,
        }),
    };
    let certificate = AccessCertificate {
        address,
        rule_ref: rule.address,
        dataset_id: rule.dataset_id,
        requester: request.requester.clone(),
        issued_at: request.now,
        expires_at: request.now.saturating_add_seconds(config.certificate_ttl_seconds()),
        is_used: false,
        used_at: None,
        outcome: None,
        attestation,
        revision: 1,
    };
    txn.insert_certificate(&certificate).map_err(|err| conflict_as_exists(err, address))?;
    let event = committed_event(
        AuditEventKind::AccessGranted {
            rule: rule.address,
            dataset_id: rule.dataset_id,
            expires_at: certificate.expires_at,
            attestation: certificate.attestation.clone(),
        },
        address,
        request.requester,
        request.now,
        &certificate,
        config.hash_algorithm,
    )?;
    Ok((certificate, event))
}

// ============================================================================
// SECTION: Consumption
// ============================================================================

/// Marks a certificate used inside a transaction.
pub(crate) fn consume_certificate(
    txn: &mut dyn LedgerTransaction,
    config: &EngineConfig,
    caller: &PrincipalId,
    now: Timestamp,
    address: RecordAddress,
    outcome: bool,
) -> Result<(AccessCertificate, AuditEvent), EngineError> {
    let Some(mut certificate) = txn.certificate(&address)? else {
        return Err(EngineError::NotFound {
            address,
            record: RecordKind::Certificate,
        });
    };
    if certificate.is_used {
        return Err(EngineError::AlreadyUsed {
            address,
        });
    }
    if now >= certificate.expires_at {
        return Err(EngineError::CertificateExpired {
            address,
            expires_at: certificate.expires_at,
        });
    }
    if certificate.requester != *caller && !config.authorized_consumers.contains(caller) {
        return Err(EngineError::Unauthorized {
            address,
            caller: caller.clone(),
        });
    }
    certificate.is_used = true;
    certificate.used_at = Some(now);
    certificate.outcome = Some(outcome);
    certificate.revision = next_revision(certificate.revision, address)?;
    txn.update_certificate(&certificate)?;
    let event = committed_event(
        AuditEventKind::CertificateUsed {
            rule: certificate.rule_ref,
            outcome,
        },
        address,
        caller,
        now,
        &certificate,
        config.hash_algorithm,
    )?;
    Ok((certificate, event))
}
