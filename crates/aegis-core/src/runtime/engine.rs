// crates/aegis-core/src/runtime/engine.rs
// ============================================================================
// Module: Aegis Access Engine
// Description: Transactional entry points for every access-gate operation.
// Purpose: Run each operation atomically and forward its events to the audit sink.
// Dependencies: serde, thiserror, crate::{core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! [`AccessEngine`] is the single entry point for rule lifecycle, issuance,
//! and consumption. Each call runs in one store transaction and either
//! commits its write and event or leaves the ledger untouched.
//!
//! The engine holds no clock and no global state: the caller identity and the
//! current time are explicit arguments, and configuration is passed in at
//! construction.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::core::AccessCertificate;
use crate::core::AccessRequest;
use crate::core::AccessRule;
use crate::core::Attestation;
use crate::core::AuditEvent;
use crate::core::CertificateState;
use crate::core::DEFAULT_HASH_ALGORITHM;
use crate::core::DenialReason;
use crate::core::HashAlgorithm;
use crate::core::HashError;
use crate::core::IdentityHash;
use crate::core::PrincipalId;
use crate::core::RecordAddress;
use crate::core::RequestEnvelope;
use crate::core::RequestError;
use crate::core::RuleParams;
use crate::core::Secret;
use crate::core::Timestamp;
use crate::core::request::validate_attestation_id;
use crate::core::request::validate_principal;
use crate::interfaces::AuditSink;
use crate::interfaces::LedgerStore;
use crate::interfaces::StoreError;
use crate::interfaces::run_transaction;
use crate::runtime::audit::denied_event;
use crate::runtime::issuer::IssueEvidence;
use crate::runtime::issuer::IssueRequest;
use crate::runtime::issuer::consume_certificate;
use crate::runtime::issuer::issue_certificate;
use crate::runtime::lifecycle::InvalidTransition;
use crate::runtime::lifecycle::LifecycleAction;
use crate::runtime::policy::RuleViolation;
use crate::runtime::policy::apply_lifecycle;
use crate::runtime::policy::create_rule;
use crate::runtime::verifier::CommitmentScheme;

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Default certificate lifetime in seconds.
pub const DEFAULT_CERTIFICATE_TTL_SECS: u64 = 3_600;
/// Default maximum approved identities per rule.
pub const DEFAULT_MAX_APPROVED_IDENTITIES: usize = 10;

/// Engine configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Certificate lifetime in seconds.
    pub certificate_ttl_secs: u64,
    /// Maximum approved identities per rule.
    pub max_approved_identities: usize,
    /// Scheme used to check submitted secrets.
    pub commitment_scheme: CommitmentScheme,
    /// Whether refused requests produce `access_denied` events.
    pub audit_denials: bool,
    /// Hash algorithm used for record hashes in events.
    pub hash_algorithm: HashAlgorithm,
    /// Principals allowed to consume any certificate besides its requester.
    pub authorized_consumers: BTreeSet<PrincipalId>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            certificate_ttl_secs: DEFAULT_CERTIFICATE_TTL_SECS,
            max_approved_identities: DEFAULT_MAX_APPROVED_IDENTITIES,
            commitment_scheme: CommitmentScheme::Sha256,
            audit_denials: true,
            hash_algorithm: DEFAULT_HASH_ALGORITHM,
            authorized_consumers: BTreeSet::new(),
        }
    }
}

impl EngineConfig {
    /// Returns the certificate lifetime as signed seconds, saturating.
    #[must_use]
    pub fn certificate_ttl_seconds(&self) -> i64 {
        i64::try_from(self.certificate_ttl_secs).unwrap_or(i64::MAX)
    }
}

// ============================================================================
// SECTION: Results
// ============================================================================

/// Result of a mutating operation plus the events it produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OperationOutcome<T> {
    /// Record as written.
    pub value: T,
    /// Events produced by the operation, in emission order.
    pub events: Vec<AuditEvent>,
}

impl<T> OperationOutcome<T> {
    /// Maps the value, keeping the events.
    #[must_use]
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> OperationOutcome<U> {
        OperationOutcome {
            value: f(self.value),
            events: self.events,
        }
    }
}

/// Record returned by [`AccessEngine::submit`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "record", content = "value", rename_all = "snake_case")]
pub enum OperationResult {
    /// Rule after creation or a lifecycle transition.
    Rule(AccessRule),
    /// Certificate after issuance or consumption.
    Certificate(AccessCertificate),
}

/// Kind of ledger record an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    /// Access rule.
    Rule,
    /// Access certificate.
    Certificate,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Rule => "rule",
            Self::Certificate => "certificate",
        })
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Engine errors. Every error leaves the ledger unchanged.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A verifier check failed.
    #[error("access denied by rule {address}: {reason}")]
    Denied {
        /// Rule address.
        address: RecordAddress,
        /// First failed check.
        reason: DenialReason,
        /// `access_denied` event emitted for the refusal, when denials are audited.
        events: Vec<AuditEvent>,
    },
    /// Caller may not perform the operation.
    #[error("{caller} is not authorized for {address}")]
    Unauthorized {
        /// Rule or certificate address.
        address: RecordAddress,
        /// Rejected caller.
        caller: PrincipalId,
    },
    /// Lifecycle transition not permitted from the current status.
    #[error("invalid state for rule {address}: {transition}")]
    InvalidState {
        /// Rule address.
        address: RecordAddress,
        /// Rejected transition.
        transition: InvalidTransition,
    },
    /// Record already exists at the derived address.
    #[error("record already exists at {address}")]
    AlreadyExists {
        /// Existing record address.
        address: RecordAddress,
    },
    /// Certificate was already consumed.
    #[error("certificate {address} already used")]
    AlreadyUsed {
        /// Certificate address.
        address: RecordAddress,
    },
    /// Certificate is past its expiry.
    #[error("certificate {address} expired at {expires_at}")]
    CertificateExpired {
        /// Certificate address.
        address: RecordAddress,
        /// Certificate expiry.
        expires_at: Timestamp,
    },
    /// No record at the address.
    #[error("{record} not found at {address}")]
    NotFound {
        /// Requested address.
        address: RecordAddress,
        /// Expected record kind.
        record: RecordKind,
    },
    /// Rule parameters were rejected.
    #[error("invalid rule {address}: {violation}")]
    InvalidRule {
        /// Address the rule would occupy.
        address: RecordAddress,
        /// Violated constraint.
        violation: RuleViolation,
    },
    /// Request failed boundary validation.
    #[error(transparent)]
    InvalidRequest(#[from] RequestError),
    /// Store failure.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// Record hashing failure.
    #[error(transparent)]
    Hash(#[from] HashError),
}

impl EngineError {
    /// Returns the stable error kind label.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Denied {
                reason,
                ..
            } => reason.label(),
            Self::Unauthorized {
                ..
            } => "unauthorized",
            Self::InvalidState {
                ..
            } => "invalid_state",
            Self::AlreadyExists {
                ..
            } => "already_exists",
            Self::AlreadyUsed {
                ..
            } => "already_used",
            Self::CertificateExpired {
                ..
            } => "certificate_expired",
            Self::NotFound {
                ..
            } => "not_found",
            Self::InvalidRule {
                ..
            } => "invalid_rule",
            Self::InvalidRequest(_) => "invalid_request",
            Self::Store(_) => "store",
            Self::Hash(_) => "hash",
        }
    }

    /// Returns the record address the error applies to, when one is known.
    #[must_use]
    pub const fn address(&self) -> Option<RecordAddress> {
        match self {
            Self::Denied {
                address,
                ..
            }
            | Self::Unauthorized {
                address,
                ..
            }
            | Self::InvalidState {
                address,
                ..
            }
            | Self::AlreadyExists {
                address,
            }
            | Self::AlreadyUsed {
                address,
            }
            | Self::CertificateExpired {
                address,
                ..
            }
            | Self::NotFound {
                address,
                ..
            }
            | Self::InvalidRule {
                address,
                ..
            } => Some(*address),
            Self::InvalidRequest(_) | Self::Store(_) | Self::Hash(_) => None,
        }
    }

    /// Returns the denial reason for verifier failures.
    #[must_use]
    pub const fn denial(&self) -> Option<DenialReason> {
        match self {
            Self::Denied {
                reason,
                ..
            } => Some(*reason),
            _ => None,
        }
    }

    /// Returns the events produced by the failed operation.
    ///
    /// Only audited denials carry an event; every other error produced none.
    #[must_use]
    pub fn events(&self) -> &[AuditEvent] {
        match self {
            Self::Denied {
                events,
                ..
            } => events,
            _ => &[],
        }
    }
}

// ============================================================================
// SECTION: Engine
// ============================================================================

/// Access-gate engine over a ledger store and an audit sink.
pub struct AccessEngine<S, A> {
    /// Ledger store.
    store: S,
    /// Audit sink receiving committed and denial events.
    audit: A,
    /// Engine configuration.
    config: EngineConfig,
}

impl<S, A> AccessEngine<S, A>
where
    S: LedgerStore,
    A: AuditSink,
{
    /// Creates an engine.
    #[must_use]
    pub const fn new(store: S, audit: A, config: EngineConfig) -> Self {
        Self {
            store,
            audit,
            config,
        }
    }

    /// Returns the engine configuration.
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Returns the ledger store.
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Returns the audit sink.
    #[must_use]
    pub const fn audit(&self) -> &A {
        &self.audit
    }

    // ------------------------------------------------------------------------
    // Policy store
    // ------------------------------------------------------------------------

    /// Publishes a rule owned by `owner`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::AlreadyExists`] when the dataset already has a
    /// rule and [`EngineError::InvalidRule`] when the parameters are rejected.
    pub fn create_rule(
        &self,
        owner: &PrincipalId,
        now: Timestamp,
        params: RuleParams,
    ) -> Result<OperationOutcome<AccessRule>, EngineError> {
        validate_principal(owner)?;
        let (rule, event) = run_transaction(&self.store, |txn| {
            create_rule(txn, &self.config, owner, now, params)
        })?;
        Ok(self.emit(rule, event))
    }

    /// Pauses an active rule.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Unauthorized`] unless the caller owns the rule
    /// and [`EngineError::InvalidState`] unless the rule is active.
    pub fn pause_rule(
        &self,
        caller: &PrincipalId,
        now: Timestamp,
        rule: RecordAddress,
    ) -> Result<OperationOutcome<AccessRule>, EngineError> {
        self.lifecycle(caller, now, rule, LifecycleAction::Pause)
    }

    /// Resumes a paused rule.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Unauthorized`] unless the caller owns the rule
    /// and [`EngineError::InvalidState`] unless the rule is paused.
    pub fn resume_rule(
        &self,
        caller: &PrincipalId,
        now: Timestamp,
        rule: RecordAddress,
    ) -> Result<OperationOutcome<AccessRule>, EngineError> {
        self.lifecycle(caller, now, rule, LifecycleAction::Resume)
    }

    /// Revokes a rule permanently.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Unauthorized`] unless the caller owns the rule
    /// and [`EngineError::InvalidState`] when it is already revoked.
    pub fn revoke_rule(
        &self,
        caller: &PrincipalId,
        now: Timestamp,
        rule: RecordAddress,
    ) -> Result<OperationOutcome<AccessRule>, EngineError> {
        self.lifecycle(caller, now, rule, LifecycleAction::Revoke)
    }

    // ------------------------------------------------------------------------
    // Certificate issuer
    // ------------------------------------------------------------------------

    /// Requests a certificate by presenting the rule's secret.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::AlreadyExists`] when the requester already holds
    /// a certificate under the rule, and [`EngineError::Denied`] naming the
    /// first failed check.
    pub fn request_access(
        &self,
        requester: &PrincipalId,
        now: Timestamp,
        rule: RecordAddress,
        secret: &Secret,
        value: u64,
        identity: &IdentityHash,
    ) -> Result<OperationOutcome<AccessCertificate>, EngineError> {
        self.issue(&IssueRequest {
            requester,
            now,
            rule,
            evidence: IssueEvidence::Secret(secret),
            value,
            identity,
        })
    }

    /// Requests a certificate backed by an external attestation.
    ///
    /// # Errors
    ///
    /// Same as [`Self::request_access`], with
    /// [`DenialReason::AttestationRejected`] in place of
    /// [`DenialReason::InvalidSecret`].
    pub fn request_access_with_attestation(
        &self,
        requester: &PrincipalId,
        now: Timestamp,
        rule: RecordAddress,
        attestation: &Attestation,
        value: u64,
        identity: &IdentityHash,
    ) -> Result<OperationOutcome<AccessCertificate>, EngineError> {
        validate_attestation_id(&attestation.attestation_id)?;
        self.issue(&IssueRequest {
            requester,
            now,
            rule,
            evidence: IssueEvidence::Attestation(attestation),
            value,
            identity,
        })
    }

    /// Consumes a certificate, recording the consumer's outcome.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::AlreadyUsed`], [`EngineError::CertificateExpired`],
    /// or [`EngineError::Unauthorized`], in that order of precedence.
    pub fn use_certificate(
        &self,
        caller: &PrincipalId,
        now: Timestamp,
        certificate: RecordAddress,
        outcome: bool,
    ) -> Result<OperationOutcome<AccessCertificate>, EngineError> {
        validate_principal(caller)?;
        let (certificate, event) = run_transaction(&self.store, |txn| {
            consume_certificate(txn, &self.config, caller, now, certificate, outcome)
        })?;
        Ok(self.emit(certificate, event))
    }

    // ------------------------------------------------------------------------
    // Request dispatch
    // ------------------------------------------------------------------------

    /// Dispatches a tagged request.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError`] from the dispatched operation.
    pub fn submit(
        &self,
        caller: &PrincipalId,
        now: Timestamp,
        request: AccessRequest,
    ) -> Result<OperationOutcome<OperationResult>, EngineError> {
        request.validate()?;
        match request {
            AccessRequest::CreateRule {
                dataset_id,
                secret_commitment,
                threshold,
                approved_identities,
                valid_from,
                valid_until,
            } => {
                let params = RuleParams {
                    dataset_id,
                    secret_commitment,
                    threshold,
                    approved_identities,
                    valid_from,
                    valid_until,
                };
                Ok(self.create_rule(caller, now, params)?.map(OperationResult::Rule))
            }
            AccessRequest::PauseRule {
                rule,
            } => Ok(self.pause_rule(caller, now, rule)?.map(OperationResult::Rule)),
            AccessRequest::ResumeRule {
                rule,
            } => Ok(self.resume_rule(caller, now, rule)?.map(OperationResult::Rule)),
            AccessRequest::RevokeRule {
                rule,
            } => Ok(self.revoke_rule(caller, now, rule)?.map(OperationResult::Rule)),
            AccessRequest::RequestAccess {
                rule,
                secret,
                value,
                identity,
            } => Ok(self
                .request_access(caller, now, rule, &secret, value, &identity)?
                .map(OperationResult::Certificate)),
            AccessRequest::RequestAccessWithAttestation {
                rule,
                source,
                attestation_id,
                attestation_hash,
                verified,
                value,
                identity,
            } => {
                let attestation = Attestation {
                    source,
                    attestation_id,
                    attestation_hash,
                    verified,
                };
                Ok(self
                    .request_access_with_attestation(
                        caller,
                        now,
                        rule,
                        &attestation,
                        value,
                        &identity,
                    )?
                    .map(OperationResult::Certificate))
            }
            AccessRequest::UseCertificate {
                certificate,
                outcome,
            } => Ok(self
                .use_certificate(caller, now, certificate, outcome)?
                .map(OperationResult::Certificate)),
        }
    }

    /// Validates and dispatches a request envelope.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidRequest`] when validation fails, else the
    /// dispatched operation's error.
    pub fn submit_envelope(
        &self,
        envelope: RequestEnvelope,
    ) -> Result<OperationOutcome<OperationResult>, EngineError> {
        envelope.validate()?;
        let RequestEnvelope {
            caller,
            now,
            request,
        } = envelope;
        self.submit(&caller, now, request)
    }

    /// Parses, validates, and dispatches a JSON request envelope.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidRequest`] when the payload is rejected,
    /// else the dispatched operation's error.
    pub fn submit_json(
        &self,
        bytes: &[u8],
    ) -> Result<OperationOutcome<OperationResult>, EngineError> {
        let envelope = RequestEnvelope::from_json_slice(bytes)?;
        self.submit_envelope(envelope)
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    /// Loads a committed rule.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Store`] when loading fails.
    pub fn rule(&self, address: &RecordAddress) -> Result<Option<AccessRule>, EngineError> {
        Ok(self.store.load_rule(address)?)
    }

    /// Loads a committed certificate.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Store`] when loading fails.
    pub fn certificate(
        &self,
        address: &RecordAddress,
    ) -> Result<Option<AccessCertificate>, EngineError> {
        Ok(self.store.load_certificate(address)?)
    }

    /// Returns the certificate slot state for a (rule, requester) pair.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Store`] when loading fails.
    pub fn certificate_state(
        &self,
        rule: &RecordAddress,
        requester: &PrincipalId,
    ) -> Result<CertificateState, EngineError> {
        let address = RecordAddress::for_certificate(rule, requester);
        let certificate = self.store.load_certificate(&address)?;
        Ok(CertificateState::of(certificate.as_ref()))
    }

    // ------------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------------

    /// Runs a lifecycle transition.
    fn lifecycle(
        &self,
        caller: &PrincipalId,
        now: Timestamp,
        rule: RecordAddress,
        action: LifecycleAction,
    ) -> Result<OperationOutcome<AccessRule>, EngineError> {
        validate_principal(caller)?;
        let (rule, event) = run_transaction(&self.store, |txn| {
            apply_lifecycle(txn, &self.config, caller, now, rule, action)
        })?;
        Ok(self.emit(rule, event))
    }

    /// Runs an issuance, recording a denial event when a check fails.
    ///
    /// The denial event is forwarded to the sink and carried on the returned error.
    fn issue(
        &self,
        request: &IssueRequest<'_>,
    ) -> Result<OperationOutcome<AccessCertificate>, EngineError> {
        validate_principal(request.requester)?;
        let result =
            run_transaction(&self.store, |txn| issue_certificate(txn, &self.config, request));
        match result {
            Ok((certificate, event)) => Ok(self.emit(certificate, event)),
            Err(mut err) => {
                if self.config.audit_denials
                    && let EngineError::Denied {
                        address,
                        reason,
                        events,
                    } = &mut err
                {
                    let event = denied_event(*address, request.requester, request.now, *reason);
                    self.audit.record(&event);
                    events.push(event);
                }
                Err(err)
            }
        }
    }

    /// Forwards a committed event to the sink and packages the outcome.
    fn emit<T>(&self, value: T, event: AuditEvent) -> OperationOutcome<T> {
        self.audit.record(&event);
        OperationOutcome {
            value,
            events: vec![event],
        }
    }
}
