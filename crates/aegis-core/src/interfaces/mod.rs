// crates/aegis-core/src/interfaces/mod.rs
// ============================================================================
// Module: Aegis Interfaces
// Description: Backend-agnostic interfaces for ledger storage and audit output.
// Purpose: Define the contract surfaces used by the Aegis runtime.
// Dependencies: crate::core, thiserror
// ============================================================================

//! ## Overview
//! The engine performs no locking of its own. It requires the host store to
//! run each operation inside an atomic, serializable transaction: either
//! every write made by the transaction body commits, or none does.
//!
//! Audit sinks are fire-and-forget. A sink that cannot write never rolls back
//! a committed transition.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use thiserror::Error;

use crate::core::AccessCertificate;
use crate::core::AccessRule;
use crate::core::AuditEvent;
use crate::core::RecordAddress;

// ============================================================================
// SECTION: Ledger Store
// ============================================================================

/// Ledger store errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Store I/O error.
    #[error("ledger store io error: {0}")]
    Io(String),
    /// Store data is corrupted or fails integrity checks.
    #[error("ledger store corruption: {0}")]
    Corrupt(String),
    /// Store data version is incompatible.
    #[error("ledger store version mismatch: {0}")]
    VersionMismatch(String),
    /// Store data is invalid.
    #[error("ledger store invalid data: {0}")]
    Invalid(String),
    /// Write conflicts with existing state (duplicate insert or stale revision).
    #[error("ledger store conflict: {0}")]
    Conflict(String),
    /// Store reported an error.
    #[error("ledger store error: {0}")]
    Store(String),
}

/// Outcome of a transaction body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionDecision {
    /// Persist every staged write.
    Commit,
    /// Discard every staged write.
    Rollback,
}

/// Read/write view of the ledger inside one transaction.
///
/// Reads observe writes staged earlier in the same transaction.
pub trait LedgerTransaction {
    /// Loads a rule by address.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when loading fails.
    fn rule(&mut self, address: &RecordAddress) -> Result<Option<AccessRule>, StoreError>;

    /// Loads a certificate by address.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when loading fails.
    fn certificate(
        &mut self,
        address: &RecordAddress,
    ) -> Result<Option<AccessCertificate>, StoreError>;

    /// Stages a new rule.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Conflict`] when a rule already exists at the address.
    fn insert_rule(&mut self, rule: &AccessRule) -> Result<(), StoreError>;

    /// Stages an update to an existing rule.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Conflict`] when the stored revision is not
    /// `rule.revision - 1`, and [`StoreError::Invalid`] when no rule exists.
    fn update_rule(&mut self, rule: &AccessRule) -> Result<(), StoreError>;

    /// Stages a new certificate.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Conflict`] when a certificate already exists at the address.
    fn insert_certificate(&mut self, certificate: &AccessCertificate) -> Result<(), StoreError>;

    /// Stages an update to an existing certificate.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Conflict`] when the stored revision is stale, and
    /// [`StoreError::Invalid`] when no certificate exists.
    fn update_certificate(&mut self, certificate: &AccessCertificate) -> Result<(), StoreError>;
}

/// Transaction body passed to [`LedgerStore::transact`].
pub type TransactionBody<'a> =
    dyn FnMut(&mut dyn LedgerTransaction) -> Result<TransactionDecision, StoreError> + 'a;

/// Durable or in-memory ledger of rules and certificates.
pub trait LedgerStore {
    /// Loads a committed rule by address.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when loading fails.
    fn load_rule(&self, address: &RecordAddress) -> Result<Option<AccessRule>, StoreError>;

    /// Loads a committed certificate by address.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when loading fails.
    fn load_certificate(
        &self,
        address: &RecordAddress,
    ) -> Result<Option<AccessCertificate>, StoreError>;

    /// Runs `body` once inside an atomic, serializable transaction.
    ///
    /// Staged writes persist only when `body` returns
    /// [`TransactionDecision::Commit`]. An error from `body` rolls back and is
    /// returned unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the body fails or the commit fails.
    fn transact(&self, body: &mut TransactionBody<'_>) -> Result<TransactionDecision, StoreError>;
}

/// Runs a typed transaction body, committing only when it returns `Ok`.
///
/// # Errors
///
/// Returns the body's error after rollback, or a [`StoreError`] converted into
/// `E` when the store fails to begin or commit.
pub fn run_transaction<S, T, E, F>(store: &S, body: F) -> Result<T, E>
where
    S: LedgerStore + ?Sized,
    E: From<StoreError>,
    F: FnOnce(&mut dyn LedgerTransaction) -> Result<T, E>,
{
    let mut body = Some(body);
    let mut outcome: Option<Result<T, E>> = None;
    store.transact(&mut |txn: &mut dyn LedgerTransaction| {
        let Some(body) = body.take() else {
            return Err(StoreError::Store("transaction body invoked twice".to_string()));
        };
        let result = body(txn);
        let decision = if result.is_ok() {
            TransactionDecision::Commit
        } else {
            TransactionDecision::Rollback
        };
        outcome = Some(result);
        Ok(decision)
    })?;
    outcome.unwrap_or_else(|| {
        Err(StoreError::Store("transaction body not invoked".to_string()).into())
    })
}

// ============================================================================
// SECTION: Audit Sink
// ============================================================================

/// Destination for audit events.
///
/// Recording cannot fail from the caller's perspective; implementations drop
/// events they cannot write.
pub trait AuditSink: Send + Sync {
    /// Records an audit event.
    fn record(&self, event: &AuditEvent);
}

impl<T: AuditSink + ?Sized> AuditSink for Box<T> {
    fn record(&self, event: &AuditEvent) {
        (**self).record(event);
    }
}

impl<T: AuditSink + ?Sized> AuditSink for Arc<T> {
    fn record(&self, event: &AuditEvent) {
        (**self).record(event);
    }
}
