// crates/aegis-core/src/runtime/store.rs
// ============================================================================
// Module: Aegis In-Memory Ledger
// Description: In-memory ledger store with staged, all-or-nothing transactions.
// Purpose: Provide a deterministic store implementation without external deps.
// Dependencies: crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! [`InMemoryLedgerStore`] holds its ledger behind one mutex for the whole
//! transaction, which makes every transaction serializable. Writes are staged
//! in an overlay and applied only when the body commits.
//!
//! Intended for tests and embedded hosts; state is lost on drop.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;

use crate::core::AccessCertificate;
use crate::core::AccessRule;
use crate::core::RecordAddress;
use crate::interfaces::LedgerStore;
use crate::interfaces::LedgerTransaction;
use crate::interfaces::StoreError;
use crate::interfaces::TransactionBody;
use crate::interfaces::TransactionDecision;

// ============================================================================
// SECTION: In-Memory Store
// ============================================================================

/// Committed ledger contents.
#[derive(Debug, Default)]
struct Ledger {
    /// Rules keyed by address.
    rules: BTreeMap<RecordAddress, AccessRule>,
    /// Certificates keyed by address.
    certificates: BTreeMap<RecordAddress, AccessCertificate>,
}

/// In-memory ledger store for tests and embedded hosts.
#[derive(Debug, Default, Clone)]
pub struct InMemoryLedgerStore {
    /// Ledger protected by a mutex.
    ledger: Arc<Mutex<Ledger>>,
}

impl InMemoryLedgerStore {
    /// Creates an empty in-memory ledger store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of committed rules.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Store`] when the mutex is poisoned.
    pub fn rule_count(&self) -> Result<usize, StoreError> {
        Ok(self.lock()?.rules.len())
    }

    /// Returns the number of committed certificates.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Store`] when the mutex is poisoned.
    pub fn certificate_count(&self) -> Result<usize, StoreError> {
        Ok(self.lock()?.certificates.len())
    }

    /// Locks the ledger.
    fn lock(&self) -> Result<MutexGuard<'_, Ledger>, StoreError> {
        self.ledger
            .lock()
            .map_err(|_| StoreError::Store("ledger store mutex poisoned".to_string()))
    }
}

impl LedgerStore for InMemoryLedgerStore {
    fn load_rule(&self, address: &RecordAddress) -> Result<Option<AccessRule>, StoreError> {
        Ok(self.lock()?.rules.get(address).cloned())
    }

    fn load_certificate(
        &self,
        address: &RecordAddress,
    ) -> Result<Option<AccessCertificate>, StoreError> {
        Ok(self.lock()?.certificates.get(address).cloned())
    }

    fn transact(&self, body: &mut TransactionBody<'_>) -> Result<TransactionDecision, StoreError> {
        let mut guard = self.lock()?;
        let mut staged = StagedTransaction {
            base: &guard,
            rules: BTreeMap::new(),
            certificates: BTreeMap::new(),
        };
        let decision = body(&mut staged)?;
        let StagedTransaction {
            rules,
            certificates,
            ..
        } = staged;
        if decision == TransactionDecision::Commit {
            guard.rules.extend(rules);
            guard.certificates.extend(certificates);
        }
        drop(guard);
        Ok(decision)
    }
}

// ============================================================================
// SECTION: Staged Transaction
// ============================================================================

/// Write overlay over the committed ledger.
struct StagedTransaction<'a> {
    /// Committed ledger as of transaction start.
    base: &'a Ledger,
    /// Staged rule writes.
    rules: BTreeMap<RecordAddress, AccessRule>,
    /// Staged certificate writes.
    certificates: BTreeMap<RecordAddress, AccessCertificate>,
}

impl LedgerTransaction for StagedTransaction<'_> {
    fn rule(&mut self, address: &RecordAddress) -> Result<Option<AccessRule>, StoreError> {
        Ok(self.rules.get(address).or_else(|| self.base.rules.get(address)).cloned())
    }

    fn certificate(
        &mut self,
        address: &RecordAddress,
    ) -> Result<Option<AccessCertificate>, StoreError> {
        Ok(self
            .certificates
            .get(address)
            .or_else(|| self.base.certificates.get(address))
            .cloned())
    }

    fn insert_rule(&mut self, rule: &AccessRule) -> Result<(), StoreError> {
        if self.rule(&rule.address)?.is_some() {
            return Err(StoreError::Conflict(format!("rule {} already exists", rule.address)));
        }
        self.rules.insert(rule.address, rule.clone());
        Ok(())
    }

    fn update_rule(&mut self, rule: &AccessRule) -> Result<(), StoreError> {
        let Some(current) = self.rule(&rule.address)? else {
            return Err(StoreError::Invalid(format!("rule {} does not exist", rule.address)));
        };
        check_revision(current.revision, rule.revision, &rule.address)?;
        self.rules.insert(rule.address, rule.clone());
        Ok(())
    }

    fn insert_certificate(&mut self, certificate: &AccessCertificate) -> Result<(), StoreError> {
        if self.certificate(&certificate.address)?.is_some() {
            return Err(StoreError::Conflict(format!(
                "certificate {} already exists",
                certificate.address
            )));
        }
        self.certificates.insert(certificate.address, certificate.clone());
        Ok(())
    }

    fn update_certificate(&mut self, certificate: &AccessCertificate) -> Result<(), StoreError> {
        let Some(current) = self.certificate(&certificate.address)? else {
            return Err(StoreError::Invalid(format!(
                "certificate {} does not exist",
                certificate.address
            )));
        };
        check_revision(current.revision, certificate.revision, &certificate.address)?;
        self.certificates.insert(certificate.address, certificate.clone());
        Ok(())
    }
}

/// Requires `next` to be exactly one past `current`.
///
/// # Errors
///
/// Returns [`StoreError::Conflict`] on a stale or skipped revision.
pub fn check_revision(current: u64, next: u64, address: &RecordAddress) -> Result<(), StoreError> {
    if current.checked_add(1) == Some(next) {
        Ok(())
    } else {
        Err(StoreError::Conflict(format!(
            "revision conflict for {address}: stored {current}, write {next}"
        )))
    }
}

// ============================================================================
// SECTION: Shared Store Wrapper
// ============================================================================

/// Shared ledger store backed by an `Arc` trait object.
#[derive(Clone)]
pub struct SharedLedgerStore {
    /// Inner store implementation.
    inner: Arc<dyn LedgerStore + Send + Sync>,
}

impl SharedLedgerStore {
    /// Wraps a ledger store in a shared, clonable wrapper.
    #[must_use]
    pub fn from_store(store: impl LedgerStore + Send + Sync + 'static) -> Self {
        Self {
            inner: Arc::new(store),
        }
    }

    /// Wraps an existing shared store.
    #[must_use]
    pub const fn new(store: Arc<dyn LedgerStore + Send + Sync>) -> Self {
        Self {
            inner: store,
        }
    }
}

impl LedgerStore for SharedLedgerStore {
    fn load_rule(&self, address: &RecordAddress) -> Result<Option<AccessRule>, StoreError> {
        self.inner.load_rule(address)
    }

    fn load_certificate(
        &self,
        address: &RecordAddress,
    ) -> Result<Option<AccessCertificate>, StoreError> {
        self.inner.load_certificate(address)
    }

    fn transact(&self, body: &mut TransactionBody<'_>) -> Result<TransactionDecision, StoreError> {
        self.inner.transact(body)
    }
}
