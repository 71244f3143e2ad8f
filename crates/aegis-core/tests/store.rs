// crates/aegis-core/tests/store.rs
// ============================================================================
// Module: In-Memory Ledger Store Tests
// Description: Transaction staging, rollback, and revision checks.
// Purpose: Ensure a failed transaction leaves no partial writes.
// Dependencies: aegis-core
// ============================================================================

//! ## Overview
//! Drives [`aegis_core::InMemoryLedgerStore`] through [`aegis_core::run_transaction`]
//! directly, without the engine on top.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

mod common;

use aegis_core::InMemoryLedgerStore;
use aegis_core::LedgerStore;
use aegis_core::LedgerTransaction;
use aegis_core::RecordAddress;
use aegis_core::RuleStatus;
use aegis_core::SharedLedgerStore;
use aegis_core::StoreError;
use aegis_core::TransactionDecision;
use aegis_core::run_transaction;
use aegis_core::runtime::store::check_revision;

use crate::common::engine_with_rule;

#[test]
fn failed_body_rolls_back_staged_writes() {
    let (engine, address) = engine_with_rule();
    let store = engine.store();
    let result: Result<(), StoreError> = run_transaction(store, |txn| {
        let mut rule = txn.rule(&address)?.unwrap();
        rule.status = RuleStatus::Paused;
        rule.revision += 1;
        txn.update_rule(&rule)?;
        assert_eq!(txn.rule(&address)?.unwrap().status, RuleStatus::Paused);
        Err(StoreError::Invalid("abort".to_string()))
    });
    assert!(result.is_err());
    assert_eq!(store.load_rule(&address).unwrap().unwrap().status, RuleStatus::Active);
    assert_eq!(store.load_rule(&address).unwrap().unwrap().revision, 1);
}

#[test]
fn explicit_rollback_discards_writes() {
    let (engine, address) = engine_with_rule();
    let store = engine.store();
    let mut body = |txn: &mut dyn LedgerTransaction| -> Result<TransactionDecision, StoreError> {
        let mut rule = txn.rule(&address)?.unwrap();
        rule.revision += 1;
        rule.threshold = 1;
        txn.update_rule(&rule)?;
        Ok(TransactionDecision::Rollback)
    };
    assert_eq!(store.transact(&mut body).unwrap(), TransactionDecision::Rollback);
    assert_eq!(store.load_rule(&address).unwrap().unwrap().threshold, 100_000);
}

#[test]
fn stale_revision_is_conflict() {
    let (engine, address) = engine_with_rule();
    let result: Result<(), StoreError> = run_transaction(engine.store(), |txn| {
        let rule = txn.rule(&address)?.unwrap();
        txn.update_rule(&rule)
    });
    assert!(matches!(result, Err(StoreError::Conflict(_))));
}

#[test]
fn insert_over_existing_record_is_conflict() {
    let (engine, address) = engine_with_rule();
    let result: Result<(), StoreError> = run_transaction(engine.store(), |txn| {
        let rule = txn.rule(&address)?.unwrap();
        txn.insert_rule(&rule)
    });
    assert!(matches!(result, Err(StoreError::Conflict(_))));
}

#[test]
fn update_of_missing_record_is_invalid() {
    let (engine, address) = engine_with_rule();
    let mut rule = engine.rule(&address).unwrap().unwrap();
    rule.address = RecordAddress::new([0x11; 32]);
    rule.revision = 2;
    let result: Result<(), StoreError> =
        run_transaction(&InMemoryLedgerStore::new(), |txn| txn.update_rule(&rule));
    assert!(matches!(result, Err(StoreError::Invalid(_))));
}

#[test]
fn check_revision_requires_exact_successor() {
    let address = RecordAddress::new([0; 32]);
    assert!(check_revision(1, 2, &address).is_ok());
    assert!(check_revision(1, 1, &address).is_err());
    assert!(check_revision(1, 3, &address).is_err());
    assert!(check_revision(u64::MAX, 0, &address).is_err());
}

#[test]
fn shared_store_delegates_to_inner_store() {
    let (engine, address) = engine_with_rule();
    let shared = SharedLedgerStore::from_store(engine.store().clone());
    assert_eq!(shared.load_rule(&address).unwrap(), engine.rule(&address).unwrap());

    let staged: Result<(), StoreError> = run_transaction(&shared, |txn| {
        let mut rule = txn.rule(&address)?.unwrap();
        rule.revision += 1;
        rule.status = RuleStatus::Paused;
        txn.update_rule(&rule)
    });
    staged.unwrap();
    assert_eq!(engine.rule(&address).unwrap().unwrap().status, RuleStatus::Paused);
}
