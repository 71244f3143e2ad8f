// crates/aegis-store-sqlite/tests/sqlite_store.rs
// ============================================================================
// Module: SQLite Store Tests
// Description: Validate the SQLite LedgerStore behavior.
// Purpose: Ensure durable persistence, atomic transactions, and integrity checks.
// Dependencies: aegis-store-sqlite, aegis-core, rusqlite, tempfile
// ============================================================================

//! ## Overview
//! Conformance tests for the SQLite-backed ledger store. Exercises durability
//! across reopen, rollback, revision history, and adversarial storage
//! conditions such as tampered rows and foreign schema versions.

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
    reason = "Test-only assertions and helpers are permitted."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::sync::Barrier;
use std::thread;

use aegis_core::AccessEngine;
use aegis_core::CertificateState;
use aegis_core::CommitmentScheme;
use aegis_core::DatasetId;
use aegis_core::DenialReason;
use aegis_core::EngineConfig;
use aegis_core::IdentityHash;
use aegis_core::InMemoryAuditSink;
use aegis_core::LedgerStore;
use aegis_core::PrincipalId;
use aegis_core::RecordAddress;
use aegis_core::RuleParams;
use aegis_core::RuleStatus;
use aegis_core::Secret;
use aegis_core::StoreError;
use aegis_core::Timestamp;
use aegis_core::run_transaction;
use aegis_store_sqlite::SqliteLedgerStore;
use aegis_store_sqlite::SqliteStoreConfig;
use aegis_store_sqlite::SqliteStoreError;
use rusqlite::Connection;
use rusqlite::params;
use tempfile::TempDir;

// ============================================================================
// SECTION: Helpers
// ============================================================================

const NOW: i64 = 1_700_000_000;

type SqliteEngine = AccessEngine<SqliteLedgerStore, InMemoryAuditSink>;

fn store_for(path: &Path) -> SqliteLedgerStore {
    SqliteLedgerStore::new(SqliteStoreConfig::for_path(path)).unwrap()
}

fn engine_for(path: &Path) -> SqliteEngine {
    AccessEngine::new(store_for(path), InMemoryAuditSink::new(), EngineConfig::default())
}

fn now() -> Timestamp {
    Timestamp::from_unix_seconds(NOW)
}

fn owner() -> PrincipalId {
    PrincipalId::new("owner")
}

fn requester() -> PrincipalId {
    PrincipalId::new("requester")
}

fn secret() -> Secret {
    Secret::from_padded_label("secret_key_123")
}

fn identity() -> IdentityHash {
    IdentityHash::from_padded_label("buyer_identity_1")
}

fn rule_params() -> RuleParams {
    RuleParams {
        dataset_id: DatasetId::from_padded_label("medical_dataset_001"),
        secret_commitment: CommitmentScheme::Sha256.commit(&secret()),
        threshold: 100_000,
        approved_identities: vec![identity()],
        valid_from: Timestamp::from_unix_seconds(NOW - 60),
        valid_until: Timestamp::from_unix_seconds(NOW + 86_400),
    }
}

/// Creates the fixture rule through a short-lived engine.
fn create_fixture_rule(path: &Path) -> RecordAddress {
    engine_for(path).create_rule(&owner(), now(), rule_params()).unwrap().value.address
}

fn db_path(dir: &TempDir) -> std::path::PathBuf {
    dir.path().join("ledger.sqlite")
}

// ============================================================================
// SECTION: Persistence
// ============================================================================

#[test]
fn sqlite_store_returns_none_for_missing_records() {
    let dir = TempDir::new().unwrap();
    let store = store_for(&db_path(&dir));
    let address = RecordAddress::new([7; 32]);
    assert!(store.load_rule(&address).unwrap().is_none());
    assert!(store.load_certificate(&address).unwrap().is_none());
}

#[test]
fn sqlite_engine_runs_full_lifecycle() {
    let dir = TempDir::new().unwrap();
    let engine = engine_for(&db_path(&dir));

    let rule = engine.create_rule(&owner(), now(), rule_params()).unwrap().value;
    assert_eq!(engine.rule(&rule.address).unwrap(), Some(rule.clone()));

    let denied = engine
        .request_access(&requester(), now(), rule.address, &secret(), 50_000, &identity())
        .unwrap_err();
    assert_eq!(denied.denial(), Some(DenialReason::InsufficientAmount));

    let cert = engine
        .request_access(&requester(), now(), rule.address, &secret(), 150_000, &identity())
        .unwrap()
        .value;
    let used = engine.use_certificate(&requester(), now(), cert.address, true).unwrap().value;
    assert!(used.is_used);
    assert_eq!(
        engine.certificate_state(&rule.address, &requester()).unwrap(),
        CertificateState::Used
    );
    assert_eq!(
        engine.audit().labels(),
        vec!["rule_created", "access_denied", "access_granted", "certificate_used"]
    );
}

#[test]
fn sqlite_store_persists_across_instances() {
    let dir = TempDir::new().unwrap();
    let path = db_path(&dir);
    let (rule, cert) = {
        let engine = engine_for(&path);
        let rule = engine.create_rule(&owner(), now(), rule_params()).unwrap().value.address;
        engine.pause_rule(&owner(), now(), rule).unwrap();
        engine.resume_rule(&owner(), now(), rule).unwrap();
        let cert = engine
            .request_access(&requester(), now(), rule, &secret(), 150_000, &identity())
            .unwrap()
            .value;
        (rule, cert)
    };

    let engine = engine_for(&path);
    let stored = engine.rule(&rule).unwrap().unwrap();
    assert_eq!(stored.status, RuleStatus::Active);
    assert_eq!(stored.revision, 3);
    assert_eq!(engine.certificate(&cert.address).unwrap(), Some(cert));

    let err = engine
        .request_access(&requester(), now(), rule, &secret(), 150_000, &identity())
        .unwrap_err();
    assert_eq!(err.kind(), "already_exists");
}

#[test]
fn sqlite_store_rolls_back_failed_transactions() {
    let dir = TempDir::new().unwrap();
    let engine = engine_for(&db_path(&dir));
    let address = engine.create_rule(&owner(), now(), rule_params()).unwrap().value.address;

    let result: Result<(), StoreError> = run_transaction(engine.store(), |txn| {
        let mut rule = txn.rule(&address)?.unwrap();
        rule.status = RuleStatus::Revoked;
        rule.revision += 1;
        txn.update_rule(&rule)?;
        Err(StoreError::Invalid("abort".to_string()))
    });
    assert!(result.is_err());
    let stored = engine.rule(&address).unwrap().unwrap();
    assert_eq!(stored.status, RuleStatus::Active);
    assert_eq!(engine.store().history(&address).unwrap().len(), 1);
}

#[test]
fn sqlite_store_rejects_stale_revision_and_duplicate_insert() {
    let dir = TempDir::new().unwrap();
    let engine = engine_for(&db_path(&dir));
    let address = engine.create_rule(&owner(), now(), rule_params()).unwrap().value.address;

    let stale: Result<(), StoreError> = run_transaction(engine.store(), |txn| {
        let rule = txn.rule(&address)?.unwrap();
        txn.update_rule(&rule)
    });
    assert!(matches!(stale, Err(StoreError::Conflict(_))));

    let duplicate: Result<(), StoreError> = run_transaction(engine.store(), |txn| {
        let rule = txn.rule(&address)?.unwrap();
        txn.insert_rule(&rule)
    });
    assert!(matches!(duplicate, Err(StoreError::Conflict(_))));
}

#[test]
fn sqlite_store_records_revision_history() {
    let dir = TempDir::new().unwrap();
    let engine = engine_for(&db_path(&dir));
    let address = engine.create_rule(&owner(), now(), rule_params()).unwrap().value.address;
    engine.pause_rule(&owner(), now(), address).unwrap();
    let revoked = engine.revoke_rule(&owner(), now(), address).unwrap();

    let history = engine.store().history(&address).unwrap();
    let revisions: Vec<u64> = history.iter().map(|version| version.revision).collect();
    assert_eq!(revisions, vec![1, 2, 3]);
    assert!(history.iter().all(|version| version.kind == "rule"));
    let latest = history.last().map(|version| &version.record_hash);
    assert_eq!(latest, revoked.events[0].record_hash.as_ref());
}

#[test]
fn sqlite_store_enforces_max_versions() {
    let dir = TempDir::new().unwrap();
    let config = SqliteStoreConfig {
        max_versions: Some(2),
        ..SqliteStoreConfig::for_path(db_path(&dir))
    };
    let store = SqliteLedgerStore::new(config).unwrap();
    let engine = AccessEngine::new(store, InMemoryAuditSink::new(), EngineConfig::default());
    let address = engine.create_rule(&owner(), now(), rule_params()).unwrap().value.address;
    for _ in 0 .. 3 {
        engine.pause_rule(&owner(), now(), address).unwrap();
        engine.resume_rule(&owner(), now(), address).unwrap();
    }
    let history = engine.store().history(&address).unwrap();
    let revisions: Vec<u64> = history.iter().map(|version| version.revision).collect();
    assert_eq!(revisions, vec![6, 7]);
}

#[test]
fn sqlite_store_serializes_concurrent_requests() {
    let dir = TempDir::new().unwrap();
    let path = db_path(&dir);
    let rule = create_fixture_rule(&path);
    let engines: Vec<_> = (0 .. 4).map(|_| engine_for(&path)).collect();
    let barrier = Barrier::new(engines.len());

    let results: Vec<_> = thread::scope(|scope| {
        let handles: Vec<_> = engines
            .iter()
            .map(|engine| {
                let barrier = &barrier;
                scope.spawn(move || {
                    barrier.wait();
                    let secret = secret();
                    engine.request_access(&requester(), now(), rule, &secret, 150_000, &identity())
                })
            })
            .collect();
        handles.into_iter().map(|handle| handle.join().unwrap()).collect()
    });

    assert_eq!(results.iter().filter(|result| result.is_ok()).count(), 1);
    assert!(
        results
            .iter()
            .filter_map(|result| result.as_ref().err())
            .all(|err| err.kind() == "already_exists")
    );
}

// ============================================================================
// SECTION: Integrity
// ============================================================================

#[test]
fn sqlite_store_detects_corrupt_hash() {
    let dir = TempDir::new().unwrap();
    let path = db_path(&dir);
    let address = create_fixture_rule(&path);

    let connection = Connection::open(&path).unwrap();
    connection
        .execute(
            "UPDATE rules SET record_hash = ?1 WHERE address = ?2",
            params!["00".repeat(32), address.to_hex()],
        )
        .unwrap();
    drop(connection);

    let err = store_for(&path).load_rule(&address).unwrap_err();
    assert!(matches!(err, StoreError::Corrupt(_)));
}

#[test]
fn sqlite_store_detects_tampered_payload() {
    let dir = TempDir::new().unwrap();
    let path = db_path(&dir);
    let address = create_fixture_rule(&path);

    let connection = Connection::open(&path).unwrap();
    let bytes: Vec<u8> = connection
        .query_row(
            "SELECT record_json FROM rules WHERE address = ?1",
            params![address.to_hex()],
            |row| row.get(0),
        )
        .unwrap();
    let tampered = String::from_utf8(bytes).unwrap().replace("100000", "1");
    connection
        .execute(
            "UPDATE rules SET record_json = ?1 WHERE address = ?2",
            params![tampered.into_bytes(), address.to_hex()],
        )
        .unwrap();
    drop(connection);

    let engine = engine_for(&path);
    let err = engine
        .request_access(&requester(), now(), address, &secret(), 10, &identity())
        .unwrap_err();
    assert_eq!(err.kind(), "store");
    assert!(matches!(err, aegis_core::EngineError::Store(StoreError::Corrupt(_))));
}

#[test]
fn sqlite_store_rejects_invalid_hash_algorithm() {
    let dir = TempDir::new().unwrap();
    let path = db_path(&dir);
    let address = create_fixture_rule(&path);

    let connection = Connection::open(&path).unwrap();
    connection
        .execute(
            "UPDATE rules SET hash_algorithm = 'md5' WHERE address = ?1",
            params![address.to_hex()],
        )
        .unwrap();
    drop(connection);

    let err = store_for(&path).load_rule(&address).unwrap_err();
    assert!(matches!(err, StoreError::Invalid(_)));
}

#[test]
fn sqlite_store_rejects_version_mismatch() {
    let dir = TempDir::new().unwrap();
    let path = db_path(&dir);
    drop(store_for(&path));

    let connection = Connection::open(&path).unwrap();
    connection.execute("UPDATE store_meta SET version = 99", params![]).unwrap();
    drop(connection);

    let result = SqliteLedgerStore::new(SqliteStoreConfig::for_path(&path));
    assert!(matches!(result, Err(SqliteStoreError::VersionMismatch(_))));
}

// ============================================================================
// SECTION: Configuration
// ============================================================================

#[test]
fn sqlite_store_rejects_directory_path() {
    let dir = TempDir::new().unwrap();
    let result = SqliteLedgerStore::new(SqliteStoreConfig::for_path(dir.path()));
    assert!(matches!(result, Err(SqliteStoreError::Invalid(_))));
}

#[test]
fn sqlite_store_rejects_overlong_path_component() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("a".repeat(256));
    let result = SqliteLedgerStore::new(SqliteStoreConfig::for_path(path));
    assert!(matches!(result, Err(SqliteStoreError::Invalid(_))));
}

#[test]
fn sqlite_store_rejects_zero_max_versions() {
    let dir = TempDir::new().unwrap();
    let config = SqliteStoreConfig {
        max_versions: Some(0),
        ..SqliteStoreConfig::for_path(db_path(&dir))
    };
    assert!(matches!(SqliteLedgerStore::new(config), Err(SqliteStoreError::Invalid(_))));
}

#[test]
fn sqlite_store_creates_parent_directories() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("deeper").join("ledger.sqlite");
    let store = store_for(&path);
    assert!(path.exists());
    assert_eq!(store.config().path, path);
}
