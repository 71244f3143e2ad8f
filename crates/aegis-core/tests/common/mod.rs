// crates/aegis-core/tests/common/mod.rs
// ============================================================================
// Module: Common Test Fixtures
// Description: Shared engine, rule, and requester fixtures for core tests.
// Purpose: Provide reusable, deterministic inputs across test files.
// Dependencies: aegis-core
// ============================================================================

//! ## Overview
//! Fixtures model one dataset gated at threshold 100000 with two approved
//! identities and a window of `[NOW - 60, NOW + 86400)`.

#![allow(dead_code, reason = "Shared test helpers may be unused in some cases.")]

use aegis_core::AccessEngine;
use aegis_core::CommitmentScheme;
use aegis_core::DatasetId;
use aegis_core::EngineConfig;
use aegis_core::IdentityHash;
use aegis_core::InMemoryAuditSink;
use aegis_core::InMemoryLedgerStore;
use aegis_core::PrincipalId;
use aegis_core::RecordAddress;
use aegis_core::RuleParams;
use aegis_core::Secret;
use aegis_core::Timestamp;

/// Request time used by every fixture.
pub const NOW: i64 = 1_700_000_000;
/// Rule threshold used by every fixture.
pub const THRESHOLD: u64 = 100_000;

/// Engine over in-memory store and sink.
pub type TestEngine = AccessEngine<InMemoryLedgerStore, InMemoryAuditSink>;

/// Returns the fixed scenario clock.
pub fn now() -> Timestamp {
    Timestamp::from_unix_seconds(NOW)
}

/// Returns a timestamp offset from the scenario clock.
pub fn at(offset: i64) -> Timestamp {
    Timestamp::from_unix_seconds(NOW + offset)
}

/// Rule owner principal.
pub fn owner() -> PrincipalId {
    PrincipalId::new("owner")
}

/// Requesting principal.
pub fn requester() -> PrincipalId {
    PrincipalId::new("requester")
}

/// Principal with no relation to any record.
pub fn stranger() -> PrincipalId {
    PrincipalId::new("stranger")
}

/// Scenario dataset id.
pub fn dataset() -> DatasetId {
    DatasetId::from_padded_label("medical_dataset_001")
}

/// Secret matching the scenario commitment.
pub fn secret() -> Secret {
    Secret::from_padded_label("secret_key_123")
}

/// Secret that does not match the commitment.
pub fn wrong_secret() -> Secret {
    Secret::from_padded_label("wrong_secret")
}

/// First approved identity.
pub fn h1() -> IdentityHash {
    IdentityHash::from_padded_label("buyer_identity_1")
}

/// Second approved identity.
pub fn h2() -> IdentityHash {
    IdentityHash::from_padded_label("buyer_identity_2")
}

/// Identity absent from the approved set.
pub fn h_unknown() -> IdentityHash {
    IdentityHash::from_padded_label("unknown_identity")
}

/// Scenario rule: threshold 100000, identities {H1, H2}, window [now-60, now+86400).
pub fn rule_params() -> RuleParams {
    RuleParams {
        dataset_id: dataset(),
        secret_commitment: CommitmentScheme::Sha256.commit(&secret()),
        threshold: THRESHOLD,
        approved_identities: vec![h1(), h2()],
        valid_from: at(-60),
        valid_until: at(86_400),
    }
}

/// Returns an engine with default configuration.
pub fn engine() -> TestEngine {
    engine_with(EngineConfig::default())
}

/// Returns an engine with the provided configuration.
pub fn engine_with(config: EngineConfig) -> TestEngine {
    AccessEngine::new(InMemoryLedgerStore::new(), InMemoryAuditSink::new(), config)
}

/// Creates the fixture rule and returns its address.
pub fn engine_with_rule() -> (TestEngine, RecordAddress) {
    let engine = engine();
    let rule = engine.create_rule(&owner(), now(), rule_params()).expect("create rule");
    (engine, rule.value.address)
}
