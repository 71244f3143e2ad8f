// crates/aegis-core/tests/verifier_ordering.rs
// ============================================================================
// Module: Verifier Ordering Tests
// Description: Check order, single-violation isolation, and commitment schemes.
// Purpose: Ensure each check reports its own reason and only the first failure.
// Dependencies: aegis-core, proptest
// ============================================================================

//! ## Overview
//! Violating exactly one check yields exactly that check's reason; violating
//! several yields the earliest in check order.

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

use std::collections::BTreeSet;

use aegis_core::AccessRule;
use aegis_core::Attestation;
use aegis_core::AttestationHash;
use aegis_core::AttestationId;
use aegis_core::AttestationSource;
use aegis_core::CommitmentScheme;
use aegis_core::DatasetId;
use aegis_core::DenialReason;
use aegis_core::IdentityHash;
use aegis_core::PrincipalId;
use aegis_core::RecordAddress;
use aegis_core::RuleStatus;
use aegis_core::Secret;
use aegis_core::Timestamp;
use aegis_core::runtime::verifier::SecretEvidence;
use aegis_core::runtime::verifier::check_rule_gate;
use aegis_core::runtime::verifier::verify;
use proptest::prelude::*;

const FROM: i64 = 1_000;
const UNTIL: i64 = 2_000;

fn approved() -> IdentityHash {
    IdentityHash::new([7; 32])
}

fn unknown() -> IdentityHash {
    IdentityHash::new([9; 32])
}

fn good_secret() -> Secret {
    Secret::new([1; 32])
}

fn bad_secret() -> Secret {
    Secret::new([2; 32])
}

fn rule(status: RuleStatus, threshold: u64) -> AccessRule {
    let dataset_id = DatasetId::new([3; 32]);
    AccessRule {
        address: RecordAddress::for_rule(&dataset_id),
        dataset_id,
        secret_commitment: CommitmentScheme::Sha256.commit(&good_secret()),
        threshold,
        approved_identities: BTreeSet::from([approved()]),
        valid_from: Timestamp::from_unix_seconds(FROM),
        valid_until: Timestamp::from_unix_seconds(UNTIL),
        owner: PrincipalId::new("owner"),
        status,
        created_at: Timestamp::from_unix_seconds(FROM),
        revision: 1,
    }
}

fn check(
    rule: &AccessRule,
    now: i64,
    secret: &Secret,
    value: u64,
    identity: &IdentityHash,
) -> Result<(), DenialReason> {
    verify(
        rule,
        Timestamp::from_unix_seconds(now),
        SecretEvidence::Secret {
            scheme: CommitmentScheme::Sha256,
            secret,
        },
        value,
        identity,
    )
}

#[test]
fn all_checks_passing_grants() {
    let rule = rule(RuleStatus::Active, 100);
    assert_eq!(check(&rule, 1_500, &good_secret(), 100, &approved()), Ok(()));
}

#[test]
fn window_is_half_open() {
    let rule = rule(RuleStatus::Active, 100);
    assert_eq!(check_rule_gate(&rule, Timestamp::from_unix_seconds(FROM)), Ok(()));
    assert_eq!(check_rule_gate(&rule, Timestamp::from_unix_seconds(UNTIL - 1)), Ok(()));
    assert_eq!(
        check_rule_gate(&rule, Timestamp::from_unix_seconds(FROM - 1)),
        Err(DenialReason::RuleNotYetValid)
    );
    assert_eq!(
        check_rule_gate(&rule, Timestamp::from_unix_seconds(UNTIL)),
        Err(DenialReason::RuleExpired)
    );
}

#[test]
fn value_equal_to_threshold_passes() {
    let rule = rule(RuleStatus::Active, 100);
    assert_eq!(
        check(&rule, 1_500, &good_secret(), 99, &approved()),
        Err(DenialReason::InsufficientAmount)
    );
    assert_eq!(check(&rule, 1_500, &good_secret(), 100, &approved()), Ok(()));
}

#[test]
fn earliest_failing_check_wins() {
    let paused = rule(RuleStatus::Paused, 100);
    assert_eq!(
        check(&paused, 5_000, &bad_secret(), 0, &unknown()),
        Err(DenialReason::RuleNotActive)
    );

    let active = rule(RuleStatus::Active, 100);
    assert_eq!(
        check(&active, 5_000, &bad_secret(), 0, &unknown()),
        Err(DenialReason::RuleExpired)
    );
    assert_eq!(
        check(&active, 1_500, &bad_secret(), 0, &unknown()),
        Err(DenialReason::InvalidSecret)
    );
    assert_eq!(
        check(&active, 1_500, &good_secret(), 0, &unknown()),
        Err(DenialReason::InsufficientAmount)
    );
}

#[test]
fn attestation_verdict_replaces_secret_check() {
    let active = rule(RuleStatus::Active, 100);
    let mut attestation = Attestation {
        source: AttestationSource::ConfidentialCompute,
        attestation_id: AttestationId::new("job-1"),
        attestation_hash: AttestationHash::new([4; 32]),
        verified: true,
    };
    let now = Timestamp::from_unix_seconds(1_500);
    assert_eq!(
        verify(&active, now, SecretEvidence::Attestation(&attestation), 100, &approved()),
        Ok(())
    );

    attestation.verified = false;
    assert_eq!(
        verify(&active, now, SecretEvidence::Attestation(&attestation), 100, &approved()),
        Err(DenialReason::AttestationRejected)
    );
    assert_eq!(
        verify(&active, now, SecretEvidence::Attestation(&attestation), 0, &unknown()),
        Err(DenialReason::AttestationRejected)
    );

    let paused = rule(RuleStatus::Paused, 100);
    attestation.verified = true;
    assert_eq!(
        verify(&paused, now, SecretEvidence::Attestation(&attestation), 100, &approved()),
        Err(DenialReason::RuleNotActive)
    );
}

#[test]
fn commitment_schemes_differ() {
    let secret = good_secret();
    assert!(CommitmentScheme::Sha256.opens(&CommitmentScheme::Sha256.commit(&secret), &secret));
    assert!(CommitmentScheme::Plain.opens(&CommitmentScheme::Plain.commit(&secret), &secret));
    assert_eq!(CommitmentScheme::Plain.commit(&secret).as_bytes(), secret.as_bytes());
    assert!(!CommitmentScheme::Sha256.opens(&CommitmentScheme::Plain.commit(&secret), &secret));
    assert!(!CommitmentScheme::Plain.opens(&CommitmentScheme::Sha256.commit(&secret), &secret));
}

proptest! {
    #[test]
    fn single_violation_yields_its_own_reason(
        violation in 0_usize .. 7,
        threshold in 1_u64 .. 1_000_000,
        surplus in 0_u64 .. 1_000_000,
        offset in 0_i64 .. (UNTIL - FROM),
        early in 1_i64 .. 10_000,
        late in 0_i64 .. 10_000,
    ) {
        let status = match violation {
            0 => RuleStatus::Paused,
            1 => RuleStatus::Revoked,
            _ => RuleStatus::Active,
        };
        let rule = rule(status, threshold);
        let now = match violation {
            2 => FROM - early,
            3 => UNTIL + late,
            _ => FROM + offset,
        };
        let secret = if violation == 4 { bad_secret() } else { good_secret() };
        let value = if violation == 5 { threshold - 1 } else { threshold + surplus };
        let identity = if violation == 6 { unknown() } else { approved() };

        let expected = match violation {
            0 | 1 => DenialReason::RuleNotActive,
            2 => DenialReason::RuleNotYetValid,
            3 => DenialReason::RuleExpired,
            4 => DenialReason::InvalidSecret,
            5 => DenialReason::InsufficientAmount,
            _ => DenialReason::IdentityNotApproved,
        };
        prop_assert_eq!(check(&rule, now, &secret, value, &identity), Err(expected));
    }

    #[test]
    fn valid_inputs_always_pass(
        threshold in 0_u64 .. 1_000_000,
        surplus in 0_u64 .. 1_000_000,
        offset in 0_i64 .. (UNTIL - FROM),
    ) {
        let rule = rule(RuleStatus::Active, threshold);
        prop_assert_eq!(
            check(&rule, FROM + offset, &good_secret(), threshold + surplus, &approved()),
            Ok(())
        );
    }
}
