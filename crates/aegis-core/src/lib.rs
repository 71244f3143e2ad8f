// crates/aegis-core/src/lib.rs
// ============================================================================
// Module: Aegis Core Library
// Description: Public API surface for the Aegis access gate.
// Purpose: Expose core types, interfaces, and runtime helpers.
// Dependencies: crate::{core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! Aegis core is a privacy-preserving access-control engine. Owners publish
//! rules binding a dataset to a secret commitment, a threshold, and a set of
//! approved identities; requesters who satisfy a rule receive a time-bounded,
//! single-use certificate. Every transition is atomic and deterministic and
//! emits one audit event.
//!
//! Storage and audit output are pluggable through [`LedgerStore`] and
//! [`AuditSink`].

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use core::*;

pub use interfaces::AuditSink;
pub use interfaces::LedgerStore;
pub use interfaces::LedgerTransaction;
pub use interfaces::StoreError;
pub use interfaces::TransactionBody;
pub use interfaces::TransactionDecision;
pub use interfaces::run_transaction;
pub use runtime::AccessEngine;
pub use runtime::CommitmentScheme;
pub use runtime::EngineConfig;
pub use runtime::EngineError;
pub use runtime::FileAuditSink;
pub use runtime::InMemoryAuditSink;
pub use runtime::InMemoryLedgerStore;
pub use runtime::InvalidTransition;
pub use runtime::LifecycleAction;
pub use runtime::NoopAuditSink;
pub use runtime::OperationOutcome;
pub use runtime::OperationResult;
pub use runtime::RecordKind;
pub use runtime::RuleViolation;
pub use runtime::SharedLedgerStore;
pub use runtime::StderrAuditSink;
