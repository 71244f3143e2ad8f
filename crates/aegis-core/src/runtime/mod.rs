// crates/aegis-core/src/runtime/mod.rs
// ============================================================================
// Module: Aegis Runtime
// Description: Verifier, lifecycle, policy store, issuer, audit, and engine.
// Purpose: Execute access-gate operations against a ledger store.
// Dependencies: crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! Runtime modules implement the access-gate state machine. Hosts call into
//! [`AccessEngine`]; the other modules are exposed for direct testing of the
//! verifier and lifecycle table.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod audit;
pub mod engine;
mod issuer;
pub mod lifecycle;
pub mod policy;
pub mod store;
pub mod verifier;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use audit::FileAuditSink;
pub use audit::InMemoryAuditSink;
pub use audit::NoopAuditSink;
pub use audit::StderrAuditSink;
pub use engine::AccessEngine;
pub use engine::DEFAULT_CERTIFICATE_TTL_SECS;
pub use engine::DEFAULT_MAX_APPROVED_IDENTITIES;
pub use engine::EngineConfig;
pub use engine::EngineError;
pub use engine::OperationOutcome;
pub use engine::OperationResult;
pub use engine::RecordKind;
pub use lifecycle::InvalidTransition;
pub use lifecycle::LifecycleAction;
pub use policy::RuleViolation;
pub use store::InMemoryLedgerStore;
pub use store::SharedLedgerStore;
pub use verifier::CommitmentScheme;
pub use verifier::SecretEvidence;
