// crates/aegis-core/src/core/mod.rs
// ============================================================================
// Module: Aegis Core Types
// Description: Canonical rule, certificate, attestation, and event structures.
// Purpose: Provide stable, serializable types shared by the runtime and stores.
// Dependencies: serde, serde_jcs, sha2, thiserror
// ============================================================================

//! ## Overview
//! Core types are the canonical source of truth for the access gate: the
//! records persisted by stores, the request payloads accepted at the
//! boundary, and the audit events emitted on every transition.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod attestation;
pub mod certificate;
pub mod denial;
pub mod events;
pub mod hashing;
pub mod identifiers;
pub mod request;
pub mod rule;
pub mod time;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use attestation::Attestation;
pub use attestation::AttestationSource;
pub use attestation::ComputeJobResult;
pub use certificate::AccessCertificate;
pub use certificate::AttestationBinding;
pub use certificate::CertificateState;
pub use denial::DenialReason;
pub use events::AuditEvent;
pub use events::AuditEventKind;
pub use hashing::DEFAULT_HASH_ALGORITHM;
pub use hashing::HashAlgorithm;
pub use hashing::HashDigest;
pub use hashing::HashError;
pub use hashing::HexError;
pub use identifiers::AttestationHash;
pub use identifiers::AttestationId;
pub use identifiers::Commitment;
pub use identifiers::DatasetId;
pub use identifiers::IdentityHash;
pub use identifiers::PrincipalId;
pub use identifiers::RecordAddress;
pub use identifiers::Secret;
pub use request::AccessRequest;
pub use request::RequestEnvelope;
pub use request::RequestError;
pub use rule::AccessRule;
pub use rule::RuleParams;
pub use rule::RuleStatus;
pub use time::Timestamp;
pub use time::ValidityWindow;
pub use time::WindowPosition;
