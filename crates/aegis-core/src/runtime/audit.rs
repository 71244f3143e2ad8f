// crates/aegis-core/src/runtime/audit.rs
// ============================================================================
// Module: Aegis Audit Emitter
// Description: Event construction and JSON-line audit sinks.
// Purpose: Emit one structured event per committed transition.
// Dependencies: serde, serde_json, crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! Events for committed transitions are built inside the transaction, after
//! the record is staged, so a transition that fails to hash never commits and
//! never emits. Sinks receive events only after commit.
//!
//! Sinks write one JSON object per line and drop events they cannot write.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::sync::Mutex;

use serde::Serialize;

use crate::core::AuditEvent;
use crate::core::AuditEventKind;
use crate::core::DenialReason;
use crate::core::HashAlgorithm;
use crate::core::HashError;
use crate::core::PrincipalId;
use crate::core::RecordAddress;
use crate::core::Timestamp;
use crate::core::hashing::hash_canonical_json;
use crate::interfaces::AuditSink;

// ============================================================================
// SECTION: Event Builders
// ============================================================================

/// Builds the event for a committed write, hashing the record as written.
///
/// # Errors
///
/// Returns [`HashError`] when the record cannot be canonicalized.
pub fn committed_event<R: Serialize>(
    kind: AuditEventKind,
    address: RecordAddress,
    actor: &PrincipalId,
    now: Timestamp,
    record: &R,
    algorithm: HashAlgorithm,
) -> Result<AuditEvent, HashError> {
    let record_hash = hash_canonical_json(algorithm, record)?;
    Ok(AuditEvent {
        kind,
        address,
        actor: actor.clone(),
        timestamp: now,
        record_hash: Some(record_hash),
    })
}

/// Builds the event for a refused access request.
#[must_use]
pub fn denied_event(
    rule: RecordAddress,
    actor: &PrincipalId,
    now: Timestamp,
    reason: DenialReason,
) -> AuditEvent {
    AuditEvent {
        kind: AuditEventKind::AccessDenied {
            rule,
            reason,
        },
        address: rule,
        actor: actor.clone(),
        timestamp: now,
        record_hash: None,
    }
}

// ============================================================================
// SECTION: Sinks
// ============================================================================

/// Audit sink that logs JSON lines to stderr.
pub struct StderrAuditSink;

impl AuditSink for StderrAuditSink {
    fn record(&self, event: &AuditEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{payload}");
        }
    }
}

/// Audit sink that logs JSON lines to a file.
pub struct FileAuditSink {
    /// File handle used for append-only logging.
    file: Mutex<std::fs::File>,
}

impl FileAuditSink {
    /// Opens the audit log file in append mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl AuditSink for FileAuditSink {
    fn record(&self, event: &AuditEvent) {
        if let Ok(payload) = serde_json::to_string(event)
            && let Ok(mut file) = self.file.lock()
        {
            let _ = writeln!(file, "{payload}");
            let _ = file.flush();
        }
    }
}

/// No-op audit sink.
pub struct NoopAuditSink;

impl AuditSink for NoopAuditSink {
    fn record(&self, _event: &AuditEvent) {}
}

/// Audit sink that keeps events in memory, in emission order.
#[derive(Debug, Default, Clone)]
pub struct InMemoryAuditSink {
    /// Recorded events protected by a mutex.
    events: Arc<Mutex<Vec<AuditEvent>>>,
}

impl InMemoryAuditSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of every recorded event.
    #[must_use]
    pub fn events(&self) -> Vec<AuditEvent> {
        self.events.lock().map(|guard| guard.clone()).unwrap_or_default()
    }

    /// Returns the labels of every recorded event.
    #[must_use]
    pub fn labels(&self) -> Vec<&'static str> {
        self.events().iter().map(|event| event.kind.label()).collect()
    }
}

impl AuditSink for InMemoryAuditSink {
    fn record(&self, event: &AuditEvent) {
        if let Ok(mut guard) = self.events.lock() {
            guard.push(event.clone());
        }
    }
}
