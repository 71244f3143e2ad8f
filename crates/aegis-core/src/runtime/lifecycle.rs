// crates/aegis-core/src/runtime/lifecycle.rs
// ============================================================================
// Module: Aegis Rule Lifecycle
// Description: Status transition table for access rules.
// Purpose: Permit only Active -> Paused, Paused -> Active, and * -> Revoked.
// Dependencies: serde, thiserror, crate::core
// ============================================================================

//! ## Overview
//! Rule status is a three-state machine. Revoked is terminal, and every
//! transition the table does not list fails with [`InvalidTransition`] rather
//! than silently doing nothing.

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::core::AuditEventKind;
use crate::core::RuleStatus;

/// Owner-initiated lifecycle action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleAction {
    /// Active to paused.
    Pause,
    /// Paused to active.
    Resume,
    /// Active or paused to revoked.
    Revoke,
}

impl LifecycleAction {
    /// Returns the canonical label for the action.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pause => "pause",
            Self::Resume => "resume",
            Self::Revoke => "revoke",
        }
    }

    /// Returns the audit payload for a successful transition out of `from`.
    #[must_use]
    pub const fn event_kind(self, from: RuleStatus) -> AuditEventKind {
        match self {
            Self::Pause => AuditEventKind::RulePaused,
            Self::Resume => AuditEventKind::RuleResumed,
            Self::Revoke => AuditEventKind::RuleRevoked {
                previous_status: from,
            },
        }
    }
}

impl fmt::Display for LifecycleAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A lifecycle action not permitted from the current status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("cannot {action} a rule that is {from}")]
pub struct InvalidTransition {
    /// Status held when the action was attempted.
    pub from: RuleStatus,
    /// Rejected action.
    pub action: LifecycleAction,
}

/// Returns the status reached by applying `action` to `from`.
///
/// # Errors
///
/// Returns [`InvalidTransition`] when the table has no such edge.
pub const fn transition(
    from: RuleStatus,
    action: LifecycleAction,
) -> Result<RuleStatus, InvalidTransition> {
    match (from, action) {
        (RuleStatus::Active, LifecycleAction::Pause) => Ok(RuleStatus::Paused),
        (RuleStatus::Paused, LifecycleAction::Resume) => Ok(RuleStatus::Active),
        (RuleStatus::Active | RuleStatus::Paused, LifecycleAction::Revoke) => {
            Ok(RuleStatus::Revoked)
        }
        _ => Err(InvalidTransition {
            from,
            action,
        }),
    }
}
