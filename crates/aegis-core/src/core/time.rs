// crates/aegis-core/src/core/time.rs
// ============================================================================
// Module: Aegis Time Model
// Description: Unix-second timestamps for rule windows and certificates.
// Purpose: Keep every engine decision a pure function of caller-supplied time.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Aegis uses explicit time values supplied by the host with each request.
//! The engine never reads wall-clock time directly, so replaying the same
//! request stream against the same store yields the same decisions.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Time Values
// ============================================================================

/// Unix timestamp in whole seconds.
///
/// # Invariants
/// - Values are explicitly provided by callers; the core never reads wall-clock time.
/// - Arithmetic saturates instead of wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(i64);

impl Timestamp {
    /// Creates a timestamp from unix seconds.
    #[must_use]
    pub const fn from_unix_seconds(seconds: i64) -> Self {
        Self(seconds)
    }

    /// Returns the timestamp as unix seconds.
    #[must_use]
    pub const fn as_unix_seconds(self) -> i64 {
        self.0
    }

    /// Returns the timestamp shifted by `seconds`, saturating at the bounds.
    #[must_use]
    pub const fn saturating_add_seconds(self, seconds: i64) -> Self {
        Self(self.0.saturating_add(seconds))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Half-open validity window `[starts_at, ends_at)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidityWindow {
    /// First instant at which the window is open.
    pub starts_at: Timestamp,
    /// First instant at which the window is closed.
    pub ends_at: Timestamp,
}

/// Position of an instant relative to a [`ValidityWindow`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowPosition {
    /// The instant precedes the window.
    Before,
    /// The instant lies inside the window.
    Within,
    /// The instant is at or past the window end.
    After,
}

impl ValidityWindow {
    /// Creates a window when `starts_at < ends_at`.
    #[must_use]
    pub fn new(starts_at: Timestamp, ends_at: Timestamp) -> Option<Self> {
        (starts_at < ends_at).then_some(Self {
            starts_at,
            ends_at,
        })
    }

    /// Classifies `now` against the window.
    #[must_use]
    pub fn position(&self, now: Timestamp) -> WindowPosition {
        if now < self.starts_at {
            WindowPosition::Before
        } else if now < self.ends_at {
            WindowPosition::Within
        } else {
            WindowPosition::After
        }
    }
}
