// crates/aegis-store-sqlite/src/lib.rs
// ============================================================================
// Module: SQLite Ledger Store
// Description: Durable LedgerStore backend using SQLite WAL.
// Purpose: Persist access rules and certificates across restarts.
// Dependencies: aegis-core, rusqlite
// ============================================================================

//! ## Overview
//! This crate provides a SQLite-backed [`LedgerStore`](aegis_core::LedgerStore)
//! that persists canonical JSON records with integrity hashes and keeps an
//! append-only revision history per record. Each engine operation runs in one
//! `IMMEDIATE` transaction, so concurrent writers serialize on the database.
//! Security posture: database contents are untrusted and verified on load.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use store::MAX_RECORD_BYTES;
pub use store::RecordVersion;
pub use store::SqliteLedgerStore;
pub use store::SqliteStoreConfig;
pub use store::SqliteStoreError;
pub use store::SqliteStoreMode;
pub use store::SqliteSyncMode;
