// crates/aegis-config/src/lib.rs
// ============================================================================
// Module: Aegis Config Library
// Description: Configuration loading and validation for the access engine.
// Purpose: Expose the canonical config model and its conversions.
// Dependencies: crate::config
// ============================================================================

//! ## Overview
//! Loads `aegis.toml`, enforces input limits, and converts validated sections
//! into engine, store, and audit sink settings.

pub mod config;

pub use config::*;
