// crates/aegis-config/tests/load_validation.rs
// ============================================================================
// Module: Config Load Validation Tests
// Description: Config loading guards (path, size, encoding) and field limits.
// Purpose: Ensure config input handling is strict and fail-closed.
// Dependencies: aegis-config, aegis-core, tempfile
// ============================================================================

//! ## Overview
//! Loads configs from temporary files and inline TOML, asserting that every
//! limit and cross-field rule rejects bad input with a descriptive message.

#![allow(clippy::use_debug, reason = "Test failures render unexpected results with Debug.")]

use std::io::Write;
use std::path::Path;

use aegis_config::AegisConfig;
use aegis_config::AuditSinkKind;
use aegis_config::ConfigError;
use aegis_config::StoreType;
use aegis_core::CommitmentScheme;
use aegis_core::EngineConfig;
use aegis_core::PrincipalId;
use tempfile::NamedTempFile;

type TestResult = Result<(), String>;

fn assert_invalid(result: Result<AegisConfig, ConfigError>, needle: &str) -> TestResult {
    match result {
        Err(error) => {
            let message = error.to_string();
            if message.contains(needle) {
                Ok(())
            } else {
                Err(format!("error {message} did not contain {needle}"))
            }
        }
        Ok(_) => Err("expected invalid config load".to_string()),
    }
}

fn write_config(contents: &[u8]) -> Result<NamedTempFile, String> {
    let mut file = NamedTempFile::new().map_err(|err| err.to_string())?;
    file.write_all(contents).map_err(|err| err.to_string())?;
    Ok(file)
}

#[test]
fn load_rejects_path_too_long() -> TestResult {
    let long_path = "a".repeat(5_000);
    assert_invalid(AegisConfig::load(Some(Path::new(&long_path))), "config path exceeds max length")
}

#[test]
fn load_rejects_path_component_too_long() -> TestResult {
    let long_component = "a".repeat(300);
    assert_invalid(
        AegisConfig::load(Some(Path::new(&long_component))),
        "config path component too long",
    )
}

#[test]
fn load_rejects_oversized_file() -> TestResult {
    let file = write_config(&vec![b'#'; 1_048_577])?;
    assert_invalid(AegisConfig::load(Some(file.path())), "config file exceeds size limit")
}

#[test]
fn load_rejects_non_utf8_file() -> TestResult {
    let file = write_config(&[0xFF, 0xFE, 0xFF])?;
    assert_invalid(AegisConfig::load(Some(file.path())), "config file must be utf-8")
}

#[test]
fn load_reports_missing_file_as_io() -> TestResult {
    let dir = tempfile::tempdir().map_err(|err| err.to_string())?;
    match AegisConfig::load(Some(&dir.path().join("absent.toml"))) {
        Err(ConfigError::Io(_)) => Ok(()),
        other => Err(format!("expected io error, got {other:?}")),
    }
}

#[test]
fn empty_file_yields_defaults() -> TestResult {
    let file = write_config(b"")?;
    let config = AegisConfig::load(Some(file.path())).map_err(|err| err.to_string())?;
    if config.engine_config() != EngineConfig::default() {
        return Err("empty config should match engine defaults".to_string());
    }
    if config.store.store_type != StoreType::Memory || config.audit.sink != AuditSinkKind::Stderr
    {
        return Err("empty config should select memory store and stderr audit".to_string());
    }
    if config.sqlite_store_config().is_some() {
        return Err("memory store should not produce sqlite config".to_string());
    }
    Ok(())
}

#[test]
fn engine_section_maps_to_engine_config() -> TestResult {
    let file = write_config(
        br#"
[engine]
certificate_ttl_secs = 600
max_approved_identities = 4
commitment_scheme = "plain"
audit_denials = false
authorized_consumers = ["settlement-service", "auditor"]
"#,
    )?;
    let config = AegisConfig::load(Some(file.path())).map_err(|err| err.to_string())?;
    let engine = config.engine_config();
    if engine.certificate_ttl_secs != 600
        || engine.max_approved_identities != 4
        || engine.commitment_scheme != CommitmentScheme::Plain
        || engine.audit_denials
    {
        return Err(format!("unexpected engine config: {engine:?}"));
    }
    if !engine.authorized_consumers.contains(&PrincipalId::new("auditor"))
        || engine.authorized_consumers.len() != 2
    {
        return Err("authorized consumers not carried over".to_string());
    }
    Ok(())
}

#[test]
fn rejects_unknown_keys() -> TestResult {
    let result = AegisConfig::from_toml_str("[engine]\ncertificate_ttl = 60\n");
    match result {
        Err(ConfigError::Parse(message)) if message.contains("unknown field") => Ok(()),
        other => Err(format!("expected unknown field parse error, got {other:?}")),
    }
}

#[test]
fn rejects_unknown_commitment_scheme() -> TestResult {
    match AegisConfig::from_toml_str("[engine]\ncommitment_scheme = \"md5\"\n") {
        Err(ConfigError::Parse(_)) => Ok(()),
        other => Err(format!("expected parse error, got {other:?}")),
    }
}

#[test]
fn rejects_ttl_out_of_range() -> TestResult {
    assert_invalid(
        AegisConfig::from_toml_str("[engine]\ncertificate_ttl_secs = 0\n"),
        "engine.certificate_ttl_secs must be between 1 and",
    )?;
    assert_invalid(
        AegisConfig::from_toml_str("[engine]\ncertificate_ttl_secs = 2592001\n"),
        "engine.certificate_ttl_secs must be between 1 and",
    )?;
    AegisConfig::from_toml_str("[engine]\ncertificate_ttl_secs = 2592000\n")
        .map(|_| ())
        .map_err(|err| err.to_string())
}

#[test]
fn rejects_identity_limit_out_of_range() -> TestResult {
    assert_invalid(
        AegisConfig::from_toml_str("[engine]\nmax_approved_identities = 0\n"),
        "engine.max_approved_identities must be between 1 and 256",
    )?;
    assert_invalid(
        AegisConfig::from_toml_str("[engine]\nmax_approved_identities = 257\n"),
        "engine.max_approved_identities must be between 1 and 256",
    )
}

#[test]
fn rejects_bad_authorized_consumers() -> TestResult {
    assert_invalid(
        AegisConfig::from_toml_str("[engine]\nauthorized_consumers = [\"  \"]\n"),
        "entries must be non-empty",
    )?;
    assert_invalid(
        AegisConfig::from_toml_str("[engine]\nauthorized_consumers = [\"a\", \"a\"]\n"),
        "contains duplicate entry: a",
    )?;
    assert_invalid(
        AegisConfig::from_toml_str("[engine]\nauthorized_consumers = [\" alice\"]\n"),
        "entry has surrounding whitespace",
    )?;
    assert_invalid(
        AegisConfig::from_toml_str("[engine]\nauthorized_consumers = [\"alice\\t\"]\n"),
        "entry has surrounding whitespace",
    )?;
    let long = format!("[engine]\nauthorized_consumers = [\"{}\"]\n", "p".repeat(257));
    assert_invalid(AegisConfig::from_toml_str(&long), "entry exceeds 256 bytes")
}

#[test]
fn rejects_inconsistent_store_sections() -> TestResult {
    assert_invalid(
        AegisConfig::from_toml_str("[store]\ntype = \"memory\"\npath = \"ledger.db\"\n"),
        "memory store must not set path",
    )?;
    assert_invalid(
        AegisConfig::from_toml_str("[store]\ntype = \"sqlite\"\n"),
        "sqlite store requires path",
    )?;
    assert_invalid(
        AegisConfig::from_toml_str("[store]\ntype = \"sqlite\"\npath = \"  \"\n"),
        "store.path must be non-empty",
    )?;
    assert_invalid(
        AegisConfig::from_toml_str(
            "[store]\ntype = \"sqlite\"\npath = \"ledger.db\"\nmax_versions = 0\n",
        ),
        "store max_versions must be greater than zero",
    )
}

#[test]
fn rejects_inconsistent_audit_sections() -> TestResult {
    assert_invalid(
        AegisConfig::from_toml_str("[audit]\nsink = \"file\"\n"),
        "file audit sink requires path",
    )?;
    assert_invalid(
        AegisConfig::from_toml_str("[audit]\nsink = \"none\"\npath = \"audit.jsonl\"\n"),
        "audit.path is only valid for the file sink",
    )
}
