// crates/aegis-config/src/config.rs
// ============================================================================
// Module: Aegis Configuration
// Description: Configuration loading and validation for the access engine.
// Purpose: Provide strict, fail-closed config parsing with explicit limits.
// Dependencies: aegis-core, aegis-store-sqlite, serde, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from `aegis.toml` (or an explicit path), bounded in
//! size and path length, and validated before use. Unknown keys are rejected
//! in every section. Validated sections convert into [`EngineConfig`], a
//! ledger store, and an audit sink.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use aegis_core::AuditSink;
use aegis_core::CommitmentScheme;
use aegis_core::EngineConfig;
use aegis_core::FileAuditSink;
use aegis_core::InMemoryLedgerStore;
use aegis_core::NoopAuditSink;
use aegis_core::PrincipalId;
use aegis_core::SharedLedgerStore;
use aegis_core::StderrAuditSink;
use aegis_core::request::MAX_PRINCIPAL_ID_BYTES;
use aegis_core::runtime::DEFAULT_CERTIFICATE_TTL_SECS;
use aegis_core::runtime::DEFAULT_MAX_APPROVED_IDENTITIES;
use aegis_store_sqlite::SqliteLedgerStore;
use aegis_store_sqlite::SqliteStoreConfig;
use aegis_store_sqlite::SqliteStoreMode;
use aegis_store_sqlite::SqliteSyncMode;
use serde::Deserialize;
use thiserror::Error;

// ============================================================================
// SECTION: Limits and Defaults
// ============================================================================

/// Default config file name.
pub const DEFAULT_CONFIG_NAME: &str = "aegis.toml";
/// Environment variable for config path overrides.
pub(crate) const CONFIG_ENV_VAR: &str = "AEGIS_CONFIG";
/// Maximum size of a config file in bytes.
pub const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Upper bound for certificate lifetimes (30 days).
pub const MAX_CERTIFICATE_TTL_SECS: u64 = 30 * 24 * 60 * 60;
/// Upper bound for the per-rule approved identity limit.
pub const MAX_APPROVED_IDENTITIES_LIMIT: usize = 256;
/// Default `SQLite` busy timeout in milliseconds.
const DEFAULT_STORE_BUSY_TIMEOUT_MS: u64 = 5_000;

// ============================================================================
// SECTION: Config Model
// ============================================================================

/// Top-level Aegis configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AegisConfig {
    /// Engine policy settings.
    #[serde(default)]
    pub engine: EngineSettings,
    /// Ledger store settings.
    #[serde(default)]
    pub store: StoreConfig,
    /// Audit sink settings.
    #[serde(default)]
    pub audit: AuditConfig,
}

impl AegisConfig {
    /// Loads configuration from disk using the default resolution rules.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path)?;
        validate_path(&resolved)?;
        let bytes = fs::read(&resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        Self::from_toml_str(content)
    }

    /// Parses and validates configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when parsing or validation fails.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        if content.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let mut config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&mut self) -> Result<(), ConfigError> {
        self.engine.validate()?;
        self.store.validate()?;
        self.audit.validate()?;
        Ok(())
    }

    /// Returns the engine configuration described by `[engine]`.
    #[must_use]
    pub fn engine_config(&self) -> EngineConfig {
        self.engine.to_engine_config()
    }

    /// Returns the `SQLite` store configuration when `[store]` selects it.
    #[must_use]
    pub fn sqlite_store_config(&self) -> Option<SqliteStoreConfig> {
        self.store.sqlite_config()
    }

    /// Opens the ledger store described by `[store]`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Store`] when the `SQLite` store cannot be opened.
    pub fn build_store(&self) -> Result<SharedLedgerStore, ConfigError> {
        match self.store.sqlite_config() {
            None => Ok(SharedLedgerStore::from_store(InMemoryLedgerStore::new())),
            Some(config) => {
                let store = SqliteLedgerStore::new(config)
                    .map_err(|err| ConfigError::Store(err.to_string()))?;
                Ok(SharedLedgerStore::from_store(store))
            }
        }
    }

    /// Opens the audit sink described by `[audit]`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] when the audit file cannot be opened.
    pub fn build_audit_sink(&self) -> Result<Box<dyn AuditSink>, ConfigError> {
        self.audit.build_sink()
    }
}

// ============================================================================
// SECTION: Engine Settings
// ============================================================================

/// `[engine]` section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineSettings {
    /// Certificate lifetime in seconds.
    #[serde(default = "default_certificate_ttl_secs")]
    pub certificate_ttl_secs: u64,
    /// Maximum approved identities per rule.
    #[serde(default = "default_max_approved_identities")]
    pub max_approved_identities: usize,
    /// Commitment scheme for submitted secrets.
    #[serde(default)]
    pub commitment_scheme: CommitmentScheme,
    /// Whether refused requests emit `access_denied` events.
    #[serde(default = "default_audit_denials")]
    pub audit_denials: bool,
    /// Principals allowed to consume any certificate.
    #[serde(default)]
    pub authorized_consumers: Vec<String>,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            certificate_ttl_secs: default_certificate_ttl_secs(),
            max_approved_identities: default_max_approved_identities(),
            commitment_scheme: CommitmentScheme::default(),
            audit_denials: default_audit_denials(),
            authorized_consumers: Vec::new(),
        }
    }
}

impl EngineSettings {
    /// Validates engine limits and the consumer allowlist.
    fn validate(&self) -> Result<(), ConfigError> {
        if !(1 ..= MAX_CERTIFICATE_TTL_SECS).contains(&self.certificate_ttl_secs) {
            return Err(ConfigError::Invalid(format!(
                "engine.certificate_ttl_secs must be between 1 and {MAX_CERTIFICATE_TTL_SECS}"
            )));
        }
        if !(1 ..= MAX_APPROVED_IDENTITIES_LIMIT).contains(&self.max_approved_identities) {
            return Err(ConfigError::Invalid(format!(
                "engine.max_approved_identities must be between 1 and \
                 {MAX_APPROVED_IDENTITIES_LIMIT}"
            )));
        }
        let mut seen = BTreeSet::new();
        for consumer in &self.authorized_consumers {
            if consumer.trim().is_empty() {
                return Err(ConfigError::Invalid(
                    "engine.authorized_consumers entries must be non-empty".to_string(),
                ));
            }
            if consumer.trim() != consumer {
                return Err(ConfigError::Invalid(format!(
                    "engine.authorized_consumers entry has surrounding whitespace: '{consumer}'"
                )));
            }
            if consumer.len() > MAX_PRINCIPAL_ID_BYTES {
                return Err(ConfigError::Invalid(format!(
                    "engine.authorized_consumers entry exceeds {MAX_PRINCIPAL_ID_BYTES} bytes"
                )));
            }
            if !seen.insert(consumer.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "engine.authorized_consumers contains duplicate entry: {consumer}"
                )));
            }
        }
        Ok(())
    }

    /// Converts the section into an engine configuration.
    fn to_engine_config(&self) -> EngineConfig {
        EngineConfig {
            certificate_ttl_secs: self.certificate_ttl_secs,
            max_approved_identities: self.max_approved_identities,
            commitment_scheme: self.commitment_scheme,
            audit_denials: self.audit_denials,
            authorized_consumers: self
                .authorized_consumers
                .iter()
                .map(|consumer| PrincipalId::new(consumer.as_str()))
                .collect(),
            ..EngineConfig::default()
        }
    }
}

/// Default certificate lifetime.
const fn default_certificate_ttl_secs() -> u64 {
    DEFAULT_CERTIFICATE_TTL_SECS
}

/// Default approved identity limit.
const fn default_max_approved_identities() -> usize {
    DEFAULT_MAX_APPROVED_IDENTITIES
}

/// Denial events are emitted unless disabled.
const fn default_audit_denials() -> bool {
    true
}

// ============================================================================
// SECTION: Store Settings
// ============================================================================

/// Ledger store backend selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreType {
    /// In-process store; state is lost on exit.
    #[default]
    Memory,
    /// Durable `SQLite` store.
    Sqlite,
}

/// `[store]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoreConfig {
    /// Store backend type.
    #[serde(rename = "type", default)]
    pub store_type: StoreType,
    /// `SQLite` database path when using the sqlite backend.
    #[serde(default)]
    pub path: Option<PathBuf>,
    /// Busy timeout in milliseconds.
    #[serde(default = "default_store_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// `SQLite` journal mode.
    #[serde(default)]
    pub journal_mode: SqliteStoreMode,
    /// `SQLite` synchronous mode.
    #[serde(default)]
    pub sync_mode: SqliteSyncMode,
    /// Optional max history entries retained per record.
    #[serde(default)]
    pub max_versions: Option<u64>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            store_type: StoreType::default(),
            path: None,
            busy_timeout_ms: default_store_busy_timeout_ms(),
            journal_mode: SqliteStoreMode::default(),
            sync_mode: SqliteSyncMode::default(),
            max_versions: None,
        }
    }
}

impl StoreConfig {
    /// Validates store configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        match self.store_type {
            StoreType::Memory => {
                if self.path.is_some() {
                    return Err(ConfigError::Invalid(
                        "memory store must not set path".to_string(),
                    ));
                }
                Ok(())
            }
            StoreType::Sqlite => {
                let path = self.path.as_ref().ok_or_else(|| {
                    ConfigError::Invalid("sqlite store requires path".to_string())
                })?;
                validate_path_string("store.path", &path.to_string_lossy())?;
                if self.max_versions == Some(0) {
                    return Err(ConfigError::Invalid(
                        "store max_versions must be greater than zero".to_string(),
                    ));
                }
                Ok(())
            }
        }
    }

    /// Builds the `SQLite` configuration when the sqlite backend is selected.
    fn sqlite_config(&self) -> Option<SqliteStoreConfig> {
        if self.store_type != StoreType::Sqlite {
            return None;
        }
        let path = self.path.clone()?;
        Some(SqliteStoreConfig {
            path,
            busy_timeout_ms: self.busy_timeout_ms,
            journal_mode: self.journal_mode,
            sync_mode: self.sync_mode,
            max_versions: self.max_versions,
        })
    }
}

/// Default busy timeout.
const fn default_store_busy_timeout_ms() -> u64 {
    DEFAULT_STORE_BUSY_TIMEOUT_MS
}

// ============================================================================
// SECTION: Audit Settings
// ============================================================================

/// Audit sink selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditSinkKind {
    /// JSON lines on stderr.
    #[default]
    Stderr,
    /// JSON lines appended to a file.
    File,
    /// Events are discarded.
    None,
}

/// `[audit]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuditConfig {
    /// Sink receiving audit events.
    #[serde(default)]
    pub sink: AuditSinkKind,
    /// Audit log path for the file sink.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl AuditConfig {
    /// Validates audit sink configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        match (self.sink, &self.path) {
            (AuditSinkKind::File, None) => {
                Err(ConfigError::Invalid("file audit sink requires path".to_string()))
            }
            (AuditSinkKind::File, Some(path)) => {
                validate_path_string("audit.path", &path.to_string_lossy())
            }
            (AuditSinkKind::Stderr | AuditSinkKind::None, Some(_)) => Err(ConfigError::Invalid(
                "audit.path is only valid for the file sink".to_string(),
            )),
            (AuditSinkKind::Stderr | AuditSinkKind::None, None) => Ok(()),
        }
    }

    /// Opens the configured sink.
    fn build_sink(&self) -> Result<Box<dyn AuditSink>, ConfigError> {
        match (self.sink, &self.path) {
            (AuditSinkKind::Stderr, _) => Ok(Box::new(StderrAuditSink)),
            (AuditSinkKind::None, _) => Ok(Box::new(NoopAuditSink)),
            (AuditSinkKind::File, Some(path)) => {
                let sink = FileAuditSink::new(path)
                    .map_err(|err| ConfigError::Io(format!("audit log open failed: {err}")))?;
                Ok(Box::new(sink))
            }
            (AuditSinkKind::File, None) => {
                Err(ConfigError::Invalid("file audit sink requires path".to_string()))
            }
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration or opening outputs.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
    /// The configured store could not be opened.
    #[error("config store error: {0}")]
    Store(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path from the argument or environment defaults.
fn resolve_path(path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = path {
        return Ok(path.to_path_buf());
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(PathBuf::from(env_path));
    }
    Ok(PathBuf::from(DEFAULT_CONFIG_NAME))
}

/// Validates the resolved path against length limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Validates a configured path string against length constraints.
fn validate_path_string(field: &str, value: &str) -> Result<(), ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if trimmed.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    for component in Path::new(trimmed).components() {
        let component_value = component.as_os_str().to_string_lossy();
        if component_value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid(format!("{field} path component too long")));
        }
    }
    Ok(())
}

// ============================================================================
// SECTION: Tests
// ============================================================================
