// crates/aegis-store-sqlite/src/store.rs
// ============================================================================
// Module: SQLite Ledger Store
// Description: Durable LedgerStore backed by SQLite WAL.
// Purpose: Persist rules and certificates with integrity-checked serialization.
// Dependencies: aegis-core, rusqlite, serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! This module implements a durable [`LedgerStore`] using `SQLite`. Each write
//! stores the record as canonical JSON alongside its hash and revision, and
//! appends a copy to a per-record history table. Loads verify integrity via
//! the stored hash and fail closed on corruption.
//!
//! Transactions begin `IMMEDIATE`, taking the write lock up front, so two
//! engines racing for the same certificate slot serialize and the loser sees
//! the winner's row.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use aegis_core::AccessCertificate;
use aegis_core::AccessRule;
use aegis_core::LedgerStore;
use aegis_core::LedgerTransaction;
use aegis_core::RecordAddress;
use aegis_core::StoreError;
use aegis_core::TransactionBody;
use aegis_core::TransactionDecision;
use aegis_core::hashing::DEFAULT_HASH_ALGORITHM;
use aegis_core::hashing::HashAlgorithm;
use aegis_core::hashing::HashDigest;
use aegis_core::hashing::canonical_json_bytes;
use aegis_core::hashing::hash_bytes;
use aegis_core::runtime::store::check_revision;
use rusqlite::Connection;
use rusqlite::OpenFlags;
use rusqlite::OptionalExtension;
use rusqlite::TransactionBehavior;
use rusqlite::params;
use serde::Deserialize;
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// `SQLite` schema version for the store.
const SCHEMA_VERSION: i64 = 1;
/// Default busy timeout (ms).
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;
/// Maximum length of a single path component.
const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Maximum serialized record size accepted by the store.
pub const MAX_RECORD_BYTES: usize = 1024 * 1024;

// ============================================================================
// SECTION: Config
// ============================================================================

/// `SQLite` journal mode configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteStoreMode {
    /// WAL journal mode (recommended).
    #[default]
    Wal,
    /// Delete journal mode (legacy).
    Delete,
}

impl SqliteStoreMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Wal => "wal",
            Self::Delete => "delete",
        }
    }
}

/// `SQLite` sync mode configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteSyncMode {
    /// Full synchronous mode (safest).
    #[default]
    Full,
    /// Normal synchronous mode (balanced).
    Normal,
}

impl SqliteSyncMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Normal => "normal",
        }
    }
}

/// Configuration for the `SQLite` ledger store.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SqliteStoreConfig {
    /// Path to the `SQLite` database file.
    pub path: PathBuf,
    /// Busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// `SQLite` journal mode.
    #[serde(default)]
    pub journal_mode: SqliteStoreMode,
    /// `SQLite` sync mode.
    #[serde(default)]
    pub sync_mode: SqliteSyncMode,
    /// Optional maximum history entries per record (older entries pruned).
    #[serde(default)]
    pub max_versions: Option<u64>,
}

impl SqliteStoreConfig {
    /// Returns a configuration for `path` with default tuning.
    #[must_use]
    pub fn for_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            journal_mode: SqliteStoreMode::default(),
            sync_mode: SqliteSyncMode::default(),
            max_versions: None,
        }
    }
}

/// Returns the default busy timeout for `SQLite` connections.
const fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// `SQLite` store errors.
#[derive(Debug, Error)]
pub enum SqliteStoreError {
    /// Store I/O error.
    #[error("sqlite store io error: {0}")]
    Io(String),
    /// `SQLite` engine error.
    #[error("sqlite store db error: {0}")]
    Db(String),
    /// Store corruption or hash mismatch.
    #[error("sqlite store corruption: {0}")]
    Corrupt(String),
    /// Store schema version mismatch.
    #[error("sqlite store version mismatch: {0}")]
    VersionMismatch(String),
    /// Invalid store data.
    #[error("sqlite store invalid data: {0}")]
    Invalid(String),
    /// Record already exists.
    #[error("sqlite store conflict: {0}")]
    Conflict(String),
    /// Store payload exceeded configured size limits.
    #[error("sqlite store payload too large: {actual_bytes} bytes (max {max_bytes})")]
    TooLarge {
        /// Maximum allowed bytes.
        max_bytes: usize,
        /// Actual payload size in bytes.
        actual_bytes: usize,
    },
}

impl From<SqliteStoreError> for StoreError {
    fn from(error: SqliteStoreError) -> Self {
        match error {
            SqliteStoreError::Io(message) => Self::Io(message),
            SqliteStoreError::Db(message) => Self::Store(message),
            SqliteStoreError::Corrupt(message) => Self::Corrupt(message),
            SqliteStoreError::VersionMismatch(message) => Self::VersionMismatch(message),
            SqliteStoreError::Invalid(message) => Self::Invalid(message),
            SqliteStoreError::Conflict(message) => Self::Conflict(message),
            SqliteStoreError::TooLarge {
                max_bytes,
                actual_bytes,
            } => Self::Invalid(format!(
                "record_json exceeds size limit: {actual_bytes} bytes (max {max_bytes})"
            )),
        }
    }
}

/// Maps a `rusqlite` error into a store error.
fn db_error(err: rusqlite::Error) -> SqliteStoreError {
    SqliteStoreError::Db(err.to_string())
}

// ============================================================================
// SECTION: Records
// ============================================================================

/// Ledger table a record lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RecordTable {
    /// `rules` table.
    Rules,
    /// `certificates` table.
    Certificates,
}

impl RecordTable {
    /// Returns the table name.
    const fn name(self) -> &'static str {
        match self {
            Self::Rules => "rules",
            Self::Certificates => "certificates",
        }
    }

    /// Returns the record kind label used in history rows and messages.
    const fn kind(self) -> &'static str {
        match self {
            Self::Rules => "rule",
            Self::Certificates => "certificate",
        }
    }
}

/// Record persisted by the ledger.
trait LedgerRecord: Serialize + DeserializeOwned {
    /// Table holding this record type.
    const TABLE: RecordTable;

    /// Returns the record's key.
    fn address(&self) -> RecordAddress;

    /// Returns the record's write counter.
    fn revision(&self) -> u64;
}

impl LedgerRecord for AccessRule {
    const TABLE: RecordTable = RecordTable::Rules;

    fn address(&self) -> RecordAddress {
        self.address
    }

    fn revision(&self) -> u64 {
        self.revision
    }
}

impl LedgerRecord for AccessCertificate {
    const TABLE: RecordTable = RecordTable::Certificates;

    fn address(&self) -> RecordAddress {
        self.address
    }

    fn revision(&self) -> u64 {
        self.revision
    }
}

/// One entry of a record's revision history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordVersion {
    /// Record kind label (`rule` or `certificate`).
    pub kind: String,
    /// Revision written.
    pub revision: u64,
    /// Hash of the canonical record bytes.
    pub record_hash: HashDigest,
    /// Wall-clock write time in unix milliseconds.
    pub saved_at: i64,
}

// ============================================================================
// SECTION: Store
// ============================================================================

/// `SQLite`-backed ledger store with WAL support.
#[derive(Clone)]
pub struct SqliteLedgerStore {
    /// Store configuration.
    config: SqliteStoreConfig,
    /// Shared `SQLite` connection guarded by a mutex.
    connection: Arc<Mutex<Connection>>,
}

impl SqliteLedgerStore {
    /// Opens an `SQLite`-backed ledger store.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the database cannot be opened or
    /// initialized.
    pub fn new(config: SqliteStoreConfig) -> Result<Self, SqliteStoreError> {
        validate_store_path(&config.path)?;
        if config.max_versions == Some(0) {
            return Err(SqliteStoreError::Invalid(
                "max_versions must be greater than zero".to_string(),
            ));
        }
        ensure_parent_dir(&config.path)?;
        let mut connection = open_connection(&config)?;
        initialize_schema(&mut connection)?;
        Ok(Self {
            config,
            connection: Arc::new(Mutex::new(connection)),
        })
    }

    /// Returns the store configuration.
    #[must_use]
    pub const fn config(&self) -> &SqliteStoreConfig {
        &self.config
    }

    /// Returns the stored revision history for a record, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the query fails or a row is invalid.
    pub fn history(&self, address: &RecordAddress) -> Result<Vec<RecordVersion>, SqliteStoreError> {
        let guard = self.lock()?;
        let mut statement = guard
            .prepare(
                "SELECT kind, revision, record_hash, hash_algorithm, saved_at FROM \
                 record_history WHERE address = ?1 ORDER BY revision ASC",
            )
            .map_err(db_error)?;
        let rows = statement
            .query_map(params![address.to_hex()], |row| {
                let kind: String = row.get(0)?;
                let revision: i64 = row.get(1)?;
                let hash: String = row.get(2)?;
                let algorithm: String = row.get(3)?;
                let saved_at: i64 = row.get(4)?;
                Ok((kind, revision, hash, algorithm, saved_at))
            })
            .map_err(db_error)?;
        let mut versions = Vec::new();
        for row in rows {
            let (kind, revision, value, algorithm, saved_at) = row.map_err(db_error)?;
            let revision = u64::try_from(revision).map_err(|_| {
                SqliteStoreError::Corrupt(format!("negative revision in history for {address}"))
            })?;
            versions.push(RecordVersion {
                kind,
                revision,
                record_hash: HashDigest {
                    algorithm: parse_hash_algorithm(&algorithm)?,
                    value,
                },
                saved_at,
            });
        }
        Ok(versions)
    }

    /// Locks the shared connection.
    fn lock(&self) -> Result<MutexGuard<'_, Connection>, SqliteStoreError> {
        self.connection.lock().map_err(|_| SqliteStoreError::Db("mutex poisoned".to_string()))
    }

    /// Loads one record outside a transaction.
    fn load<R: LedgerRecord>(
        &self,
        address: &RecordAddress,
    ) -> Result<Option<R>, SqliteStoreError> {
        let guard = self.lock()?;
        let record = load_record(&guard, address)?;
        drop(guard);
        Ok(record)
    }
}

impl LedgerStore for SqliteLedgerStore {
    fn load_rule(&self, address: &RecordAddress) -> Result<Option<AccessRule>, StoreError> {
        self.load(address).map_err(StoreError::from)
    }

    fn load_certificate(
        &self,
        address: &RecordAddress,
    ) -> Result<Option<AccessCertificate>, StoreError> {
        self.load(address).map_err(StoreError::from)
    }

    fn transact(&self, body: &mut TransactionBody<'_>) -> Result<TransactionDecision, StoreError> {
        let mut guard = self.lock()?;
        let tx = guard.transaction_with_behavior(TransactionBehavior::Immediate).map_err(db_error)?;
        let decision = {
            let mut staged = SqliteTransaction {
                connection: &tx,
                max_versions: self.config.max_versions,
            };
            body(&mut staged)?
        };
        match decision {
            TransactionDecision::Commit => tx.commit().map_err(db_error)?,
            TransactionDecision::Rollback => tx.rollback().map_err(db_error)?,
        }
        drop(guard);
        Ok(decision)
    }
}

// ============================================================================
// SECTION: Transaction
// ============================================================================

/// Ledger view over an open `SQLite` transaction.
struct SqliteTransaction<'a> {
    /// Connection inside the open transaction.
    connection: &'a Connection,
    /// History retention limit.
    max_versions: Option<u64>,
}

impl SqliteTransaction<'_> {
    /// Inserts a record that must not exist yet.
    fn insert<R: LedgerRecord>(&self, record: &R) -> Result<(), StoreError> {
        let address = record.address();
        if stored_revision(self.connection, R::TABLE, &address)?.is_some() {
            let kind = R::TABLE.kind();
            let message = format!("{kind} {address} already exists");
            return Err(SqliteStoreError::Conflict(message).into());
        }
        write_record(self.connection, record, self.max_versions)?;
        Ok(())
    }

    /// Replaces a record whose stored revision is exactly one behind.
    fn update<R: LedgerRecord>(&self, record: &R) -> Result<(), StoreError> {
        let address = record.address();
        let Some(current) = stored_revision(self.connection, R::TABLE, &address)? else {
            return Err(StoreError::Invalid(format!(
                "{} {address} does not exist",
                R::TABLE.kind()
            )));
        };
        check_revision(current, record.revision(), &address)?;
        write_record(self.connection, record, self.max_versions)?;
        Ok(())
    }
}

impl LedgerTransaction for SqliteTransaction<'_> {
    fn rule(&mut self, address: &RecordAddress) -> Result<Option<AccessRule>, StoreError> {
        Ok(load_record(self.connection, address)?)
    }

    fn certificate(
        &mut self,
        address: &RecordAddress,
    ) -> Result<Option<AccessCertificate>, StoreError> {
        Ok(load_record(self.connection, address)?)
    }

    fn insert_rule(&mut self, rule: &AccessRule) -> Result<(), StoreError> {
        self.insert(rule)
    }

    fn update_rule(&mut self, rule: &AccessRule) -> Result<(), StoreError> {
        self.update(rule)
    }

    fn insert_certificate(&mut self, certificate: &AccessCertificate) -> Result<(), StoreError> {
        self.insert(certificate)
    }

    fn update_certificate(&mut self, certificate: &AccessCertificate) -> Result<(), StoreError> {
        self.update(certificate)
    }
}

// ============================================================================
// SECTION: Row Access
// ============================================================================

/// Returns the stored revision of a record, if present.
fn stored_revision(
    connection: &Connection,
    table: RecordTable,
    address: &RecordAddress,
) -> Result<Option<u64>, SqliteStoreError> {
    let revision: Option<i64> = connection
        .query_row(
            &format!("SELECT revision FROM {} WHERE address = ?1", table.name()),
            params![address.to_hex()],
            |row| row.get(0),
        )
        .optional()
        .map_err(db_error)?;
    revision
        .map(|value| {
            u64::try_from(value).map_err(|_| {
                let kind = table.kind();
                SqliteStoreError::Corrupt(format!("negative revision for {kind} {address}"))
            })
        })
        .transpose()
}

/// Loads and verifies one record.
fn load_record<R: LedgerRecord>(
    connection: &Connection,
    address: &RecordAddress,
) -> Result<Option<R>, SqliteStoreError> {
    let table = R::TABLE;
    let key = address.to_hex();
    let metadata = connection
        .query_row(
            &format!(
                "SELECT length(record_json), record_hash, hash_algorithm, revision FROM {} WHERE \
                 address = ?1",
                table.name()
            ),
            params![key],
            |row| {
                let length: i64 = row.get(0)?;
                let hash: String = row.get(1)?;
                let algorithm: String = row.get(2)?;
                let revision: i64 = row.get(3)?;
                Ok((length, hash, algorithm, revision))
            },
        )
        .optional()
        .map_err(db_error)?;
    let Some((length, hash_value, hash_algorithm, revision)) = metadata else {
        return Ok(None);
    };
    let length = usize::try_from(length).map_err(|_| {
        SqliteStoreError::Invalid(format!("negative record length for {} {address}", table.kind()))
    })?;
    if length > MAX_RECORD_BYTES {
        return Err(SqliteStoreError::TooLarge {
            max_bytes: MAX_RECORD_BYTES,
            actual_bytes: length,
        });
    }
    let bytes: Vec<u8> = connection
        .query_row(
            &format!("SELECT record_json FROM {} WHERE address = ?1", table.name()),
            params![key],
            |row| row.get(0),
        )
        .map_err(db_error)?;
    let algorithm = parse_hash_algorithm(&hash_algorithm)?;
    let expected = hash_bytes(algorithm, &bytes);
    if expected.value != hash_value {
        return Err(SqliteStoreError::Corrupt(format!(
            "hash mismatch for {} {address}",
            table.kind()
        )));
    }
    let record: R =
        serde_json::from_slice(&bytes).map_err(|err| SqliteStoreError::Invalid(err.to_string()))?;
    if record.address() != *address {
        return Err(SqliteStoreError::Invalid(format!(
            "address mismatch between key and payload for {} {address}",
            table.kind()
        )));
    }
    if i64::try_from(record.revision()).ok() != Some(revision) {
        return Err(SqliteStoreError::Corrupt(format!(
            "revision mismatch between column and payload for {} {address}",
            table.kind()
        )));
    }
    Ok(Some(record))
}

/// Upserts a record row and appends it to the history table.
fn write_record<R: LedgerRecord>(
    connection: &Connection,
    record: &R,
    max_versions: Option<u64>,
) -> Result<(), SqliteStoreError> {
    let table = R::TABLE;
    let address = record.address();
    let canonical_json =
        canonical_json_bytes(record).map_err(|err| SqliteStoreError::Invalid(err.to_string()))?;
    if canonical_json.len() > MAX_RECORD_BYTES {
        return Err(SqliteStoreError::TooLarge {
            max_bytes: MAX_RECORD_BYTES,
            actual_bytes: canonical_json.len(),
        });
    }
    let digest = hash_bytes(DEFAULT_HASH_ALGORITHM, &canonical_json);
    let revision = i64::try_from(record.revision())
        .map_err(|_| SqliteStoreError::Invalid(format!("revision overflow for {address}")))?;
    let key = address.to_hex();
    connection
        .execute(
            &format!(
                "INSERT INTO {} (address, record_json, record_hash, hash_algorithm, revision) \
                 VALUES (?1, ?2, ?3, ?4, ?5) ON CONFLICT(address) DO UPDATE SET record_json = \
                 excluded.record_json, record_hash = excluded.record_hash, hash_algorithm = \
                 excluded.hash_algorithm, revision = excluded.revision",
                table.name()
            ),
            params![key, canonical_json, digest.value, digest.algorithm.label(), revision],
        )
        .map_err(db_error)?;
    connection
        .execute(
            "INSERT INTO record_history (address, kind, revision, record_json, record_hash, \
             hash_algorithm, saved_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                key,
                table.kind(),
                revision,
                canonical_json,
                digest.value,
                digest.algorithm.label(),
                unix_millis()
            ],
        )
        .map_err(db_error)?;
    enforce_retention(connection, &key, revision, max_versions)
}

/// Prunes history beyond the retention limit.
fn enforce_retention(
    connection: &Connection,
    key: &str,
    latest_revision: i64,
    max_versions: Option<u64>,
) -> Result<(), SqliteStoreError> {
    let Some(max_versions) = max_versions else {
        return Ok(());
    };
    let max_versions = i64::try_from(max_versions)
        .map_err(|_| SqliteStoreError::Invalid("max_versions too large".to_string()))?;
    if latest_revision > max_versions {
        let min_revision = latest_revision - max_versions + 1;
        connection
            .execute(
                "DELETE FROM record_history WHERE address = ?1 AND revision < ?2",
                params![key, min_revision],
            )
            .map_err(db_error)?;
    }
    Ok(())
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Ensures the parent directory for the store exists.
fn ensure_parent_dir(path: &Path) -> Result<(), SqliteStoreError> {
    let Some(parent) = path.parent() else {
        return Err(SqliteStoreError::Io("store path missing parent directory".to_string()));
    };
    std::fs::create_dir_all(parent).map_err(|err| SqliteStoreError::Io(err.to_string()))
}

/// Validates store paths for safety limits.
fn validate_store_path(path: &Path) -> Result<(), SqliteStoreError> {
    let path_string = path.display().to_string();
    if path_string.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(SqliteStoreError::Invalid("store path exceeds length limit".to_string()));
    }
    for component in path.components() {
        let name = component.as_os_str().to_string_lossy();
        if name.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(SqliteStoreError::Invalid(
                "store path contains an overlong component".to_string(),
            ));
        }
    }
    if path.is_dir() {
        return Err(SqliteStoreError::Invalid(
            "store path must be a file, not a directory".to_string(),
        ));
    }
    Ok(())
}

/// Opens an `SQLite` connection with secure defaults.
fn open_connection(config: &SqliteStoreConfig) -> Result<Connection, SqliteStoreError> {
    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
        | OpenFlags::SQLITE_OPEN_CREATE
        | OpenFlags::SQLITE_OPEN_FULL_MUTEX;
    let connection = Connection::open_with_flags(&config.path, flags).map_err(db_error)?;
    apply_pragmas(&connection, config)?;
    Ok(connection)
}

/// Applies `SQLite` pragmas required for durability.
fn apply_pragmas(
    connection: &Connection,
    config: &SqliteStoreConfig,
) -> Result<(), SqliteStoreError> {
    connection.execute_batch("PRAGMA foreign_keys = ON;").map_err(db_error)?;
    connection
        .execute_batch(&format!("PRAGMA journal_mode = {};", config.journal_mode.pragma_value()))
        .map_err(db_error)?;
    connection
        .execute_batch(&format!("PRAGMA synchronous = {};", config.sync_mode.pragma_value()))
        .map_err(db_error)?;
    connection
        .busy_timeout(std::time::Duration::from_millis(config.busy_timeout_ms))
        .map_err(db_error)?;
    Ok(())
}

/// Initializes the `SQLite` schema or validates the existing version.
fn initialize_schema(connection: &mut Connection) -> Result<(), SqliteStoreError> {
    let tx = connection.transaction().map_err(db_error)?;
    tx.execute_batch("CREATE TABLE IF NOT EXISTS store_meta (version INTEGER NOT NULL);")
        .map_err(db_error)?;
    let version: Option<i64> = tx
        .query_row("SELECT version FROM store_meta LIMIT 1", params![], |row| row.get(0))
        .optional()
        .map_err(db_error)?;
    match version {
        None => {
            tx.execute("INSERT INTO store_meta (version) VALUES (?1)", params![SCHEMA_VERSION])
                .map_err(db_error)?;
            tx.execute_batch(
                "CREATE TABLE IF NOT EXISTS rules (
                    address TEXT PRIMARY KEY,
                    record_json BLOB NOT NULL,
                    record_hash TEXT NOT NULL,
                    hash_algorithm TEXT NOT NULL,
                    revision INTEGER NOT NULL
                );
                CREATE TABLE IF NOT EXISTS certificates (
                    address TEXT PRIMARY KEY,
                    record_json BLOB NOT NULL,
                    record_hash TEXT NOT NULL,
                    hash_algorithm TEXT NOT NULL,
                    revision INTEGER NOT NULL
                );
                CREATE TABLE IF NOT EXISTS record_history (
                    address TEXT NOT NULL,
                    kind TEXT NOT NULL,
                    revision INTEGER NOT NULL,
                    record_json BLOB NOT NULL,
                    record_hash TEXT NOT NULL,
                    hash_algorithm TEXT NOT NULL,
                    saved_at INTEGER NOT NULL,
                    PRIMARY KEY (address, revision)
                );",
            )
            .map_err(db_error)?;
        }
        Some(value) if value == SCHEMA_VERSION => {}
        Some(value) => {
            return Err(SqliteStoreError::VersionMismatch(format!(
                "unsupported schema version: {value}"
            )));
        }
    }
    tx.commit().map_err(db_error)?;
    Ok(())
}

/// Returns the current unix epoch in milliseconds.
fn unix_millis() -> i64 {
    let now = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default();
    i64::try_from(now.as_millis()).unwrap_or(i64::MAX)
}

/// Parses a hash algorithm label.
fn parse_hash_algorithm(label: &str) -> Result<HashAlgorithm, SqliteStoreError> {
    HashAlgorithm::from_label(label).ok_or_else(|| {
        SqliteStoreError::Invalid(format!("unsupported hash algorithm: {label}"))
    })
}
