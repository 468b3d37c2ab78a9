//! Core error types for lanlearner-core.
//!
//! The scheduling core itself never fails; these errors belong to the layers
//! around it (collection lookups, storage, configuration, backups).

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for lanlearner-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Backup import/export errors
    #[error("Transfer error: {0}")]
    Transfer(#[from] TransferError),

    /// No card with the given id exists in the collection
    #[error("Card not found: {id}")]
    CardNotFound { id: String },

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Database-specific errors.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Failed to open database connection
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Migration failed
    #[error("Database migration failed: {0}")]
    MigrationFailed(String),

    /// A stored row could not be decoded
    #[error("Corrupt row in '{table}': {message}")]
    CorruptRow { table: String, message: String },

    /// Database is locked
    #[error("Database is locked")]
    Locked,
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Unknown configuration key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

/// Validation errors for cards entering the collection from outside.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    /// Stage outside `[0, MAX_STAGE]`
    #[error("Card {card_id}: stage {stage} is outside 0..={max}")]
    StageOutOfRange { card_id: String, stage: i64, max: i64 },

    /// Review count disagrees with the number of history entries
    #[error("Card {card_id}: reviewCount is {review_count} but history has {history_len} entries")]
    HistoryMismatch {
        card_id: String,
        review_count: u64,
        history_len: usize,
    },

    /// A history entry records an impossible stage
    #[error("Card {card_id}: history entry {index} has stage outside 0..={max}")]
    HistoryStageOutOfRange {
        card_id: String,
        index: usize,
        max: i64,
    },

    /// Title must not be blank
    #[error("Card title must not be empty")]
    EmptyTitle,

    /// Two cards share one id
    #[error("Duplicate card id: {0}")]
    DuplicateId(String),

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

/// Backup import/export errors.
#[derive(Error, Debug)]
pub enum TransferError {
    /// The backup has no lossless card section
    #[error("Backup is missing the raw card data section")]
    MissingRawData,

    /// The backup was written by an incompatible version
    #[error("Unsupported backup format '{format}' version {version}")]
    UnsupportedFormat { format: String, version: u32 },

    /// A raw row could not be decoded into a card
    #[error("Malformed raw row for card '{id}': {message}")]
    MalformedRow { id: String, message: String },

    /// CSV writer failure
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl From<rusqlite::Error> for DatabaseError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(e, _msg) => {
                if e.code == rusqlite::ErrorCode::DatabaseLocked
                    || e.code == rusqlite::ErrorCode::DatabaseBusy
                {
                    DatabaseError::Locked
                } else {
                    DatabaseError::QueryFailed(err.to_string())
                }
            }
            _ => DatabaseError::QueryFailed(err.to_string()),
        }
    }
}

impl From<rusqlite::Error> for CoreError {
    fn from(err: rusqlite::Error) -> Self {
        CoreError::Database(err.into())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locked_sqlite_maps_to_locked() {
        let err = rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_BUSY),
            None,
        );
        assert!(matches!(DatabaseError::from(err), DatabaseError::Locked));
    }

    #[test]
    fn card_not_found_message_names_id() {
        let err = CoreError::CardNotFound { id: "abc".into() };
        assert_eq!(err.to_string(), "Card not found: abc");
    }
}
