//! Core error types for ritual-core.
//!
//! Every failure kind the engine can report is a `CoreError` variant;
//! storage and configuration failures nest their own enums underneath.

use std::path::PathBuf;

use chrono::NaiveDate;
use thiserror::Error;

/// Core error type for ritual-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// The habit does not exist, is not owned by the caller, or is not active
    #[error("Habit {habit_id} not found")]
    HabitNotFound { habit_id: i64 },

    /// A check-in already exists for this habit and date
    #[error("Habit {habit_id} already has a check-in for {date}")]
    DuplicateCheckin { habit_id: i64, date: NaiveDate },

    /// Makeup check-ins are restricted to exactly yesterday
    #[error("Makeup check-ins are only allowed for yesterday, got {date}")]
    InvalidMakeupWindow { date: NaiveDate },

    /// The user's balance cannot cover the requested spend
    #[error("Insufficient points: {required} required, {available} available")]
    InsufficientPoints { required: i64, available: i64 },

    /// The reward id is not in the catalog
    #[error("Reward '{reward_id}' not found")]
    RewardNotFound { reward_id: String },

    /// No user row for this id
    #[error("User {user_id} not found")]
    UserNotFound { user_id: i64 },

    /// A multi-write transaction could not be applied atomically
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

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

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

impl From<rusqlite::Error> for DatabaseError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(err, _msg) => {
                if err.code == rusqlite::ErrorCode::DatabaseLocked {
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
