//! Core error types for fittimer-core.
//!
//! This module defines the error hierarchy using thiserror. The timer
//! engine itself performs no I/O, so its only failure mode is a rejected
//! transition ([`TransitionError`]); everything else comes from the
//! storage and configuration layers around it.

use std::path::PathBuf;
use thiserror::Error;

use crate::timer::Phase;

/// Core error type for fittimer-core.
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

    /// A timer operation was invoked where it is not permitted
    #[error("Invalid transition: {0}")]
    Transition(#[from] TransitionError),
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
    /// Data directory could not be determined or created
    #[error("Failed to prepare data directory {path}: {message}")]
    DataDir { path: PathBuf, message: String },

    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Unknown dot-separated key
    #[error("unknown config key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

/// Validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// Empty collection
    #[error("Empty collection: {0}")]
    EmptyCollection(String),

    /// Out of bounds
    #[error("Index {index} out of bounds for {collection} (length: {len})")]
    OutOfBounds {
        collection: String,
        index: usize,
        len: usize,
    },

    /// Referenced record does not exist
    #[error("No {kind} with id '{id}'")]
    NotFound { kind: String, id: String },

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

/// A phase-specific timer operation was invoked in the wrong state.
///
/// The engine leaves its run state untouched whenever it returns one of these.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransitionError {
    /// No exercise has been started on this engine
    #[error("no exercise has been started")]
    NotStarted,

    /// The run already finished
    #[error("the run is already completed")]
    Completed,

    /// Operation requires a different phase
    #[error("'{operation}' is not allowed during the {phase} phase")]
    WrongPhase {
        operation: &'static str,
        phase: Phase,
    },

    /// Skipping forward from the last set
    #[error("set {current_set} of {set_count} is the last set; there is no next set")]
    NoNextSet { current_set: u32, set_count: u32 },

    /// The final set is never followed by a rest phase
    #[error("the final set has no rest phase")]
    NoRestAfterFinalSet,
}

impl From<rusqlite::Error> for DatabaseError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(e, _msg)
                if e.code == rusqlite::ErrorCode::DatabaseLocked =>
            {
                DatabaseError::Locked
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
    fn transition_error_messages() {
        let err = TransitionError::WrongPhase {
            operation: "skip_to_rest",
            phase: Phase::Rest,
        };
        assert_eq!(
            err.to_string(),
            "'skip_to_rest' is not allowed during the rest phase"
        );

        let err = TransitionError::NoNextSet {
            current_set: 4,
            set_count: 4,
        };
        assert!(err.to_string().contains("set 4 of 4"));
    }

    #[test]
    fn transition_error_wraps_into_core_error() {
        let err: CoreError = TransitionError::Completed.into();
        assert!(matches!(err, CoreError::Transition(TransitionError::Completed)));
        assert_eq!(err.to_string(), "Invalid transition: the run is already completed");
    }
}
