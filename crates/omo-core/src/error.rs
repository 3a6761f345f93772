//! Core error types for omo-core.
//!
//! The bladder model itself is total and never fails. Errors come from the
//! pieces around it: misuse of the hold timers, session rules, reading and
//! writing the accident log, and configuration.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for omo-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Accident log errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Stopwatch or countdown misuse
    #[error("Timer error: {0}")]
    Timer(#[from] TimerError),

    /// Tracking session rule violations
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
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

    /// Key does not name a configuration value
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Data directory could not be prepared
    #[error("Data directory unavailable at {path}: {source}")]
    DataDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Accident log errors.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Reading or writing the record file failed
    #[error("I/O on {path} failed: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A record could not be read as an amount
    #[error("{path}:{line}: cannot parse '{value}' as an amount")]
    Parse {
        path: PathBuf,
        line: usize,
        value: String,
    },
}

/// Stopwatch and countdown errors.
///
/// `InvalidState` is a caller-contract violation. `InvalidDuration` is bad
/// input data.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TimerError {
    /// Operation not valid in the current run/pause state
    #[error("cannot {operation} a {timer} that is {state}")]
    InvalidState {
        timer: &'static str,
        operation: &'static str,
        state: &'static str,
    },

    /// Countdown duration is zero or does not fit in milliseconds
    #[error("countdown duration is zero or too long")]
    InvalidDuration,
}

/// Tracking session errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// Not enough has been absorbed since the last permission decision
    #[error("permission was asked too recently; keep holding")]
    AskTooSoon,

    /// Voiding requires a granted permission
    #[error("permission has not been granted")]
    NotPermitted,
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
