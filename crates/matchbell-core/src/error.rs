//! Core error types for matchbell-core.
//!
//! All fallible operations in the library report through this hierarchy.
//! Errors are local to the failing call; nothing in the engine retries.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for matchbell-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Clock and start-time errors
    #[error("clock error: {0}")]
    Clock(#[from] ClockError),

    /// Configuration-related errors
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors from the corrected clock and start-time parsing.
#[derive(Error, Debug)]
pub enum ClockError {
    /// Remaining time was requested before the clock correction was set.
    /// This is an ordering bug in the caller, not a runtime condition.
    #[error("clock correction has not been set")]
    NotSynced,

    /// A start-time string that is not a recognizable timestamp.
    #[error("unparseable start timestamp '{0}'")]
    InvalidTimestamp(String),

    /// A start-time value that is neither a string nor a number.
    #[error("start time must be an ISO-8601 string or Unix seconds, got {0}")]
    UnsupportedStartTime(&'static str),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Unknown configuration key
    #[error("unknown config key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("invalid value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
