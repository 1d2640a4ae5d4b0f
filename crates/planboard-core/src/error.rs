//! Core error types for planboard-core.
//!
//! This module defines the error hierarchy using thiserror. Each concern
//! (dates, validation, storage, configuration, reports) has its own enum and
//! `CoreError` wraps them for callers that do not care which one failed.

use std::path::PathBuf;
use thiserror::Error;

pub use crate::import::ImportError;

/// Core error type for planboard-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Malformed civil dates
    #[error("Date error: {0}")]
    Date(#[from] DateError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Activity store errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// CSV import errors
    #[error("Import error: {0}")]
    Import(#[from] ImportError),

    /// Report service errors
    #[error("Report error: {0}")]
    Report(#[from] ReportError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A civil date that could not be parsed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DateError {
    #[error("invalid {field} '{value}': expected YYYY-MM-DD")]
    Invalid { field: String, value: String },

    #[error("invalid month '{0}': expected YYYY-MM")]
    InvalidMonth(String),
}

/// Validation errors for activity drafts and their attributes.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Activity name is blank after trimming
    #[error("Activity name is required")]
    EmptyName,

    /// Board label not in the known set
    #[error("Invalid Board \"{0}\"")]
    UnknownBoard(String),

    /// Status label not in the known set
    #[error("Invalid Status \"{0}\"")]
    UnknownStatus(String),

    /// Recurrence frequency label not in the known set
    #[error("Invalid frequency \"{0}\"")]
    UnknownFrequency(String),

    /// Update scope label not in the known set
    #[error("Invalid scope \"{0}\": expected single, future or all")]
    UnknownScope(String),

    /// Weekday outside 0 (Sunday) ..= 6 (Saturday)
    #[error("Invalid weekday \"{0}\"")]
    InvalidWeekday(String),
}

/// Activity store failures.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Failed to open database connection
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    Query(#[from] rusqlite::Error),

    /// A JSON column could not be encoded or decoded
    #[error("Column encoding failed: {0}")]
    Encoding(#[from] serde_json::Error),

    /// A stored date column is malformed
    #[error("Stored record is corrupt: {0}")]
    Date(#[from] DateError),

    /// A stored enum column is malformed
    #[error("Stored record is corrupt: {0}")]
    Invalid(#[from] ValidationError),

    /// Failed to locate the data directory
    #[error("Failed to access data directory: {0}")]
    DataDir(String),
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

    /// Unknown dot-path key
    #[error("unknown config key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Failed to locate the data directory
    #[error("Failed to access data directory: {0}")]
    DataDir(String),
}

/// Report generation service errors.
#[derive(Error, Debug)]
pub enum ReportError {
    /// API key environment variable is unset or empty
    #[error("Report API key not configured: set {var}")]
    MissingApiKey { var: String },

    /// Transport-level failure
    #[error("Report request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Service answered with a non-success status
    #[error("Report service error (HTTP {status}): {body}")]
    Http { status: u16, body: String },

    /// Prompt could not be encoded
    #[error("Failed to encode report prompt: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_error_wraps_concerns() {
        let err: CoreError = ValidationError::UnknownBoard("CHESS".into()).into();
        assert_eq!(err.to_string(), "Validation error: Invalid Board \"CHESS\"");

        let err: CoreError = ImportError::EndBeforeStart { line: 4 }.into();
        assert_eq!(
            err.to_string(),
            "Import error: Row 4: End Date is before Start Date."
        );
    }
}
