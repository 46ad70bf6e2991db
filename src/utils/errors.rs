//! Error handling for settings resolution
//!
//! This module defines the error type returned by every loading, validation
//! and derivation step, and provides a unified error handling strategy.

use std::io::ErrorKind;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for settings resolution
///
/// The type is `Clone` so a single failed resolution can be handed to every
/// caller that was waiting on it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SettingsError {
    #[error("Configuration error: required field {group}.{field} is missing")]
    MissingRequiredField { group: String, field: String },

    #[error("Configuration error: invalid value for {group}.{field}: {value:?}")]
    InvalidFieldType {
        group: String,
        field: String,
        value: String,
    },

    /// A `.env` line could not be parsed.
    ///
    /// Only the line number is reported, never the line itself.
    #[error("Configuration error: malformed line {line} in {}", path.display())]
    MalformedSourceFile { path: PathBuf, line: usize },

    #[error("Configuration error: failed to read {}: {kind}", path.display())]
    SourceRead { path: PathBuf, kind: ErrorKind },

    #[error("Configuration error: secret {group}.{field} is not set")]
    MissingSecretValue { group: String, field: String },

    #[error("Serialization error: {0}")]
    Rendering(String),
}

/// Result type alias for settings operations
pub type Result<T> = std::result::Result<T, SettingsError>;

impl SettingsError {
    pub(crate) fn missing(group: &str, field: &str) -> Self {
        SettingsError::MissingRequiredField {
            group: group.to_string(),
            field: field.to_string(),
        }
    }

    pub(crate) fn invalid(group: &str, field: &str, value: impl Into<String>) -> Self {
        SettingsError::InvalidFieldType {
            group: group.to_string(),
            field: field.to_string(),
            value: value.into(),
        }
    }

    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            SettingsError::MissingRequiredField { .. } => ErrorSeverity::Critical,
            SettingsError::InvalidFieldType { .. } => ErrorSeverity::Critical,
            SettingsError::MalformedSourceFile { .. } => ErrorSeverity::Critical,
            SettingsError::SourceRead { .. } => ErrorSeverity::Error,
            SettingsError::MissingSecretValue { .. } => ErrorSeverity::Warning,
            SettingsError::Rendering(_) => ErrorSeverity::Error,
        }
    }
}

impl From<serde_json::Error> for SettingsError {
    fn from(error: serde_json::Error) -> Self {
        SettingsError::Rendering(error.to_string())
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "INFO"),
            ErrorSeverity::Warning => write!(f, "WARN"),
            ErrorSeverity::Error => write!(f, "ERROR"),
            ErrorSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}
