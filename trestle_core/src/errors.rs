//! # Error Types
//!
//! Structured fatal errors for trestle_core. Non-fatal conditions raised while
//! editing (range violations, crossing conflicts, duplicate time periods) are
//! [`Warning`](crate::warnings::Warning)s instead and never abort a batch.
//!
//! ## Example
//!
//! ```rust
//! use trestle_core::errors::{EngineError, EngineResult};
//!
//! fn validate_tolerance(tolerance: f64) -> EngineResult<()> {
//!     if tolerance < 0.0 {
//!         return Err(EngineError::invalid_input(
//!             "tolerance",
//!             tolerance.to_string(),
//!             "Tolerance cannot be negative",
//!         ));
//!     }
//!     Ok(())
//! }
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for trestle_core operations
pub type EngineResult<T> = Result<T, EngineError>;

/// Structured error type for engine operations.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum EngineError {
    /// An input value is invalid (out of range, malformed, etc.)
    #[error("Invalid input for '{field}': {value} - {reason}")]
    InvalidInput {
        field: String,
        value: String,
        reason: String,
    },

    /// A named element does not exist in the connectivity map
    #[error("Element not found: {name}")]
    ElementNotFound { name: String },

    /// A background clash run failed
    #[error("Clash detection failed: {reason}")]
    DetectorFailed { reason: String },

    /// File I/O error
    #[error("File error: {operation} on '{path}' - {reason}")]
    FileError {
        operation: String,
        path: String,
        reason: String,
    },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {reason}")]
    SerializationError { reason: String },

    /// Schema version mismatch
    #[error("Version mismatch: file version {file_version}, expected {expected_version}")]
    VersionMismatch {
        file_version: String,
        expected_version: String,
    },

    /// Engine configuration could not be parsed or is inconsistent
    #[error("Configuration error: {reason}")]
    ConfigError { reason: String },

    /// Generic internal error (should be rare)
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl EngineError {
    /// Create an InvalidInput error
    pub fn invalid_input(
        field: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        EngineError::InvalidInput {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create an ElementNotFound error
    pub fn element_not_found(name: impl Into<String>) -> Self {
        EngineError::ElementNotFound { name: name.into() }
    }

    /// Create a DetectorFailed error
    pub fn detector_failed(reason: impl Into<String>) -> Self {
        EngineError::DetectorFailed { reason: reason.into() }
    }

    /// Create a FileError
    pub fn file_error(
        operation: impl Into<String>,
        path: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        EngineError::FileError {
            operation: operation.into(),
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a ConfigError
    pub fn config(reason: impl Into<String>) -> Self {
        EngineError::ConfigError { reason: reason.into() }
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            EngineError::InvalidInput { .. } => "INVALID_INPUT",
            EngineError::ElementNotFound { .. } => "ELEMENT_NOT_FOUND",
            EngineError::DetectorFailed { .. } => "DETECTOR_FAILED",
            EngineError::FileError { .. } => "FILE_ERROR",
            EngineError::SerializationError { .. } => "SERIALIZATION_ERROR",
            EngineError::VersionMismatch { .. } => "VERSION_MISMATCH",
            EngineError::ConfigError { .. } => "CONFIG_ERROR",
            EngineError::Internal { .. } => "INTERNAL_ERROR",
        }
    }
}

impl From<serde_json::Error> for EngineError {
    fn from(e: serde_json::Error) -> Self {
        EngineError::SerializationError { reason: e.to_string() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_serialization() {
        let error = EngineError::invalid_input("elevation", "NaN", "Elevation must be finite");
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("\"type\":\"InvalidInput\""));
        let roundtrip: EngineError = serde_json::from_str(&json).unwrap();
        assert_eq!(error, roundtrip);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(EngineError::element_not_found("B1").error_code(), "ELEMENT_NOT_FOUND");
        assert_eq!(EngineError::detector_failed("boom").error_code(), "DETECTOR_FAILED");
        assert_eq!(EngineError::config("bad").error_code(), "CONFIG_ERROR");
    }

    #[test]
    fn test_display_includes_context() {
        let error = EngineError::file_error("open", "/tmp/model.json", "not found");
        assert_eq!(error.to_string(), "File error: open on '/tmp/model.json' - not found");
    }
}
