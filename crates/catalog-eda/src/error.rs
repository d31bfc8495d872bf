//! Custom error types for the EDA core.
//!
//! This module provides the error hierarchy using `thiserror`. Every
//! analysis section reports its own error, so errors are serializable
//! (as `{code, message}`) and can be embedded directly in a report.

use serde::Serialize;
use serde::ser::SerializeStruct;
use thiserror::Error;

/// The main error type for loading and analysing a dataset.
#[derive(Error, Debug)]
pub enum EdaError {
    /// The input file is missing or unreadable.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed delimited content (ragged rows, broken quoting, no header).
    #[error("Failed to parse dataset: {0}")]
    Parse(String),

    /// An expected column is absent or has the wrong kind.
    #[error("Schema error: {0}")]
    Schema(String),

    /// A per-column computation lacks enough non-missing values.
    #[error("Column '{column}' has {available} non-missing values, {required} required")]
    InsufficientData {
        column: String,
        available: usize,
        required: usize,
    },

    /// Invalid configuration or request parameters.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<EdaError>,
    },
}

impl EdaError {
    /// Shorthand for a missing column.
    pub fn column_not_found(column: &str) -> Self {
        EdaError::Schema(format!("column '{column}' not found in dataset"))
    }

    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        EdaError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Stable error code for consumers of the report.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Io(_) => "IO_ERROR",
            Self::Parse(_) => "PARSE_ERROR",
            Self::Schema(_) => "SCHEMA_ERROR",
            Self::InsufficientData { .. } => "INSUFFICIENT_DATA",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// Check if this error comes from reading the input file.
    pub fn is_load_failure(&self) -> bool {
        match self {
            Self::Io(_) | Self::Parse(_) => true,
            Self::WithContext { source, .. } => source.is_load_failure(),
            _ => false,
        }
    }
}

impl From<crate::config::ConfigValidationError> for EdaError {
    fn from(err: crate::config::ConfigValidationError) -> Self {
        EdaError::InvalidConfig(err.to_string())
    }
}

/// Errors are serialized as a struct with `code` and `message` fields.
impl Serialize for EdaError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("EdaError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for EDA operations.
pub type Result<T> = std::result::Result<T, EdaError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| EdaError::Polars(e).with_context(context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code() {
        assert_eq!(EdaError::Parse("bad".to_string()).error_code(), "PARSE_ERROR");
        assert_eq!(
            EdaError::column_not_found("Genre").error_code(),
            "SCHEMA_ERROR"
        );
        assert_eq!(
            EdaError::InsufficientData {
                column: "x".to_string(),
                available: 2,
                required: 4,
            }
            .error_code(),
            "INSUFFICIENT_DATA"
        );
    }

    #[test]
    fn test_is_load_failure() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        assert!(EdaError::Io(io).is_load_failure());
        assert!(EdaError::Parse("ragged".to_string()).is_load_failure());
        assert!(!EdaError::Schema("x".to_string()).is_load_failure());
        assert!(
            EdaError::Parse("ragged".to_string())
                .with_context("Loading catalog")
                .is_load_failure()
        );
    }

    #[test]
    fn test_error_serialization() {
        let error = EdaError::column_not_found("IMDb Score");
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("SCHEMA_ERROR"));
        assert!(json.contains("IMDb Score"));
    }

    #[test]
    fn test_with_context() {
        let error = EdaError::column_not_found("Genre").with_context("During genre expansion");
        assert!(error.to_string().contains("During genre expansion"));
        assert_eq!(error.error_code(), "SCHEMA_ERROR");
    }

    #[test]
    fn test_insufficient_data_message() {
        let error = EdaError::InsufficientData {
            column: "Boxoffice".to_string(),
            available: 3,
            required: 4,
        };
        assert_eq!(
            error.to_string(),
            "Column 'Boxoffice' has 3 non-missing values, 4 required"
        );
    }
}
