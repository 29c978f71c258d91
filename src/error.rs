//! Custom error types for the agreement backend
//!
//! This module defines the error hierarchy for the application using thiserror
//! for ergonomic error definitions.

use thiserror::Error;

use crate::models::MoneyOverflow;

/// The main error type for convenios operations
#[derive(Error, Debug)]
pub enum ConvenioError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// Validation errors for data models
    #[error("Validation error: {0}")]
    Validation(String),

    /// Entity not found errors
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },

    /// Duplicate entity errors
    #[error("{entity_type} already exists: {identifier}")]
    Duplicate {
        entity_type: &'static str,
        identifier: String,
    },

    /// Entity is still referenced and cannot be deleted
    #[error("{entity_type} '{identifier}' is referenced by {count} {referenced_by}")]
    Protected {
        entity_type: &'static str,
        identifier: String,
        referenced_by: &'static str,
        count: usize,
    },

    /// Report generation errors
    #[error("Report error: {0}")]
    Report(String),

    /// Export errors
    #[error("Export error: {0}")]
    Export(String),

    /// Storage errors
    #[error("Storage error: {0}")]
    Storage(String),
}

impl ConvenioError {
    /// Create a "not found" error for agreements
    pub fn agreement_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Agreement",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for companies
    pub fn company_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Company",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for contracts
    pub fn contract_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Contract",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for amendments
    pub fn amendment_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Amendment",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for payments
    pub fn payment_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Payment",
            identifier: identifier.into(),
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

impl From<std::io::Error> for ConvenioError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for ConvenioError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

impl From<MoneyOverflow> for ConvenioError {
    fn from(err: MoneyOverflow) -> Self {
        Self::Report(err.to_string())
    }
}

/// Result type alias for convenios operations
pub type ConvenioResult<T> = Result<T, ConvenioError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ConvenioError::Config("test error".into());
        assert_eq!(err.to_string(), "Configuration error: test error");
    }

    #[test]
    fn test_not_found_error() {
        let err = ConvenioError::agreement_not_found("cnv-1234abcd");
        assert_eq!(err.to_string(), "Agreement not found: cnv-1234abcd");
        assert!(err.is_not_found());
        assert!(!err.is_validation());
    }

    #[test]
    fn test_protected_error() {
        let err = ConvenioError::Protected {
            entity_type: "Company",
            identifier: "12.345.678/0001-90".into(),
            referenced_by: "contract(s)",
            count: 2,
        };
        assert_eq!(
            err.to_string(),
            "Company '12.345.678/0001-90' is referenced by 2 contract(s)"
        );
    }

    #[test]
    fn test_money_overflow_is_report_error() {
        let err: ConvenioError = MoneyOverflow.into();
        assert!(matches!(err, ConvenioError::Report(_)));
        assert_eq!(err.to_string(), "Report error: Money total out of range");
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: ConvenioError = io_err.into();
        assert!(matches!(err, ConvenioError::Io(_)));
    }
}
