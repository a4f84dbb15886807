//! Custom error types for Moneybags
//!
//! This module defines the error hierarchy for the application using thiserror
//! for ergonomic error definitions.

use thiserror::Error;

/// The main error type for Moneybags operations
#[derive(Error, Debug)]
pub enum MoneybagsError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// Validation errors for submitted data
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

    /// Entity is still referenced and cannot be removed
    #[error("{0}")]
    InUse(String),

    /// Spreadsheet import errors
    #[error("Import error: {0}")]
    Import(String),

    /// Export errors
    #[error("Export error: {0}")]
    Export(String),

    /// Storage errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// The database could not be reached; the caller may retry
    #[error("Database unavailable: {0}")]
    Unavailable(String),
}

impl MoneybagsError {
    /// Create a "not found" error for categories
    pub fn category_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Category",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for payees
    pub fn payee_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Payee",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for transactions
    pub fn transaction_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Transaction",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for budget entries
    pub fn budget_entry_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Budget entry",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for supersaver categories
    pub fn supersaver_category_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Supersaver category",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for supersaver entries
    pub fn supersaver_entry_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Supersaver entry",
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

    /// Check if the failure is transient and the operation can be retried
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

// Implement From traits for common error types

impl From<std::io::Error> for MoneybagsError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for MoneybagsError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

impl From<sqlx::Error> for MoneybagsError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed
            | sqlx::Error::Io(_) => Self::Unavailable(err.to_string()),
            sqlx::Error::Configuration(_) => Self::Config(err.to_string()),
            other => Self::Storage(other.to_string()),
        }
    }
}

/// Result type alias for Moneybags operations
pub type MoneybagsResult<T> = Result<T, MoneybagsError>;
