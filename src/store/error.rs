//! Document store error types

use thiserror::Error;

/// Errors that can occur in the document store
#[derive(Error, Debug)]
pub enum StoreError {
    /// I/O operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization failed
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// A filter referenced a field in a way that cannot be evaluated
    #[error("Invalid filter: {0}")]
    InvalidFilter(String),

    /// Filter query-string could not be parsed
    #[error("Query parse error: {0}")]
    QueryParse(String),

    /// A transaction was used after commit or rollback
    #[error("Transaction closed: {0}")]
    TransactionClosed(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

/// Result type alias for store operations
pub type StoreResult<T> = Result<T, StoreError>;
