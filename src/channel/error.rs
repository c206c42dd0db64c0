//! Channel engine error types

use thiserror::Error;

use crate::store::StoreError;

/// Errors that can occur in the channel-data engine
#[derive(Error, Debug)]
pub enum ChannelError {
    /// Two input records share a primary index value
    #[error("Duplicate index value: {0}")]
    DuplicateIndex(f64),

    /// Input records violate the configured index direction
    #[error("Index out of order: {previous} then {current}")]
    IndexOutOfOrder { previous: f64, current: f64 },

    /// Range, direction or channel metadata is inconsistent
    #[error("Invalid range: {0}")]
    InvalidRange(String),

    /// Chunk retrieval failed
    #[error("Read error: {0}")]
    Read(#[source] StoreError),

    /// Chunk insert failed
    #[error("Write error: {0}")]
    Write(#[source] StoreError),

    /// Chunk replacement failed
    #[error("Update error: {0}")]
    Update(#[source] StoreError),

    /// Cascade delete failed
    #[error("Delete error: {0}")]
    Delete(#[source] StoreError),

    /// A referenced object does not exist
    #[error("Not found: {0}")]
    NotFound(String),
}

/// Result type alias for channel engine operations
pub type ChannelResult<T> = Result<T, ChannelError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ChannelError::DuplicateIndex(100.0);
        assert_eq!(err.to_string(), "Duplicate index value: 100");

        let err = ChannelError::IndexOutOfOrder {
            previous: 300.0,
            current: 200.0,
        };
        assert_eq!(err.to_string(), "Index out of order: 300 then 200");
    }
}
