//! Database-specific error types
//!
//! This module defines all error types that can occur during storage operations.
//!
//! # Error Types
//!
//! - **`SledError`**: Errors from the underlying sled embedded database
//! - **`DecodeError`**: Failures when deserializing stored records
//! - **`EncodeError`**: Failures when serializing records
//! - **`SerializeError`**: Malformed keys or values
//! - **`Unavailable`**: Storage refused the operation (used by in-memory storage
//!   to simulate write failures)

use thiserror::Error;

/// Database-specific errors
#[derive(Debug, Error)]
pub enum DbError {
    /// Represents a sled database error
    #[error("Database error: {0}")]
    SledError(#[from] sled::Error),

    /// Represents a bincode decoding error
    #[error("Error while decoding data: {0}")]
    DecodeError(#[from] bincode::error::DecodeError),

    /// Represents a bincode encoding error
    #[error("Error while encoding data: {0}")]
    EncodeError(#[from] bincode::error::EncodeError),

    /// Generic serialization/deserialization error
    #[error("Error during serialization: {0}")]
    SerializeError(String),

    /// Storage is not accepting the operation
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialize_error_display() {
        let error = DbError::SerializeError("bad key".to_string());
        assert_eq!(error.to_string(), "Error during serialization: bad key");
    }

    #[test]
    fn test_unavailable_display() {
        let error = DbError::Unavailable("writes disabled".to_string());
        assert!(error.to_string().contains("writes disabled"));
    }
}
