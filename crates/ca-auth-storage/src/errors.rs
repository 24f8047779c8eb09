//! Storage error types.

use thiserror::Error;

/// Document store operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    /// Store-side failure
    #[error("Database error: {0}")]
    Database(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Deserialization error
    #[error("Deserialization error: {0}")]
    Deserialization(String),

    /// Document with this key already exists
    #[error("Document already exists")]
    AlreadyExists,

    /// Database has not been provisioned
    #[error("Database not found: {0}")]
    DatabaseNotFound(String),

    /// Store unreachable or request timed out
    #[error("Transport error: {0}")]
    Transport(String),

    /// Store answered with a status the client does not handle
    #[error("Unexpected response: status={status}, reason={reason}")]
    UnexpectedStatus { status: u16, reason: String },

    /// Store URL cannot be used as a base
    #[error("Invalid store URL: {0}")]
    InvalidUrl(String),
}

/// Result type for storage operations
pub type Result<T> = std::result::Result<T, StorageError>;
