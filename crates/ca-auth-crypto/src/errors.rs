//! Cryptographic error types.

use thiserror::Error;

/// Cryptographic operation errors
#[derive(Debug, Error)]
pub enum CryptoError {
    /// Salt is not a valid B64 salt string
    #[error("Invalid salt: {0}")]
    InvalidSalt(String),

    /// Hasher parameters rejected
    #[error("Invalid hasher parameters: {0}")]
    InvalidParams(String),

    /// Argon2 hashing failed
    #[error("Argon2 operation failed: {0}")]
    Argon2Failed(String),
}

/// Result type for cryptographic operations
pub type Result<T> = std::result::Result<T, CryptoError>;
