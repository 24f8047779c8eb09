//! Identity issuer error types.

use thiserror::Error;

/// Identity issuer and wallet errors
#[derive(Debug, Error)]
pub enum IssuerError {
    /// Identity already registered with the issuer or present in the wallet
    #[error("Identity already registered: {0}")]
    AlreadyRegistered(String),

    /// Identity was never registered
    #[error("Identity not registered: {0}")]
    NotRegistered(String),

    /// Enrollment secret rejected by the issuer
    #[error("Enrollment authentication failed for identity: {0}")]
    AuthenticationFailed(String),

    /// Identity has used up its enrollments
    #[error("Enrollment limit reached for identity: {0}")]
    EnrollmentLimitReached(String),

    /// Identifier cannot be used as a wallet label
    #[error("Invalid identity label: {0}")]
    InvalidIdentity(String),

    /// Credential encoding error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Wallet IO error
    #[error("Wallet IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for issuer operations
pub type Result<T> = std::result::Result<T, IssuerError>;
