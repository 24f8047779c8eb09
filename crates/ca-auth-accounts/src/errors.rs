//! Account error types.

use ca_auth_crypto::CryptoError;
use ca_auth_issuer::IssuerError;
use ca_auth_sessions::SessionError;
use ca_auth_storage::StorageError;
use thiserror::Error;

/// Account errors
#[derive(Debug, Error)]
pub enum AccountError {
    /// No account for the supplied identifier
    #[error("Account not found")]
    AccountNotFound,

    /// Account identifier already taken in the document store
    #[error("Account already exists: {0}")]
    DuplicateAccount(String),

    /// Identity already known to the issuer
    #[error("Identity already registered: {0}")]
    IdentityAlreadyRegistered(String),

    #[error("Wrong password")]
    WrongPassword,

    /// Validity flag is false
    #[error("Account is invalid")]
    AccountInvalid,

    #[error("No token supplied")]
    NoToken,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token expired")]
    TokenExpired,

    /// Token is valid but the wallet holds no credential for its subject
    #[error("No issuer credential for identity")]
    NoCredential,

    #[error("Authentication required")]
    Unauthenticated,

    #[error("Administrator role required")]
    Forbidden,

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Issuer registration succeeded but the account record was not written
    #[error("Identity {id} registered with issuer but account was not persisted: {source}")]
    OrphanedIdentity {
        id: String,
        #[source]
        source: StorageError,
    },

    /// Account exists but the issuer refused to enroll it
    #[error("Enrollment failed for {id}: {source}")]
    EnrollmentFailed {
        id: String,
        #[source]
        source: IssuerError,
    },

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Issuer error: {0}")]
    Issuer(#[from] IssuerError),

    #[error("Session error: {0}")]
    Session(SessionError),

    #[error("Crypto error: {0}")]
    Crypto(#[from] CryptoError),
}

impl From<SessionError> for AccountError {
    fn from(e: SessionError) -> Self {
        match e {
            SessionError::NoToken => AccountError::NoToken,
            SessionError::InvalidToken => AccountError::InvalidToken,
            SessionError::TokenExpired => AccountError::TokenExpired,
            other => AccountError::Session(other),
        }
    }
}

impl AccountError {
    /// Failures reported to callers only as "unauthorized"
    pub fn is_authentication_failure(&self) -> bool {
        matches!(
            self,
            AccountError::AccountNotFound
                | AccountError::WrongPassword
                | AccountError::AccountInvalid
                | AccountError::NoToken
                | AccountError::InvalidToken
                | AccountError::TokenExpired
                | AccountError::NoCredential
                | AccountError::Unauthenticated
        )
    }
}

pub type Result<T> = std::result::Result<T, AccountError>;
