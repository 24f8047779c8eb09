use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("No token supplied")]
    NoToken,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token expired")]
    TokenExpired,

    #[error("Token signing failed: {0}")]
    SigningFailed(String),

    #[error("Invalid token configuration: {0}")]
    InvalidConfiguration(String),
}

pub type Result<T> = std::result::Result<T, SessionError>;
