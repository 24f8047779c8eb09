use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use ca_auth_accounts::AccountError;
use serde::Serialize;

/// API error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetails,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetails {
    pub code: String,
    pub message: String,
}

/// Application error type
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden")]
    Forbidden,

    #[error("Conflict: {0}")]
    Conflict(String),

    /// Issuer identity without an account record
    #[error("Reconciliation required: {0}")]
    ReconciliationRequired(String),

    #[error("Enrollment failed: {0}")]
    EnrollmentFailed(String),

    /// A collaborator (document store, issuer, wallet) failed
    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            ApiError::InvalidRequest(msg) => (StatusCode::BAD_REQUEST, "INVALID_REQUEST", msg),
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                "Missing or invalid credentials".to_string(),
            ),
            ApiError::Forbidden => (
                StatusCode::FORBIDDEN,
                "FORBIDDEN",
                "Administrator role required".to_string(),
            ),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg),
            ApiError::ReconciliationRequired(msg) => {
                tracing::error!("Reconciliation required: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "RECONCILIATION_REQUIRED",
                    msg,
                )
            }
            ApiError::EnrollmentFailed(msg) => (StatusCode::BAD_GATEWAY, "ENROLLMENT_FAILED", msg),
            ApiError::Upstream(msg) => {
                tracing::warn!("Upstream error: {}", msg);
                (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR", msg)
            }
            ApiError::Unavailable(msg) => {
                (StatusCode::SERVICE_UNAVAILABLE, "SERVICE_UNAVAILABLE", msg)
            }
            ApiError::Internal(err) => {
                tracing::error!("Internal error: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse {
            error: ErrorDetails {
                code: code.to_string(),
                message,
            },
        });

        (status, body).into_response()
    }
}

impl From<AccountError> for ApiError {
    fn from(error: AccountError) -> Self {
        if error.is_authentication_failure() {
            // Which check failed is never disclosed
            tracing::debug!("Authentication failed: {}", error);
            return ApiError::Unauthorized;
        }

        match error {
            AccountError::Forbidden => ApiError::Forbidden,
            AccountError::InvalidRequest(msg) => ApiError::InvalidRequest(msg),
            AccountError::DuplicateAccount(id) => {
                ApiError::Conflict(format!("Account already exists: {}", id))
            }
            AccountError::IdentityAlreadyRegistered(id) => {
                ApiError::Conflict(format!("Identity already registered: {}", id))
            }
            e @ AccountError::OrphanedIdentity { .. } => {
                ApiError::ReconciliationRequired(e.to_string())
            }
            e @ AccountError::EnrollmentFailed { .. } => ApiError::EnrollmentFailed(e.to_string()),
            AccountError::Storage(e) => ApiError::Upstream(format!("Document store: {}", e)),
            AccountError::Issuer(e) => ApiError::Upstream(format!("Identity issuer: {}", e)),
            other => ApiError::Internal(anyhow::Error::new(other)),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::InvalidRequest(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ca_auth_storage::StorageError;

    fn status_of(error: AccountError) -> StatusCode {
        ApiError::from(error).into_response().status()
    }

    #[test]
    fn test_authentication_failures_are_indistinguishable() {
        for error in [
            AccountError::AccountNotFound,
            AccountError::WrongPassword,
            AccountError::AccountInvalid,
            AccountError::NoToken,
            AccountError::InvalidToken,
            AccountError::TokenExpired,
            AccountError::NoCredential,
            AccountError::Unauthenticated,
        ] {
            assert!(matches!(ApiError::from(error), ApiError::Unauthorized));
        }
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(status_of(AccountError::Forbidden), StatusCode::FORBIDDEN);
        assert_eq!(
            status_of(AccountError::DuplicateAccount("bob".into())),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(AccountError::IdentityAlreadyRegistered("bob".into())),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(AccountError::InvalidRequest("username is required".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(AccountError::OrphanedIdentity {
                id: "bob".into(),
                source: StorageError::Transport("timeout".into()),
            }),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_of(AccountError::Storage(StorageError::Transport("timeout".into()))),
            StatusCode::BAD_GATEWAY
        );
    }
}
