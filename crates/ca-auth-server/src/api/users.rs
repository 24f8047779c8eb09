use axum::{
    extract::{rejection::JsonRejection, State},
    response::Json,
};
use ca_auth_accounts::{Account, AccountManager, AuthenticatedIdentity, LoginResponse};
use ca_auth_sessions::UserRole;
use serde::Deserialize;
use std::sync::Arc;

use crate::{error::ApiError, extractors::AuthenticatedUser, state::AppState};

// ============================================================================
// Request Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub password: String,
    pub role: UserRole,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /v1/jwt/user/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let Json(req) = payload?;

    let response = state.accounts.login(&req.username, &req.password).await?;
    Ok(Json(response))
}

/// POST /v1/jwt/user/create
///
/// Requires an administrator token in `X-TOKEN`.
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    AuthenticatedUser(requester): AuthenticatedUser,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<Json<Account>, ApiError> {
    let Json(req) = payload?;

    let account = state
        .accounts
        .create_user(Some(&requester), &req.username, &req.password, req.role)
        .await?;
    Ok(Json(account))
}

/// GET /v1/jwt/user/me
pub async fn current_user(
    AuthenticatedUser(identity): AuthenticatedUser,
) -> Json<AuthenticatedIdentity> {
    Json(identity)
}
