use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use ca_auth_accounts::{AccountManager, AuthenticatedIdentity};
use ca_auth_sessions::{resolve_token, TOKEN_HEADER};
use std::sync::Arc;

use crate::{error::ApiError, state::AppState};

/// Session token from the `X-TOKEN` header, if any
pub fn header_token(parts: &Parts) -> Option<String> {
    let header = parts
        .headers
        .get(TOKEN_HEADER)
        .and_then(|h| h.to_str().ok());
    resolve_token(None, header)
}

/// Extractor for authenticated requests
///
/// Runs the auth gate once per request; handlers receive the identity
/// by value.
pub struct AuthenticatedUser(pub AuthenticatedIdentity);

#[async_trait]
impl FromRequestParts<Arc<AppState>> for AuthenticatedUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = header_token(parts);
        let identity = state.accounts.authenticate(token.as_deref()).await?;
        Ok(AuthenticatedUser(identity))
    }
}

/// Raw `X-TOKEN` header value, used as a fallback by the token check
pub struct TokenHeader(pub Option<String>);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for TokenHeader {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(TokenHeader(header_token(parts)))
    }
}
