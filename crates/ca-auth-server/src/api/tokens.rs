use axum::{extract::State, response::Json};
use ca_auth_accounts::AccountManager;
use ca_auth_sessions::{resolve_token, TokenCheck};
use serde::Deserialize;
use std::sync::Arc;

use crate::{extractors::TokenHeader, state::AppState};

#[derive(Debug, Default, Deserialize)]
pub struct CheckTokenRequest {
    #[serde(default)]
    pub token: Option<String>,
}

/// POST /v1/jwt/token/check
///
/// The body token wins over the `X-TOKEN` header. Always answers 200 with
/// `valid` set accordingly.
pub async fn check_token(
    State(state): State<Arc<AppState>>,
    TokenHeader(header): TokenHeader,
    payload: Option<Json<CheckTokenRequest>>,
) -> Json<TokenCheck> {
    let req = payload.map(|Json(req)| req).unwrap_or_default();
    let token = resolve_token(req.token.as_deref(), header.as_deref());

    Json(state.accounts.check_token(token.as_deref()).await)
}
