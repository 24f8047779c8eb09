//! Request authentication.

use crate::{errors::*, types::AuthenticatedIdentity};
use ca_auth_issuer::{CredentialWallet, IdentityIssuer, IssuerAdapter};
use ca_auth_sessions::TokenService;
use std::sync::Arc;
use tracing::{debug, warn};

/// Auth gate
///
/// `NoToken -> TokenParsed -> {Authenticated, Rejected}`. A token only
/// authenticates while its subject still holds a wallet credential, so
/// removing the credential revokes outstanding tokens.
pub struct AuthGate<I: IdentityIssuer, W: CredentialWallet> {
    tokens: Arc<TokenService>,
    issuer: Arc<IssuerAdapter<I, W>>,
}

impl<I: IdentityIssuer, W: CredentialWallet> AuthGate<I, W> {
    pub fn new(tokens: Arc<TokenService>, issuer: Arc<IssuerAdapter<I, W>>) -> Self {
        Self { tokens, issuer }
    }

    /// Authenticate an already-resolved token value
    pub async fn authenticate(&self, token: Option<&str>) -> Result<AuthenticatedIdentity> {
        let token = token
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(AccountError::NoToken)?;

        let claim = self.tokens.verify(token)?;

        if !self.issuer.identity_exists(&claim.user_id).await? {
            warn!(
                username = %claim.user_id,
                "Token rejected, no issuer credential in wallet"
            );
            return Err(AccountError::NoCredential);
        }

        debug!(username = %claim.user_id, role = %claim.role, "Request authenticated");
        Ok(claim.into())
    }
}
