//! Account service implementation.

mod bootstrap;
mod gate;
mod registration;

pub use bootstrap::AdminBootstrap;
pub use gate::AuthGate;
pub use registration::RegistrationCoordinator;

use crate::{errors::*, registry::AccountRegistry, traits::AccountManager, types::*};
use async_trait::async_trait;
use ca_auth_crypto::PasswordHasher;
use ca_auth_issuer::{CredentialWallet, IdentityIssuer, IssuerAdapter};
use ca_auth_sessions::{resolve_token, TokenCheck, TokenService, UserRole};
use ca_auth_storage::DocumentStore;
use std::sync::Arc;
use tracing::{info, warn};

/// Account service settings
#[derive(Debug, Clone)]
pub struct AccountServiceOptions {
    pub registrar: RegistrarIdentity,
    /// Fail registrar logins when re-enrollment fails
    pub strict_registrar_enroll: bool,
    pub hasher: PasswordHasher,
}

impl AccountServiceOptions {
    pub fn new(registrar: RegistrarIdentity) -> Self {
        Self {
            registrar,
            strict_registrar_enroll: true,
            hasher: PasswordHasher::default(),
        }
    }

    pub fn strict_registrar_enroll(mut self, strict: bool) -> Self {
        self.strict_registrar_enroll = strict;
        self
    }

    pub fn hasher(mut self, hasher: PasswordHasher) -> Self {
        self.hasher = hasher;
        self
    }
}

/// Account service
pub struct AccountService<S, I, W>
where
    S: DocumentStore,
    I: IdentityIssuer,
    W: CredentialWallet,
{
    registry: Arc<AccountRegistry<S>>,
    tokens: Arc<TokenService>,
    coordinator: RegistrationCoordinator<S, I, W>,
    gate: AuthGate<I, W>,
    bootstrap: AdminBootstrap<S, I, W>,
}

impl<S, I, W> AccountService<S, I, W>
where
    S: DocumentStore,
    I: IdentityIssuer,
    W: CredentialWallet,
{
    /// Create a new account service
    pub fn new(
        store: Arc<S>,
        issuer: Arc<IssuerAdapter<I, W>>,
        tokens: Arc<TokenService>,
        options: AccountServiceOptions,
    ) -> Self {
        let registry = Arc::new(AccountRegistry::new(store, options.hasher));

        Self {
            coordinator: RegistrationCoordinator::new(registry.clone(), issuer.clone()),
            gate: AuthGate::new(tokens.clone(), issuer.clone()),
            bootstrap: AdminBootstrap::new(
                registry.clone(),
                issuer,
                options.registrar,
                options.strict_registrar_enroll,
            ),
            registry,
            tokens,
        }
    }

    pub fn registry(&self) -> &AccountRegistry<S> {
        &self.registry
    }

    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }
}

fn required<'a>(field: &str, value: &'a str) -> Result<&'a str> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AccountError::InvalidRequest(format!("{} is required", field)));
    }
    Ok(value)
}

#[async_trait]
impl<S, I, W> AccountManager for AccountService<S, I, W>
where
    S: DocumentStore + 'static,
    I: IdentityIssuer + 'static,
    W: CredentialWallet + 'static,
{
    async fn provision(&self) -> Result<()> {
        self.registry.provision().await
    }

    async fn login(&self, username: &str, password: &str) -> Result<LoginResponse> {
        let username = required("username", username)?;
        let password = required("password", password)?;

        if self.bootstrap.is_registrar(username, password) {
            self.bootstrap.ensure_system_admin(username, password).await?;
        }

        let account = self.registry.find_by_id(username).await?.ok_or_else(|| {
            warn!(username = %username, "Login failed, no such account");
            AccountError::AccountNotFound
        })?;

        if !self.registry.matches_secret(&account, password) {
            warn!(username = %username, "Login failed, wrong password");
            return Err(AccountError::WrongPassword);
        }

        if !account.valid {
            warn!(username = %username, "Login failed, account is invalid");
            return Err(AccountError::AccountInvalid);
        }

        let token = self
            .tokens
            .issue(&account.id, &account.username, account.role)?;

        info!(username = %account.id, role = %account.role, "Login succeeded");
        Ok(LoginResponse {
            token,
            user: account.redacted(),
        })
    }

    async fn create_user(
        &self,
        requester: Option<&AuthenticatedIdentity>,
        username: &str,
        password: &str,
        role: UserRole,
    ) -> Result<Account> {
        let username = required("username", username)?;
        let password = required("password", password)?;

        let account = self
            .coordinator
            .register_user(requester, username, password, role)
            .await?;
        self.coordinator.enroll(&account).await?;

        Ok(account.redacted())
    }

    async fn check_token(&self, token: Option<&str>) -> TokenCheck {
        self.tokens.check(resolve_token(token, None))
    }

    async fn authenticate(&self, token: Option<&str>) -> Result<AuthenticatedIdentity> {
        self.gate.authenticate(token).await
    }
}
