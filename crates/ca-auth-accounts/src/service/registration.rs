//! User registration across the identity issuer and the document store.

use crate::{errors::*, registry::AccountRegistry, types::*};
use ca_auth_issuer::{
    validate_label, CredentialWallet, IdentityIssuer, IssuerAdapter, IssuerError,
};
use ca_auth_sessions::UserRole;
use ca_auth_storage::DocumentStore;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Creates accounts issuer-first, store-second
///
/// There is no rollback: when the issuer registration succeeds and the
/// record write fails, the issuer identity is left orphaned and reported
/// as `OrphanedIdentity` for manual reconciliation.
pub struct RegistrationCoordinator<S, I, W>
where
    S: DocumentStore,
    I: IdentityIssuer,
    W: CredentialWallet,
{
    registry: Arc<AccountRegistry<S>>,
    issuer: Arc<IssuerAdapter<I, W>>,
}

impl<S, I, W> RegistrationCoordinator<S, I, W>
where
    S: DocumentStore,
    I: IdentityIssuer,
    W: CredentialWallet,
{
    pub fn new(registry: Arc<AccountRegistry<S>>, issuer: Arc<IssuerAdapter<I, W>>) -> Self {
        Self { registry, issuer }
    }

    /// Register a new user on behalf of an authenticated administrator
    ///
    /// Returns the persisted account, password hash included, so the
    /// caller can follow up with [`Self::enroll`].
    pub async fn register_user(
        &self,
        requester: Option<&AuthenticatedIdentity>,
        username: &str,
        secret: &str,
        role: UserRole,
    ) -> Result<Account> {
        let requester = requester.ok_or(AccountError::Unauthenticated)?;
        if !requester.is_admin() {
            warn!(
                requester = %requester.user_id,
                role = %requester.role,
                "Create user refused, requester is not an administrator"
            );
            return Err(AccountError::Forbidden);
        }

        // The id is both the wallet label and the document key
        validate_label(username).map_err(|_| {
            AccountError::InvalidRequest(format!(
                "username is not a valid identifier: {:?}",
                username
            ))
        })?;

        if self.registry.find_by_id(username).await?.is_some() {
            warn!(username = %username, "Create user refused, account exists");
            return Err(AccountError::DuplicateAccount(username.to_string()));
        }

        let account = self.registry.build_account(username, username, secret, role)?;

        // Issuer first: a failure here leaves nothing behind
        self.issuer
            .register(&account.id, &account.pass_hash, role.as_str())
            .await
            .map_err(|e| match e {
                IssuerError::AlreadyRegistered(id) => AccountError::IdentityAlreadyRegistered(id),
                other => AccountError::Issuer(other),
            })?;

        match self.registry.create(&account).await {
            Ok(()) => {}
            Err(AccountError::DuplicateAccount(id)) => {
                // Lost a race with a concurrent registration of the same id
                warn!(username = %id, "Account created concurrently after issuer registration");
                return Err(AccountError::DuplicateAccount(id));
            }
            Err(AccountError::Storage(source)) => {
                error!(
                    username = %account.id,
                    error = %source,
                    "Issuer identity registered but account record not persisted, reconciliation required"
                );
                return Err(AccountError::OrphanedIdentity {
                    id: account.id,
                    source,
                });
            }
            Err(e) => return Err(e),
        }

        info!(
            username = %account.id,
            role = %role,
            created_by = %requester.user_id,
            "User account created"
        );
        Ok(account)
    }

    /// Enroll a freshly registered account and store its credential
    ///
    /// Failure does not undo the registration.
    pub async fn enroll(&self, account: &Account) -> Result<()> {
        self.issuer
            .enroll(&account.id, &account.pass_hash)
            .await
            .map(|_| ())
            .map_err(|source| {
                error!(username = %account.id, "Enrollment after registration failed");
                AccountError::EnrollmentFailed {
                    id: account.id.clone(),
                    source,
                }
            })
    }
}
