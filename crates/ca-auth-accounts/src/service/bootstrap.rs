//! First administrator from the registrar identity.

use crate::{errors::*, registry::AccountRegistry, types::*};
use ca_auth_crypto::constant_time_compare;
use ca_auth_issuer::{CredentialWallet, IdentityIssuer, IssuerAdapter};
use ca_auth_sessions::UserRole;
use ca_auth_storage::DocumentStore;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Admin bootstrap
///
/// Self-authorizing: presenting the registrar secret is the only check.
pub struct AdminBootstrap<S, I, W>
where
    S: DocumentStore,
    I: IdentityIssuer,
    W: CredentialWallet,
{
    registry: Arc<AccountRegistry<S>>,
    issuer: Arc<IssuerAdapter<I, W>>,
    registrar: RegistrarIdentity,
    strict_enroll: bool,
}

impl<S, I, W> AdminBootstrap<S, I, W>
where
    S: DocumentStore,
    I: IdentityIssuer,
    W: CredentialWallet,
{
    pub fn new(
        registry: Arc<AccountRegistry<S>>,
        issuer: Arc<IssuerAdapter<I, W>>,
        registrar: RegistrarIdentity,
        strict_enroll: bool,
    ) -> Self {
        Self {
            registry,
            issuer,
            registrar,
            strict_enroll,
        }
    }

    /// Whether the supplied pair equals the configured registrar identity
    pub fn is_registrar(&self, id: &str, secret: &str) -> bool {
        let id_matches = constant_time_compare(id.as_bytes(), self.registrar.id.as_bytes());
        let secret_matches =
            constant_time_compare(secret.as_bytes(), self.registrar.secret.as_bytes());
        id_matches && secret_matches
    }

    /// Ensure the administrator account exists and refresh its credential
    ///
    /// Idempotent: repeated calls leave exactly one administrator record.
    /// Every call re-enrolls; with strict enrollment a failed re-enroll is
    /// returned as an error, otherwise it is only logged.
    pub async fn ensure_system_admin(&self, id: &str, secret: &str) -> Result<()> {
        if !self.is_registrar(id, secret) {
            return Err(AccountError::Forbidden);
        }

        if self.registry.find_by_username(id).await?.is_none() {
            let account = self.registry.build_account(id, id, secret, UserRole::Admin)?;
            match self.registry.create(&account).await {
                Ok(()) => info!(username = %id, "System administrator account created"),
                Err(AccountError::DuplicateAccount(_)) => {
                    info!(username = %id, "System administrator created concurrently")
                }
                Err(e) => return Err(e),
            }
        }

        match self.issuer.enroll(id, secret).await {
            Ok(_) => Ok(()),
            Err(source) if self.strict_enroll => {
                error!(username = %id, error = %source, "Enroll system administrator failed");
                Err(AccountError::EnrollmentFailed {
                    id: id.to_string(),
                    source,
                })
            }
            Err(source) => {
                warn!(
                    username = %id,
                    error = %source,
                    "Enroll system administrator failed, continuing with existing credential"
                );
                Ok(())
            }
        }
    }
}
