//! Identity issuer adapter.
//!
//! Wraps the issuer and the credential wallet with the semantics the
//! account services depend on:
//! - `identity_exists` means "the wallet holds a usable credential"
//! - `register` refuses identities that already have a credential
//! - `enroll` stores the issued credential in the wallet

use crate::{
    errors::{IssuerError, Result},
    traits::{CredentialWallet, IdentityIssuer},
    types::*,
};
use std::sync::Arc;
use tracing::{debug, error, info};

/// Register/enroll/exists over an issuer and its wallet
pub struct IssuerAdapter<I: IdentityIssuer, W: CredentialWallet> {
    issuer: Arc<I>,
    wallet: Arc<W>,
}

impl<I: IdentityIssuer, W: CredentialWallet> IssuerAdapter<I, W> {
    pub fn new(issuer: Arc<I>, wallet: Arc<W>) -> Self {
        Self { issuer, wallet }
    }

    /// Whether the wallet holds a usable credential for `id`
    pub async fn identity_exists(&self, id: &str) -> Result<bool> {
        self.wallet.exists(id).await
    }

    /// Register a new identity with the issuer
    ///
    /// Checked against the wallet first so a duplicate yields a precise
    /// `AlreadyRegistered` rather than whatever the issuer reports.
    pub async fn register(&self, id: &str, secret: &str, identity_type: &str) -> Result<()> {
        if self.identity_exists(id).await? {
            error!("Register identity {} failed: credential already in wallet", id);
            return Err(IssuerError::AlreadyRegistered(id.to_string()));
        }

        let request = RegistrationRequest {
            name: id.to_string(),
            identity_type: identity_type.to_string(),
            secret: secret.to_string(),
            max_enrollments: UNLIMITED_ENROLLMENTS,
        };

        self.issuer.register(request).await.map_err(|e| {
            error!("Register identity {} with issuer failed: {}", id, e);
            e
        })?;

        debug!("Registered identity {} with issuer", id);
        Ok(())
    }

    /// Enroll `id` and store the resulting credential in the wallet
    ///
    /// Re-enrolling overwrites the wallet entry. Issuer rejections are not
    /// retried.
    pub async fn enroll(&self, id: &str, secret: &str) -> Result<IssuerCredential> {
        let credential = self.issuer.enroll(id, secret).await.map_err(|e| {
            error!("Enroll identity {} failed: {}", id, e);
            e
        })?;

        self.wallet.put(id, &credential).await.map_err(|e| {
            error!("Enroll identity {}, put into wallet failed: {}", id, e);
            e
        })?;

        info!("Enrolled identity {}", id);
        Ok(credential)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{InMemoryWallet, LocalIssuer};

    fn create_test_adapter() -> (
        IssuerAdapter<LocalIssuer, InMemoryWallet>,
        Arc<LocalIssuer>,
        Arc<InMemoryWallet>,
    ) {
        let issuer = Arc::new(LocalIssuer::new("Org1MSP"));
        let wallet = Arc::new(InMemoryWallet::new());
        let adapter = IssuerAdapter::new(issuer.clone(), wallet.clone());
        (adapter, issuer, wallet)
    }

    #[tokio::test]
    async fn test_register_then_enroll_populates_wallet() {
        let (adapter, issuer, wallet) = create_test_adapter();

        adapter.register("bob", "hash", "client").await.unwrap();
        assert!(issuer.is_registered("bob").await);
        assert!(!adapter.identity_exists("bob").await.unwrap());

        let credential = adapter.enroll("bob", "hash").await.unwrap();
        assert!(adapter.identity_exists("bob").await.unwrap());
        assert_eq!(wallet.get("bob").await.unwrap(), Some(credential));
    }

    #[tokio::test]
    async fn test_register_rejects_identity_with_credential() {
        let (adapter, issuer, _wallet) = create_test_adapter();

        adapter.register("bob", "hash", "client").await.unwrap();
        adapter.enroll("bob", "hash").await.unwrap();

        let result = adapter.register("bob", "hash", "client").await;
        assert!(matches!(result, Err(IssuerError::AlreadyRegistered(_))));
        assert_eq!(issuer.enrollment_count("bob").await, 1);
    }

    #[tokio::test]
    async fn test_register_surfaces_issuer_conflict() {
        let (adapter, _issuer, _wallet) = create_test_adapter();

        // Registered but never enrolled: only the issuer knows about it
        adapter.register("bob", "hash", "client").await.unwrap();
        let result = adapter.register("bob", "hash", "client").await;
        assert!(matches!(result, Err(IssuerError::AlreadyRegistered(_))));
    }

    #[tokio::test]
    async fn test_failed_enroll_leaves_wallet_untouched() {
        let (adapter, _issuer, wallet) = create_test_adapter();

        adapter.register("bob", "hash", "client").await.unwrap();
        let result = adapter.enroll("bob", "wrong").await;

        assert!(matches!(result, Err(IssuerError::AuthenticationFailed(_))));
        assert!(wallet.is_empty().await);
    }

    #[tokio::test]
    async fn test_reenroll_overwrites_wallet_entry() {
        let (adapter, _issuer, wallet) = create_test_adapter();

        adapter.register("bob", "hash", "client").await.unwrap();
        let first = adapter.enroll("bob", "hash").await.unwrap();
        let second = adapter.enroll("bob", "hash").await.unwrap();

        assert_ne!(first, second);
        assert_eq!(wallet.get("bob").await.unwrap(), Some(second));
        assert_eq!(wallet.len().await, 1);
    }
}
