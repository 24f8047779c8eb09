//! Identity issuer trait definitions.

use crate::{errors::Result, types::*};
use async_trait::async_trait;

/// Identity issuer (certificate authority) interface
#[async_trait]
pub trait IdentityIssuer: Send + Sync {
    /// Register a new named identity
    ///
    /// Fails with `IssuerError::AlreadyRegistered` when the issuer reports
    /// a conflict.
    async fn register(&self, request: RegistrationRequest) -> Result<()>;

    /// Exchange a registered identity's secret for a signing credential
    async fn enroll(&self, id: &str, secret: &str) -> Result<IssuerCredential>;
}

/// Keyed store of issued credentials
#[async_trait]
pub trait CredentialWallet: Send + Sync {
    /// Store (or overwrite) the credential for `id`
    async fn put(&self, id: &str, credential: &IssuerCredential) -> Result<()>;

    /// Load the credential for `id`
    async fn get(&self, id: &str) -> Result<Option<IssuerCredential>>;

    /// Whether a usable credential is stored for `id`
    async fn exists(&self, id: &str) -> Result<bool>;

    /// Remove the credential for `id`; succeeds if absent
    async fn remove(&self, id: &str) -> Result<()>;
}
