//! Account service trait.

use crate::{errors::Result, types::*};
use async_trait::async_trait;
use ca_auth_sessions::{TokenCheck, UserRole};

/// Operations exposed to the transport layer
#[async_trait]
pub trait AccountManager: Send + Sync {
    /// Create the account database and indexes
    async fn provision(&self) -> Result<()>;

    /// Exchange username and password for a session token
    ///
    /// The registrar identity bootstraps the administrator account first.
    async fn login(&self, username: &str, password: &str) -> Result<LoginResponse>;

    /// Create and enroll a user; requires an administrator requester
    async fn create_user(
        &self,
        requester: Option<&AuthenticatedIdentity>,
        username: &str,
        password: &str,
        role: UserRole,
    ) -> Result<Account>;

    /// Report token validity without failing
    async fn check_token(&self, token: Option<&str>) -> TokenCheck;

    /// Run the auth gate for a protected request
    async fn authenticate(&self, token: Option<&str>) -> Result<AuthenticatedIdentity>;
}
