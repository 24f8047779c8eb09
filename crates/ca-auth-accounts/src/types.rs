//! Account types.

use crate::errors::Result;
use ca_auth_crypto::{current_timestamp, generate_salt, PasswordHasher};
use ca_auth_sessions::{SessionClaim, UserRole};
use serde::{Deserialize, Serialize};
use std::fmt;
use zeroize::Zeroizing;

/// Persistent account record
///
/// `id` is both the document key and the issuer enrollment id.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: String,
    #[serde(rename = "_rev", default, skip_serializing_if = "Option::is_none")]
    pub rev: Option<String>,
    pub username: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub salt: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub pass_hash: String,
    pub role: UserRole,
    pub valid: bool,
    pub created: u64,
    pub updated: u64,
}

impl Account {
    /// Build a valid account with a fresh salt and password hash
    pub fn new(
        id: &str,
        username: &str,
        secret: &str,
        role: UserRole,
        hasher: &PasswordHasher,
    ) -> Result<Self> {
        let salt = generate_salt();
        let pass_hash = hasher.hash(secret, &salt)?;
        let now = current_timestamp();

        Ok(Self {
            id: id.to_string(),
            rev: None,
            username: username.to_string(),
            salt,
            pass_hash,
            role,
            valid: true,
            created: now,
            updated: now,
        })
    }

    /// Check a plaintext secret against the stored hash
    pub fn matches_secret(&self, hasher: &PasswordHasher, secret: &str) -> bool {
        hasher.verify(secret, &self.salt, &self.pass_hash)
    }

    /// Copy safe to return across the API boundary
    pub fn redacted(mut self) -> Self {
        self.salt.clear();
        self.pass_hash.clear();
        self
    }
}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account")
            .field("id", &self.id)
            .field("rev", &self.rev)
            .field("username", &self.username)
            .field("role", &self.role)
            .field("valid", &self.valid)
            .field("created", &self.created)
            .field("updated", &self.updated)
            .finish_non_exhaustive()
    }
}

/// Identity established by the auth gate for one request
///
/// Produced once at the boundary and passed explicitly to handlers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticatedIdentity {
    pub user_id: String,
    pub username: String,
    pub role: UserRole,
    pub issued_at: u64,
    pub expires_at: u64,
}

impl AuthenticatedIdentity {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

impl From<SessionClaim> for AuthenticatedIdentity {
    fn from(claim: SessionClaim) -> Self {
        Self {
            user_id: claim.user_id,
            username: claim.username,
            role: claim.role,
            issued_at: claim.iat,
            expires_at: claim.exp,
        }
    }
}

/// Successful login
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    /// Account with salt and password hash cleared
    pub user: Account,
}

/// Deployment bootstrap credential used to create the first administrator
#[derive(Clone)]
pub struct RegistrarIdentity {
    pub id: String,
    pub secret: Zeroizing<String>,
}

impl RegistrarIdentity {
    pub fn new(id: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            secret: Zeroizing::new(secret.into()),
        }
    }
}

impl fmt::Debug for RegistrarIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistrarIdentity")
            .field("id", &self.id)
            .field("secret", &"<redacted>")
            .finish()
    }
}
