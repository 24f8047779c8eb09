use serde::{Deserialize, Serialize};
use std::fmt;

/// Request header carrying the session token
pub const TOKEN_HEADER: &str = "X-TOKEN";

/// Account role, shared with the issuer as the identity type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    Client,
    Peer,
    Orderer,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::Client => "client",
            UserRole::Peer => "peer",
            UserRole::Orderer => "orderer",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decoded payload of a session token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionClaim {
    pub user_id: String,
    pub username: String,
    pub role: UserRole,
    pub iat: u64, // Issued at
    pub exp: u64, // Expiration
}

/// Result of a token check; failures are reported as `valid = false`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenCheck {
    pub valid: bool,
    pub token: String,
    pub claim: Option<SessionClaim>,
}

/// Pick the token to verify: an explicit value wins, otherwise the
/// `X-TOKEN` header value. Blank values count as absent.
pub fn resolve_token(explicit: Option<&str>, header: Option<&str>) -> Option<String> {
    explicit
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .or_else(|| header.map(str::trim).filter(|t| !t.is_empty()))
        .map(str::to_string)
}
