//! Token issuance and verification.
//!
//! Tokens are HS256 JWTs signed with a process-wide secret, so any
//! instance holding the same secret can verify them without shared state.

use crate::{clock::*, errors::*, types::*};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use std::sync::Arc;
use tracing::debug;
use zeroize::Zeroizing;

const SECONDS_PER_HOUR: u64 = 3600;

/// Session token service
pub struct TokenService {
    secret: Zeroizing<Vec<u8>>,
    lifetime_secs: u64,
    clock: Arc<dyn Clock>,
}

impl TokenService {
    /// Create a token service using the wall clock
    pub fn new(secret: &[u8], expire_hours: u64) -> Result<Self> {
        Self::with_clock(secret, expire_hours, Arc::new(SystemClock))
    }

    /// Create a token service with a custom time source
    pub fn with_clock(secret: &[u8], expire_hours: u64, clock: Arc<dyn Clock>) -> Result<Self> {
        if secret.is_empty() {
            return Err(SessionError::InvalidConfiguration(
                "signing secret must not be empty".to_string(),
            ));
        }
        if expire_hours == 0 {
            return Err(SessionError::InvalidConfiguration(
                "token lifetime must be at least one hour".to_string(),
            ));
        }
        let lifetime_secs = expire_hours.checked_mul(SECONDS_PER_HOUR).ok_or_else(|| {
            SessionError::InvalidConfiguration(format!(
                "token lifetime of {} hours is out of range",
                expire_hours
            ))
        })?;

        Ok(Self {
            secret: Zeroizing::new(secret.to_vec()),
            lifetime_secs,
            clock,
        })
    }

    /// Issue a signed token for an account
    pub fn issue(&self, user_id: &str, username: &str, role: UserRole) -> Result<String> {
        let claim = self.build_claim(user_id, username, role);
        let header = Header::new(Algorithm::HS256);

        encode(&header, &claim, &EncodingKey::from_secret(&self.secret))
            .map_err(|e| SessionError::SigningFailed(e.to_string()))
    }

    /// Verify signature and expiry, returning the claim
    pub fn verify(&self, token: &str) -> Result<SessionClaim> {
        // Expiry is checked against the injected clock below
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "iat"]);

        let data = decode::<SessionClaim>(token, &DecodingKey::from_secret(&self.secret), &validation)
            .map_err(|e| {
                debug!("Token verification failed: {}", e);
                SessionError::InvalidToken
            })?;

        let claim = data.claims;
        if self.clock.now() >= claim.exp {
            debug!("Token for {} expired at {}", claim.user_id, claim.exp);
            return Err(SessionError::TokenExpired);
        }

        Ok(claim)
    }

    /// Verify a token without failing; used by the token-check endpoint
    pub fn check(&self, token: Option<String>) -> TokenCheck {
        let Some(token) = token else {
            return TokenCheck {
                valid: false,
                token: String::new(),
                claim: None,
            };
        };

        match self.verify(&token) {
            Ok(claim) => TokenCheck {
                valid: true,
                token,
                claim: Some(claim),
            },
            Err(_) => TokenCheck {
                valid: false,
                token,
                claim: None,
            },
        }
    }

    fn build_claim(&self, user_id: &str, username: &str, role: UserRole) -> SessionClaim {
        let now = self.clock.now();
        SessionClaim {
            user_id: user_id.to_string(),
            username: username.to_string(),
            role,
            iat: now,
            exp: now.saturating_add(self.lifetime_secs),
        }
    }
}
