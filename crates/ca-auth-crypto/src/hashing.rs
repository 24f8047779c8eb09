//! Password hashing using Argon2id.
//!
//! Account records keep the salt and the digest in separate fields, so the
//! hasher works on an explicit salt rather than a self-describing PHC string:
//! `hash(secret, salt)` is deterministic and `verify` recomputes and compares.

use crate::errors::*;
use argon2::password_hash::SaltString;
use argon2::PasswordHasher as _;
use argon2::{Algorithm, Argon2, Params, Version};
use subtle::ConstantTimeEq;

/// Deterministic salted password hasher
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    params: Params,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self {
            params: Params::default(),
        }
    }
}

impl PasswordHasher {
    /// Create a hasher with explicit Argon2id cost parameters
    ///
    /// * `memory_kib` - memory cost in KiB
    /// * `iterations` - time cost
    /// * `parallelism` - lanes
    pub fn new(memory_kib: u32, iterations: u32, parallelism: u32) -> Result<Self> {
        let params = Params::new(memory_kib, iterations, parallelism, None)
            .map_err(|e| CryptoError::InvalidParams(e.to_string()))?;
        Ok(Self { params })
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    /// Hash a secret with the given salt
    ///
    /// The same `(secret, salt)` pair always produces the same digest.
    /// An empty secret is accepted.
    pub fn hash(&self, secret: &str, salt: &str) -> Result<String> {
        let salt = SaltString::from_b64(salt).map_err(|e| CryptoError::InvalidSalt(e.to_string()))?;

        let digest = self
            .argon2()
            .hash_password(secret.as_bytes(), &salt)
            .map_err(|e| CryptoError::Argon2Failed(e.to_string()))?;

        Ok(digest.to_string())
    }

    /// Check a secret against a stored salt and digest
    ///
    /// A malformed salt never verifies.
    pub fn verify(&self, secret: &str, salt: &str, digest: &str) -> bool {
        match self.hash(secret, salt) {
            Ok(computed) => constant_time_compare(computed.as_bytes(), digest.as_bytes()),
            Err(_) => false,
        }
    }
}

/// Generate a fresh random salt for a new account
pub fn generate_salt() -> String {
    SaltString::generate(&mut rand::thread_rng())
        .as_str()
        .to_string()
}

/// Compare two byte slices in constant time
pub fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    a.ct_eq(b).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_hasher() -> PasswordHasher {
        PasswordHasher::new(1024, 1, 1).unwrap()
    }

    #[test]
    fn test_hash_is_deterministic() {
        let hasher = fast_hasher();
        let salt = generate_salt();

        let first = hasher.hash("s3cret", &salt).unwrap();
        let second = hasher.hash("s3cret", &salt).unwrap();
        assert_eq!(first, second);
        assert!(first.starts_with("$argon2id$"));
    }

    #[test]
    fn test_verify_accepts_matching_secret() {
        let hasher = fast_hasher();
        let salt = generate_salt();
        let digest = hasher.hash("correct horse battery staple", &salt).unwrap();

        assert!(hasher.verify("correct horse battery staple", &salt, &digest));
        assert!(!hasher.verify("wrong password", &salt, &digest));
    }

    #[test]
    fn test_different_salts_give_different_digests() {
        let hasher = fast_hasher();
        let a = hasher.hash("pw123", &generate_salt()).unwrap();
        let b = hasher.hash("pw123", &generate_salt()).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_empty_secret_is_accepted() {
        let hasher = fast_hasher();
        let salt = generate_salt();
        let digest = hasher.hash("", &salt).unwrap();
        assert!(hasher.verify("", &salt, &digest));
        assert!(!hasher.verify("x", &salt, &digest));
    }

    #[test]
    fn test_malformed_salt() {
        let hasher = fast_hasher();
        assert!(matches!(
            hasher.hash("pw", "no spaces allowed!"),
            Err(CryptoError::InvalidSalt(_))
        ));
        assert!(!hasher.verify("pw", "no spaces allowed!", "anything"));
    }

    #[test]
    fn test_generate_salt_is_random() {
        assert_ne!(generate_salt(), generate_salt());
    }

    #[test]
    fn test_constant_time_compare() {
        assert!(constant_time_compare(b"secret", b"secret"));
        assert!(!constant_time_compare(b"secret", b"public"));
        assert!(!constant_time_compare(b"secret", b"sec"));
    }

    #[test]
    fn test_invalid_params_rejected() {
        assert!(matches!(
            PasswordHasher::new(0, 0, 0),
            Err(CryptoError::InvalidParams(_))
        ));
    }
}
