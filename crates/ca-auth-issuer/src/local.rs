//! In-process identity issuer.
//!
//! Stands in for an external certificate authority during development and
//! in tests. Registrations live in memory; each enrollment mints a fresh
//! Ed25519 key pair and a certificate signed by the issuer's own key.

use crate::{
    errors::{IssuerError, Result},
    traits::IdentityIssuer,
    types::*,
};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use ca_auth_crypto::{constant_time_compare, current_timestamp};
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

const CERTIFICATE_HEADER: &str = "-----BEGIN LOCAL CERTIFICATE-----";
const CERTIFICATE_FOOTER: &str = "-----END LOCAL CERTIFICATE-----";

#[derive(Debug)]
struct Registration {
    identity_type: String,
    secret: String,
    max_enrollments: i32,
    enrollments: u32,
}

/// Certificate body signed by the issuer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalCertificate {
    pub subject: String,
    pub identity_type: String,
    pub msp_id: String,
    /// Hex-encoded Ed25519 public key of the subject
    pub public_key: String,
    pub issued_at: u64,
    /// Hex-encoded issuer signature over the fields above
    pub signature: String,
}

impl LocalCertificate {
    fn signing_message(&self) -> Vec<u8> {
        format!(
            "{}|{}|{}|{}|{}",
            self.subject, self.identity_type, self.msp_id, self.public_key, self.issued_at
        )
        .into_bytes()
    }

    fn to_pem(&self) -> Result<String> {
        let json =
            serde_json::to_vec(self).map_err(|e| IssuerError::Serialization(e.to_string()))?;
        Ok(format!(
            "{}\n{}\n{}\n",
            CERTIFICATE_HEADER,
            STANDARD.encode(json),
            CERTIFICATE_FOOTER
        ))
    }

    /// Decode a certificate produced by `LocalIssuer`
    pub fn from_pem(pem: &str) -> Result<Self> {
        let body = pem
            .trim()
            .strip_prefix(CERTIFICATE_HEADER)
            .and_then(|rest| rest.strip_suffix(CERTIFICATE_FOOTER))
            .ok_or_else(|| IssuerError::Serialization("malformed certificate".to_string()))?;
        let json = STANDARD
            .decode(body.trim())
            .map_err(|e| IssuerError::Serialization(e.to_string()))?;
        serde_json::from_slice(&json).map_err(|e| IssuerError::Serialization(e.to_string()))
    }
}

fn generate_signing_key() -> SigningKey {
    let mut seed = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut seed);
    SigningKey::from_bytes(&seed)
}

/// In-memory identity issuer
pub struct LocalIssuer {
    msp_id: String,
    signing_key: SigningKey,
    registrations: RwLock<HashMap<String, Registration>>,
}

impl LocalIssuer {
    /// Create an issuer for the given issuer domain
    pub fn new(msp_id: impl Into<String>) -> Self {
        Self {
            msp_id: msp_id.into(),
            signing_key: generate_signing_key(),
            registrations: RwLock::new(HashMap::new()),
        }
    }

    /// Pre-register the issuer's bootstrap administrator
    pub fn with_bootstrap_identity(mut self, id: &str, secret: &str) -> Self {
        self.registrations.get_mut().insert(
            id.to_string(),
            Registration {
                identity_type: "admin".to_string(),
                secret: secret.to_string(),
                max_enrollments: UNLIMITED_ENROLLMENTS,
                enrollments: 0,
            },
        );
        self
    }

    pub fn verifying_key(&self) -> VerifyingKey {
        self.signing_key.verifying_key()
    }

    pub async fn is_registered(&self, id: &str) -> bool {
        self.registrations.read().await.contains_key(id)
    }

    /// Number of successful enrollments for `id`
    pub async fn enrollment_count(&self, id: &str) -> u32 {
        self.registrations
            .read()
            .await
            .get(id)
            .map(|r| r.enrollments)
            .unwrap_or(0)
    }

    /// Check that a certificate was signed by this issuer
    pub fn verify_certificate(&self, pem: &str) -> bool {
        let Ok(certificate) = LocalCertificate::from_pem(pem) else {
            return false;
        };
        let Ok(signature_bytes) = hex::decode(&certificate.signature) else {
            return false;
        };
        let Ok(signature) = Signature::from_slice(&signature_bytes) else {
            return false;
        };
        self.verifying_key()
            .verify(&certificate.signing_message(), &signature)
            .is_ok()
    }

    fn issue_certificate(
        &self,
        subject: &str,
        identity_type: &str,
        public_key: &VerifyingKey,
    ) -> Result<String> {
        let mut certificate = LocalCertificate {
            subject: subject.to_string(),
            identity_type: identity_type.to_string(),
            msp_id: self.msp_id.clone(),
            public_key: hex::encode(public_key.to_bytes()),
            issued_at: current_timestamp(),
            signature: String::new(),
        };
        let signature = self.signing_key.sign(&certificate.signing_message());
        certificate.signature = hex::encode(signature.to_bytes());
        certificate.to_pem()
    }
}

#[async_trait]
impl IdentityIssuer for LocalIssuer {
    async fn register(&self, request: RegistrationRequest) -> Result<()> {
        let mut registrations = self.registrations.write().await;
        if registrations.contains_key(&request.name) {
            warn!("Registration conflict for identity {}", request.name);
            return Err(IssuerError::AlreadyRegistered(request.name));
        }

        info!(
            "Registered identity {} as {}",
            request.name, request.identity_type
        );
        registrations.insert(
            request.name,
            Registration {
                identity_type: request.identity_type,
                secret: request.secret,
                max_enrollments: request.max_enrollments,
                enrollments: 0,
            },
        );
        Ok(())
    }

    async fn enroll(&self, id: &str, secret: &str) -> Result<IssuerCredential> {
        let mut registrations = self.registrations.write().await;
        let registration = registrations
            .get_mut(id)
            .ok_or_else(|| IssuerError::NotRegistered(id.to_string()))?;

        if !constant_time_compare(registration.secret.as_bytes(), secret.as_bytes()) {
            return Err(IssuerError::AuthenticationFailed(id.to_string()));
        }

        if registration.max_enrollments != UNLIMITED_ENROLLMENTS
            && i64::from(registration.enrollments) >= i64::from(registration.max_enrollments)
        {
            return Err(IssuerError::EnrollmentLimitReached(id.to_string()));
        }

        let key_pair = generate_signing_key();
        let certificate =
            self.issue_certificate(id, &registration.identity_type, &key_pair.verifying_key())?;
        registration.enrollments += 1;

        debug!("Enrolled identity {} ({} enrollments)", id, registration.enrollments);

        Ok(IssuerCredential::x509(
            self.msp_id.clone(),
            certificate,
            hex::encode(key_pair.to_bytes()),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(name: &str, max_enrollments: i32) -> RegistrationRequest {
        RegistrationRequest {
            name: name.to_string(),
            identity_type: "client".to_string(),
            secret: "pw".to_string(),
            max_enrollments,
        }
    }

    #[tokio::test]
    async fn test_register_and_enroll() {
        let issuer = LocalIssuer::new("Org1MSP");
        issuer.register(request("bob", UNLIMITED_ENROLLMENTS)).await.unwrap();

        let credential = issuer.enroll("bob", "pw").await.unwrap();
        assert_eq!(credential.msp_id, "Org1MSP");
        assert_eq!(credential.credential_type, X509_CREDENTIAL_TYPE);
        assert!(issuer.verify_certificate(&credential.credentials.certificate));

        let certificate = LocalCertificate::from_pem(&credential.credentials.certificate).unwrap();
        assert_eq!(certificate.subject, "bob");
        assert_eq!(certificate.identity_type, "client");
    }

    #[tokio::test]
    async fn test_register_conflict() {
        let issuer = LocalIssuer::new("Org1MSP");
        issuer.register(request("bob", UNLIMITED_ENROLLMENTS)).await.unwrap();

        let result = issuer.register(request("bob", UNLIMITED_ENROLLMENTS)).await;
        assert!(matches!(result, Err(IssuerError::AlreadyRegistered(id)) if id == "bob"));
    }

    #[tokio::test]
    async fn test_enroll_rejects_wrong_secret_and_unknown_identity() {
        let issuer = LocalIssuer::new("Org1MSP");
        issuer.register(request("bob", UNLIMITED_ENROLLMENTS)).await.unwrap();

        assert!(matches!(
            issuer.enroll("bob", "nope").await,
            Err(IssuerError::AuthenticationFailed(_))
        ));
        assert!(matches!(
            issuer.enroll("carol", "pw").await,
            Err(IssuerError::NotRegistered(_))
        ));
        assert_eq!(issuer.enrollment_count("bob").await, 0);
    }

    #[tokio::test]
    async fn test_enrollment_limit() {
        let issuer = LocalIssuer::new("Org1MSP");
        issuer.register(request("peer0", 1)).await.unwrap();

        issuer.enroll("peer0", "pw").await.unwrap();
        assert!(matches!(
            issuer.enroll("peer0", "pw").await,
            Err(IssuerError::EnrollmentLimitReached(_))
        ));
    }

    #[tokio::test]
    async fn test_bootstrap_identity_enrolls_repeatedly() {
        let issuer = LocalIssuer::new("Org1MSP").with_bootstrap_identity("orgadmin", "passwd");
        assert!(issuer.is_registered("orgadmin").await);

        let first = issuer.enroll("orgadmin", "passwd").await.unwrap();
        let second = issuer.enroll("orgadmin", "passwd").await.unwrap();
        assert_ne!(first.credentials.private_key, second.credentials.private_key);
        assert_eq!(issuer.enrollment_count("orgadmin").await, 2);
    }

    #[test]
    fn test_foreign_certificate_rejected() {
        let issuer = LocalIssuer::new("Org1MSP");
        let other = LocalIssuer::new("Org1MSP");
        let pem = other
            .issue_certificate("bob", "client", &generate_signing_key().verifying_key())
            .unwrap();

        assert!(other.verify_certificate(&pem));
        assert!(!issuer.verify_certificate(&pem));
        assert!(!issuer.verify_certificate("garbage"));
    }
}
