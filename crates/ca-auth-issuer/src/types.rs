//! Identity issuer types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// `max_enrollments` value allowing any number of enrollments
pub const UNLIMITED_ENROLLMENTS: i32 = -1;

/// Credential type written into wallet entries
pub const X509_CREDENTIAL_TYPE: &str = "X.509";

/// Identity registration sent to the issuer
#[derive(Clone, PartialEq, Eq)]
pub struct RegistrationRequest {
    /// Enrollment id
    pub name: String,
    /// Issuer-side identity type (`admin`, `client`, `peer`, `orderer`)
    pub identity_type: String,
    /// Enrollment secret
    pub secret: String,
    /// Allowed enrollments, `UNLIMITED_ENROLLMENTS` for no limit
    pub max_enrollments: i32,
}

impl fmt::Debug for RegistrationRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistrationRequest")
            .field("name", &self.name)
            .field("identity_type", &self.identity_type)
            .field("secret", &"<redacted>")
            .field("max_enrollments", &self.max_enrollments)
            .finish()
    }
}

/// Key material of an enrolled identity
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialMaterial {
    pub certificate: String,
    pub private_key: String,
}

impl fmt::Debug for CredentialMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialMaterial")
            .field("certificate", &self.certificate)
            .field("private_key", &"<redacted>")
            .finish()
    }
}

/// Credential produced by enrollment and persisted in the wallet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuerCredential {
    #[serde(rename = "type")]
    pub credential_type: String,
    /// Issuer-domain identifier
    pub msp_id: String,
    pub credentials: CredentialMaterial,
    pub version: u32,
}

impl IssuerCredential {
    pub fn x509(msp_id: impl Into<String>, certificate: String, private_key: String) -> Self {
        Self {
            credential_type: X509_CREDENTIAL_TYPE.to_string(),
            msp_id: msp_id.into(),
            credentials: CredentialMaterial {
                certificate,
                private_key,
            },
            version: 1,
        }
    }
}
