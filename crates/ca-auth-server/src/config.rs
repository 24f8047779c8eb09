use anyhow::{Context, Result};
use ca_auth_accounts::RegistrarIdentity;
use ca_auth_storage::CouchDbConfig;
use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use zeroize::Zeroizing;

/// Which document store backs the account registry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentStoreKind {
    CouchDb,
    Memory,
}

/// Argon2id cost parameters for account passwords
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordHashSettings {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

/// Server configuration
#[derive(Clone)]
pub struct Config {
    /// Address to bind the server to
    pub bind_address: SocketAddr,

    pub document_store: DocumentStoreKind,
    pub couchdb: CouchDbConfig,

    /// Directory of the file-system credential wallet
    pub wallet_path: PathBuf,

    /// Issuer-domain identifier stamped on issued credentials
    pub issuer_msp_id: String,

    pub registrar: RegistrarIdentity,

    /// Fail registrar logins when re-enrollment fails
    pub registrar_enroll_strict: bool,

    /// HS256 signing secret for session tokens
    pub jwt_secret: Zeroizing<Vec<u8>>,

    /// Session token lifetime (hours)
    pub jwt_expire_hours: u64,

    pub password_hash: PasswordHashSettings,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("bind_address", &self.bind_address)
            .field("document_store", &self.document_store)
            .field("couchdb_url", &self.couchdb.url)
            .field("wallet_path", &self.wallet_path)
            .field("issuer_msp_id", &self.issuer_msp_id)
            .field("registrar", &self.registrar)
            .field("registrar_enroll_strict", &self.registrar_enroll_strict)
            .field("jwt_expire_hours", &self.jwt_expire_hours)
            .field("password_hash", &self.password_hash)
            .finish_non_exhaustive()
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.is_empty())
                .with_context(|| format!("{} environment variable required", key))
        };

        let bind_address = var("BIND_ADDRESS", "127.0.0.1:8080")
            .parse()
            .context("BIND_ADDRESS must be a socket address")?;

        let document_store = match var("DOCUMENT_STORE", "couchdb").as_str() {
            "couchdb" => DocumentStoreKind::CouchDb,
            "memory" => DocumentStoreKind::Memory,
            other => anyhow::bail!("DOCUMENT_STORE must be 'couchdb' or 'memory', got '{}'", other),
        };

        let couchdb_timeout: u64 = var("COUCHDB_TIMEOUT_SECONDS", "10")
            .parse()
            .context("COUCHDB_TIMEOUT_SECONDS must be a number")?;
        let couchdb = CouchDbConfig {
            url: var("COUCHDB_URL", "http://localhost:5984"),
            username: lookup("COUCHDB_USER"),
            password: lookup("COUCHDB_PASSWORD"),
            timeout: Duration::from_secs(couchdb_timeout),
        };

        let registrar = RegistrarIdentity::new(
            required("REGISTRAR_ENROLL_ID")?,
            required("REGISTRAR_SECRET")?,
        );

        let registrar_enroll_strict = var("REGISTRAR_ENROLL_STRICT", "true")
            .parse()
            .context("REGISTRAR_ENROLL_STRICT must be true or false")?;

        let jwt_secret = Zeroizing::new(required("JWT_SECRET")?.into_bytes());

        let jwt_expire_hours: u64 = var("JWT_EXPIRE_HOURS", "720")
            .parse()
            .context("JWT_EXPIRE_HOURS must be a number")?;
        if jwt_expire_hours == 0 {
            anyhow::bail!("JWT_EXPIRE_HOURS must be at least 1");
        }

        let password_hash = PasswordHashSettings {
            memory_kib: var("ARGON2_MEMORY_KIB", "19456")
                .parse()
                .context("ARGON2_MEMORY_KIB must be a number")?,
            iterations: var("ARGON2_ITERATIONS", "2")
                .parse()
                .context("ARGON2_ITERATIONS must be a number")?,
            parallelism: var("ARGON2_PARALLELISM", "1")
                .parse()
                .context("ARGON2_PARALLELISM must be a number")?,
        };

        Ok(Config {
            bind_address,
            document_store,
            couchdb,
            wallet_path: var("WALLET_PATH", "./data/wallet").into(),
            issuer_msp_id: var("ISSUER_MSP_ID", "Org1MSP"),
            registrar,
            registrar_enroll_strict,
            jwt_secret,
            jwt_expire_hours,
            password_hash,
        })
    }
}
