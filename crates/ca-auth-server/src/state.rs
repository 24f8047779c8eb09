use anyhow::{Context, Result};
use ca_auth_accounts::{AccountManager, AccountService, AccountServiceOptions};
use ca_auth_crypto::PasswordHasher;
use ca_auth_issuer::{FileSystemWallet, IssuerAdapter, LocalIssuer};
use ca_auth_sessions::TokenService;
use ca_auth_storage::{CouchDbStore, DocumentBackend, InMemoryStore};
use std::sync::Arc;

use crate::config::{Config, DocumentStoreKind};

pub type AppAccountService = AccountService<DocumentBackend, LocalIssuer, FileSystemWallet>;

/// Application state shared across all handlers
pub struct AppState {
    pub config: Config,
    pub accounts: Arc<AppAccountService>,
}

impl AppState {
    /// Build the state from configuration and provision the account database
    pub async fn new(config: Config) -> Result<Self> {
        let store = match config.document_store {
            DocumentStoreKind::CouchDb => DocumentBackend::CouchDb(
                CouchDbStore::new(config.couchdb.clone()).context("invalid CouchDB settings")?,
            ),
            DocumentStoreKind::Memory => DocumentBackend::Memory(InMemoryStore::new()),
        };
        tracing::info!("Using {} document store", store.name());

        // Development issuer; the registrar is its bootstrap administrator
        let issuer = Arc::new(
            LocalIssuer::new(config.issuer_msp_id.clone())
                .with_bootstrap_identity(&config.registrar.id, &config.registrar.secret),
        );
        let wallet = Arc::new(
            FileSystemWallet::open(&config.wallet_path)
                .await
                .with_context(|| format!("opening wallet at {:?}", config.wallet_path))?,
        );
        let adapter = Arc::new(IssuerAdapter::new(issuer, wallet));

        let tokens = Arc::new(TokenService::new(
            &config.jwt_secret,
            config.jwt_expire_hours,
        )?);

        let settings = config.password_hash;
        let hasher = PasswordHasher::new(
            settings.memory_kib,
            settings.iterations,
            settings.parallelism,
        )?;

        let options = AccountServiceOptions::new(config.registrar.clone())
            .strict_registrar_enroll(config.registrar_enroll_strict)
            .hasher(hasher);

        let accounts = Arc::new(AccountService::new(
            Arc::new(store),
            adapter,
            tokens,
            options,
        ));
        accounts
            .provision()
            .await
            .context("provisioning account database")?;

        Ok(AppState { config, accounts })
    }
}
