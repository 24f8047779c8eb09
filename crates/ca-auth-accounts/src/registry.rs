//! Account records in the document store.

use crate::{errors::*, types::Account};
use ca_auth_crypto::PasswordHasher;
use ca_auth_sessions::UserRole;
use ca_auth_storage::{
    DocumentStore, SearchRequest, StorageError, ACCOUNT_INDEX_FIELDS, DB_USER_ACCOUNTS,
};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Account registry
///
/// "Not found" is an `Ok(None)` outcome; every other store failure
/// propagates unchanged.
pub struct AccountRegistry<S: DocumentStore> {
    store: Arc<S>,
    hasher: PasswordHasher,
}

impl<S: DocumentStore> AccountRegistry<S> {
    pub fn new(store: Arc<S>, hasher: PasswordHasher) -> Self {
        Self { store, hasher }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Create the account database and its search index
    pub async fn provision(&self) -> Result<()> {
        self.store.create_database(DB_USER_ACCOUNTS).await?;
        self.store
            .create_index(DB_USER_ACCOUNTS, ACCOUNT_INDEX_FIELDS)
            .await?;
        info!("Provisioned {} database", DB_USER_ACCOUNTS);
        Ok(())
    }

    /// Look an account up by its document key
    pub async fn find_by_id(&self, id: &str) -> Result<Option<Account>> {
        Ok(self.store.get_by_id(DB_USER_ACCOUNTS, id).await?)
    }

    /// Look an account up by username, returning the first match
    pub async fn find_by_username(&self, username: &str) -> Result<Option<Account>> {
        let request = SearchRequest::new().eq("username", username).limit(2);
        let matches: Vec<Account> = self.store.search(DB_USER_ACCOUNTS, &request).await?;

        if matches.len() > 1 {
            warn!(
                username = %username,
                "Multiple accounts share a username, using the first"
            );
        }

        Ok(matches.into_iter().next())
    }

    /// Persist a new account
    ///
    /// A taken identifier is reported as `DuplicateAccount` from the
    /// store's own conflict signal.
    pub async fn create(&self, account: &Account) -> Result<()> {
        match self
            .store
            .create(DB_USER_ACCOUNTS, &account.id, account)
            .await
        {
            Ok(()) => {
                debug!(username = %account.id, "Account record created");
                Ok(())
            }
            Err(StorageError::AlreadyExists) => Err(AccountError::DuplicateAccount(account.id.clone())),
            Err(e) => Err(e.into()),
        }
    }

    /// Build an account (not yet persisted) hashed with this registry's parameters
    pub fn build_account(
        &self,
        id: &str,
        username: &str,
        secret: &str,
        role: UserRole,
    ) -> Result<Account> {
        Account::new(id, username, secret, role, &self.hasher)
    }

    pub fn matches_secret(&self, account: &Account, secret: &str) -> bool {
        account.matches_secret(&self.hasher, secret)
    }
}
