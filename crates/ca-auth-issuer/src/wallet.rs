//! Credential wallet implementations.

use crate::{
    errors::{IssuerError, Result},
    traits::CredentialWallet,
    types::IssuerCredential,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;
use tracing::debug;

const IDENTITY_FILE_EXTENSION: &str = "id";

/// Wallet storing one JSON identity file per label (`<label>.id`)
#[derive(Debug, Clone)]
pub struct FileSystemWallet {
    root: PathBuf,
}

impl FileSystemWallet {
    /// Open the wallet directory, creating it if missing
    pub async fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let root = path.as_ref().to_path_buf();
        tokio::fs::create_dir_all(&root).await?;
        debug!("Opened file wallet at {:?}", root);
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn identity_path(&self, id: &str) -> Result<PathBuf> {
        validate_label(id)?;
        Ok(self.root.join(format!("{}.{}", id, IDENTITY_FILE_EXTENSION)))
    }
}

/// Check that an identifier is usable as a wallet label
///
/// Labels become file names and document keys: they must not escape the
/// wallet directory and must not start with `_`, which CouchDB reserves.
pub fn validate_label(id: &str) -> Result<()> {
    let forbidden = id.is_empty()
        || id == "."
        || id == ".."
        || id.starts_with('_')
        || id.chars().any(|c| matches!(c, '/' | '\\' | '\0'));
    if forbidden {
        return Err(IssuerError::InvalidIdentity(id.to_string()));
    }
    Ok(())
}

#[async_trait]
impl CredentialWallet for FileSystemWallet {
    async fn put(&self, id: &str, credential: &IssuerCredential) -> Result<()> {
        let path = self.identity_path(id)?;
        let bytes = serde_json::to_vec_pretty(credential)
            .map_err(|e| IssuerError::Serialization(e.to_string()))?;

        // Write then rename so readers never see a partial file
        let tmp = self
            .root
            .join(format!(".{}.{}.tmp", id, IDENTITY_FILE_EXTENSION));
        tokio::fs::write(&tmp, &bytes).await?;
        tokio::fs::rename(&tmp, &path).await?;

        debug!("Stored credential for {} in file wallet", id);
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<IssuerCredential>> {
        let path = self.identity_path(id)?;
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let credential =
            serde_json::from_slice(&bytes).map_err(|e| IssuerError::Serialization(e.to_string()))?;
        Ok(Some(credential))
    }

    async fn exists(&self, id: &str) -> Result<bool> {
        Ok(self.get(id).await?.is_some())
    }

    async fn remove(&self, id: &str) -> Result<()> {
        let path = self.identity_path(id)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Wallet held in process memory
#[derive(Debug, Default)]
pub struct InMemoryWallet {
    credentials: RwLock<HashMap<String, IssuerCredential>>,
}

impl InMemoryWallet {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.credentials.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.credentials.read().await.is_empty()
    }
}

#[async_trait]
impl CredentialWallet for InMemoryWallet {
    async fn put(&self, id: &str, credential: &IssuerCredential) -> Result<()> {
        validate_label(id)?;
        self.credentials
            .write()
            .await
            .insert(id.to_string(), credential.clone());
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<IssuerCredential>> {
        validate_label(id)?;
        Ok(self.credentials.read().await.get(id).cloned())
    }

    async fn exists(&self, id: &str) -> Result<bool> {
        validate_label(id)?;
        Ok(self.credentials.read().await.contains_key(id))
    }

    async fn remove(&self, id: &str) -> Result<()> {
        self.credentials.write().await.remove(id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn credential(cert: &str) -> IssuerCredential {
        IssuerCredential::x509("Org1MSP", cert.to_string(), "key".to_string())
    }

    async fn create_test_wallet() -> (FileSystemWallet, TempDir) {
        let temp_dir = tempfile::tempdir().unwrap();
        let wallet = FileSystemWallet::open(temp_dir.path().join("wallet"))
            .await
            .unwrap();
        (wallet, temp_dir)
    }

    #[tokio::test]
    async fn test_file_wallet_put_get() {
        let (wallet, _temp) = create_test_wallet().await;

        assert!(!wallet.exists("bob").await.unwrap());
        wallet.put("bob", &credential("cert-1")).await.unwrap();

        assert!(wallet.exists("bob").await.unwrap());
        assert_eq!(wallet.get("bob").await.unwrap(), Some(credential("cert-1")));
        assert!(wallet.root().join("bob.id").exists());
    }

    #[tokio::test]
    async fn test_file_wallet_put_overwrites() {
        let (wallet, _temp) = create_test_wallet().await;

        wallet.put("bob", &credential("cert-1")).await.unwrap();
        wallet.put("bob", &credential("cert-2")).await.unwrap();

        let stored = wallet.get("bob").await.unwrap().unwrap();
        assert_eq!(stored.credentials.certificate, "cert-2");
    }

    #[tokio::test]
    async fn test_file_wallet_remove() {
        let (wallet, _temp) = create_test_wallet().await;

        wallet.put("bob", &credential("cert-1")).await.unwrap();
        wallet.remove("bob").await.unwrap();
        assert!(!wallet.exists("bob").await.unwrap());

        // Removing again is fine
        wallet.remove("bob").await.unwrap();
    }

    #[tokio::test]
    async fn test_file_wallet_rejects_path_labels() {
        let (wallet, _temp) = create_test_wallet().await;

        for label in ["", ".", "..", "../escape", "a/b", "a\\b", "a\0b", "_bob"] {
            let result = wallet.put(label, &credential("cert")).await;
            assert!(
                matches!(result, Err(IssuerError::InvalidIdentity(_))),
                "label {:?} should be rejected",
                label
            );
        }
    }

    #[tokio::test]
    async fn test_file_wallet_corrupt_entry() {
        let (wallet, _temp) = create_test_wallet().await;
        tokio::fs::write(wallet.root().join("bob.id"), b"not json")
            .await
            .unwrap();

        assert!(matches!(
            wallet.exists("bob").await,
            Err(IssuerError::Serialization(_))
        ));
    }

    #[tokio::test]
    async fn test_file_wallet_survives_reopen() {
        let (wallet, temp) = create_test_wallet().await;
        wallet.put("bob", &credential("cert-1")).await.unwrap();

        let reopened = FileSystemWallet::open(temp.path().join("wallet"))
            .await
            .unwrap();
        assert!(reopened.exists("bob").await.unwrap());
    }

    #[tokio::test]
    async fn test_memory_wallet() {
        let wallet = InMemoryWallet::new();
        assert!(wallet.is_empty().await);

        wallet.put("bob", &credential("cert-1")).await.unwrap();
        assert!(wallet.exists("bob").await.unwrap());
        assert_eq!(wallet.len().await, 1);

        wallet.remove("bob").await.unwrap();
        assert!(!wallet.exists("bob").await.unwrap());
        assert!(wallet.get("bob").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_wallets_agree_on_invalid_labels() {
        let (file_wallet, _temp) = create_test_wallet().await;
        let memory_wallet = InMemoryWallet::new();

        for label in ["a/b", "..", "_bob"] {
            assert!(matches!(
                file_wallet.exists(label).await,
                Err(IssuerError::InvalidIdentity(_))
            ));
            assert!(matches!(
                memory_wallet.exists(label).await,
                Err(IssuerError::InvalidIdentity(_))
            ));
            assert!(matches!(
                memory_wallet.get(label).await,
                Err(IssuerError::InvalidIdentity(_))
            ));
        }
    }

    #[test]
    fn test_validate_label() {
        for label in ["bob", "bob.smith", "org1-admin", "b_ob"] {
            assert!(validate_label(label).is_ok(), "{:?}", label);
        }
        for label in ["", ".", "..", "a/b", "a\\b", "a\0b", "_bob"] {
            assert!(validate_label(label).is_err(), "{:?}", label);
        }
    }
}
