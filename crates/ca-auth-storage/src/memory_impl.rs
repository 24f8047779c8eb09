//! In-memory document store.
//!
//! Mirrors the observable behaviour of the CouchDB client (conflict on
//! duplicate create, `_id`/`_rev` stamping, unprovisioned databases
//! rejected) without any network dependency.

use crate::{
    errors::{Result, StorageError},
    traits::{DocumentStore, SearchRequest},
};
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Default)]
struct Database {
    docs: BTreeMap<String, Value>,
    indexes: Vec<Vec<String>>,
}

/// In-memory storage implementation
#[derive(Debug, Default)]
pub struct InMemoryStore {
    databases: RwLock<HashMap<String, Database>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents held in `db`
    pub async fn document_count(&self, db: &str) -> usize {
        self.databases
            .read()
            .await
            .get(db)
            .map(|d| d.docs.len())
            .unwrap_or(0)
    }

    /// Index field lists registered on `db`
    pub async fn indexes(&self, db: &str) -> Vec<Vec<String>> {
        self.databases
            .read()
            .await
            .get(db)
            .map(|d| d.indexes.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl DocumentStore for InMemoryStore {
    async fn get_by_id<V>(&self, db: &str, key: &str) -> Result<Option<V>>
    where
        V: DeserializeOwned + Send,
    {
        let databases = self.databases.read().await;
        let database = databases
            .get(db)
            .ok_or_else(|| StorageError::DatabaseNotFound(db.to_string()))?;

        match database.docs.get(key) {
            Some(doc) => {
                let value = serde_json::from_value(doc.clone())
                    .map_err(|e| StorageError::Deserialization(e.to_string()))?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    async fn create<V>(&self, db: &str, key: &str, value: &V) -> Result<()>
    where
        V: Serialize + Send + Sync,
    {
        let mut doc =
            serde_json::to_value(value).map_err(|e| StorageError::Serialization(e.to_string()))?;
        let fields = doc.as_object_mut().ok_or_else(|| {
            StorageError::Serialization("document must be a JSON object".to_string())
        })?;
        fields.insert("_id".to_string(), Value::String(key.to_string()));
        fields.insert(
            "_rev".to_string(),
            Value::String(format!("1-{}", Uuid::new_v4().simple())),
        );

        let mut databases = self.databases.write().await;
        let database = databases
            .get_mut(db)
            .ok_or_else(|| StorageError::DatabaseNotFound(db.to_string()))?;

        if database.docs.contains_key(key) {
            return Err(StorageError::AlreadyExists);
        }
        database.docs.insert(key.to_string(), doc);

        Ok(())
    }

    async fn search<V>(&self, db: &str, request: &SearchRequest) -> Result<Vec<V>>
    where
        V: DeserializeOwned + Send,
    {
        let databases = self.databases.read().await;
        let database = databases
            .get(db)
            .ok_or_else(|| StorageError::DatabaseNotFound(db.to_string()))?;

        database
            .docs
            .values()
            .filter(|doc| request.matches(doc))
            .take(request.limit)
            .map(|doc| {
                serde_json::from_value(doc.clone())
                    .map_err(|e| StorageError::Deserialization(e.to_string()))
            })
            .collect()
    }

    async fn create_database(&self, db: &str) -> Result<()> {
        let mut databases = self.databases.write().await;
        if databases.contains_key(db) {
            debug!("Database {} already exists", db);
            return Ok(());
        }
        databases.insert(db.to_string(), Database::default());
        Ok(())
    }

    async fn create_index(&self, db: &str, fields: &[&str]) -> Result<()> {
        let mut databases = self.databases.write().await;
        let database = databases
            .get_mut(db)
            .ok_or_else(|| StorageError::DatabaseNotFound(db.to_string()))?;

        let fields: Vec<String> = fields.iter().map(|f| f.to_string()).collect();
        if !database.indexes.contains(&fields) {
            database.indexes.push(fields);
        }
        Ok(())
    }
}
