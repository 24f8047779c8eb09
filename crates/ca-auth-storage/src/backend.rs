//! Runtime selection between document store implementations.

use crate::{
    couchdb_impl::CouchDbStore,
    errors::Result,
    memory_impl::InMemoryStore,
    traits::{DocumentStore, SearchRequest},
};
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};

/// Document store chosen by configuration at startup
#[derive(Debug)]
pub enum DocumentBackend {
    CouchDb(CouchDbStore),
    Memory(InMemoryStore),
}

impl DocumentBackend {
    pub fn name(&self) -> &'static str {
        match self {
            DocumentBackend::CouchDb(_) => "couchdb",
            DocumentBackend::Memory(_) => "memory",
        }
    }
}

#[async_trait]
impl DocumentStore for DocumentBackend {
    async fn get_by_id<V>(&self, db: &str, key: &str) -> Result<Option<V>>
    where
        V: DeserializeOwned + Send,
    {
        match self {
            DocumentBackend::CouchDb(store) => store.get_by_id(db, key).await,
            DocumentBackend::Memory(store) => store.get_by_id(db, key).await,
        }
    }

    async fn create<V>(&self, db: &str, key: &str, value: &V) -> Result<()>
    where
        V: Serialize + Send + Sync,
    {
        match self {
            DocumentBackend::CouchDb(store) => store.create(db, key, value).await,
            DocumentBackend::Memory(store) => store.create(db, key, value).await,
        }
    }

    async fn search<V>(&self, db: &str, request: &SearchRequest) -> Result<Vec<V>>
    where
        V: DeserializeOwned + Send,
    {
        match self {
            DocumentBackend::CouchDb(store) => store.search(db, request).await,
            DocumentBackend::Memory(store) => store.search(db, request).await,
        }
    }

    async fn create_database(&self, db: &str) -> Result<()> {
        match self {
            DocumentBackend::CouchDb(store) => store.create_database(db).await,
            DocumentBackend::Memory(store) => store.create_database(db).await,
        }
    }

    async fn create_index(&self, db: &str, fields: &[&str]) -> Result<()> {
        match self {
            DocumentBackend::CouchDb(store) => store.create_index(db, fields).await,
            DocumentBackend::Memory(store) => store.create_index(db, fields).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    #[tokio::test]
    async fn test_memory_backend_delegates() {
        let backend = DocumentBackend::Memory(InMemoryStore::new());
        assert_eq!(backend.name(), "memory");

        backend.create_database("useraccount").await.unwrap();
        backend
            .create("useraccount", "alice", &json!({ "username": "alice" }))
            .await
            .unwrap();

        let found: Option<Value> = backend.get_by_id("useraccount", "alice").await.unwrap();
        assert_eq!(found.unwrap()["username"], "alice");
    }
}
