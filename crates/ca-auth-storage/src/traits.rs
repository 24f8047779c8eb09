//! Storage trait definitions.

use crate::errors::Result;
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};

/// Document store interface
///
/// Abstracts the backing document database so services can be tested
/// against an in-memory implementation.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Get a document by key
    ///
    /// # Returns
    ///
    /// `Ok(Some(doc))` if the key exists, `Ok(None)` if not found
    async fn get_by_id<V>(&self, db: &str, key: &str) -> Result<Option<V>>
    where
        V: DeserializeOwned + Send;

    /// Create a new document under `key`
    ///
    /// Fails with `StorageError::AlreadyExists` if the key is taken.
    async fn create<V>(&self, db: &str, key: &str, value: &V) -> Result<()>
    where
        V: Serialize + Send + Sync;

    /// Find documents matching an equality selector
    async fn search<V>(&self, db: &str, request: &SearchRequest) -> Result<Vec<V>>
    where
        V: DeserializeOwned + Send;

    /// Create a database; succeeds if it already exists
    async fn create_database(&self, db: &str) -> Result<()>;

    /// Create an index over the given fields
    async fn create_index(&self, db: &str, fields: &[&str]) -> Result<()>;
}

/// Equality search over document fields
///
/// Field names may be dotted paths into nested objects.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchRequest {
    pub selector: Map<String, Value>,
    pub limit: usize,
}

impl SearchRequest {
    /// Create an empty request returning at most one document
    pub fn new() -> Self {
        Self {
            selector: Map::new(),
            limit: 1,
        }
    }

    /// Require `field == value`
    pub fn eq(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.selector.insert(field.to_string(), value.into());
        self
    }

    /// Set the maximum number of documents returned
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Check whether a JSON document satisfies every selector clause
    pub fn matches(&self, doc: &Value) -> bool {
        self.selector
            .iter()
            .all(|(field, expected)| lookup_path(doc, field) == Some(expected))
    }
}

fn lookup_path<'a>(doc: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(doc, |current, segment| current.get(segment))
}
