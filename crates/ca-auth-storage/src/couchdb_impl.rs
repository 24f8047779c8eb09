//! CouchDB storage implementation over the HTTP API.

use crate::{
    errors::{Result, StorageError},
    traits::{DocumentStore, SearchRequest},
};
use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// CouchDB connection settings
#[derive(Debug, Clone)]
pub struct CouchDbConfig {
    /// Base URL, e.g. `http://localhost:5984`
    pub url: String,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Per-request timeout
    pub timeout: Duration,
}

/// CouchDB storage implementation
#[derive(Debug, Clone)]
pub struct CouchDbStore {
    client: reqwest::Client,
    base_url: Url,
    username: Option<String>,
    password: Option<String>,
}

#[derive(Deserialize)]
struct FindResponse<V> {
    docs: Vec<V>,
}

#[derive(Deserialize)]
struct CouchError {
    error: String,
    #[serde(default)]
    reason: String,
}

impl CouchDbStore {
    /// Build a client for the configured server
    pub fn new(config: CouchDbConfig) -> Result<Self> {
        let base_url =
            Url::parse(&config.url).map_err(|e| StorageError::InvalidUrl(e.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(StorageError::InvalidUrl(config.url));
        }

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(transport)?;

        Ok(Self {
            client,
            base_url,
            username: config.username,
            password: config.password,
        })
    }

    /// Build `<base>/<segments...>` with each segment percent-encoded
    pub(crate) fn url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| StorageError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let builder = self.client.request(method, url);
        match &self.username {
            Some(user) => builder.basic_auth(user, self.password.as_ref()),
            None => builder,
        }
    }
}

fn transport(error: reqwest::Error) -> StorageError {
    StorageError::Transport(error.to_string())
}

/// Turn a non-success response into a diagnostic error
async fn unexpected(response: Response) -> StorageError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    let reason = match serde_json::from_str::<CouchError>(&body) {
        Ok(err) if err.reason.is_empty() => err.error,
        Ok(err) => format!("{}: {}", err.error, err.reason),
        Err(_) => body,
    };
    StorageError::UnexpectedStatus { status, reason }
}

/// Whether a 404 body reports the database itself as missing
///
/// CouchDB answers `{"error":"not_found","reason":"missing"}` (or
/// `"deleted"`) for an absent document and `"Database does not exist."`
/// for an absent database.
fn is_missing_database(body: &str) -> bool {
    serde_json::from_str::<CouchError>(body)
        .map(|err| err.reason.starts_with("Database does not exist"))
        .unwrap_or(false)
}

#[async_trait]
impl DocumentStore for CouchDbStore {
    async fn get_by_id<V>(&self, db: &str, key: &str) -> Result<Option<V>>
    where
        V: DeserializeOwned + Send,
    {
        let url = self.url(&[db, key])?;
        let response = self
            .request(Method::GET, url)
            .send()
            .await
            .map_err(transport)?;

        match response.status() {
            StatusCode::NOT_FOUND => {
                let body = response.text().await.map_err(transport)?;
                if is_missing_database(&body) {
                    return Err(StorageError::DatabaseNotFound(db.to_string()));
                }
                Ok(None)
            }
            status if status.is_success() => {
                let bytes = response.bytes().await.map_err(transport)?;
                let value = serde_json::from_slice(&bytes)
                    .map_err(|e| StorageError::Deserialization(e.to_string()))?;
                Ok(Some(value))
            }
            _ => Err(unexpected(response).await),
        }
    }

    async fn create<V>(&self, db: &str, key: &str, value: &V) -> Result<()>
    where
        V: Serialize + Send + Sync,
    {
        let body =
            serde_json::to_vec(value).map_err(|e| StorageError::Serialization(e.to_string()))?;
        let url = self.url(&[db, key])?;
        let response = self
            .request(Method::PUT, url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(transport)?;

        match response.status() {
            StatusCode::CREATED | StatusCode::ACCEPTED => Ok(()),
            StatusCode::CONFLICT => Err(StorageError::AlreadyExists),
            StatusCode::NOT_FOUND => Err(StorageError::DatabaseNotFound(db.to_string())),
            _ => Err(unexpected(response).await),
        }
    }

    async fn search<V>(&self, db: &str, request: &SearchRequest) -> Result<Vec<V>>
    where
        V: DeserializeOwned + Send,
    {
        let url = self.url(&[db, "_find"])?;
        let body = json!({
            "selector": request.selector,
            "limit": request.limit,
        });
        let response = self
            .request(Method::POST, url)
            .json(&body)
            .send()
            .await
            .map_err(transport)?;

        match response.status() {
            StatusCode::NOT_FOUND => Err(StorageError::DatabaseNotFound(db.to_string())),
            status if status.is_success() => {
                let bytes = response.bytes().await.map_err(transport)?;
                let found: FindResponse<V> = serde_json::from_slice(&bytes)
                    .map_err(|e| StorageError::Deserialization(e.to_string()))?;
                Ok(found.docs)
            }
            _ => Err(unexpected(response).await),
        }
    }

    async fn create_database(&self, db: &str) -> Result<()> {
        let url = self.url(&[db])?;
        let response = self
            .request(Method::PUT, url)
            .send()
            .await
            .map_err(transport)?;

        match response.status() {
            StatusCode::CREATED | StatusCode::ACCEPTED => {
                debug!("Created database {}", db);
                Ok(())
            }
            StatusCode::PRECONDITION_FAILED => {
                debug!("Database {} already exists", db);
                Ok(())
            }
            _ => Err(unexpected(response).await),
        }
    }

    async fn create_index(&self, db: &str, fields: &[&str]) -> Result<()> {
        let url = self.url(&[db, "_index"])?;
        let body = json!({
            "index": { "fields": fields },
            "name": format!("{}-index", db),
            "type": "json",
        });
        let response = self
            .request(Method::POST, url)
            .json(&body)
            .send()
            .await
            .map_err(transport)?;

        match response.status() {
            StatusCode::NOT_FOUND => Err(StorageError::DatabaseNotFound(db.to_string())),
            status if status.is_success() => {
                debug!("Index on {} over {:?} ready", db, fields);
                Ok(())
            }
            _ => Err(unexpected(response).await),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn store(url: &str) -> Result<CouchDbStore> {
        CouchDbStore::new(CouchDbConfig {
            url: url.to_string(),
            username: Some("admin".to_string()),
            password: Some("passwd".to_string()),
            timeout: Duration::from_secs(5),
        })
    }

    #[test]
    fn test_document_url() {
        let store = store("http://localhost:5984").unwrap();
        let url = store.url(&["useraccount", "alice"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:5984/useraccount/alice");
    }

    #[test]
    fn test_url_with_base_path_and_trailing_slash() {
        let store = store("http://couch.internal:5984/proxy/").unwrap();
        let url = store.url(&["useraccount", "_find"]).unwrap();
        assert_eq!(url.as_str(), "http://couch.internal:5984/proxy/useraccount/_find");
    }

    #[test]
    fn test_document_key_is_percent_encoded() {
        let store = store("http://localhost:5984").unwrap();
        let url = store.url(&["useraccount", "org1/admin"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:5984/useraccount/org1%2Fadmin");
    }

    #[test]
    fn test_missing_database_is_not_a_missing_document() {
        assert!(is_missing_database(
            r#"{"error":"not_found","reason":"Database does not exist."}"#
        ));

        assert!(!is_missing_database(r#"{"error":"not_found","reason":"missing"}"#));
        assert!(!is_missing_database(r#"{"error":"not_found","reason":"deleted"}"#));
        assert!(!is_missing_database(""));
    }

    async fn mock_get(server: &MockServer, doc_path: &str, status: u16, body: &str) {
        Mock::given(method("GET"))
            .and(path(doc_path))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_get_by_id_missing_document() {
        let server = MockServer::start().await;
        mock_get(
            &server,
            "/useraccount/bob",
            404,
            r#"{"error":"not_found","reason":"missing"}"#,
        )
        .await;

        let store = store(&server.uri()).unwrap();
        let found: Option<Value> = store.get_by_id("useraccount", "bob").await.unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_get_by_id_missing_database() {
        let server = MockServer::start().await;
        mock_get(
            &server,
            "/useraccount/bob",
            404,
            r#"{"error":"not_found","reason":"Database does not exist."}"#,
        )
        .await;

        let store = store(&server.uri()).unwrap();
        let result: Result<Option<Value>> = store.get_by_id("useraccount", "bob").await;
        assert!(matches!(result, Err(StorageError::DatabaseNotFound(db)) if db == "useraccount"));
    }

    #[tokio::test]
    async fn test_get_by_id_found() {
        let server = MockServer::start().await;
        mock_get(
            &server,
            "/useraccount/bob",
            200,
            r#"{"_id":"bob","_rev":"1-abc","username":"bob"}"#,
        )
        .await;

        let store = store(&server.uri()).unwrap();
        let found: Value = store
            .get_by_id("useraccount", "bob")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found["username"], "bob");
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(store("not a url"), Err(StorageError::InvalidUrl(_))));
        assert!(matches!(store("mailto:db@example.com"), Err(StorageError::InvalidUrl(_))));
    }
}
