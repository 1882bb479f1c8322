//! Remote context service client.
//!
//! The context service persists exact-text memory across runs: a context is
//! created once (`POST /contexts`), its opaque id is kept on disk for reuse,
//! and records are read and appended through `GET`/`POST /contexts/{id}`.
//!
//! Every transport or decode failure maps to
//! [`MemoryError::PersistenceUnavailable`]; callers degrade to local-only
//! storage rather than failing a resolution.

use std::path::PathBuf;
use std::time::Duration;

use reqwest::StatusCode;
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::error::MemoryError;
use super::types::ContextRecord;

/// File under the data dir holding the persisted context id.
const CONTEXT_ID_FILE: &str = "context_id";

/// Per-request timeout for the context service.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Response to context creation.
#[derive(Debug, Deserialize)]
struct CreatedContext {
    id: String,
}

/// Envelope around stored records.
#[derive(Debug, Deserialize)]
struct ContextData {
    #[serde(default)]
    data: Vec<ContextRecord>,
}

/// HTTP client for the remote context service.
pub struct ContextClient {
    base_url: String,
    client: reqwest::Client,
    id_path: PathBuf,
    context_id: Mutex<Option<String>>,
}

impl ContextClient {
    /// Create a client against a base URL with a bearer token.
    ///
    /// The context id is persisted under [`mend_paths::data_dir`].
    pub fn new(base_url: impl Into<String>, api_key: &str) -> Result<Self, MemoryError> {
        Self::with_id_path(base_url, api_key, mend_paths::data_dir().join(CONTEXT_ID_FILE))
    }

    /// Create a client that persists the context id at an explicit path
    /// (used by tests).
    pub fn with_id_path(
        base_url: impl Into<String>,
        api_key: &str,
        id_path: PathBuf,
    ) -> Result<Self, MemoryError> {
        let mut headers = reqwest::header::HeaderMap::new();
        let mut auth = reqwest::header::HeaderValue::from_str(&format!("Bearer {api_key}"))
            .map_err(|e| MemoryError::Storage(format!("invalid API key: {e}")))?;
        auth.set_sensitive(true);
        headers.insert(reqwest::header::AUTHORIZATION, auth);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| MemoryError::Storage(e.to_string()))?;

        Ok(Self {
            base_url: base_url.into(),
            client,
            id_path,
            context_id: Mutex::new(None),
        })
    }

    /// Ensure a context exists, creating and persisting one on first use.
    ///
    /// The id is read from disk when a prior run left one, so a context is
    /// created at most once per installation.
    async fn ensure_context(&self) -> Result<String, MemoryError> {
        let mut guard = self.context_id.lock().await;
        if let Some(id) = guard.as_ref() {
            return Ok(id.clone());
        }

        if self.id_path.exists() {
            let id = std::fs::read_to_string(&self.id_path)?.trim().to_string();
            if !id.is_empty() {
                debug!(context_id = %id, "reusing persisted context");
                *guard = Some(id.clone());
                return Ok(id);
            }
        }

        let response = self
            .client
            .post(format!("{}/contexts", self.base_url))
            .send()
            .await
            .map_err(|e| MemoryError::PersistenceUnavailable(e.to_string()))?;

        if response.status() != StatusCode::CREATED {
            return Err(MemoryError::PersistenceUnavailable(format!(
                "failed to create context: status {}",
                response.status()
            )));
        }

        let created: CreatedContext = response
            .json()
            .await
            .map_err(|e| MemoryError::PersistenceUnavailable(e.to_string()))?;

        if let Some(parent) = self.id_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.id_path, &created.id)?;
        info!(context_id = %created.id, "created context");

        *guard = Some(created.id.clone());
        Ok(created.id)
    }

    /// Fetch all stored records.
    pub async fn records(&self) -> Result<Vec<ContextRecord>, MemoryError> {
        let id = self.ensure_context().await?;
        let response = self
            .client
            .get(format!("{}/contexts/{}", self.base_url, id))
            .send()
            .await
            .map_err(|e| MemoryError::PersistenceUnavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(MemoryError::PersistenceUnavailable(format!(
                "failed to fetch context: status {}",
                response.status()
            )));
        }

        let data: ContextData = response
            .json()
            .await
            .map_err(|e| MemoryError::PersistenceUnavailable(e.to_string()))?;
        Ok(data.data)
    }

    /// Append a new record.
    pub async fn append(&self, error: &str, fix: &str) -> Result<(), MemoryError> {
        let id = self.ensure_context().await?;
        let record = ContextRecord::new(error, fix);
        let response = self
            .client
            .post(format!("{}/contexts/{}", self.base_url, id))
            .json(&record)
            .send()
            .await
            .map_err(|e| MemoryError::PersistenceUnavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(MemoryError::PersistenceUnavailable(format!(
                "failed to store record: status {}",
                response.status()
            )));
        }
        debug!("stored record in context");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_id_path(dir: &tempfile::TempDir) -> PathBuf {
        dir.path().join("context_id")
    }

    #[tokio::test]
    async fn creates_and_persists_context_id() {
        let mut server = mockito::Server::new_async().await;
        let create = server
            .mock("POST", "/contexts")
            .with_status(201)
            .with_body(r#"{"id": "ctx-123"}"#)
            .expect(1)
            .create_async()
            .await;
        let fetch = server
            .mock("GET", "/contexts/ctx-123")
            .with_status(200)
            .with_body(r#"{"data": []}"#)
            .expect(2)
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let client = ContextClient::with_id_path(server.url(), "key", temp_id_path(&dir)).unwrap();

        assert!(client.records().await.unwrap().is_empty());
        // Second call must reuse the persisted id, not create again.
        assert!(client.records().await.unwrap().is_empty());

        create.assert_async().await;
        fetch.assert_async().await;
        assert_eq!(
            std::fs::read_to_string(temp_id_path(&dir)).unwrap(),
            "ctx-123"
        );
    }

    #[tokio::test]
    async fn reuses_id_from_prior_run() {
        let mut server = mockito::Server::new_async().await;
        let fetch = server
            .mock("GET", "/contexts/ctx-old")
            .with_status(200)
            .with_body(r#"{"data": [{"error": "IndexError: oops", "fix": "Check bounds", "timestamp": "2026-08-01T00:00:00Z"}]}"#)
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        std::fs::write(temp_id_path(&dir), "ctx-old\n").unwrap();
        let client = ContextClient::with_id_path(server.url(), "key", temp_id_path(&dir)).unwrap();

        let records = client.records().await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].fix, "Check bounds");
        fetch.assert_async().await;
    }

    #[tokio::test]
    async fn append_posts_record() {
        let mut server = mockito::Server::new_async().await;
        let append = server
            .mock("POST", "/contexts/ctx-old")
            .match_body(mockito::Matcher::PartialJsonString(
                r#"{"error": "IndexError: oops", "fix": "Check bounds"}"#.to_string(),
            ))
            .with_status(201)
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        std::fs::write(temp_id_path(&dir), "ctx-old").unwrap();
        let client = ContextClient::with_id_path(server.url(), "key", temp_id_path(&dir)).unwrap();

        client.append("IndexError: oops", "Check bounds").await.unwrap();
        append.assert_async().await;
    }

    #[tokio::test]
    async fn unreachable_service_is_persistence_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        // Port 1 refuses connections.
        let client =
            ContextClient::with_id_path("http://127.0.0.1:1", "key", temp_id_path(&dir)).unwrap();

        let err = client.records().await.unwrap_err();
        assert!(matches!(err, MemoryError::PersistenceUnavailable(_)));
    }

    #[tokio::test]
    async fn non_created_status_is_persistence_unavailable() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/contexts")
            .with_status(500)
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let client = ContextClient::with_id_path(server.url(), "key", temp_id_path(&dir)).unwrap();

        let err = client.records().await.unwrap_err();
        assert!(matches!(err, MemoryError::PersistenceUnavailable(_)));
    }
}
