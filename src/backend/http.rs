//! HTTP implementation of [`SearchBackend`] for Elasticsearch-compatible
//! backends.
//!
//! Endpoints used:
//! - `HEAD /{index}` for the existence check
//! - `POST /{index}/_pit?keep_alive=...` to open a snapshot
//! - `DELETE /_pit` with the snapshot id to close it
//! - `POST /_search` for paged queries (the snapshot reference inside the
//!   query body scopes the search, so no index appears in the path)

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::{Value, json};
use std::time::Duration;
use tracing::debug;

use crate::error::{BackendError, Result};

use super::{Hit, SearchBackend, SnapshotHandle};

/// Search backend speaking the Elasticsearch REST API over HTTP.
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    /// Create a backend client for the given base URL.
    ///
    /// # Arguments
    /// * `base_url` - Backend address, e.g. `http://localhost:9200`
    /// * `timeout` - Per-request timeout
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// Map transport-level failures to [`BackendError::Unreachable`] so the
    /// caller can distinguish "backend is down" from "backend said no".
    fn transport_err(err: reqwest::Error) -> BackendError {
        if err.is_connect() || err.is_timeout() {
            BackendError::Unreachable(err.to_string())
        } else {
            BackendError::QueryFailed(err.to_string())
        }
    }
}

#[async_trait]
impl SearchBackend for HttpBackend {
    async fn index_exists(&self, index: &str) -> Result<bool> {
        let resp = self
            .client
            .head(self.url(index))
            .send()
            .await
            .map_err(Self::transport_err)?;

        match resp.status() {
            StatusCode::OK => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            status => Err(BackendError::UnexpectedResponse(format!(
                "existence check for '{index}' returned {status}"
            ))
            .into()),
        }
    }

    async fn open_snapshot(&self, index: &str, keep_alive: &str) -> Result<SnapshotHandle> {
        let resp = self
            .client
            .post(self.url(&format!("{index}/_pit")))
            .query(&[("keep_alive", keep_alive)])
            .send()
            .await
            .map_err(|e| BackendError::SnapshotOpenFailed(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(BackendError::SnapshotOpenFailed(format!(
                "backend returned {} for index '{index}'",
                resp.status()
            ))
            .into());
        }

        let body: Value = resp
            .json()
            .await
            .map_err(|e| BackendError::SnapshotOpenFailed(e.to_string()))?;

        // Older backends answer with "pit_id", newer ones with "id".
        let id = body
            .get("id")
            .or_else(|| body.get("pit_id"))
            .and_then(Value::as_str)
            .ok_or_else(|| {
                BackendError::UnexpectedResponse(format!(
                    "snapshot open response carried no id: {body}"
                ))
            })?;

        debug!("Opened snapshot over '{}' (keep_alive {})", index, keep_alive);

        Ok(SnapshotHandle {
            id: id.to_string(),
            keep_alive: keep_alive.to_string(),
        })
    }

    async fn close_snapshot(&self, snapshot: &SnapshotHandle) -> Result<()> {
        let resp = self
            .client
            .delete(self.url("_pit"))
            .json(&json!({ "id": snapshot.id }))
            .send()
            .await
            .map_err(|e| BackendError::SnapshotCloseFailed(e.to_string()))?;

        if resp.status().is_success() {
            debug!("Closed snapshot");
            Ok(())
        } else {
            Err(BackendError::SnapshotCloseFailed(format!(
                "backend returned {}",
                resp.status()
            ))
            .into())
        }
    }

    async fn search(&self, query: &Value) -> Result<Vec<Hit>> {
        let resp = self
            .client
            .post(self.url("_search"))
            .json(query)
            .send()
            .await
            .map_err(Self::transport_err)?;

        if !resp.status().is_success() {
            return Err(
                BackendError::QueryFailed(format!("backend returned {}", resp.status())).into(),
            );
        }

        let body: Value = resp
            .json()
            .await
            .map_err(|e| BackendError::UnexpectedResponse(e.to_string()))?;

        let hits = body
            .pointer("/hits/hits")
            .and_then(Value::as_array)
            .ok_or_else(|| {
                BackendError::UnexpectedResponse("search response carried no hits array".into())
            })?;

        hits.iter()
            .map(|hit| {
                let source = hit
                    .get("_source")
                    .and_then(Value::as_object)
                    .cloned()
                    .ok_or_else(|| {
                        BackendError::UnexpectedResponse("hit carried no _source object".into())
                    })?;

                let sort = hit
                    .get("sort")
                    .and_then(Value::as_array)
                    .cloned()
                    .ok_or_else(|| {
                        BackendError::UnexpectedResponse("hit carried no sort tuple".into())
                    })?;

                Ok(Hit { source, sort })
            })
            .collect()
    }
}
