//! Content archive client.
//!
//! Books linked to an archive document copy their license and table of
//! contents from `{archive}/contents/{id}.json` when validated.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

/// Failure to obtain archive metadata.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArchiveError {
    #[error("HTTP Error {status}: {reason}")]
    Http { status: u16, reason: String },

    #[error("archive request failed: {0}")]
    Transport(String),

    #[error("archive returned malformed metadata: {0}")]
    Malformed(String),
}

/// License block of an archive document.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ArchiveLicense {
    pub name: String,
    pub version: String,
    pub url: String,
}

/// The parts of an archive document a book imports.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ArchiveMetadata {
    pub license: ArchiveLicense,
    /// Table of contents, kept as-is.
    pub tree: Value,
}

impl ArchiveMetadata {
    pub fn from_slice(body: &[u8]) -> Result<Self, ArchiveError> {
        serde_json::from_slice(body).map_err(|e| ArchiveError::Malformed(e.to_string()))
    }
}

/// Source of archive metadata.
#[async_trait]
pub trait ArchiveClient: Send + Sync {
    async fn fetch_metadata(&self, cnx_id: &str) -> Result<ArchiveMetadata, ArchiveError>;
}

/// Fetches metadata over HTTP with a bounded timeout.
#[derive(Debug, Clone)]
pub struct HttpArchiveClient {
    base_url: String,
    client: reqwest::Client,
}

impl HttpArchiveClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();
        Self {
            base_url: base_url.into(),
            client,
        }
    }

    /// Metadata URL for a document id.
    pub fn metadata_url(&self, cnx_id: &str) -> String {
        format!(
            "{}/contents/{}.json",
            self.base_url.trim_end_matches('/'),
            cnx_id
        )
    }
}

#[async_trait]
impl ArchiveClient for HttpArchiveClient {
    async fn fetch_metadata(&self, cnx_id: &str) -> Result<ArchiveMetadata, ArchiveError> {
        let url = self.metadata_url(cnx_id);
        debug!(url = %url, "fetching archive metadata");

        let response = self.client.get(&url).send().await.map_err(|e| {
            warn!(url = %url, error = %e, "archive request failed");
            ArchiveError::Transport(e.to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!(url = %url, status = status.as_u16(), "archive returned error status");
            return Err(ArchiveError::Http {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| ArchiveError::Transport(e.to_string()))?;
        ArchiveMetadata::from_slice(&body)
    }
}
