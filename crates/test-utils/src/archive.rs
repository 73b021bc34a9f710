//! Stub archive server for import tests.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, RwLock};

use axum::Router;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use serde_json::Value;
use tokio::task::JoinHandle;

type Documents = Arc<RwLock<HashMap<String, String>>>;

/// An HTTP server on an ephemeral local port that serves
/// `/contents/{id}.json`. Unknown ids return 404.
///
/// The server stops when the stub is dropped.
pub struct ArchiveStub {
    addr: SocketAddr,
    documents: Documents,
    server: JoinHandle<()>,
}

impl ArchiveStub {
    /// Bind to `127.0.0.1:0` and start serving.
    pub async fn start() -> std::io::Result<Self> {
        let documents: Documents = Arc::default();
        let app = Router::new()
            .route("/contents/{file}", get(contents))
            .with_state(documents.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let server = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::warn!(error = %e, "archive stub stopped");
            }
        });

        Ok(Self {
            addr,
            documents,
            server,
        })
    }

    /// Base URL to configure as the archive.
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Serve `metadata` for `cnx_id`.
    pub fn insert(&self, cnx_id: &str, metadata: &Value) {
        self.insert_raw(cnx_id, &metadata.to_string());
    }

    /// Serve an arbitrary body for `cnx_id`, e.g. malformed JSON.
    pub fn insert_raw(&self, cnx_id: &str, body: &str) {
        if let Ok(mut documents) = self.documents.write() {
            documents.insert(cnx_id.to_string(), body.to_string());
        }
    }
}

impl Drop for ArchiveStub {
    fn drop(&mut self) {
        self.server.abort();
    }
}

async fn contents(State(documents): State<Documents>, Path(file): Path<String>) -> Response {
    let Some(cnx_id) = file.strip_suffix(".json") else {
        return StatusCode::NOT_FOUND.into_response();
    };
    let body = documents
        .read()
        .ok()
        .and_then(|documents| documents.get(cnx_id).cloned());
    match body {
        Some(body) => ([("content-type", "application/json")], body).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}
