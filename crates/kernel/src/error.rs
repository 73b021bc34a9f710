//! Application error types.

use std::collections::BTreeMap;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

use crate::catalog::PlacementError;
use crate::projection::ProjectionError;
use crate::services::page_service::PageServiceError;
use crate::store::StoreError;

/// Field-level validation messages, keyed by field path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, Vec<String>>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// `Ok(())` when empty, otherwise `Err(self)`.
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let fields: Vec<&str> = self.fields().collect();
        write!(f, "invalid fields: {}", fields.join(", "))
    }
}

/// Application errors.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("internal server error")]
    Internal(#[from] anyhow::Error),

    #[error("not found")]
    NotFound,

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("{0}")]
    Validation(ValidationErrors),

    #[error(transparent)]
    Placement(#[from] PlacementError),

    #[error("storage error")]
    Store(#[from] StoreError),

    #[error("projection error")]
    Projection(#[from] ProjectionError),
}

impl From<PageServiceError> for AppError {
    fn from(err: PageServiceError) -> Self {
        match err {
            PageServiceError::Validation(errors) => AppError::Validation(errors),
            PageServiceError::Placement(e) => AppError::Placement(e),
            PageServiceError::NotFound => AppError::NotFound,
            PageServiceError::Store(e) => AppError::Store(e),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::NotFound => (StatusCode::NOT_FOUND, json!({"error": "not found"})),
            AppError::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, json!({"error": message}))
            }
            AppError::Validation(errors) => (StatusCode::BAD_REQUEST, json!({"errors": errors})),
            AppError::Placement(e) => (
                StatusCode::BAD_REQUEST,
                json!({"errors": {"parent_id": [e.to_string()]}}),
            ),
            AppError::Internal(e) => {
                tracing::error!(error = %e, "internal server error");
                internal()
            }
            AppError::Store(e) => {
                tracing::error!(error = %e, "storage error");
                internal()
            }
            AppError::Projection(e) => {
                tracing::error!(error = %e, "projection error");
                internal()
            }
        };

        (status, Json(body)).into_response()
    }
}

fn internal() -> (StatusCode, serde_json::Value) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        json!({"error": "internal server error"}),
    )
}

/// Result type alias using AppError.
pub type AppResult<T> = Result<T, AppError>;
