//! Snippet and media API.
//!
//! Images are served by id for sites off the default port. Deleting a
//! document or image nulls every page reference to it.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post},
};
use folio_sdk::types::ReferenceTarget;
use serde_json::{Value, json};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::Snippet;
use crate::state::AppState;

/// Create the media router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/v0/snippets", post(put_snippet))
        .route("/api/v0/images/{id}", get(get_image).delete(delete_image))
        .route("/api/v0/documents/{id}", delete(delete_document))
}

async fn put_snippet(
    State(state): State<AppState>,
    Json(snippet): Json<Snippet>,
) -> AppResult<(StatusCode, Json<Snippet>)> {
    state.pages().put_snippet(&snippet).await?;
    Ok((StatusCode::CREATED, Json(snippet)))
}

async fn get_image(State(state): State<AppState>, Path(id): Path<Uuid>) -> AppResult<Json<Value>> {
    let Snippet::Image(image) = state.pages().get_snippet(ReferenceTarget::Image, id).await?
    else {
        return Err(AppError::NotFound);
    };
    let url = state.projector().media().image(Some(&image));
    Ok(Json(json!({
        "id": image.id,
        "title": image.title,
        "file": image.file,
        "url": url,
    })))
}

async fn delete_image(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Value>> {
    remove(&state, ReferenceTarget::Image, id).await
}

async fn delete_document(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Value>> {
    remove(&state, ReferenceTarget::Document, id).await
}

async fn remove(state: &AppState, target: ReferenceTarget, id: Uuid) -> AppResult<Json<Value>> {
    let updated = state.pages().delete_snippet(target, id).await?;
    Ok(Json(json!({ "updated_pages": updated })))
}
