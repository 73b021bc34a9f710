//! Page read/write API.
//!
//! Listing and detail reads follow the v2 pages API shape: a listing is
//! `{meta: {total_count}, items}` and a detail read is the page type's
//! projection.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};
use serde::Deserialize;
use serde_json::{Value, json};
use uuid::Uuid;

use crate::catalog::PageKind;
use crate::error::{AppError, AppResult};
use crate::services::{CreatePage, PageInput, SaveReport};
use crate::state::AppState;

/// Query parameters for the page listing.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub slug: Option<String>,
}

/// Create the pages router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/v2/pages/", get(list_pages).post(create_page))
        .route(
            "/api/v2/pages/{id}",
            get(get_page).put(update_page).delete(delete_page),
        )
}

async fn list_pages(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Value>> {
    let kind = query
        .kind
        .as_deref()
        .map(str::parse::<PageKind>)
        .transpose()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let pages = state
        .store()
        .list_pages(kind, query.slug.as_deref())
        .await?;
    let items: Vec<Value> = pages
        .iter()
        .map(|page| state.projector().summarize(page))
        .collect();

    Ok(Json(json!({
        "meta": {"total_count": items.len()},
        "items": items,
    })))
}

async fn get_page(State(state): State<AppState>, Path(id): Path<Uuid>) -> AppResult<Json<Value>> {
    let page = state.pages().get(id).await?;
    let body = state.projector().project(&page).await?;
    Ok(Json(body))
}

async fn create_page(
    State(state): State<AppState>,
    Json(request): Json<CreatePage>,
) -> AppResult<(StatusCode, Json<Value>)> {
    let report = state.pages().create(request).await?;
    Ok((StatusCode::CREATED, Json(saved(&state, &report))))
}

async fn update_page(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<PageInput>,
) -> AppResult<Json<Value>> {
    let report = state.pages().update(id, input).await?;
    Ok(Json(saved(&state, &report)))
}

async fn delete_page(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Value>> {
    let deleted = state.pages().delete(id).await?;
    Ok(Json(json!({ "deleted": deleted })))
}

fn saved(state: &AppState, report: &SaveReport) -> Value {
    let mut body = state.projector().summarize(&report.page);
    body["dirty_fields"] = json!(report.dirty_fields);
    body
}
