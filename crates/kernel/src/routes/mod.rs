//! HTTP route handlers.

pub mod health;
pub mod media;
pub mod pages;

use axum::Router;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// The full API router with request tracing.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(health::router())
        .merge(pages::router())
        .merge(media::router())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
