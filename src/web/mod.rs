// src/web/mod.rs
// HTTP layer receiving saved query callbacks from the frontend

pub mod api;
pub mod error;
pub mod state;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::web::state::AppState;

/// Create the callback router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(api::health))
        .route(
            "/saved-query-was-created-or-updated",
            post(api::saved_query_was_created_or_updated),
        )
        .route("/saved-query-was-deleted", post(api::saved_query_was_deleted))
        .route("/test-notification", post(api::test_notification))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
