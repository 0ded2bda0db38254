use std::sync::Arc;

use axum::{http::StatusCode, routing::get, Json, Router};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::request_id::{http_request_span, propagate_request_id};
use crate::services::recommendations::RecommendationService;

pub mod recommendations;

/// Shared application state
pub struct AppState {
    pub recommendations: Arc<RecommendationService>,
}

/// Creates the application router with all routes
///
/// Layer order matters: the request id middleware sits outside the trace
/// layer so every span carries the id.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api_routes())
        .layer(TraceLayer::new_for_http().make_span_with(http_request_span))
        .layer(axum::middleware::from_fn(propagate_request_id))
        .layer(CorsLayer::permissive())
        .with_state(Arc::new(state))
}

/// API routes under /api/v1
fn api_routes() -> Router<Arc<AppState>> {
    Router::new().route(
        "/users/:user_id/recommendations",
        get(recommendations::get_user_recommendations),
    )
}

/// Health check endpoint
async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}
