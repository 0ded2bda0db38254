use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde::Deserialize;

use crate::{
    error::AppResult,
    middleware::request_id::RequestId,
    models::{RecommendationsResponse, UserId},
    routes::AppState,
};

/// Query parameters accepted by the recommendations endpoint
#[derive(Debug, Deserialize)]
pub struct RecommendationsQuery {
    pub limit: Option<u32>,
    pub min_similarity: Option<u32>,
}

/// Handler for per-user project recommendations
pub async fn get_user_recommendations(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Path(user_id): Path<UserId>,
    Query(params): Query<RecommendationsQuery>,
) -> AppResult<Json<RecommendationsResponse>> {
    tracing::info!(
        request_id = %request_id,
        user_id,
        limit = ?params.limit,
        min_similarity = ?params.min_similarity,
        "Processing recommendations request"
    );

    let response = state
        .recommendations
        .get_recommendations(user_id, params.limit, params.min_similarity)
        .await?;

    tracing::info!(
        request_id = %request_id,
        returned = response.total,
        "Recommendations request completed"
    );

    Ok(Json(response))
}
