use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use tracing::info;
use validator::Validate;

use crate::models::{AppState, SearchReport, SearchRequest};
use crate::types::{AppError, AppResult};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/search", post(run_search))
        .with_state(state)
}

async fn run_search(
    State(state): State<AppState>,
    payload: Result<Json<SearchRequest>, JsonRejection>,
) -> AppResult<Json<SearchReport>> {
    let Json(request) = payload.map_err(|rejection| AppError::InvalidRequest(rejection.body_text()))?;

    request
        .validate()
        .map_err(|e| AppError::InvalidRequest(e.to_string()))?;

    let num_results = request.clamped_num_results();
    info!(query = %request.query, num_results, "Search request received");

    let report = state.pipeline.run(request.query.trim(), num_results).await?;
    Ok(Json(report))
}
