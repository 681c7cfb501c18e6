use axum::{extract::State, routing::get, Json, Router};

use crate::models::{AppState, HealthResponse};
use crate::search::ScholarSearch;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health_check))
        .with_state(state)
}

async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        llm_configured: !state.config.llm.openai_api_key.is_empty(),
        proxy_configured: ScholarSearch::proxy_configured(&state.config.search),
    })
}
