//! API Routes
//!
//! This module organizes all HTTP endpoints for the application:
//! - `/api/search` - Run the search, summarize and propose pipeline
//! - `/api/health` - Health checks
//! - `/` - Browser UI

pub mod health;
pub mod search;
pub mod ui;

use axum::Router;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::middleware::apply_cors;
use crate::models::AppState;

/// Create the main application router
pub fn create_router(state: AppState) -> Router {
    info!("Creating application router");

    let allowed_origins = state.config.server.cors_allowed_origins.clone();

    let router = Router::new()
        .merge(search::router(state.clone()))
        .merge(health::router(state))
        .merge(ui::router())
        .layer(TraceLayer::new_for_http());

    apply_cors(router, &allowed_origins)
}
