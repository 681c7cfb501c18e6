// Patent Scout - search academic papers, summarize them and draft patent proposals

pub mod config;
pub mod models;
pub mod types;
pub mod agents;
pub mod llm;
pub mod search;    // Proxy activation and Google Scholar publications
pub mod pipeline;
pub mod routes;
pub mod middleware;
pub mod utils;

#[cfg(test)]
pub(crate) mod testing;

// Re-exports for convenience
pub use config::Config;
pub use models::AppState;
pub use pipeline::ResearchPipeline;

pub fn create_router(state: AppState) -> axum::Router {
    routes::create_router(state)
}
