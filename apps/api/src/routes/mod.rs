pub mod health;
pub mod jobs;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::enhancement::handlers::handle_enhance;
use crate::extraction::handlers::handle_extract_text;
use crate::metrics::handle_metrics;
use crate::providers::handlers::handle_ai_providers;
use crate::state::AppState;
use crate::structuring::handlers::handle_extract_structured;

/// Room for multipart boundaries and the small text fields next to the file.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_file_size + MULTIPART_OVERHEAD;

    Router::new()
        .route("/health", get(health::health_handler))
        .route("/ai-providers", get(handle_ai_providers))
        .route("/extract/text", post(handle_extract_text))
        .route("/extract/structured", post(handle_extract_structured))
        .route("/enhance", post(handle_enhance))
        .route("/job/:job_id/status", get(jobs::handle_job_status))
        .route("/metrics", get(handle_metrics))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
