use axum::{extract::State, Json};

use crate::providers::ProviderStatus;
use crate::state::AppState;

/// GET /ai-providers
///
/// Probes every backend on each call and reports what `auto` would pick.
pub async fn handle_ai_providers(State(state): State<AppState>) -> Json<ProviderStatus> {
    Json(state.status_checker.status().await)
}
