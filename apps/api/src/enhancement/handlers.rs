use axum::{extract::State, Json};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::AppError;
use crate::metrics::Endpoint;
use crate::providers::{Provider, ProviderChoice};
use crate::routes::jobs::job_id_or_new;
use crate::state::AppState;
use crate::text::truncate_chars;

#[derive(Debug, Deserialize)]
pub struct EnhanceRequest {
    pub job_id: Option<String>,
    #[serde(alias = "resume_text", alias = "text")]
    pub resume_content: String,
    pub job_description: Option<String>,
    #[serde(alias = "provider")]
    pub ai_provider: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct EnhanceResponse {
    pub job_id: String,
    pub success: bool,
    pub enhanced_content: String,
    pub suggestions: Vec<String>,
    pub match_score: f64,
    pub ai_provider: Provider,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_used: Option<String>,
    pub timestamp: String,
}

/// POST /enhance
///
/// Never fails on backend trouble; the basic suggestions are returned
/// instead. Only an empty resume is rejected.
pub async fn handle_enhance(
    State(state): State<AppState>,
    Json(request): Json<EnhanceRequest>,
) -> Result<Json<EnhanceResponse>, AppError> {
    state.metrics.record_request(Endpoint::Enhance);
    let job_id = job_id_or_new(request.job_id.as_deref());

    if request.resume_content.trim().is_empty() {
        state.metrics.record_failure();
        return Err(AppError::Validation(
            "resume_content cannot be empty".to_string(),
        ));
    }

    let resume = truncate_chars(&request.resume_content, state.config.max_text_length);
    let job_description = request
        .job_description
        .as_deref()
        .map(|jd| truncate_chars(jd, state.config.max_text_length));
    let choice = ProviderChoice::from_request(request.ai_provider.as_deref());

    let result = state
        .enhancer
        .enhance(resume, job_description, choice, &job_id)
        .await;
    state.metrics.record_result(result.provider_used);

    info!(
        "Enhancement completed: job_id={job_id}, provider={}, suggestions={}, match_score={}",
        result.provider_used,
        result.suggestions.len(),
        result.match_score
    );

    Ok(Json(EnhanceResponse {
        job_id,
        success: true,
        enhanced_content: result.enhanced_content,
        suggestions: result.suggestions,
        match_score: result.match_score,
        ai_provider: result.provider_used,
        model_used: result.model_used,
        timestamp: Utc::now().to_rfc3339(),
    }))
}
