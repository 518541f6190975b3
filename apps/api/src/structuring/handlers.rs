use axum::{
    extract::{Multipart, Query, State},
    Json,
};
use chrono::Utc;
use serde::Serialize;
use tracing::info;

use crate::errors::AppError;
use crate::extraction::handlers::{extract_uploaded_document, UploadParams};
use crate::extraction::upload::FileInfo;
use crate::metrics::Endpoint;
use crate::providers::{Provider, ProviderChoice};
use crate::state::AppState;
use crate::structuring::models::StructuredResume;
use crate::text::truncate_chars;

#[derive(Debug, Serialize)]
pub struct StructuredExtractionResponse {
    pub job_id: String,
    pub success: bool,
    pub original_text: String,
    pub structured_data: StructuredResume,
    pub file_info: FileInfo,
    /// Provider that produced `structured_data`, after any fallback.
    pub ai_provider: Provider,
    pub timestamp: String,
}

/// POST /extract/structured
///
/// Multipart upload (`file`, optional `job_id`, optional `ai_provider` or
/// `provider`, default `auto`). Extraction errors are reported; AI errors
/// are not, the basic structuring result is returned instead.
pub async fn handle_extract_structured(
    State(state): State<AppState>,
    Query(params): Query<UploadParams>,
    multipart: Multipart,
) -> Result<Json<StructuredExtractionResponse>, AppError> {
    state.metrics.record_request(Endpoint::ExtractStructured);

    let upload = extract_uploaded_document(&state, &params, multipart)
        .await
        .inspect_err(|_| state.metrics.record_failure())?;

    let choice = ProviderChoice::from_request(
        upload.param(params.ai_provider.as_deref(), &["ai_provider", "provider"]),
    );
    let text = truncate_chars(&upload.extracted.text, state.config.max_text_length);

    let structured = state.structurer.process(text, choice, &upload.job_id).await;
    state.metrics.record_result(structured.provider_used);

    info!(
        "Structured extraction completed: job_id={}, provider={}",
        upload.job_id, structured.provider_used
    );

    Ok(Json(StructuredExtractionResponse {
        ai_provider: structured.provider_used,
        structured_data: structured,
        original_text: upload.extracted.text,
        file_info: upload.file_info,
        job_id: upload.job_id,
        success: true,
        timestamp: Utc::now().to_rfc3339(),
    }))
}
