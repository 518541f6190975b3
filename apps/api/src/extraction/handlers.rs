use axum::{
    extract::{Multipart, Query, State},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::AppError;
use crate::extraction::document::TextExtractionMethod;
use crate::extraction::upload::{read_upload_form, FileInfo, UploadForm};
use crate::extraction::{DocumentFormat, ExtractedText};
use crate::metrics::Endpoint;
use crate::routes::jobs::job_id_or_new;
use crate::state::AppState;

/// Query parameters accepted by the upload endpoints. Each may also be sent
/// as a multipart text field.
#[derive(Debug, Default, Deserialize)]
pub struct UploadParams {
    pub job_id: Option<String>,
    #[serde(alias = "provider")]
    pub ai_provider: Option<String>,
}

/// A document that has been received, validated and converted to text.
pub struct ExtractedUpload {
    pub job_id: String,
    pub file_info: FileInfo,
    pub extracted: ExtractedText,
    form: UploadForm,
}

impl ExtractedUpload {
    /// Query value first, then the multipart field of the same name.
    pub fn param<'a>(&'a self, query: Option<&'a str>, names: &[&str]) -> Option<&'a str> {
        query
            .filter(|v| !v.trim().is_empty())
            .or_else(|| names.iter().find_map(|name| self.form.field(name)))
    }
}

#[derive(Debug, Serialize)]
pub struct TextExtractionResponse {
    pub job_id: String,
    pub success: bool,
    pub extracted_text: String,
    pub text_length: usize,
    pub file_info: FileInfo,
    pub extraction_method: TextExtractionMethod,
    pub timestamp: String,
}

/// Reads the multipart body, checks the document type and runs text
/// extraction on the blocking pool. The staged temp file is gone by the time
/// this returns.
pub async fn extract_uploaded_document(
    state: &AppState,
    params: &UploadParams,
    multipart: Multipart,
) -> Result<ExtractedUpload, AppError> {
    let mut form = read_upload_form(multipart, state.config.max_file_size).await?;
    let mut upload = form
        .upload
        .take()
        .ok_or_else(|| AppError::Validation("No file uploaded".to_string()))?;

    let job_id = job_id_or_new(params.job_id.as_deref().or(form.field("job_id")));
    let info = upload.info.clone();

    let format = DocumentFormat::detect(info.content_type.as_deref(), info.filename.as_deref())
        .filter(|format| state.config.is_allowed_file_type(format.mime()))
        .ok_or_else(|| {
            AppError::UnsupportedFormat(
                info.content_type
                    .clone()
                    .or_else(|| info.filename.clone())
                    .unwrap_or_else(|| "unknown".to_string()),
            )
        })?;

    info!(
        "Extracting text: job_id={job_id}, filename={:?}, format={format:?}, size={}",
        info.filename, info.size
    );

    let bytes = upload.read_bytes()?;
    drop(upload);

    let extractor = state.extractor;
    let extracted = tokio::task::spawn_blocking(move || extractor.extract_text(&bytes, format.mime()))
        .await
        .map_err(|e| AppError::ExtractionFailed(format!("extraction task aborted: {e}")))??;

    Ok(ExtractedUpload {
        job_id,
        file_info: info,
        extracted,
        form,
    })
}

/// POST /extract/text
///
/// Multipart upload (`file`, optional `job_id`). Returns the document text
/// without any AI processing.
pub async fn handle_extract_text(
    State(state): State<AppState>,
    Query(params): Query<UploadParams>,
    multipart: Multipart,
) -> Result<Json<TextExtractionResponse>, AppError> {
    state.metrics.record_request(Endpoint::ExtractText);

    let upload = extract_uploaded_document(&state, &params, multipart)
        .await
        .inspect_err(|_| state.metrics.record_failure())?;

    info!(
        "Text extraction completed: job_id={}, text_length={}",
        upload.job_id, upload.extracted.char_count
    );

    Ok(Json(TextExtractionResponse {
        job_id: upload.job_id,
        success: true,
        text_length: upload.extracted.char_count,
        extracted_text: upload.extracted.text,
        file_info: upload.file_info,
        extraction_method: upload.extracted.method,
        timestamp: Utc::now().to_rfc3339(),
    }))
}
