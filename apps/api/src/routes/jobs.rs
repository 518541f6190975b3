use axum::{extract::Path, Json};
use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Serialize)]
pub struct JobStatusResponse {
    pub job_id: String,
    pub status: &'static str,
    pub timestamp: String,
}

/// Caller-supplied job id, or a fresh UUID when absent or blank.
pub fn job_id_or_new(raw: Option<&str>) -> String {
    match raw.map(str::trim).filter(|id| !id.is_empty()) {
        Some(id) => id.to_string(),
        None => Uuid::new_v4().to_string(),
    }
}

/// GET /job/:job_id/status
///
/// Work is done inline with the request, so every job is reported complete.
pub async fn handle_job_status(Path(job_id): Path<String>) -> Json<JobStatusResponse> {
    Json(JobStatusResponse {
        job_id,
        status: "completed",
        timestamp: Utc::now().to_rfc3339(),
    })
}
