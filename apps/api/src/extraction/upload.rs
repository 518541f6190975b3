use std::io::{Read, Seek, SeekFrom, Write};

use axum::extract::multipart::{Field, Multipart, MultipartError};
use axum::http::StatusCode;
use bytes::Bytes;
use serde::Serialize;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::errors::AppError;

/// Multipart field carrying the document.
pub const FILE_FIELD: &str = "file";

#[derive(Debug, Clone, Serialize)]
pub struct FileInfo {
    pub filename: Option<String>,
    pub size: usize,
    pub content_type: Option<String>,
}

/// An uploaded document spooled to a temp file for the duration of one
/// request. The file is unlinked when this value is dropped, which covers
/// early returns and panics alike.
#[derive(Debug)]
pub struct StagedUpload {
    file: NamedTempFile,
    pub info: FileInfo,
}

impl StagedUpload {
    pub fn read_bytes(&mut self) -> Result<Vec<u8>, AppError> {
        let handle = self.file.as_file_mut();
        handle
            .seek(SeekFrom::Start(0))
            .map_err(|e| AppError::Internal(e.into()))?;
        let mut bytes = Vec::with_capacity(self.info.size);
        handle
            .read_to_end(&mut bytes)
            .map_err(|e| AppError::Internal(e.into()))?;
        Ok(bytes)
    }
}

/// Everything a document upload request carries besides the file itself.
#[derive(Debug, Default)]
pub struct UploadForm {
    pub upload: Option<StagedUpload>,
    pub text_fields: Vec<(String, String)>,
}

impl UploadForm {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.text_fields
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
            .filter(|v| !v.trim().is_empty())
    }
}

/// Drains the multipart body: the `file` part is streamed to disk while its
/// size is checked against `max_size`, every other part is kept as text.
pub async fn read_upload_form(
    mut multipart: Multipart,
    max_size: usize,
) -> Result<UploadForm, AppError> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error("Invalid multipart body", e))?
    {
        let name = field.name().unwrap_or_default().to_string();
        if name == FILE_FIELD {
            form.upload = Some(stage_field(field, max_size).await?);
        } else {
            let value = field
                .text()
                .await
                .map_err(|e| multipart_error(&format!("Invalid form field '{name}'"), e))?;
            form.text_fields.push((name, value));
        }
    }

    Ok(form)
}

async fn stage_field(mut field: Field<'_>, max_size: usize) -> Result<StagedUpload, AppError> {
    let filename = field.file_name().map(String::from);
    let content_type = field.content_type().map(String::from);

    let suffix = filename
        .as_deref()
        .and_then(|name| name.rsplit_once('.'))
        .map(|(_, ext)| ext)
        .filter(|ext| !ext.is_empty() && ext.len() <= 8 && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|ext| format!(".{ext}"))
        .unwrap_or_default();
    let mut file = tempfile::Builder::new()
        .prefix("upload-")
        .suffix(&suffix)
        .tempfile()
        .map_err(|e| AppError::Internal(e.into()))?;

    let mut size = 0usize;
    while let Some(chunk) = next_chunk(&mut field).await? {
        size += chunk.len();
        if size > max_size {
            return Err(AppError::PayloadTooLarge {
                size,
                limit: max_size,
            });
        }
        file.write_all(&chunk)
            .map_err(|e| AppError::Internal(e.into()))?;
    }

    if size == 0 {
        return Err(AppError::Validation("Uploaded file is empty".to_string()));
    }

    debug!("Staged upload {:?} ({} bytes) at {:?}", filename, size, file.path());

    Ok(StagedUpload {
        file,
        info: FileInfo {
            filename,
            size,
            content_type,
        },
    })
}

async fn next_chunk(field: &mut Field<'_>) -> Result<Option<Bytes>, AppError> {
    field
        .chunk()
        .await
        .map_err(|e| multipart_error("Failed to read uploaded file", e))
}

/// Hitting the request body limit mid-stream is a 413; anything else is a
/// malformed request.
fn multipart_error(context: &str, e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::BodyTooLarge(e.body_text())
    } else {
        AppError::Validation(format!("{context}: {e}"))
    }
}
