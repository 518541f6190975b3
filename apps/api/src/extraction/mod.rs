//! Document text extraction: PDF/DOCX to plain text, plus the regex-based
//! contact and skill scan used by the basic provider.

pub mod basic_info;
pub mod document;
pub mod handlers;
pub mod upload;

use thiserror::Error;

pub use document::{DocumentFormat, DocumentTextExtractor, ExtractedText};

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("unsupported document format '{0}'")]
    UnsupportedFormat(String),

    #[error("{0}")]
    ExtractionFailed(String),
}
