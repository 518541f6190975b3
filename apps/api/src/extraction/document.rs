use std::io::{Cursor, Read};

use quick_xml::events::Event;
use quick_xml::Reader;
use serde::Serialize;
use tracing::info;
use zip::ZipArchive;

use crate::config::{DOCX_MIME, PDF_MIME};
use crate::extraction::basic_info::{extract_basic_info, BasicInfo};
use crate::extraction::ExtractionError;

/// Returned instead of an error when a PDF parses but yields no text
/// (scanned or image-only documents).
pub const PDF_NO_TEXT_PLACEHOLDER: &str =
    "Unable to extract text from PDF - file may be image-based";
pub const DOCX_NO_TEXT_PLACEHOLDER: &str = "Unable to extract text from DOCX file";

const DOCX_BODY_PART: &str = "word/document.xml";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    Pdf,
    Docx,
}

impl DocumentFormat {
    /// Parameters such as `; charset=binary` are ignored.
    pub fn from_mime(mime: &str) -> Option<Self> {
        let essence = mime.split(';').next().unwrap_or_default().trim();
        if essence.eq_ignore_ascii_case(PDF_MIME) {
            Some(DocumentFormat::Pdf)
        } else if essence.eq_ignore_ascii_case(DOCX_MIME) {
            Some(DocumentFormat::Docx)
        } else {
            None
        }
    }

    pub fn from_filename(filename: &str) -> Option<Self> {
        let lower = filename.to_lowercase();
        if lower.ends_with(".pdf") {
            Some(DocumentFormat::Pdf)
        } else if lower.ends_with(".docx") {
            Some(DocumentFormat::Docx)
        } else {
            None
        }
    }

    /// The declared content type wins; the file extension is only consulted
    /// when the client sent nothing useful.
    pub fn detect(content_type: Option<&str>, filename: Option<&str>) -> Option<Self> {
        let declared = content_type
            .map(str::trim)
            .filter(|ct| !ct.is_empty() && !ct.eq_ignore_ascii_case("application/octet-stream"));

        match declared {
            Some(ct) => Self::from_mime(ct),
            None => filename.and_then(Self::from_filename),
        }
    }

    pub fn mime(&self) -> &'static str {
        match self {
            DocumentFormat::Pdf => PDF_MIME,
            DocumentFormat::Docx => DOCX_MIME,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TextExtractionMethod {
    PdfText,
    DocxText,
}

/// Plain text pulled out of one uploaded document. Lives for one request.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractedText {
    pub text: String,
    pub char_count: usize,
    pub method: TextExtractionMethod,
}

impl ExtractedText {
    fn new(text: String, method: TextExtractionMethod) -> Self {
        let char_count = text.chars().count();
        ExtractedText {
            text,
            char_count,
            method,
        }
    }
}

/// Converts PDF and DOCX bytes into plain text. Stateless; parsing is
/// CPU-bound, so async callers should run it on the blocking pool.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentTextExtractor;

impl DocumentTextExtractor {
    pub fn extract_text(&self, bytes: &[u8], mime: &str) -> Result<ExtractedText, ExtractionError> {
        let format = DocumentFormat::from_mime(mime)
            .ok_or_else(|| ExtractionError::UnsupportedFormat(mime.to_string()))?;

        match format {
            DocumentFormat::Pdf => extract_pdf(bytes),
            DocumentFormat::Docx => extract_docx(bytes),
        }
    }

    pub fn extract_basic_info(&self, text: &str) -> BasicInfo {
        extract_basic_info(text)
    }
}

fn extract_pdf(bytes: &[u8]) -> Result<ExtractedText, ExtractionError> {
    // pdf-extract panics on some malformed inputs instead of returning an error.
    let pages = std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem_by_pages(bytes))
        .map_err(|_| {
            ExtractionError::ExtractionFailed(
                "PDF processing failed: parser aborted on malformed input".to_string(),
            )
        })?
        .map_err(|e| ExtractionError::ExtractionFailed(format!("PDF processing failed: {e}")))?;

    let text = pages.join("\n");
    let text = text.trim();

    if text.is_empty() {
        return Ok(ExtractedText::new(
            PDF_NO_TEXT_PLACEHOLDER.to_string(),
            TextExtractionMethod::PdfText,
        ));
    }

    info!(
        "Extracted {} characters from PDF ({} pages)",
        text.chars().count(),
        pages.len()
    );
    Ok(ExtractedText::new(
        text.to_string(),
        TextExtractionMethod::PdfText,
    ))
}

fn extract_docx(bytes: &[u8]) -> Result<ExtractedText, ExtractionError> {
    let xml = read_docx_body(bytes)?;
    let paragraphs = docx_paragraphs(&xml)?;

    let text = paragraphs
        .into_iter()
        .filter(|p| !p.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n");
    let text = text.trim();

    if text.is_empty() {
        return Ok(ExtractedText::new(
            DOCX_NO_TEXT_PLACEHOLDER.to_string(),
            TextExtractionMethod::DocxText,
        ));
    }

    info!("Extracted {} characters from DOCX", text.chars().count());
    Ok(ExtractedText::new(
        text.to_string(),
        TextExtractionMethod::DocxText,
    ))
}

fn read_docx_body(bytes: &[u8]) -> Result<String, ExtractionError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes)).map_err(|e| {
        ExtractionError::ExtractionFailed(format!("DOCX processing failed: not a valid archive: {e}"))
    })?;

    let mut part = archive.by_name(DOCX_BODY_PART).map_err(|e| {
        ExtractionError::ExtractionFailed(format!(
            "DOCX processing failed: missing {DOCX_BODY_PART}: {e}"
        ))
    })?;

    let mut xml = String::new();
    part.read_to_string(&mut xml).map_err(|e| {
        ExtractionError::ExtractionFailed(format!("DOCX processing failed: {e}"))
    })?;
    Ok(xml)
}

/// A `w:p` being read, plus the finished paragraphs of any text boxes
/// anchored inside it.
#[derive(Default)]
struct OpenParagraph {
    text: String,
    nested: Vec<String>,
}

/// Collects the text of every `w:p` in document order. A paragraph holding a
/// text box is emitted first, followed by the paragraphs inside the box.
/// `mc:Fallback` content repeats the `mc:Choice` branch and is skipped.
fn docx_paragraphs(xml: &str) -> Result<Vec<String>, ExtractionError> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(false);

    let mut buf = Vec::new();
    let mut open: Vec<OpenParagraph> = Vec::new();
    let mut paragraphs = Vec::new();
    let mut in_text = false;
    let mut fallback_depth = 0usize;

    loop {
        match reader.read_event_into(&mut buf).map_err(|e| {
            ExtractionError::ExtractionFailed(format!(
                "DOCX processing failed: malformed document XML: {e}"
            ))
        })? {
            Event::Start(e) if e.name().as_ref() == b"mc:Fallback" => fallback_depth += 1,
            Event::End(e) if e.name().as_ref() == b"mc:Fallback" => {
                fallback_depth = fallback_depth.saturating_sub(1)
            }
            Event::Eof => break,
            _ if fallback_depth > 0 => {}
            Event::Start(e) => match e.name().as_ref() {
                b"w:p" => open.push(OpenParagraph::default()),
                b"w:t" => in_text = true,
                _ => {}
            },
            Event::Empty(e) => {
                if let Some(current) = open.last_mut() {
                    match e.name().as_ref() {
                        b"w:tab" => current.text.push('\t'),
                        b"w:br" | b"w:cr" => current.text.push('\n'),
                        _ => {}
                    }
                }
            }
            Event::Text(e) if in_text => {
                let text = e.unescape().map_err(|err| {
                    ExtractionError::ExtractionFailed(format!("DOCX processing failed: {err}"))
                })?;
                if let Some(current) = open.last_mut() {
                    current.text.push_str(&text);
                }
            }
            Event::End(e) => match e.name().as_ref() {
                b"w:t" => in_text = false,
                b"w:p" => {
                    if let Some(done) = open.pop() {
                        let target = match open.last_mut() {
                            Some(parent) => &mut parent.nested,
                            None => &mut paragraphs,
                        };
                        target.push(done.text);
                        target.extend(done.nested);
                    }
                }
                _ => {}
            },
            _ => {}
        }
        buf.clear();
    }

    Ok(paragraphs)
}

#[cfg(test)]
pub(crate) mod fixtures {
    use std::io::{Cursor, Write};

    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Document, Object, Stream};
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    /// Minimal DOCX: one `w:p` per input line.
    pub fn docx_with_paragraphs(paragraphs: &[&str]) -> Vec<u8> {
        let body: String = paragraphs
            .iter()
            .map(|p| format!(r#"<w:p><w:r><w:t xml:space="preserve">{p}</w:t></w:r></w:p>"#))
            .collect();
        docx_with_body(&body)
    }

    /// DOCX whose `w:body` is the given markup.
    pub fn docx_with_body(body: &str) -> Vec<u8> {
        let xml = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main" xmlns:mc="http://schemas.openxmlformats.org/markup-compatibility/2006" xmlns:wps="http://schemas.microsoft.com/office/word/2010/wordprocessingShape" xmlns:v="urn:schemas-microsoft-com:vml"><w:body>{body}</w:body></w:document>"#
        );

        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        writer
            .start_file("[Content_Types].xml", SimpleFileOptions::default())
            .unwrap();
        writer
            .write_all(br#"<?xml version="1.0" encoding="UTF-8"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"/>"#)
            .unwrap();
        writer
            .start_file("word/document.xml", SimpleFileOptions::default())
            .unwrap();
        writer.write_all(xml.as_bytes()).unwrap();
        writer.finish().unwrap().into_inner()
    }

    /// Single-page PDF. `None` produces a page with an empty content stream.
    pub fn pdf_with_text(text: Option<&str>) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let operations = match text {
            Some(text) => vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 12.into()]),
                Operation::new("Td", vec![72.into(), 720.into()]),
                Operation::new("Tj", vec![Object::string_literal(text)]),
                Operation::new("ET", vec![]),
            ],
            None => vec![],
        };
        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![page_id.into()],
                "Count" => 1,
                "Resources" => resources_id,
                "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut out = Vec::new();
        doc.save_to(&mut out).unwrap();
        out
    }
}
