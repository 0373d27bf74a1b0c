//! Resume Text Extraction
//!
//! Plain-text extraction for the two accepted resume formats, PDF and DOCX.

use std::io::Read;
use std::path::Path;

use quick_xml::events::Event;

use crate::utils::error::{AppError, AppResult};

/// Largest resume accepted (5 MiB)
pub const MAX_RESUME_SIZE: u64 = 5 * 1024 * 1024;

/// Supported resume file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResumeFormat {
    Pdf,
    Docx,
}

impl ResumeFormat {
    /// Format from the file extension, case-insensitive.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "pdf" => Some(Self::Pdf),
            "docx" => Some(Self::Docx),
            _ => None,
        }
    }
}

/// Check extension and size before any parsing happens.
pub fn validate_resume_file(path: &Path) -> AppResult<ResumeFormat> {
    let format = ResumeFormat::from_path(path).ok_or_else(|| {
        AppError::validation(format!(
            "unsupported resume format: {} (expected .pdf or .docx)",
            path.display()
        ))
    })?;

    let metadata = std::fs::metadata(path)
        .map_err(|e| AppError::validation(format!("cannot read {}: {}", path.display(), e)))?;
    if !metadata.is_file() {
        return Err(AppError::validation(format!("{} is not a file", path.display())));
    }
    if metadata.len() > MAX_RESUME_SIZE {
        return Err(AppError::validation(format!(
            "resume too large: {:.1} MB (max {:.1} MB)",
            metadata.len() as f64 / (1024.0 * 1024.0),
            MAX_RESUME_SIZE as f64 / (1024.0 * 1024.0)
        )));
    }

    Ok(format)
}

/// Extract the text of a validated resume file.
pub fn extract_text(path: &Path, format: ResumeFormat) -> AppResult<String> {
    match format {
        ResumeFormat::Pdf => extract_pdf(path),
        ResumeFormat::Docx => extract_docx(path),
    }
}

fn extract_pdf(path: &Path) -> AppResult<String> {
    let text = pdf_extract::extract_text(path)
        .map_err(|e| AppError::internal(format!("Failed to extract PDF text: {}", e)))?;
    // pdf-extract separates pages with form feeds
    Ok(text.replace('\x0c', "\n").trim().to_string())
}

fn extract_docx(path: &Path) -> AppResult<String> {
    let file = std::fs::File::open(path)?;
    let mut archive = zip::ZipArchive::new(file)
        .map_err(|e| AppError::internal(format!("Failed to read DOCX as ZIP: {}", e)))?;

    let mut doc_xml = String::new();
    {
        let mut entry = archive
            .by_name("word/document.xml")
            .map_err(|_| AppError::internal("Invalid DOCX: missing word/document.xml"))?;
        entry.read_to_string(&mut doc_xml)?;
    }

    document_xml_text(&doc_xml)
}

/// Paragraph text of a WordprocessingML body, one paragraph per line.
fn document_xml_text(xml: &str) -> AppResult<String> {
    let mut reader = quick_xml::Reader::from_str(xml);
    let mut paragraphs: Vec<String> = Vec::new();
    let mut paragraph = String::new();
    let mut in_text = false;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => match e.local_name().as_ref() {
                b"p" => paragraph.clear(),
                b"t" => in_text = true,
                _ => {}
            },
            Ok(Event::Empty(ref e)) => {
                if e.local_name().as_ref() == b"tab" {
                    paragraph.push('\t');
                }
            }
            Ok(Event::End(ref e)) => match e.local_name().as_ref() {
                b"p" => {
                    let line = paragraph.trim();
                    if !line.is_empty() {
                        paragraphs.push(line.to_string());
                    }
                    paragraph.clear();
                }
                b"t" => in_text = false,
                _ => {}
            },
            Ok(Event::Text(ref e)) if in_text => {
                if let Ok(text) = e.unescape() {
                    paragraph.push_str(&text);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(AppError::internal(format!("DOCX XML parse error: {}", e))),
            _ => {}
        }
        buf.clear();
    }

    Ok(paragraphs.join("\n"))
}
