use crate::docx::DocxTextExtractor;
use crate::error::ExtractError;
use lopdf::Document;
use std::path::Path;
use tracing::debug;

pub const PDF_CONTENT_TYPE: &str = "application/pdf";
pub const DOCX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// Turns a binary document container into plain text.
pub trait TextExtractor {
    fn extract_text(&self, bytes: &[u8]) -> Result<String, ExtractError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentFormat {
    Pdf,
    Docx,
}

impl DocumentFormat {
    /// Resolves the format from a filename's extension, ignoring case.
    pub fn from_filename(filename: &str) -> Option<Self> {
        let extension = Path::new(filename).extension()?.to_str()?;

        if extension.eq_ignore_ascii_case("pdf") {
            Some(DocumentFormat::Pdf)
        } else if extension.eq_ignore_ascii_case("docx") {
            Some(DocumentFormat::Docx)
        } else {
            None
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            DocumentFormat::Pdf => PDF_CONTENT_TYPE,
            DocumentFormat::Docx => DOCX_CONTENT_TYPE,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            DocumentFormat::Pdf => "pdf",
            DocumentFormat::Docx => "docx",
        }
    }

    pub fn extract(self, bytes: &[u8]) -> Result<String, ExtractError> {
        match self {
            DocumentFormat::Pdf => PdfTextExtractor.extract_text(bytes),
            DocumentFormat::Docx => DocxTextExtractor.extract_text(bytes),
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct PdfTextExtractor;

impl TextExtractor for PdfTextExtractor {
    fn extract_text(&self, bytes: &[u8]) -> Result<String, ExtractError> {
        extract_pdf(bytes)
    }
}

/// Extracts the text of every readable page, in page order, each followed by a newline.
///
/// Pages whose content cannot be decoded or that carry no text are skipped; only an
/// unreadable container fails the whole extraction.
pub fn extract_pdf(bytes: &[u8]) -> Result<String, ExtractError> {
    let document =
        Document::load_mem(bytes).map_err(|error| ExtractError::MalformedInput(error.to_string()))?;

    let mut text = String::new();
    // get_pages is keyed by 1-based page number, so iteration is in page order.
    for page_no in document.get_pages().into_keys() {
        let page_text = match document.extract_text(&[page_no]) {
            Ok(page_text) => page_text,
            Err(error) => {
                debug!(page = page_no, %error, "skipping unreadable pdf page");
                continue;
            }
        };

        if page_text.trim().is_empty() {
            debug!(page = page_no, "skipping pdf page without text");
            continue;
        }

        text.push_str(&page_text);
        text.push('\n');
    }

    Ok(text)
}
