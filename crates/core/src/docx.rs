//! Minimal DOCX reader.
//!
//! Only the main document part is read. Text runs (`w:t`) are collected in document order
//! and every paragraph start (`w:p`) emits a newline; tables, headers, footers and
//! embedded objects are not interpreted beyond the runs they happen to contain.

use crate::error::ExtractError;
use crate::extractor::TextExtractor;
use quick_xml::events::Event;
use quick_xml::Reader;
use std::io::{BufRead, BufReader, Cursor, Read};
use tracing::debug;
use zip::result::ZipError;
use zip::ZipArchive;

pub const MAIN_DOCUMENT_PART: &str = "word/document.xml";

/// Largest decompressed main document part accepted (64 MiB).
///
/// Uploads are capped before decompression, so a deflated part must be bounded separately.
pub const MAX_DOCUMENT_XML_BYTES: u64 = 64 * 1024 * 1024;

const TEXT_RUN_TAG: &[u8] = b"t";
const PARAGRAPH_TAG: &[u8] = b"p";

#[derive(Debug, Default, Clone, Copy)]
pub struct DocxTextExtractor;

impl TextExtractor for DocxTextExtractor {
    fn extract_text(&self, bytes: &[u8]) -> Result<String, ExtractError> {
        extract_docx(bytes)
    }
}

pub fn extract_docx(bytes: &[u8]) -> Result<String, ExtractError> {
    extract_docx_within(bytes, MAX_DOCUMENT_XML_BYTES)
}

fn extract_docx_within(bytes: &[u8], limit: u64) -> Result<String, ExtractError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))
        .map_err(|error| ExtractError::MalformedInput(error.to_string()))?;

    let part = match archive.by_name(MAIN_DOCUMENT_PART) {
        Ok(part) => part,
        Err(ZipError::FileNotFound) => {
            return Err(ExtractError::MissingPart(MAIN_DOCUMENT_PART.to_string()))
        }
        Err(error) => return Err(ExtractError::MalformedInput(error.to_string())),
    };

    if part.size() > limit {
        return Err(oversized_part(limit));
    }

    text_from_part(part, limit)
}

/// Streams a main document part, failing once more than `limit` bytes have been decompressed.
///
/// The declared entry size can lie, so the read itself is bounded as well.
fn text_from_part<R: Read>(part: R, limit: u64) -> Result<String, ExtractError> {
    let mut source = BufReader::new(part.take(limit.saturating_add(1)));
    let text = text_from_document_xml(&mut source);

    if source.get_ref().limit() == 0 {
        return Err(oversized_part(limit));
    }

    Ok(text)
}

fn oversized_part(limit: u64) -> ExtractError {
    ExtractError::MalformedInput(format!(
        "{MAIN_DOCUMENT_PART} expands beyond {limit} bytes"
    ))
}

/// Walks the WordprocessingML token stream and returns the trimmed plain text.
///
/// A token error ends the walk; whatever was collected up to that point is kept.
pub fn text_from_document_xml<R: BufRead>(source: R) -> String {
    let mut reader = Reader::from_reader(source);
    let mut buf = Vec::new();
    let mut text = String::new();
    // Some(..) while inside a text run; None once the run failed to decode.
    let mut run: Option<Option<String>> = None;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(element)) => match element.local_name().as_ref() {
                TEXT_RUN_TAG => run = Some(Some(String::new())),
                PARAGRAPH_TAG => text.push('\n'),
                _ => {}
            },
            Ok(Event::Empty(element)) => match element.local_name().as_ref() {
                TEXT_RUN_TAG => text.push(' '),
                PARAGRAPH_TAG => text.push('\n'),
                _ => {}
            },
            Ok(Event::Text(content)) => {
                if let Some(Some(pending)) = run.as_mut() {
                    match content.unescape() {
                        Ok(decoded) => pending.push_str(&decoded),
                        Err(error) => {
                            debug!(%error, "skipping undecodable text run");
                            run = Some(None);
                        }
                    }
                }
            }
            Ok(Event::CData(content)) => {
                if let Some(Some(pending)) = run.as_mut() {
                    match std::str::from_utf8(&content) {
                        Ok(decoded) => pending.push_str(decoded),
                        Err(error) => {
                            debug!(%error, "skipping undecodable text run");
                            run = Some(None);
                        }
                    }
                }
            }
            Ok(Event::End(element)) => {
                if element.local_name().as_ref() == TEXT_RUN_TAG {
                    if let Some(Some(completed)) = run.take() {
                        text.push_str(&completed);
                        text.push(' ');
                    }
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(error) => {
                debug!(
                    position = reader.buffer_position(),
                    %error,
                    "stopping at malformed document xml"
                );
                break;
            }
        }
        buf.clear();
    }

    text.trim().to_string()
}
