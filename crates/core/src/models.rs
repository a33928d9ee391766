use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A metadata value returned by the analysis service.
///
/// The service decides which keys it emits, so values are modelled as a JSON-like
/// tree rather than a fixed schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetadataValue {
    Null,
    Bool(bool),
    Number(serde_json::Number),
    String(String),
    List(Vec<MetadataValue>),
    Map(BTreeMap<String, MetadataValue>),
}

pub type Metadata = BTreeMap<String, MetadataValue>;

impl From<&str> for MetadataValue {
    fn from(value: &str) -> Self {
        MetadataValue::String(value.to_string())
    }
}

impl From<i64> for MetadataValue {
    fn from(value: i64) -> Self {
        MetadataValue::Number(value.into())
    }
}

impl From<bool> for MetadataValue {
    fn from(value: bool) -> Self {
        MetadataValue::Bool(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentState {
    Stored,
    Analyzed,
}

/// A stored upload together with its extracted text and latest analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub filename: String,
    pub content_type: String,
    pub file_size: u64,
    pub blob_key: String,
    pub extracted_text: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub document_type: String,
    #[serde(default)]
    pub metadata: Metadata,
    #[serde(default)]
    pub analyzed_at: Option<DateTime<Utc>>,
}

impl Document {
    pub fn state(&self) -> DocumentState {
        if self.analyzed_at.is_some() {
            DocumentState::Analyzed
        } else {
            DocumentState::Stored
        }
    }

    /// Replaces every analysis field with `result`; earlier analysis is discarded, not merged.
    pub fn apply_analysis(&mut self, result: AnalysisResult, at: DateTime<Utc>) {
        self.summary = result.summary;
        self.document_type = result.document_type;
        self.metadata = result.metadata;
        self.analyzed_at = Some(at);
    }

    pub fn view(&self) -> DocumentView {
        DocumentView::from(self)
    }
}

/// External representation of a [`Document`]. The blob key never leaves the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentView {
    pub id: String,
    pub filename: String,
    pub content_type: String,
    pub file_size: u64,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub text: String,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub summary: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub document_type: String,
    #[serde(default, skip_serializing_if = "Metadata::is_empty")]
    pub metadata: Metadata,
}

impl From<&Document> for DocumentView {
    fn from(document: &Document) -> Self {
        Self {
            id: document.id.clone(),
            filename: document.filename.clone(),
            content_type: document.content_type.clone(),
            file_size: document.file_size,
            text: document.extracted_text.clone(),
            created_at: document.created_at,
            summary: document.summary.clone(),
            document_type: document.document_type.clone(),
            metadata: document.metadata.clone(),
        }
    }
}

/// Outcome of one analysis round-trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub summary: String,
    pub document_type: String,
    pub metadata: Metadata,
    /// Set when the reply was not valid JSON and the raw text was used as the summary.
    pub degraded: bool,
}

/// Type label used when the analysis reply could not be parsed.
pub const UNKNOWN_DOCUMENT_TYPE: &str = "Unknown";

impl AnalysisResult {
    pub fn degraded(raw: impl Into<String>) -> Self {
        Self {
            summary: raw.into(),
            document_type: UNKNOWN_DOCUMENT_TYPE.to_string(),
            metadata: Metadata::new(),
            degraded: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: String,
    pub content: Vec<u8>,
}

impl UploadedFile {
    pub fn new(filename: impl Into<String>, content: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            content,
        }
    }

    pub fn size(&self) -> u64 {
        self.content.len() as u64
    }
}
