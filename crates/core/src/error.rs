use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("malformed input: {0}")]
    MalformedInput(String),

    #[error("missing document part: {0}")]
    MissingPart(String),

    #[error("extraction task interrupted: {0}")]
    Interrupted(String),
}

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("analysis is not configured: {0}")]
    Configuration(String),

    #[error("completion service failed: {0}")]
    Upstream(String),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("completion service returned no choices")]
    EmptyResponse,

    #[error("no text to analyze")]
    EmptyText,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialize error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("record already exists: {0}")]
    Conflict(String),

    #[error("record does not exist: {0}")]
    Missing(String),

    #[error("invalid storage key: {0}")]
    InvalidKey(String),
}

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("file too large: {size} bytes exceeds the {limit} byte limit")]
    PayloadTooLarge { size: u64, limit: u64 },

    #[error("unsupported file type: {0} (only .pdf and .docx are accepted)")]
    UnsupportedType(String),

    #[error("failed to store upload: {0}")]
    Storage(#[source] StoreError),

    #[error("failed to extract text: {0}")]
    Extraction(#[source] ExtractError),

    #[error("failed to persist document: {0}")]
    Persistence(#[source] StoreError),

    #[error("analysis is not configured: {0}")]
    Configuration(String),

    #[error("analysis request failed: {0}")]
    Upstream(String),

    #[error("analysis service returned an empty response")]
    EmptyResponse,

    #[error("document not found: {0}")]
    NotFound(String),

    #[error("document {0} has no text to analyze")]
    NothingToAnalyze(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

/// Flat classification of every failure a [`DocumentError`] can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    PayloadTooLarge,
    UnsupportedType,
    /// The extractor rejected the file content (broken PDF, non-zip DOCX, oversized DOCX part).
    MalformedInput,
    /// A DOCX archive without `word/document.xml`.
    MissingPart,
    StorageError,
    /// The blocking extraction task panicked or was cancelled before it produced a result.
    ///
    /// Content problems never land here; they report [`ErrorKind::MalformedInput`] or
    /// [`ErrorKind::MissingPart`].
    ExtractionError,
    PersistenceError,
    ConfigurationError,
    UpstreamError,
    EmptyResponse,
    NotFound,
    NothingToAnalyze,
    InvalidArgument,
}

impl ErrorKind {
    /// True when the caller can fix the request; false for server-side failures.
    pub fn is_client_error(self) -> bool {
        matches!(
            self,
            ErrorKind::PayloadTooLarge
                | ErrorKind::UnsupportedType
                | ErrorKind::MalformedInput
                | ErrorKind::MissingPart
                | ErrorKind::NotFound
                | ErrorKind::NothingToAnalyze
                | ErrorKind::InvalidArgument
        )
    }
}

impl DocumentError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DocumentError::PayloadTooLarge { .. } => ErrorKind::PayloadTooLarge,
            DocumentError::UnsupportedType(_) => ErrorKind::UnsupportedType,
            DocumentError::Storage(_) => ErrorKind::StorageError,
            DocumentError::Extraction(ExtractError::MalformedInput(_)) => ErrorKind::MalformedInput,
            DocumentError::Extraction(ExtractError::MissingPart(_)) => ErrorKind::MissingPart,
            DocumentError::Extraction(ExtractError::Interrupted(_)) => ErrorKind::ExtractionError,
            DocumentError::Persistence(_) => ErrorKind::PersistenceError,
            DocumentError::Configuration(_) => ErrorKind::ConfigurationError,
            DocumentError::Upstream(_) => ErrorKind::UpstreamError,
            DocumentError::EmptyResponse => ErrorKind::EmptyResponse,
            DocumentError::NotFound(_) => ErrorKind::NotFound,
            DocumentError::NothingToAnalyze(_) => ErrorKind::NothingToAnalyze,
            DocumentError::InvalidArgument(_) => ErrorKind::InvalidArgument,
        }
    }

    pub(crate) fn from_analysis(document_id: &str, error: AnalysisError) -> Self {
        match error {
            AnalysisError::Configuration(details) => DocumentError::Configuration(details),
            AnalysisError::Upstream(details) => DocumentError::Upstream(details),
            AnalysisError::Http(error) => DocumentError::Upstream(error.to_string()),
            AnalysisError::EmptyResponse => DocumentError::EmptyResponse,
            AnalysisError::EmptyText => DocumentError::NothingToAnalyze(document_id.to_string()),
        }
    }
}
