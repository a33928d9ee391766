pub mod analysis;
pub mod config;
pub mod docx;
pub mod error;
pub mod extractor;
pub mod ingest;
pub mod models;
pub mod orchestrator;
pub mod stores;
pub mod traits;

pub use analysis::{build_prompt, parse_analysis, strip_code_fence, AnalysisClient};
pub use config::AnalysisConfig;
pub use docx::{extract_docx, DocxTextExtractor, MAX_DOCUMENT_XML_BYTES};
pub use error::{AnalysisError, DocumentError, ErrorKind, ExtractError, StoreError};
pub use extractor::{extract_pdf, DocumentFormat, PdfTextExtractor, TextExtractor};
pub use ingest::{
    discover_documents, read_upload, storage_key, validate_upload, IngestionReport, SkippedFile,
    UploadReadError, MAX_UPLOAD_BYTES,
};
pub use models::{
    AnalysisResult, Document, DocumentState, DocumentView, Metadata, MetadataValue, UploadedFile,
    UNKNOWN_DOCUMENT_TYPE,
};
pub use orchestrator::DocumentService;
pub use stores::{FsBlobStore, JsonDocumentStore, MemoryBlobStore, MemoryDocumentStore};
pub use traits::{BlobStore, DocumentAnalyzer, DocumentStore};
