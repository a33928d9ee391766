use crate::error::{DocumentError, ExtractError};
use crate::ingest::{discover_documents, read_upload, storage_key, validate_upload};
use crate::ingest::{IngestionReport, SkippedFile};
use crate::models::{Document, Metadata, UploadedFile};
use crate::traits::{BlobStore, DocumentAnalyzer, DocumentStore};
use chrono::Utc;
use std::path::Path;
use tracing::{info, warn};
use uuid::Uuid;

/// Drives a document from upload through extraction, storage and analysis.
///
/// Collaborators are injected once at construction; the service holds no other state, so
/// concurrent calls only interact through the stores.
pub struct DocumentService<D, B, A>
where
    D: DocumentStore,
    B: BlobStore,
    A: DocumentAnalyzer,
{
    documents: D,
    blobs: B,
    analyzer: A,
}

impl<D, B, A> DocumentService<D, B, A>
where
    D: DocumentStore + Send + Sync,
    B: BlobStore + Send + Sync,
    A: DocumentAnalyzer + Send + Sync,
{
    pub fn new(documents: D, blobs: B, analyzer: A) -> Self {
        Self {
            documents,
            blobs,
            analyzer,
        }
    }

    pub fn documents(&self) -> &D {
        &self.documents
    }

    pub fn blobs(&self) -> &B {
        &self.blobs
    }

    /// Validates, stores and extracts an upload, then records it as a new document.
    ///
    /// The blob is written before extraction; if extraction or persistence fails afterwards
    /// the blob is left in place.
    pub async fn upload(&self, file: UploadedFile) -> Result<Document, DocumentError> {
        let file_size = file.size();
        let format = validate_upload(&file.filename, file_size)?;

        let created_at = Utc::now();
        let blob_key = storage_key(created_at, &file.filename);
        self.blobs
            .put(&blob_key, &file.content)
            .await
            .map_err(DocumentError::Storage)?;

        let content = file.content;
        let extracted_text = tokio::task::spawn_blocking(move || format.extract(&content))
            .await
            .map_err(|error| DocumentError::Extraction(ExtractError::Interrupted(error.to_string())))?
            .map_err(DocumentError::Extraction)?;

        let document = Document {
            id: Uuid::new_v4().to_string(),
            filename: file.filename,
            content_type: format.content_type().to_string(),
            file_size,
            blob_key,
            extracted_text,
            created_at,
            summary: String::new(),
            document_type: String::new(),
            metadata: Metadata::new(),
            analyzed_at: None,
        };

        self.documents
            .create(&document)
            .await
            .map_err(DocumentError::Persistence)?;

        info!(
            id = %document.id,
            filename = %document.filename,
            format = format.extension(),
            bytes = file_size,
            text_chars = document.extracted_text.len(),
            "document uploaded"
        );

        Ok(document)
    }

    pub async fn get_document(&self, id: &str) -> Result<Document, DocumentError> {
        self.documents
            .get_by_id(id)
            .await
            .map_err(DocumentError::Persistence)?
            .ok_or_else(|| DocumentError::NotFound(id.to_string()))
    }

    /// Runs analysis on a stored document and persists the result, replacing earlier analysis.
    pub async fn analyze_stored_document(&self, id: &str) -> Result<Document, DocumentError> {
        let mut document = self.get_document(id).await?;

        if document.extracted_text.is_empty() {
            return Err(DocumentError::NothingToAnalyze(id.to_string()));
        }

        let result = self
            .analyzer
            .analyze(&document.extracted_text)
            .await
            .map_err(|error| DocumentError::from_analysis(id, error))?;

        if result.degraded {
            warn!(id, "storing degraded analysis");
        }

        document.apply_analysis(result, Utc::now());
        self.documents
            .update(&document)
            .await
            .map_err(DocumentError::Persistence)?;

        info!(id, document_type = %document.document_type, "document analyzed");
        Ok(document)
    }

    /// Uploads every supported file under `folder`, recording failures instead of stopping.
    pub async fn ingest_folder(&self, folder: &Path) -> Result<IngestionReport, DocumentError> {
        let files = discover_documents(folder);
        if files.is_empty() {
            return Err(DocumentError::InvalidArgument(format!(
                "no .pdf or .docx files found in {}",
                folder.display()
            )));
        }

        let mut report = IngestionReport::default();
        for path in files {
            let outcome = match read_upload(&path).await {
                Ok(file) => self.upload(file).await.map_err(|error| error.to_string()),
                Err(error) => Err(error.to_string()),
            };

            match outcome {
                Ok(document) => report.documents.push(document),
                Err(reason) => {
                    warn!(path = %path.display(), %reason, "skipped document");
                    report.skipped_files.push(SkippedFile { path, reason });
                }
            }
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::docx::tests::build_docx;
    use crate::error::{AnalysisError, ErrorKind, StoreError};
    use crate::extractor::tests::build_pdf;
    use crate::ingest::MAX_UPLOAD_BYTES;
    use crate::models::{AnalysisResult, DocumentState, MetadataValue, UNKNOWN_DOCUMENT_TYPE};
    use crate::stores::{MemoryBlobStore, MemoryDocumentStore};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Clone, Default)]
    struct FakeAnalyzer {
        calls: Arc<AtomicUsize>,
        reply: Option<AnalysisResult>,
    }

    #[async_trait]
    impl DocumentAnalyzer for FakeAnalyzer {
        async fn analyze(&self, _text: &str) -> Result<AnalysisResult, AnalysisError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.reply.clone().ok_or(AnalysisError::EmptyResponse)
        }
    }

    struct FailingBlobStore;

    #[async_trait]
    impl BlobStore for FailingBlobStore {
        async fn put(&self, _key: &str, _bytes: &[u8]) -> Result<(), StoreError> {
            Err(StoreError::Io(std::io::Error::other("bucket unavailable")))
        }
    }

    fn invoice_result() -> AnalysisResult {
        let mut metadata = Metadata::new();
        metadata.insert("amount".to_string(), MetadataValue::from(42));
        AnalysisResult {
            summary: "Invoice for consulting".to_string(),
            document_type: "Invoice".to_string(),
            metadata,
            degraded: false,
        }
    }

    fn service(
        analyzer: FakeAnalyzer,
    ) -> DocumentService<MemoryDocumentStore, MemoryBlobStore, FakeAnalyzer> {
        DocumentService::new(MemoryDocumentStore::new(), MemoryBlobStore::new(), analyzer)
    }

    #[tokio::test]
    async fn upload_stores_blob_and_extracted_text() {
        let service = service(FakeAnalyzer::default());
        let docx = build_docx(&[&["Quarterly", "report"]]);

        let document = service
            .upload(UploadedFile::new("Q3.DOCX", docx.clone()))
            .await
            .expect("upload succeeds");

        assert_eq!(document.extracted_text, "Quarterly report");
        assert_eq!(document.content_type, crate::extractor::DOCX_CONTENT_TYPE);
        assert_eq!(document.file_size, docx.len() as u64);
        assert_eq!(document.state(), DocumentState::Stored);
        assert!(document.blob_key.starts_with("documents/"));
        assert!(document.blob_key.ends_with("_Q3.DOCX"));
        assert_eq!(service.blobs().get(&document.blob_key).await, Some(docx));
    }

    #[tokio::test]
    async fn oversized_upload_writes_nothing() {
        let service = service(FakeAnalyzer::default());
        let content = vec![0u8; MAX_UPLOAD_BYTES as usize + 1];

        let error = service
            .upload(UploadedFile::new("big.pdf", content))
            .await
            .unwrap_err();

        assert_eq!(error.kind(), ErrorKind::PayloadTooLarge);
        assert!(service.blobs().keys().await.is_empty());
        assert!(service.documents().is_empty().await);
    }

    #[tokio::test]
    async fn unsupported_extension_writes_nothing() {
        let service = service(FakeAnalyzer::default());

        let error = service
            .upload(UploadedFile::new("photo.png", b"\x89PNG".to_vec()))
            .await
            .unwrap_err();

        assert_eq!(error.kind(), ErrorKind::UnsupportedType);
        assert!(service.blobs().keys().await.is_empty());
    }

    #[tokio::test]
    async fn extraction_failure_keeps_blob_but_creates_no_record() {
        let service = service(FakeAnalyzer::default());

        let error = service
            .upload(UploadedFile::new("broken.pdf", b"%PDF-1.4\n%broken".to_vec()))
            .await
            .unwrap_err();

        assert_eq!(error.kind(), ErrorKind::MalformedInput);
        assert!(matches!(error, DocumentError::Extraction(_)));
        assert_eq!(service.blobs().keys().await.len(), 1);
        assert!(service.documents().is_empty().await);
    }

    #[tokio::test]
    async fn blob_failure_aborts_before_extraction() {
        let service = DocumentService::new(
            MemoryDocumentStore::new(),
            FailingBlobStore,
            FakeAnalyzer::default(),
        );

        let error = service
            .upload(UploadedFile::new("a.pdf", build_pdf(&[Some("text")])))
            .await
            .unwrap_err();

        assert_eq!(error.kind(), ErrorKind::StorageError);
        assert!(service.documents().is_empty().await);
    }

    #[tokio::test]
    async fn analysis_overwrites_fields_and_persists() {
        let analyzer = FakeAnalyzer {
            reply: Some(invoice_result()),
            ..Default::default()
        };
        let service = service(analyzer.clone());
        let uploaded = service
            .upload(UploadedFile::new("inv.pdf", build_pdf(&[Some("Amount due 42")])))
            .await
            .unwrap();

        let analyzed = service.analyze_stored_document(&uploaded.id).await.unwrap();

        assert_eq!(analyzed.document_type, "Invoice");
        assert_eq!(analyzed.state(), DocumentState::Analyzed);
        let stored = service.get_document(&uploaded.id).await.unwrap();
        assert_eq!(stored, analyzed);
        assert_eq!(analyzer.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn degraded_analysis_is_stored_as_unknown() {
        let analyzer = FakeAnalyzer {
            reply: Some(AnalysisResult::degraded("Hello")),
            ..Default::default()
        };
        let service = service(analyzer);
        let uploaded = service
            .upload(UploadedFile::new("memo.docx", build_docx(&[&["memo"]])))
            .await
            .unwrap();

        let analyzed = service.analyze_stored_document(&uploaded.id).await.unwrap();

        assert_eq!(analyzed.summary, "Hello");
        assert_eq!(analyzed.document_type, UNKNOWN_DOCUMENT_TYPE);
        assert!(analyzed.metadata.is_empty());
    }

    #[tokio::test]
    async fn empty_text_is_not_sent_for_analysis() {
        let analyzer = FakeAnalyzer {
            reply: Some(invoice_result()),
            ..Default::default()
        };
        let service = service(analyzer.clone());
        let uploaded = service
            .upload(UploadedFile::new("blank.pdf", build_pdf(&[None])))
            .await
            .expect("empty text does not fail ingestion");
        assert!(uploaded.extracted_text.is_empty());

        let error = service.analyze_stored_document(&uploaded.id).await.unwrap_err();

        assert_eq!(error.kind(), ErrorKind::NothingToAnalyze);
        assert_eq!(analyzer.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn unknown_ids_are_not_found() {
        let service = service(FakeAnalyzer::default());

        assert_eq!(
            service.get_document("missing").await.unwrap_err().kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            service.analyze_stored_document("missing").await.unwrap_err().kind(),
            ErrorKind::NotFound
        );
    }

    #[tokio::test]
    async fn analyzer_failures_leave_the_record_untouched() {
        let service = service(FakeAnalyzer::default());
        let uploaded = service
            .upload(UploadedFile::new("a.docx", build_docx(&[&["text"]])))
            .await
            .unwrap();

        let error = service.analyze_stored_document(&uploaded.id).await.unwrap_err();

        assert_eq!(error.kind(), ErrorKind::EmptyResponse);
        assert_eq!(service.get_document(&uploaded.id).await.unwrap(), uploaded);
    }

    #[tokio::test]
    async fn folder_ingestion_reports_skipped_files() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        std::fs::write(dir.path().join("good.pdf"), build_pdf(&[Some("Good")]))?;
        std::fs::write(dir.path().join("bad.docx"), b"not a zip")?;
        std::fs::write(dir.path().join("ignored.txt"), b"ignored")?;
        let service = service(FakeAnalyzer::default());

        let report = service.ingest_folder(dir.path()).await?;

        assert_eq!(report.documents.len(), 1);
        assert_eq!(report.documents[0].filename, "good.pdf");
        assert_eq!(report.skipped_files.len(), 1);
        assert!(report.skipped_files[0].path.ends_with("bad.docx"));
        Ok(())
    }

    #[tokio::test]
    async fn folder_without_supported_files_is_an_invalid_argument() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"plain text").unwrap();
        let service = service(FakeAnalyzer::default());

        let error = service.ingest_folder(dir.path()).await.unwrap_err();

        assert_eq!(error.kind(), ErrorKind::InvalidArgument);
        assert!(service.documents().is_empty().await);
        assert!(service.blobs().keys().await.is_empty());
    }
}
