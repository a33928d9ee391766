use crate::error::{AnalysisError, StoreError};
use crate::models::{AnalysisResult, Document};
use async_trait::async_trait;

/// Structured record storage for [`Document`]s.
#[async_trait]
pub trait DocumentStore {
    async fn create(&self, document: &Document) -> Result<(), StoreError>;

    async fn get_by_id(&self, id: &str) -> Result<Option<Document>, StoreError>;

    async fn update(&self, document: &Document) -> Result<(), StoreError>;
}

/// Key-addressed storage for the raw uploaded bytes.
#[async_trait]
pub trait BlobStore {
    async fn put(&self, key: &str, bytes: &[u8]) -> Result<(), StoreError>;
}

/// Derives a summary, type label and metadata from extracted text.
#[async_trait]
pub trait DocumentAnalyzer {
    async fn analyze(&self, text: &str) -> Result<AnalysisResult, AnalysisError>;
}
