use crate::error::StoreError;
use crate::models::Document;
use crate::traits::{BlobStore, DocumentStore};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Document records kept in process memory. Clones share the same records.
#[derive(Debug, Clone, Default)]
pub struct MemoryDocumentStore {
    documents: Arc<RwLock<HashMap<String, Document>>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn is_empty(&self) -> bool {
        self.documents.read().await.is_empty()
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn create(&self, document: &Document) -> Result<(), StoreError> {
        let mut documents = self.documents.write().await;
        if documents.contains_key(&document.id) {
            return Err(StoreError::Conflict(document.id.clone()));
        }
        documents.insert(document.id.clone(), document.clone());
        Ok(())
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Document>, StoreError> {
        Ok(self.documents.read().await.get(id).cloned())
    }

    async fn update(&self, document: &Document) -> Result<(), StoreError> {
        let mut documents = self.documents.write().await;
        match documents.get_mut(&document.id) {
            Some(existing) => {
                *existing = document.clone();
                Ok(())
            }
            None => Err(StoreError::Missing(document.id.clone())),
        }
    }
}

/// Blobs kept in process memory. Clones share the same blobs.
#[derive(Debug, Clone, Default)]
pub struct MemoryBlobStore {
    blobs: Arc<RwLock<HashMap<String, Vec<u8>>>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.blobs.read().await.get(key).cloned()
    }

    pub async fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.blobs.read().await.keys().cloned().collect();
        keys.sort_unstable();
        keys
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn put(&self, key: &str, bytes: &[u8]) -> Result<(), StoreError> {
        self.blobs.write().await.insert(key.to_string(), bytes.to_vec());
        Ok(())
    }
}
