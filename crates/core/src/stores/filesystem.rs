use crate::error::StoreError;
use crate::models::Document;
use crate::traits::{BlobStore, DocumentStore};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// Stores each document as `<root>/<id>.json`.
#[derive(Debug, Clone)]
pub struct JsonDocumentStore {
    root: PathBuf,
}

impl JsonDocumentStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn record_path(&self, id: &str) -> Result<PathBuf, StoreError> {
        let is_plain = !id.is_empty()
            && id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !is_plain {
            return Err(StoreError::InvalidKey(id.to_string()));
        }
        Ok(self.root.join(format!("{id}.json")))
    }

    async fn write_record(&self, path: &Path, document: &Document) -> Result<(), StoreError> {
        fs::create_dir_all(&self.root).await?;
        let body = serde_json::to_vec_pretty(document)?;
        fs::write(path, body).await?;
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for JsonDocumentStore {
    async fn create(&self, document: &Document) -> Result<(), StoreError> {
        let path = self.record_path(&document.id)?;
        if fs::try_exists(&path).await? {
            return Err(StoreError::Conflict(document.id.clone()));
        }
        self.write_record(&path, document).await?;
        debug!(id = %document.id, path = %path.display(), "document record created");
        Ok(())
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Document>, StoreError> {
        // Ids that could never have been written are simply absent.
        let Ok(path) = self.record_path(id) else {
            return Ok(None);
        };

        match fs::read(&path).await {
            Ok(body) => Ok(Some(serde_json::from_slice(&body)?)),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(None),
            Err(error) => Err(error.into()),
        }
    }

    async fn update(&self, document: &Document) -> Result<(), StoreError> {
        let path = self.record_path(&document.id)?;
        if !fs::try_exists(&path).await? {
            return Err(StoreError::Missing(document.id.clone()));
        }
        self.write_record(&path, document).await
    }
}

/// Stores each blob at `<root>/<key>`; keys may contain `/` separators but never escape the root.
#[derive(Debug, Clone)]
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        let relative = Path::new(key);
        let is_contained = !key.is_empty()
            && relative
                .components()
                .all(|component| matches!(component, Component::Normal(_)));
        if !is_contained {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn put(&self, key: &str, bytes: &[u8]) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&path, bytes).await?;
        debug!(key, bytes = bytes.len(), "blob written");
        Ok(())
    }
}
