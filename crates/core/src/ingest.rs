use crate::extractor::DocumentFormat;
use crate::models::UploadedFile;
use crate::DocumentError;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use tokio::fs;
use walkdir::WalkDir;

/// Largest accepted upload, in bytes (5 MiB).
pub const MAX_UPLOAD_BYTES: u64 = 5 * 1024 * 1024;

const STORAGE_PREFIX: &str = "documents";

/// Checks the size ceiling, then the extension, and returns the detected format.
pub fn validate_upload(filename: &str, size: u64) -> Result<DocumentFormat, DocumentError> {
    if size > MAX_UPLOAD_BYTES {
        return Err(DocumentError::PayloadTooLarge {
            size,
            limit: MAX_UPLOAD_BYTES,
        });
    }

    DocumentFormat::from_filename(filename)
        .ok_or_else(|| DocumentError::UnsupportedType(filename.to_string()))
}

/// Blob key for an upload: `documents/<unix-seconds>_<basename>`.
pub fn storage_key(ingested_at: DateTime<Utc>, filename: &str) -> String {
    let basename = Path::new(filename)
        .file_name()
        .and_then(|name| name.to_str())
        .filter(|name| !name.is_empty())
        .unwrap_or("upload");
    format!("{STORAGE_PREFIX}/{}_{basename}", ingested_at.timestamp())
}

/// Reads a file from disk as an upload, refusing oversized or unsupported files before reading.
pub async fn read_upload(path: &Path) -> Result<UploadedFile, UploadReadError> {
    let filename = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| UploadReadError::MissingFileName(path.to_path_buf()))?
        .to_string();

    let size = fs::metadata(path).await?.len();
    validate_upload(&filename, size)?;

    let content = fs::read(path).await?;
    // The file may have grown between the metadata call and the read.
    validate_upload(&filename, content.len() as u64)?;

    Ok(UploadedFile::new(filename, content))
}

#[derive(Debug, thiserror::Error)]
pub enum UploadReadError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("path has no file name: {0}")]
    MissingFileName(PathBuf),

    #[error(transparent)]
    Rejected(#[from] DocumentError),
}

/// Recursively lists `.pdf` and `.docx` files under `folder`, sorted by path.
pub fn discover_documents(folder: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for entry in WalkDir::new(folder)
        .into_iter()
        .filter_map(|item| item.ok())
    {
        if !entry.file_type().is_file() {
            continue;
        }

        let supported = entry
            .path()
            .file_name()
            .and_then(|name| name.to_str())
            .and_then(DocumentFormat::from_filename)
            .is_some();

        if supported {
            files.push(entry.path().to_path_buf());
        }
    }

    files.sort_unstable();
    files
}

#[derive(Debug)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

#[derive(Debug, Default)]
pub struct IngestionReport {
    pub documents: Vec<crate::models::Document>,
    pub skipped_files: Vec<SkippedFile>,
}
