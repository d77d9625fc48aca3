// src/upload/validation.rs
//! Local checks run before any byte leaves the machine

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::errors::UploadError;

pub const MAX_FILE_SIZE: u64 = 5 * 1024 * 1024;

pub const MIME_PDF: &str = "application/pdf";
pub const MIME_DOC: &str = "application/msword";
pub const MIME_DOCX: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

const ALLOWED_TYPES: [&str; 3] = [MIME_PDF, MIME_DOC, MIME_DOCX];
const FALLBACK_TYPE: &str = "application/octet-stream";

/// A file the candidate picked, held until it is uploaded or removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalFileSelection {
    pub path: PathBuf,
    pub name: String,
    pub size: u64,
    pub mime_type: String,
}

impl LocalFileSelection {
    pub fn new(path: impl Into<PathBuf>, size: u64, mime_type: &str) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();

        Self {
            path,
            name,
            size,
            mime_type: mime_type.to_string(),
        }
    }

    /// Build a selection from a file on disk, typing it by extension
    pub async fn from_path(path: &Path) -> Result<Self> {
        let metadata = tokio::fs::metadata(path)
            .await
            .with_context(|| format!("Failed to read file metadata: {}", path.display()))?;

        if !metadata.is_file() {
            anyhow::bail!("Not a regular file: {}", path.display());
        }

        Ok(Self::new(path, metadata.len(), content_type_for(path)))
    }

    pub fn validate(&self) -> Result<(), UploadError> {
        validate_selection(&self.mime_type, self.size)
    }
}

/// Type check first, then size, matching the order the messages are shown in
pub fn validate_selection(mime_type: &str, size: u64) -> Result<(), UploadError> {
    if !ALLOWED_TYPES.contains(&mime_type) {
        return Err(UploadError::UnsupportedFileType);
    }

    if size > MAX_FILE_SIZE {
        return Err(UploadError::FileTooLarge);
    }

    Ok(())
}

pub fn content_type_for(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase());

    match extension.as_deref() {
        Some("pdf") => MIME_PDF,
        Some("doc") => MIME_DOC,
        Some("docx") => MIME_DOCX,
        _ => FALLBACK_TYPE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_supported_types_at_the_limit() {
        for mime in ALLOWED_TYPES {
            assert_eq!(validate_selection(mime, MAX_FILE_SIZE), Ok(()));
        }
    }

    #[test]
    fn rejects_unsupported_type() {
        let err = validate_selection("image/png", 10).unwrap_err();
        assert_eq!(err, UploadError::UnsupportedFileType);
        assert_eq!(err.to_string(), "Please upload a PDF, DOC, or DOCX file");
    }

    #[test]
    fn rejects_oversized_file() {
        let err = validate_selection(MIME_PDF, MAX_FILE_SIZE + 1).unwrap_err();
        assert_eq!(err, UploadError::FileTooLarge);
        assert_eq!(err.to_string(), "File size must be less than 5MB");
    }

    #[test]
    fn types_files_by_extension() {
        assert_eq!(content_type_for(Path::new("cv.PDF")), MIME_PDF);
        assert_eq!(content_type_for(Path::new("cv.doc")), MIME_DOC);
        assert_eq!(content_type_for(Path::new("/tmp/cv.docx")), MIME_DOCX);
        assert_eq!(content_type_for(Path::new("cv.txt")), FALLBACK_TYPE);
        assert_eq!(content_type_for(Path::new("README")), FALLBACK_TYPE);
    }

    #[tokio::test]
    async fn reads_selection_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("resume.pdf");
        std::fs::write(&path, b"%PDF-1.4 test").unwrap();

        let selection = LocalFileSelection::from_path(&path).await.unwrap();
        assert_eq!(selection.name, "resume.pdf");
        assert_eq!(selection.size, 13);
        assert_eq!(selection.mime_type, MIME_PDF);
        assert!(selection.validate().is_ok());
    }

    #[tokio::test]
    async fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(LocalFileSelection::from_path(&dir.path().join("nope.pdf"))
            .await
            .is_err());
    }
}
