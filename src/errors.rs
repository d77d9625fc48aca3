// src/errors.rs
use thiserror::Error;

/// Errors raised while talking to the CV backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// 401/403 from the backend; the stored session token has been dropped
    #[error("Session expired, please log in again")]
    Unauthorized,

    #[error("HTTP {status}: {}", .message.as_deref().unwrap_or("no message"))]
    Status { status: u16, message: Option<String> },

    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),
}

impl ApiError {
    /// Message supplied by the server in the error body, if any
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Status { message, .. } => message.as_deref(),
            _ => None,
        }
    }
}

/// Errors surfaced by the upload flow. Display strings are user facing.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UploadError {
    #[error("Please upload a PDF, DOC, or DOCX file")]
    UnsupportedFileType,

    #[error("File size must be less than 5MB")]
    FileTooLarge,

    #[error("No file selected")]
    NoFileSelected,

    #[error("{0}")]
    Rejected(String),
}
