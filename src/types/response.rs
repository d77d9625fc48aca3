// src/types/response.rs
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a background CV processing job.
pub type JobId = i64;

/// Server-driven lifecycle of a CV processing job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            JobStatus::Pending => "PENDING",
            JobStatus::Processing => "PROCESSING",
            JobStatus::Completed => "COMPLETED",
            JobStatus::Failed => "FAILED",
        };
        f.write_str(s)
    }
}

// ===== Service Response Types =====

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub job_id: Option<JobId>,
    pub status_details: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobStatusResponse {
    pub status: JobStatus,
    pub status_details: Option<String>,
    pub error_message: Option<String>,
}

impl JobStatusResponse {
    pub fn new(status: JobStatus) -> Self {
        Self {
            status,
            status_details: None,
            error_message: None,
        }
    }

    pub fn with_details(mut self, details: &str) -> Self {
        self.status_details = Some(details.to_string());
        self
    }

    pub fn with_error(mut self, message: &str) -> Self {
        self.error_message = Some(message.to_string());
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CvStatusResponse {
    pub has_cv: bool,
}

/// Error envelope returned by the backend on non-2xx responses.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiErrorBody {
    pub status_code: Option<u16>,
    pub message: Option<String>,
    pub error: Option<String>,
}
