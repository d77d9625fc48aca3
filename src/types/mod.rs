// src/types/mod.rs
pub mod cv_data;
pub mod response;

pub use cv_data::CvSummary;
pub use response::{ApiErrorBody, CvStatusResponse, JobId, JobStatus, JobStatusResponse, UploadResponse};
