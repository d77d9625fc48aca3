//! Client for uploading a candidate CV to the job marketplace backend and
//! following its background processing job.

pub mod cli;
pub mod core;
pub mod environment;
pub mod errors;
pub mod poller;
pub mod types;
pub mod upload;
pub mod utils;

pub use self::core::{CvApi, ServiceClient};
pub use environment::EnvironmentConfig;
pub use errors::{ApiError, UploadError};
pub use poller::{JobPoller, PollOutcome, PollerConfig};
pub use upload::{CvUploadController, LocalFileSelection, UploadEvent, UploadState};
