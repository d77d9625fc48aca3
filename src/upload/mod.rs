// src/upload/mod.rs
pub mod controller;
pub mod state;
pub mod validation;

pub use controller::CvUploadController;
pub use state::{EventSender, NotificationLevel, SharedState, UploadEvent, UploadState};
pub use validation::{validate_selection, LocalFileSelection, MAX_FILE_SIZE};
