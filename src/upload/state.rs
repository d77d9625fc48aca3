// src/upload/state.rs
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};

use super::validation::LocalFileSelection;
use crate::types::{CvSummary, JobId};

pub type SharedState = Arc<RwLock<UploadState>>;

/// Everything a front-end needs to render the upload panel.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UploadState {
    pub selected_file: Option<LocalFileSelection>,
    pub uploading: bool,
    pub progress: u8,
    pub status_text: String,
    /// Inline error shown next to the upload control
    pub error: Option<String>,
    pub job_id: Option<JobId>,
    pub success: bool,
    pub cv: Option<CvSummary>,
}

impl UploadState {
    /// Drop everything tied to the finished upload; the stored CV survives
    pub fn reset_transient(&mut self) {
        self.selected_file = None;
        self.uploading = false;
        self.progress = 0;
        self.status_text.clear();
        self.job_id = None;
        self.success = false;
    }

    pub fn is_tracking(&self, job_id: JobId) -> bool {
        self.job_id == Some(job_id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Success,
    Error,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadEvent {
    Notification {
        level: NotificationLevel,
        message: String,
    },
    Progress {
        percent: u8,
        status_text: String,
    },
    /// Transient state went back to idle
    Reset,
}

/// Sending half of the event stream. Sends after the receiver is gone are dropped.
#[derive(Debug, Clone)]
pub struct EventSender(mpsc::UnboundedSender<UploadEvent>);

impl EventSender {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<UploadEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self(tx), rx)
    }

    pub fn notify(&self, level: NotificationLevel, message: &str) {
        let _ = self.0.send(UploadEvent::Notification {
            level,
            message: message.to_string(),
        });
    }

    pub fn success(&self, message: &str) {
        self.notify(NotificationLevel::Success, message);
    }

    pub fn error(&self, message: &str) {
        self.notify(NotificationLevel::Error, message);
    }

    pub fn warning(&self, message: &str) {
        self.notify(NotificationLevel::Warning, message);
    }

    pub fn progress(&self, state: &UploadState) {
        let _ = self.0.send(UploadEvent::Progress {
            percent: state.progress,
            status_text: state.status_text.clone(),
        });
    }

    pub fn reset(&self) {
        let _ = self.0.send(UploadEvent::Reset);
    }
}
