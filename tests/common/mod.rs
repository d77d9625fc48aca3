//! In-memory backend for driving the upload flow without a network.

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::Instant;

use cv_uploader::types::{
    CvStatusResponse, CvSummary, JobId, JobStatus, JobStatusResponse, UploadResponse,
};
use cv_uploader::upload::validation::MIME_PDF;
use cv_uploader::{ApiError, CvApi, LocalFileSelection, PollerConfig, UploadEvent};

#[derive(Debug, Clone)]
pub enum UploadScript {
    Job(JobId),
    JobWithDetails(JobId, String),
    MissingJobId,
    Reject(Option<String>),
}

#[derive(Debug, Clone)]
pub enum StatusScript {
    Reply(JobStatusResponse),
    NetworkBlip,
}

impl StatusScript {
    pub fn status(status: JobStatus) -> Self {
        StatusScript::Reply(JobStatusResponse::new(status))
    }
}

/// Scripted backend. Each job replays its status script; the last entry repeats.
#[derive(Default)]
pub struct ScriptedApi {
    uploads: Mutex<VecDeque<UploadScript>>,
    statuses: Mutex<HashMap<JobId, VecDeque<StatusScript>>>,
    cv: Mutex<Option<CvSummary>>,
    cv_delay: Duration,
    status_calls: Mutex<Vec<(JobId, Instant)>>,
    upload_calls: AtomicUsize,
    my_cv_calls: AtomicUsize,
    delete_calls: AtomicUsize,
}

impl ScriptedApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_upload(self, script: UploadScript) -> Self {
        self.uploads.lock().unwrap().push_back(script);
        self
    }

    pub fn with_statuses(self, job_id: JobId, script: Vec<StatusScript>) -> Self {
        self.statuses
            .lock()
            .unwrap()
            .insert(job_id, script.into_iter().collect());
        self
    }

    pub fn with_cv(self, cv: CvSummary) -> Self {
        *self.cv.lock().unwrap() = Some(cv);
        self
    }

    /// Hold every CV fetch for `delay` before answering
    pub fn with_cv_delay(mut self, delay: Duration) -> Self {
        self.cv_delay = delay;
        self
    }

    pub fn upload_calls(&self) -> usize {
        self.upload_calls.load(Ordering::SeqCst)
    }

    pub fn my_cv_calls(&self) -> usize {
        self.my_cv_calls.load(Ordering::SeqCst)
    }

    pub fn delete_calls(&self) -> usize {
        self.delete_calls.load(Ordering::SeqCst)
    }

    pub fn status_calls(&self) -> Vec<(JobId, Instant)> {
        self.status_calls.lock().unwrap().clone()
    }

    pub fn status_call_count(&self) -> usize {
        self.status_calls.lock().unwrap().len()
    }

    pub fn status_calls_for(&self, job_id: JobId) -> usize {
        self.status_calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(id, _)| *id == job_id)
            .count()
    }
}

#[async_trait]
impl CvApi for ScriptedApi {
    async fn upload_cv(&self, _file: &LocalFileSelection) -> Result<UploadResponse, ApiError> {
        self.upload_calls.fetch_add(1, Ordering::SeqCst);
        let script = self
            .uploads
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(UploadScript::Reject(None));

        match script {
            UploadScript::Job(job_id) => Ok(UploadResponse {
                job_id: Some(job_id),
                status_details: None,
                message: None,
            }),
            UploadScript::JobWithDetails(job_id, details) => Ok(UploadResponse {
                job_id: Some(job_id),
                status_details: Some(details),
                message: None,
            }),
            UploadScript::MissingJobId => Ok(UploadResponse {
                job_id: None,
                status_details: None,
                message: None,
            }),
            UploadScript::Reject(message) => Err(ApiError::Status {
                status: 400,
                message,
            }),
        }
    }

    async fn job_status(&self, job_id: JobId) -> Result<JobStatusResponse, ApiError> {
        self.status_calls
            .lock()
            .unwrap()
            .push((job_id, Instant::now()));

        let script = {
            let mut statuses = self.statuses.lock().unwrap();
            let queue = statuses.entry(job_id).or_default();
            if queue.len() > 1 {
                queue.pop_front()
            } else {
                queue.front().cloned()
            }
        };

        match script {
            Some(StatusScript::Reply(reply)) => Ok(reply),
            Some(StatusScript::NetworkBlip) => Err(ApiError::Io(std::io::Error::new(
                std::io::ErrorKind::ConnectionReset,
                "connection reset",
            ))),
            None => Err(ApiError::Status {
                status: 404,
                message: Some("Job not found".to_string()),
            }),
        }
    }

    async fn my_cv(&self) -> Result<CvSummary, ApiError> {
        self.my_cv_calls.fetch_add(1, Ordering::SeqCst);
        if !self.cv_delay.is_zero() {
            tokio::time::sleep(self.cv_delay).await;
        }
        self.cv.lock().unwrap().clone().ok_or(ApiError::Status {
            status: 404,
            message: Some("Aucun CV trouvé pour cet utilisateur".to_string()),
        })
    }

    async fn cv_status(&self) -> Result<CvStatusResponse, ApiError> {
        Ok(CvStatusResponse {
            has_cv: self.cv.lock().unwrap().is_some(),
        })
    }

    async fn delete_cv(&self) -> Result<(), ApiError> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        self.cv.lock().unwrap().take();
        Ok(())
    }

    async fn download_cv(&self) -> Result<Vec<u8>, ApiError> {
        match self.cv.lock().unwrap().as_ref() {
            Some(_) => Ok(b"%PDF-1.4 stored cv".to_vec()),
            None => Err(ApiError::Status {
                status: 404,
                message: None,
            }),
        }
    }
}

pub fn pdf_selection() -> LocalFileSelection {
    LocalFileSelection::new("/tmp/resume.pdf", 120_000, MIME_PDF)
}

pub fn sample_cv() -> CvSummary {
    CvSummary {
        id: 9,
        first_name: Some("Alice".to_string()),
        last_name: Some("Durand".to_string()),
        ..Default::default()
    }
}

pub fn poller_config() -> PollerConfig {
    PollerConfig::default()
}

pub fn short_poller_config(max_attempts: u32) -> PollerConfig {
    PollerConfig {
        interval: Duration::from_secs(2),
        max_attempts,
        completion_delay: Duration::from_secs(2),
    }
}

/// Everything queued on the event channel so far
pub fn drain(events: &mut UnboundedReceiver<UploadEvent>) -> Vec<UploadEvent> {
    let mut drained = Vec::new();
    while let Ok(event) = events.try_recv() {
        drained.push(event);
    }
    drained
}

pub fn progress_values(events: &[UploadEvent]) -> Vec<u8> {
    events
        .iter()
        .filter_map(|e| match e {
            UploadEvent::Progress { percent, .. } => Some(*percent),
            _ => None,
        })
        .collect()
}
