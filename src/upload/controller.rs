// src/upload/controller.rs
//! Candidate-side CV workflow: pick a file, upload it, follow processing

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};
use tokio::task::JoinHandle;
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::{error, info, info_span, warn, Instrument};

use super::state::{EventSender, SharedState, UploadEvent, UploadState};
use super::validation::LocalFileSelection;
use crate::core::{CvApi, FsOps};
use crate::errors::UploadError;
use crate::poller::progress::{UPLOAD_ACCEPTED, UPLOAD_STARTED};
use crate::poller::{JobPoller, PollOutcome, PollerConfig};
use crate::types::{CvStatusResponse, CvSummary, JobId};

const UPLOADING_TEXT: &str = "Uploading CV file...";
const PROCESSING_STARTED_TEXT: &str = "Processing started...";
const UPLOAD_FAILED_MESSAGE: &str = "Failed to upload CV. Please try again.";
const UPLOAD_FAILED_NOTICE: &str = "Failed to upload CV";
const UPLOAD_ACCEPTED_NOTICE: &str = "CV uploaded! Processing in background...";

/// The poll task currently following a job. Dropping it cancels the task.
struct ActivePoll {
    job_id: JobId,
    token: CancellationToken,
    handle: JoinHandle<PollOutcome>,
    _guard: DropGuard,
}

impl ActivePoll {
    fn spawn(poller: JobPoller, job_id: JobId) -> Self {
        let token = CancellationToken::new();
        let task_token = token.clone();
        let handle = tokio::spawn(
            async move { poller.run(job_id, task_token).await }
                .instrument(info_span!("cv_job_poll", job_id)),
        );

        Self {
            job_id,
            _guard: token.clone().drop_guard(),
            token,
            handle,
        }
    }
}

pub struct CvUploadController {
    api: Arc<dyn CvApi>,
    state: SharedState,
    events: EventSender,
    config: PollerConfig,
    active_poll: Option<ActivePoll>,
}

impl CvUploadController {
    pub fn new(
        api: Arc<dyn CvApi>,
        config: PollerConfig,
    ) -> (Self, mpsc::UnboundedReceiver<UploadEvent>) {
        let (events, receiver) = EventSender::channel();
        let controller = Self {
            api,
            state: Arc::new(RwLock::new(UploadState::default())),
            events,
            config,
            active_poll: None,
        };
        (controller, receiver)
    }

    /// Snapshot of the current state
    pub async fn state(&self) -> UploadState {
        self.state.read().await.clone()
    }

    pub fn active_job(&self) -> Option<JobId> {
        self.active_poll
            .as_ref()
            .filter(|poll| !poll.handle.is_finished())
            .map(|poll| poll.job_id)
    }

    pub async fn select_file(&self, selection: LocalFileSelection) -> Result<(), UploadError> {
        let mut state = self.state.write().await;
        state.error = None;

        if let Err(e) = selection.validate() {
            info!("Rejected {}: {}", selection.name, e);
            state.error = Some(e.to_string());
            return Err(e);
        }

        state.selected_file = Some(selection);
        Ok(())
    }

    pub async fn remove_file(&self) {
        let mut state = self.state.write().await;
        state.selected_file = None;
        state.error = None;
        state.progress = 0;
    }

    /// Send the selected file and start following its processing job.
    /// Any poll still running for an earlier upload is cancelled first.
    pub async fn upload(&mut self) -> Result<JobId, UploadError> {
        let file = self
            .state
            .read()
            .await
            .selected_file
            .clone()
            .ok_or(UploadError::NoFileSelected)?;
        file.validate()?;

        if let Some(previous) = self.active_poll.take() {
            info!("New upload supersedes polling of job {}", previous.job_id);
            previous.token.cancel();
        }

        {
            let mut state = self.state.write().await;
            state.uploading = true;
            state.error = None;
            state.job_id = None;
            state.success = false;
            state.progress = UPLOAD_STARTED;
            state.status_text = UPLOADING_TEXT.to_string();
            self.events.progress(&state);
        }

        let response = match self.api.upload_cv(&file).await {
            Ok(response) => response,
            Err(e) => {
                error!("CV upload failed: {}", e);
                let message = e.server_message().map(str::to_string);
                return Err(self.upload_failed(message).await);
            }
        };

        let Some(job_id) = response.job_id else {
            warn!("Upload response carried no job id");
            return Err(self.upload_failed(response.message).await);
        };

        {
            let mut state = self.state.write().await;
            state.progress = UPLOAD_ACCEPTED;
            state.job_id = Some(job_id);
            state.status_text = response
                .status_details
                .unwrap_or_else(|| PROCESSING_STARTED_TEXT.to_string());
            self.events.progress(&state);
        }
        self.events.success(UPLOAD_ACCEPTED_NOTICE);
        info!("Uploaded {}, processing as job {}", file.name, job_id);

        let poller = JobPoller::new(
            self.api.clone(),
            self.state.clone(),
            self.events.clone(),
            self.config.clone(),
        );
        self.active_poll = Some(ActivePoll::spawn(poller, job_id));

        Ok(job_id)
    }

    async fn upload_failed(&self, message: Option<String>) -> UploadError {
        let message = message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| UPLOAD_FAILED_MESSAGE.to_string());

        {
            let mut state = self.state.write().await;
            state.error = Some(message.clone());
            state.uploading = false;
            state.progress = 0;
            state.status_text.clear();
        }
        self.events.error(UPLOAD_FAILED_NOTICE);
        self.events.reset();

        UploadError::Rejected(message)
    }

    /// Wait for the running poll, if any, to finish
    pub async fn wait_for_poll(&mut self) -> Option<PollOutcome> {
        let ActivePoll { handle, _guard, .. } = self.active_poll.take()?;
        match handle.await {
            Ok(outcome) => Some(outcome),
            Err(e) => {
                error!("Poll task ended abnormally: {}", e);
                None
            }
        }
    }

    /// Stop following the current job without touching the server. The
    /// upload control is released; the selected file and inline error stay.
    pub async fn cancel_poll(&mut self) {
        let Some(poll) = self.active_poll.take() else {
            return;
        };
        poll.token.cancel();
        info!("Cancelled polling of job {}", poll.job_id);

        let mut state = self.state.write().await;
        if state.is_tracking(poll.job_id) {
            state.uploading = false;
            state.success = false;
            state.job_id = None;
            state.progress = 0;
            state.status_text.clear();
            self.events.reset();
        }
    }

    /// Reload the stored CV. A missing CV is not an error.
    pub async fn refresh_cv(&self) -> Option<CvSummary> {
        let cv = match self.api.my_cv().await {
            Ok(cv) => Some(cv),
            Err(e) => {
                info!("No existing CV found: {}", e);
                None
            }
        };
        self.state.write().await.cv = cv.clone();
        cv
    }

    pub async fn cv_status(&self) -> Result<CvStatusResponse> {
        self.api
            .cv_status()
            .await
            .context("Failed to check CV status")
    }

    pub async fn delete_cv(&self) -> Result<()> {
        match self.api.delete_cv().await {
            Ok(()) => {
                self.state.write().await.cv = None;
                self.events.success("CV deleted successfully!");
                Ok(())
            }
            Err(e) => {
                self.events.error("Error deleting CV");
                Err(e).context("Failed to delete CV")
            }
        }
    }

    pub async fn download_cv(&self, destination: &Path) -> Result<PathBuf> {
        let bytes = self
            .api
            .download_cv()
            .await
            .context("Failed to download CV")?;

        if let Some(backup) = FsOps::write_bytes_safe(destination, &bytes).await? {
            info!("Previous download kept at {}", backup.display());
        }
        Ok(destination.to_path_buf())
    }
}
