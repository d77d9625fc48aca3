// src/poller/mod.rs
//! Background job-status polling for an uploaded CV.
//!
//! One poll task per tracked job. The task ticks on a fixed interval, reads the
//! job status once per tick and stops on `COMPLETED`, `FAILED`, attempt
//! exhaustion or cancellation. Ticks never overlap: a slow response delays the
//! next read and missed ticks are skipped rather than bunched up.

pub mod progress;

use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::core::CvApi;
use crate::types::{JobId, JobStatus, JobStatusResponse};
use crate::upload::{EventSender, SharedState};
use progress::{ProgressModel, COMPLETE};

pub const DEFAULT_STATUS_TEXT: &str = "Processing...";
pub const DEFAULT_FAILURE_MESSAGE: &str = "CV processing failed";
pub const TIMEOUT_MESSAGE: &str =
    "Processing is taking longer than expected. Please check back later.";
pub const TIMEOUT_WARNING: &str = "Processing is taking longer than expected";
pub const COMPLETED_NOTICE: &str = "CV processed successfully!";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PollerConfig {
    #[serde(with = "nonzero_millis")]
    pub interval: Duration,
    pub max_attempts: u32,
    /// How long the completed state stays on screen before it is cleared
    #[serde(with = "millis")]
    pub completion_delay: Duration,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(2000),
            max_attempts: 360,
            completion_delay: Duration::from_millis(2000),
        }
    }
}

impl PollerConfig {
    /// Longest a job is watched before giving up
    pub fn ceiling(&self) -> Duration {
        self.interval * self.max_attempts
    }
}

mod millis {
    use serde::{Deserialize, Deserializer};
    use std::time::Duration;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

/// Tick periods must be positive; a zero period cannot drive a timer.
mod nonzero_millis {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer};
    use std::time::Duration;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        match u64::deserialize(deserializer)? {
            0 => Err(D::Error::custom("interval must be greater than zero milliseconds")),
            ms => Ok(Duration::from_millis(ms)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    Completed,
    Failed(String),
    TimedOut,
    /// Superseded by a newer upload or torn down with its owner
    Cancelled,
}

pub struct JobPoller {
    api: Arc<dyn CvApi>,
    state: SharedState,
    events: EventSender,
    config: PollerConfig,
    progress: ProgressModel,
}

impl JobPoller {
    pub fn new(
        api: Arc<dyn CvApi>,
        state: SharedState,
        events: EventSender,
        config: PollerConfig,
    ) -> Self {
        Self {
            api,
            state,
            events,
            config,
            progress: ProgressModel::default(),
        }
    }

    pub async fn run(&self, job_id: JobId, cancel: CancellationToken) -> PollOutcome {
        info!(
            "Polling job {} every {:?} for up to {:?}",
            job_id,
            self.config.interval,
            self.config.ceiling()
        );

        let mut ticker = interval_at(Instant::now() + self.config.interval, self.config.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let mut attempts: u32 = 0;

        loop {
            tokio::select! {
                _ = cancel.cancelled() => return self.cancelled(job_id),
                _ = ticker.tick() => {}
            }

            attempts += 1;

            let observed = tokio::select! {
                _ = cancel.cancelled() => return self.cancelled(job_id),
                result = self.api.job_status(job_id) => result,
            };

            match observed {
                Ok(job) => {
                    debug!("Job {} attempt {}: {}", job_id, attempts, job.status);
                    if let Some(outcome) = self.observe(job_id, &job, &cancel).await {
                        return outcome;
                    }
                }
                Err(e) => warn!("Error polling job {} (attempt {}): {}", job_id, attempts, e),
            }

            if attempts >= self.config.max_attempts {
                return self.time_out(job_id).await;
            }
        }
    }

    /// Apply one status read. Returns the outcome once the job is finished.
    async fn observe(
        &self,
        job_id: JobId,
        job: &JobStatusResponse,
        cancel: &CancellationToken,
    ) -> Option<PollOutcome> {
        {
            let mut state = self.state.write().await;
            if !state.is_tracking(job_id) {
                return Some(self.cancelled(job_id));
            }

            state.status_text = job
                .status_details
                .clone()
                .unwrap_or_else(|| DEFAULT_STATUS_TEXT.to_string());
            state.progress = self.progress.advance(state.progress, job.status);

            if !job.status.is_terminal() {
                self.events.progress(&state);
                return None;
            }

            if job.status == JobStatus::Failed {
                let message = job
                    .error_message
                    .clone()
                    .filter(|m| !m.trim().is_empty())
                    .unwrap_or_else(|| DEFAULT_FAILURE_MESSAGE.to_string());

                warn!("Job {} failed: {}", job_id, message);
                state.reset_transient();
                state.error = Some(message.clone());
                self.events.error(DEFAULT_FAILURE_MESSAGE);
                self.events.reset();
                return Some(PollOutcome::Failed(message));
            }

            state.progress = COMPLETE;
            state.success = true;
            self.events.progress(&state);
            self.events.success(COMPLETED_NOTICE);
        }

        info!("Job {} completed", job_id);
        Some(self.finish_completed(job_id, cancel).await)
    }

    async fn finish_completed(&self, job_id: JobId, cancel: &CancellationToken) -> PollOutcome {
        tokio::select! {
            _ = cancel.cancelled() => return self.cancelled(job_id),
            _ = tokio::time::sleep(self.config.completion_delay) => {}
        }

        {
            let mut state = self.state.write().await;
            if !state.is_tracking(job_id) {
                return self.cancelled(job_id);
            }
            state.reset_transient();
        }
        self.events.reset();

        let fetched = tokio::select! {
            _ = cancel.cancelled() => return self.cancelled(job_id),
            result = self.api.my_cv() => result,
        };

        let cv = match fetched {
            Ok(cv) => Some(cv),
            Err(e) => {
                warn!("No CV available after job {} completed: {}", job_id, e);
                None
            }
        };
        self.state.write().await.cv = cv;

        PollOutcome::Completed
    }

    async fn time_out(&self, job_id: JobId) -> PollOutcome {
        warn!(
            "Job {} still running after {} attempts, giving up",
            job_id, self.config.max_attempts
        );

        let mut state = self.state.write().await;
        if !state.is_tracking(job_id) {
            return self.cancelled(job_id);
        }
        state.uploading = false;
        state.job_id = None;
        state.error = Some(TIMEOUT_MESSAGE.to_string());
        self.events.warning(TIMEOUT_WARNING);

        PollOutcome::TimedOut
    }

    fn cancelled(&self, job_id: JobId) -> PollOutcome {
        info!("Stopped polling job {}", job_id);
        PollOutcome::Cancelled
    }
}
