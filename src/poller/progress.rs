// src/poller/progress.rs
//! Displayed progress while the backend works on a CV.
//!
//! The backend reports no real percentage, so the bar is a heuristic: a fixed
//! value while the job is queued and a constant step per `PROCESSING`
//! observation, capped below completion. Nothing here talks to the network.

use crate::types::JobStatus;

/// Progress shown while the file itself is being sent
pub const UPLOAD_STARTED: u8 = 10;
/// Progress once the backend has accepted the file and returned a job id
pub const UPLOAD_ACCEPTED: u8 = 20;
pub const COMPLETE: u8 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressModel {
    pub pending: u8,
    pub step: u8,
    pub cap: u8,
}

impl Default for ProgressModel {
    fn default() -> Self {
        Self {
            pending: 25,
            step: 2,
            cap: 90,
        }
    }
}

impl ProgressModel {
    /// Next displayed value after observing `status`. Never lower than `current`.
    pub fn advance(&self, current: u8, status: JobStatus) -> u8 {
        let next = match status {
            JobStatus::Pending => self.pending,
            JobStatus::Processing => current.saturating_add(self.step).min(self.cap),
            JobStatus::Completed => COMPLETE,
            // Failure resets the bar elsewhere; the observation itself moves nothing.
            JobStatus::Failed => current,
        };
        next.max(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_sets_fixed_value() {
        let model = ProgressModel::default();
        assert_eq!(model.advance(UPLOAD_ACCEPTED, JobStatus::Pending), 25);
    }

    #[test]
    fn processing_steps_towards_cap() {
        let model = ProgressModel::default();
        assert_eq!(model.advance(25, JobStatus::Processing), 27);
        assert_eq!(model.advance(89, JobStatus::Processing), 90);
        assert_eq!(model.advance(90, JobStatus::Processing), 90);
    }

    #[test]
    fn never_decreases() {
        let model = ProgressModel::default();
        assert_eq!(model.advance(60, JobStatus::Pending), 60);
        assert_eq!(model.advance(95, JobStatus::Processing), 95);
        assert_eq!(model.advance(40, JobStatus::Failed), 40);
    }

    #[test]
    fn completed_jumps_to_full() {
        let model = ProgressModel::default();
        assert_eq!(model.advance(27, JobStatus::Completed), COMPLETE);
    }

    #[test]
    fn long_processing_settles_at_cap() {
        let model = ProgressModel::default();
        let mut current = 25;
        for _ in 0..50 {
            let next = model.advance(current, JobStatus::Processing);
            assert!(next >= current);
            current = next;
        }
        assert_eq!(current, 90);
    }
}
