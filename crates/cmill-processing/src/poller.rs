//! Cancelable polling loop driving a job to a terminal state.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use cmill_models::{JobId, JobState, JobStatus, Stage};

use crate::client::ProcessingClient;
use crate::config::PollConfig;
use crate::error::{ProcessingError, ProcessingResult};
use crate::progress::{PollProgress, ProgressChannel};

/// Message shown when a job fails without a reason on the wire.
const GENERIC_FAILURE: &str = "An error occurred while processing the video";

/// Polls the status endpoint until the job completes, fails, or the
/// caller cancels.
///
/// The loop is explicit: fetch (with retries), interpret, wait, repeat.
/// There is no cap on the number of polls; a job stuck in `processing`
/// is polled until the cancellation token fires. Cancellation is checked
/// before every request and interrupts both in-flight fetches and the
/// inter-poll wait.
pub struct StatusPoller {
    client: ProcessingClient,
    config: PollConfig,
    progress: Option<Arc<ProgressChannel>>,
}

impl StatusPoller {
    pub fn new(client: ProcessingClient, config: PollConfig) -> Self {
        Self {
            client,
            config,
            progress: None,
        }
    }

    /// Attach a progress channel; each status report publishes a snapshot.
    pub fn with_progress(mut self, channel: Arc<ProgressChannel>) -> Self {
        self.progress = Some(channel);
        self
    }

    pub fn config(&self) -> &PollConfig {
        &self.config
    }

    /// Drive `job_id` to a terminal state.
    ///
    /// Returns the final [`JobStatus`] on completion (clips default to
    /// empty when the wire omits them). A failed job becomes
    /// [`ProcessingError::ProcessingFailed`] carrying the service's error
    /// text, or a generic message when it gives none.
    pub async fn poll_until_terminal(
        &self,
        job_id: &JobId,
        cancel: &CancellationToken,
    ) -> ProcessingResult<JobStatus> {
        let mut stage: Option<Stage> = None;
        let mut polls: u32 = 0;

        info!(job_id = %job_id, "Polling job until terminal");

        loop {
            if cancel.is_cancelled() {
                debug!(job_id = %job_id, polls, "Polling cancelled");
                return Err(ProcessingError::Cancelled);
            }

            let report = tokio::select! {
                _ = cancel.cancelled() => {
                    debug!(job_id = %job_id, polls, "Polling cancelled mid-fetch");
                    return Err(ProcessingError::Cancelled);
                }
                result = self
                    .client
                    .fetch_status_with_retry(job_id, &self.config.retry) => result?,
            };
            polls += 1;

            if let Some(message) = report.message.as_deref() {
                if let Some(next) = Stage::from_message(message) {
                    if stage != Some(next) {
                        debug!(job_id = %job_id, stage = %next, "Stage changed");
                    }
                    stage = Some(next);
                }
            }

            self.publish(job_id, &report, stage, polls);

            match report.state {
                JobState::Completed => {
                    info!(
                        job_id = %job_id,
                        clips = report.clips.len(),
                        polls,
                        "Job completed"
                    );
                    return Ok(report);
                }
                JobState::Failed => {
                    let reason = report
                        .error
                        .clone()
                        .unwrap_or_else(|| GENERIC_FAILURE.to_string());
                    warn!(job_id = %job_id, polls, "Job failed: {}", reason);
                    return Err(ProcessingError::ProcessingFailed(reason));
                }
                JobState::Pending | JobState::Processing => {}
            }

            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!(job_id = %job_id, polls, "Polling cancelled during wait");
                    return Err(ProcessingError::Cancelled);
                }
                _ = tokio::time::sleep(self.config.interval) => {}
            }
        }
    }

    fn publish(&self, job_id: &JobId, report: &JobStatus, stage: Option<Stage>, polls: u32) {
        if let Some(channel) = &self.progress {
            channel.publish(PollProgress {
                job_id: Some(job_id.clone()),
                state: report.state,
                stage,
                message: report.message.clone(),
                polls,
            });
        }
    }
}
