//! In-process progress snapshots for polling runs.

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use cmill_models::{JobId, JobState, Stage};

/// Latest-value snapshot of one polling run.
///
/// `stage` is sticky: it keeps the last recognized stage when a status
/// message matches nothing in the stage table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PollProgress {
    /// Job being polled, absent before the first report
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_id: Option<JobId>,
    /// Last reported state
    #[serde(default)]
    pub state: JobState,
    /// Last recognized coarse stage
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage: Option<Stage>,
    /// Last free-text status message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Status reports seen so far
    #[serde(default)]
    pub polls: u32,
}

/// Publish side of a watch channel carrying [`PollProgress`] snapshots.
///
/// Subscribers always observe the latest value; there is no backlog to
/// drain and publishing never blocks.
pub struct ProgressChannel {
    tx: watch::Sender<PollProgress>,
}

impl ProgressChannel {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(PollProgress::default());
        Self { tx }
    }

    /// Subscribe to snapshots.
    pub fn subscribe(&self) -> watch::Receiver<PollProgress> {
        self.tx.subscribe()
    }

    /// Publish a snapshot. Succeeds with or without active subscribers.
    pub fn publish(&self, progress: PollProgress) {
        self.tx.send_replace(progress);
    }

    /// Latest published snapshot.
    pub fn latest(&self) -> PollProgress {
        self.tx.borrow().clone()
    }
}

impl Default for ProgressChannel {
    fn default() -> Self {
        Self::new()
    }
}
