//! Job identifiers and status reports from the processing service.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::Clip;

/// Unique identifier for a processing job.
///
/// Issued by the processing service on submission and carried verbatim;
/// the client never inspects or validates its shape.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(pub String);

impl JobId {
    /// Create from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for JobId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for JobId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Job state as reported by the status endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    /// Job accepted, not yet picked up
    #[default]
    Pending,
    /// Job is being processed
    Processing,
    /// Job completed successfully
    Completed,
    /// Job failed
    Failed,
}

impl JobState {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobState::Pending => "pending",
            JobState::Processing => "processing",
            JobState::Completed => "completed",
            JobState::Failed => "failed",
        }
    }

    /// Whether this state ends the polling loop.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Completed | JobState::Failed)
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One response from `GET /status/{jobId}`.
///
/// The service omits `clips` and `highlights` until completion and only
/// sets `error` on failure, so everything past `state` is defaulted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobStatus {
    /// Current job state
    pub state: JobState,

    /// Free-text progress message (e.g. "Processing clip 2/5")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Generated clips; present only once the job completes
    #[serde(default)]
    pub clips: Vec<Clip>,

    /// Highlights reel URL; present only once the job completes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highlights: Option<String>,

    /// Failure reason; present only when the job failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl JobStatus {
    /// Status report with just a state, everything else empty.
    pub fn new(state: JobState) -> Self {
        Self {
            state,
            message: None,
            clips: Vec::new(),
            highlights: None,
            error: None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }
}
