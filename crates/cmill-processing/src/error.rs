//! Processing client error types.

use thiserror::Error;

pub type ProcessingResult<T> = Result<T, ProcessingError>;

#[derive(Debug, Error)]
pub enum ProcessingError {
    /// Submission rejected, or the accepted response carried no job id.
    #[error("Submission failed: {0}")]
    SubmissionFailed(String),

    /// Status endpoint returned a non-500 error status.
    #[error("Status request failed: {0}")]
    RequestFailed(String),

    /// Status endpoint returned HTTP 500. Terminal, never retried.
    #[error("Processing service error: {0}")]
    InternalError(String),

    /// The job itself finished in the failed state.
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),

    /// One status fetch used up every retry attempt.
    #[error("Status retries exhausted after {attempts} attempts: {last}")]
    RetryExhausted {
        attempts: u32,
        last: Box<ProcessingError>,
    },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The caller cancelled the polling loop.
    #[error("Polling cancelled")]
    Cancelled,
}

impl ProcessingError {
    /// Whether another status attempt could succeed.
    ///
    /// Transport failures and transient HTTP errors retry; a 500 means the
    /// service itself broke on this job and repeating the request only
    /// hammers it.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ProcessingError::RequestFailed(_) | ProcessingError::Network(_)
        )
    }
}
