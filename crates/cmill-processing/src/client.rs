//! Processing service HTTP client.

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use cmill_models::{JobId, JobStatus, ProcessingOptions};

use crate::config::{ProcessingConfig, RetryPolicy};
use crate::error::{ProcessingError, ProcessingResult};

/// Request body for `POST /process-video`.
#[derive(Debug, Serialize)]
struct SubmitRequest<'a> {
    url: &'a str,
    #[serde(flatten)]
    options: &'a ProcessingOptions,
}

/// Response body for `POST /process-video`.
#[derive(Debug, Deserialize)]
struct SubmitResponse {
    #[serde(rename = "jobId", default)]
    job_id: Option<String>,
}

/// Client for the clip processing service.
#[derive(Debug, Clone)]
pub struct ProcessingClient {
    http: Client,
    config: ProcessingConfig,
}

impl ProcessingClient {
    /// Create a new processing client.
    pub fn new(config: ProcessingConfig) -> ProcessingResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(concat!("cmill-processing/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(ProcessingError::Network)?;

        Ok(Self { http, config })
    }

    /// Create from environment variables.
    pub fn from_env() -> ProcessingResult<Self> {
        Self::new(ProcessingConfig::from_env())
    }

    pub fn config(&self) -> &ProcessingConfig {
        &self.config
    }

    /// Submit a video for processing and return the service-issued job id.
    ///
    /// The id is passed through verbatim; nothing about its shape is
    /// checked. Url validation beyond what the service enforces is the
    /// caller's concern.
    pub async fn submit(
        &self,
        url: &str,
        options: &ProcessingOptions,
    ) -> ProcessingResult<JobId> {
        let endpoint = format!("{}/process-video", self.config.base_url);

        debug!(url, "Submitting video for processing");

        let response = self
            .http
            .post(&endpoint)
            .json(&SubmitRequest { url, options })
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if !status.is_success() {
            return Err(ProcessingError::SubmissionFailed(format!(
                "service returned {}: {}",
                status, body
            )));
        }

        let parsed: SubmitResponse = serde_json::from_str(&body)?;
        match parsed.job_id {
            Some(id) if !id.is_empty() => Ok(JobId::from_string(id)),
            _ => Err(ProcessingError::SubmissionFailed(
                "service accepted the request but returned no job id".to_string(),
            )),
        }
    }

    /// Fetch the current status of a job.
    ///
    /// HTTP 500 means the service broke on this job and maps straight to
    /// [`ProcessingError::InternalError`]; other error statuses map to the
    /// retryable [`ProcessingError::RequestFailed`]. Media URLs in the
    /// report are rewritten against the configured origin before returning.
    pub async fn fetch_status(&self, job_id: &JobId) -> ProcessingResult<JobStatus> {
        let endpoint = format!("{}/status/{}", self.config.base_url, job_id);

        let response = self.http.get(&endpoint).send().await?;
        let status = response.status();

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            let body = response.text().await.unwrap_or_default();
            let detail = if body.is_empty() {
                "processing service returned 500".to_string()
            } else {
                body
            };
            return Err(ProcessingError::InternalError(detail));
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProcessingError::RequestFailed(format!(
                "service returned {}: {}",
                status, body
            )));
        }

        let mut report: JobStatus = response.json().await?;
        self.rewrite_media_urls(&mut report);
        Ok(report)
    }

    /// Fetch status with bounded, linearly backed-off retries.
    ///
    /// Up to `policy.max_attempts` requests; after failed attempt n the
    /// wait is `backoff_step * n`. Non-retryable errors propagate
    /// immediately; when every attempt fails the last error comes back
    /// wrapped in [`ProcessingError::RetryExhausted`]. No further request
    /// is made once attempts run out.
    pub async fn fetch_status_with_retry(
        &self,
        job_id: &JobId,
        policy: &RetryPolicy,
    ) -> ProcessingResult<JobStatus> {
        let mut last_error = None;

        for attempt in 1..=policy.max_attempts {
            match self.fetch_status(job_id).await {
                Ok(report) => return Ok(report),
                Err(e) if e.is_retryable() => {
                    if attempt < policy.max_attempts {
                        let delay = policy.delay_for_attempt(attempt);
                        warn!(
                            job_id = %job_id,
                            attempt,
                            "Status fetch failed, retrying in {:?}: {}",
                            delay,
                            e
                        );
                        tokio::time::sleep(delay).await;
                    }
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(ProcessingError::RetryExhausted {
            attempts: policy.max_attempts,
            last: Box::new(last_error.unwrap_or_else(|| {
                ProcessingError::RequestFailed("no status attempt was made".to_string())
            })),
        })
    }

    /// Prefix relative media URLs with the configured origin.
    fn rewrite_media_urls(&self, report: &mut JobStatus) {
        for clip in &mut report.clips {
            clip.url = absolutize(&self.config.media_origin, &clip.url);
        }
        if let Some(highlights) = report.highlights.take() {
            report.highlights = Some(absolutize(&self.config.media_origin, &highlights));
        }
    }
}

/// Resolve a possibly-relative media path against an origin.
///
/// Anything already starting with `http` passes through untouched; other
/// paths get the origin prepended, inserting a `/` when the path lacks one.
fn absolutize(origin: &str, path: &str) -> String {
    if path.starts_with("http") {
        return path.to_string();
    }
    if path.starts_with('/') {
        format!("{}{}", origin, path)
    } else {
        format!("{}/{}", origin, path)
    }
}
