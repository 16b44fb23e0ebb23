//! HTTP client and polling loop for the ClipMill processing service.
//!
//! The service exposes two endpoints the client cares about:
//! `POST /process-video` (submit, returns a job id) and
//! `GET /status/{jobId}` (free-text progress plus results on completion).
//! This crate wraps both behind typed calls, bounds status failures with
//! a linear-backoff retry, and drives jobs to a terminal state with an
//! explicit, cancelable polling loop.

pub mod client;
pub mod config;
pub mod error;
pub mod poller;
pub mod progress;

pub use client::ProcessingClient;
pub use config::{PollConfig, ProcessingConfig, RetryPolicy};
pub use error::{ProcessingError, ProcessingResult};
pub use poller::StatusPoller;
pub use progress::{PollProgress, ProgressChannel};
