use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use cmill_models::{JobId, JobState, Stage};
use cmill_processing::{
    PollConfig, ProcessingClient, ProcessingConfig, ProcessingError, ProgressChannel, RetryPolicy,
    StatusPoller,
};

fn fast_poller(server: &MockServer) -> StatusPoller {
    let client = ProcessingClient::new(ProcessingConfig {
        base_url: server.uri(),
        media_origin: server.uri(),
        ..ProcessingConfig::default()
    })
    .expect("client builds");
    StatusPoller::new(
        client,
        PollConfig {
            interval: Duration::from_millis(10),
            retry: RetryPolicy {
                max_attempts: 3,
                backoff_step: Duration::from_millis(5),
            },
        },
    )
}

#[tokio::test]
async fn poller_runs_to_completion_and_tracks_stages() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/status/j1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "state": "processing",
            "message": "Starting video download"
        })))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/status/j1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "state": "processing",
            "message": "Processing clip 1/2"
        })))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    // Final report has no recognizable message: the stage must stick.
    Mock::given(method("GET"))
        .and(path("/status/j1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "state": "completed",
            "clips": [{"url": "/clips/1.mp4"}, {"url": "/clips/2.mp4"}],
            "highlights": "/highlights/reel.mp4"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let channel = Arc::new(ProgressChannel::new());
    let poller = fast_poller(&server).with_progress(channel.clone());
    let report = poller
        .poll_until_terminal(&JobId::from_string("j1"), &CancellationToken::new())
        .await
        .expect("job completes");

    assert_eq!(report.state, JobState::Completed);
    assert_eq!(report.clips.len(), 2);

    let latest = channel.latest();
    assert_eq!(latest.polls, 3);
    assert_eq!(latest.state, JobState::Completed);
    assert_eq!(latest.stage, Some(Stage::Creating));
}

#[tokio::test]
async fn poller_completion_without_clips_yields_empty_vec() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/status/j1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "state": "completed"
        })))
        .mount(&server)
        .await;

    let poller = fast_poller(&server);
    let report = poller
        .poll_until_terminal(&JobId::from_string("j1"), &CancellationToken::new())
        .await
        .expect("job completes");
    assert!(report.clips.is_empty());
    assert!(report.highlights.is_none());
}

#[tokio::test]
async fn poller_failure_carries_wire_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/status/j1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "state": "failed",
            "error": "bad format"
        })))
        .mount(&server)
        .await;

    let poller = fast_poller(&server);
    let err = poller
        .poll_until_terminal(&JobId::from_string("j1"), &CancellationToken::new())
        .await
        .unwrap_err();
    match err {
        ProcessingError::ProcessingFailed(reason) => assert_eq!(reason, "bad format"),
        other => panic!("expected ProcessingFailed, got {other:?}"),
    }
}

#[tokio::test]
async fn poller_failure_without_reason_gets_generic_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/status/j1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "state": "failed"
        })))
        .mount(&server)
        .await;

    let poller = fast_poller(&server);
    let err = poller
        .poll_until_terminal(&JobId::from_string("j1"), &CancellationToken::new())
        .await
        .unwrap_err();
    match err {
        ProcessingError::ProcessingFailed(reason) => {
            assert_eq!(reason, "An error occurred while processing the video");
        }
        other => panic!("expected ProcessingFailed, got {other:?}"),
    }
}

#[tokio::test]
async fn poller_keeps_polling_perpetual_job_until_cancelled() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/status/j1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "state": "processing",
            "message": "Analyzing video content"
        })))
        .mount(&server)
        .await;

    let poller = fast_poller(&server);
    let cancel = CancellationToken::new();
    let stop = cancel.clone();
    let handle = tokio::spawn(async move {
        poller
            .poll_until_terminal(&JobId::from_string("j1"), &stop)
            .await
    });

    tokio::time::sleep(Duration::from_millis(60)).await;
    cancel.cancel();
    let err = handle.await.expect("task joins").unwrap_err();
    assert!(matches!(err, ProcessingError::Cancelled));

    // The job never went terminal, so the poller must have kept asking.
    let requests = server.received_requests().await.unwrap_or_default();
    assert!(requests.len() >= 2, "saw {} requests", requests.len());
}

#[tokio::test]
async fn poller_checks_cancellation_before_first_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/status/j1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "state": "processing"
        })))
        .expect(0)
        .mount(&server)
        .await;

    let poller = fast_poller(&server);
    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = poller
        .poll_until_terminal(&JobId::from_string("j1"), &cancel)
        .await
        .unwrap_err();
    assert!(matches!(err, ProcessingError::Cancelled));
}

#[tokio::test]
async fn poller_propagates_retry_exhaustion() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/status/j1"))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&server)
        .await;

    let poller = fast_poller(&server);
    let err = poller
        .poll_until_terminal(&JobId::from_string("j1"), &CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(err, ProcessingError::RetryExhausted { attempts: 3, .. }));
}
