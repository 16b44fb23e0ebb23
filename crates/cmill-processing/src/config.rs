//! Client and poller configuration.

use std::time::Duration;

/// Configuration for the processing-service client.
#[derive(Debug, Clone)]
pub struct ProcessingConfig {
    /// Base URL of the processing service
    pub base_url: String,
    /// Origin prefixed onto relative media URLs in status responses
    pub media_origin: String,
    /// Request timeout
    pub timeout: Duration,
    /// Connect timeout
    pub connect_timeout: Duration,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        let base_url = "http://localhost:8000".to_string();
        Self {
            media_origin: base_url.clone(),
            base_url,
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

impl ProcessingConfig {
    /// Create config from environment variables.
    ///
    /// `CMILL_MEDIA_ORIGIN` defaults to the service URL; a separate origin
    /// only matters when clips are served from a different host than the
    /// API (e.g. a tunnel in front of the service).
    pub fn from_env() -> Self {
        let base_url = trim_origin(
            std::env::var("CMILL_PROCESSING_URL")
                .unwrap_or_else(|_| "http://localhost:8000".to_string()),
        );
        Self {
            media_origin: std::env::var("CMILL_MEDIA_ORIGIN")
                .map(trim_origin)
                .unwrap_or_else(|_| base_url.clone()),
            base_url,
            timeout: Duration::from_secs(env_u64("CMILL_PROCESSING_TIMEOUT_SECS", 30)),
            connect_timeout: Duration::from_secs(env_u64("CMILL_CONNECT_TIMEOUT_SECS", 10)),
        }
    }
}

/// Retry policy for a single status fetch: bounded attempts with a wait
/// that grows linearly per failed attempt (1x, 2x, ...).
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, counting the first request
    pub max_attempts: u32,
    /// The wait after failed attempt n is `backoff_step * n`
    pub backoff_step: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_step: Duration::from_millis(1000),
        }
    }
}

impl RetryPolicy {
    /// Wait before the retry that follows failed attempt `attempt` (1-based).
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        self.backoff_step * attempt
    }
}

/// Configuration for the polling loop.
#[derive(Debug, Clone)]
pub struct PollConfig {
    /// Pause between status requests while the job is in flight
    pub interval: Duration,
    /// Retry policy applied to each individual status fetch
    pub retry: RetryPolicy,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(2000),
            retry: RetryPolicy::default(),
        }
    }
}

impl PollConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            interval: Duration::from_millis(env_u64("CMILL_POLL_INTERVAL_MS", 2000)),
            retry: RetryPolicy {
                max_attempts: std::env::var("CMILL_STATUS_RETRIES")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(3),
                backoff_step: Duration::from_millis(env_u64("CMILL_STATUS_BACKOFF_MS", 1000)),
            },
        }
    }
}

fn env_u64(name: &str, default: u64) -> u64 {
    std::env::var(name)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

fn trim_origin(mut origin: String) -> String {
    while origin.ends_with('/') {
        origin.pop();
    }
    origin
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = ProcessingConfig::default();
        assert_eq!(config.base_url, "http://localhost:8000");
        assert_eq!(config.media_origin, config.base_url);
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_retry_delays_grow_linearly() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for_attempt(1), Duration::from_millis(1000));
        assert_eq!(policy.delay_for_attempt(2), Duration::from_millis(2000));
    }

    #[test]
    fn test_poll_defaults() {
        let config = PollConfig::default();
        assert_eq!(config.interval, Duration::from_millis(2000));
        assert_eq!(config.retry.max_attempts, 3);
    }

    #[test]
    fn test_trim_origin() {
        assert_eq!(trim_origin("http://x/".to_string()), "http://x");
        assert_eq!(trim_origin("http://x//".to_string()), "http://x");
        assert_eq!(trim_origin("http://x".to_string()), "http://x");
    }
}
