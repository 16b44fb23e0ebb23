//! Video service: the submission gate and the submit-to-results flow.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use cmill_models::{JobId, JobStatus, PlanTier, ProcessingOptions, UsageSummary};
use cmill_supabase::{
    HistoryEntry, HistoryRepository, SavedResults, SubscriptionRepository, UsageRepository,
    VideoResultsRepository,
};

use crate::error::{AppError, AppResult};
use crate::state::AppState;

#[derive(Clone)]
pub struct VideoService {
    state: Arc<AppState>,
}

impl VideoService {
    pub fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }

    /// Fresh usage-vs-limit check.
    ///
    /// Tier and count are re-fetched on every call; cached values are
    /// never trusted for gating, and a read failure blocks submission
    /// rather than waving it through. The check and the later increment
    /// are separate requests, so two submissions racing each other can
    /// both pass; closing that window needs an idempotent server-side
    /// counter keyed by job id, which the store does not have yet.
    pub async fn check_limit(&self) -> AppResult<UsageSummary> {
        let session = self.state.require_session().await?;

        let subscription =
            SubscriptionRepository::new(self.state.supabase.clone(), &session.user_id)
                .fetch()
                .await
                .map_err(AppError::UsageFetchFailed)?
                .unwrap_or_default();

        let used = UsageRepository::new(self.state.supabase.clone(), &session.user_id)
            .monthly_count()
            .await
            .map_err(AppError::UsageFetchFailed)?;

        let summary = UsageSummary::new(
            subscription.tier,
            used,
            self.state.plans.clip_limit(subscription.tier),
        );
        self.state.cache_usage(summary).await;
        Ok(summary)
    }

    /// Increment the monthly counter after a completed job.
    pub async fn record_usage(&self) -> AppResult<u32> {
        let session = self.state.require_session().await?;
        UsageRepository::new(self.state.supabase.clone(), &session.user_id)
            .increment()
            .await
            .map_err(AppError::UsageWriteFailed)
    }

    /// Submit a video and drive it to its terminal state.
    ///
    /// Order matters here: the gate runs before the submission request,
    /// so a blocked user causes no traffic to the processing service,
    /// and the counter is incremented only after the job completes.
    /// Persistence and counting failures after completion are logged and
    /// never discard the finished result.
    pub async fn process(
        &self,
        url: &str,
        options: ProcessingOptions,
        cancel: &CancellationToken,
    ) -> AppResult<JobStatus> {
        let session = self.state.require_session().await?;

        if url.trim().is_empty() {
            return Err(AppError::invalid_input("video url must not be empty"));
        }

        let summary = self.check_limit().await?;
        if summary.at_limit() {
            info!(
                user_id = %session.user_id,
                used = summary.used,
                limit = summary.limit,
                "Submission blocked by plan limit"
            );
            return Err(AppError::UsageLimitReached {
                used: summary.used,
                limit: summary.limit,
                tier: summary.tier,
            });
        }

        let options = options.with_user(&session.user_id);
        let job_id = self.state.processing.submit(url, &options).await?;
        info!(job_id = %job_id, user_id = %session.user_id, "Job submitted");

        let status = self
            .state
            .poller
            .poll_until_terminal(&job_id, cancel)
            .await?;

        self.persist_results(&session.user_id, url, summary.tier, &status)
            .await;

        match self.record_usage().await {
            Ok(count) => info!(user_id = %session.user_id, count, "Usage recorded"),
            // The user's clips beat the bookkeeping.
            Err(e) => warn!(user_id = %session.user_id, "Failed to record usage: {}", e),
        }

        Ok(status)
    }

    /// Re-attach to a job submitted elsewhere and poll it to terminal.
    ///
    /// No gating and no counting: whoever submitted the job owns the
    /// bookkeeping.
    pub async fn poll_existing(
        &self,
        job_id: &JobId,
        cancel: &CancellationToken,
    ) -> AppResult<JobStatus> {
        self.state.require_session().await?;
        let status = self
            .state
            .poller
            .poll_until_terminal(job_id, cancel)
            .await?;
        Ok(status)
    }

    /// Saved results from the latest completed run, if any.
    pub async fn saved_results(&self) -> AppResult<Option<SavedResults>> {
        let session = self.state.require_session().await?;
        let results = VideoResultsRepository::new(self.state.supabase.clone(), &session.user_id)
            .load()
            .await?;
        Ok(results)
    }

    /// Delete the saved results.
    pub async fn clear_results(&self) -> AppResult<()> {
        let session = self.state.require_session().await?;
        VideoResultsRepository::new(self.state.supabase.clone(), &session.user_id)
            .clear()
            .await?;
        Ok(())
    }

    /// One page of processing history, newest first.
    pub async fn history(&self, page: u32) -> AppResult<Vec<HistoryEntry>> {
        let session = self.state.require_session().await?;
        let entries = HistoryRepository::new(self.state.supabase.clone(), &session.user_id)
            .recent(page)
            .await?;
        Ok(entries)
    }

    async fn persist_results(
        &self,
        user_id: &str,
        video_url: &str,
        tier: PlanTier,
        status: &JobStatus,
    ) {
        let results = VideoResultsRepository::new(self.state.supabase.clone(), user_id);
        if let Err(e) = results
            .save(&status.clips, status.highlights.as_deref())
            .await
        {
            warn!(user_id, "Failed to save results: {}", e);
        }

        let history = HistoryRepository::new(self.state.supabase.clone(), user_id);
        if let Err(e) = history
            .record(video_url, tier, &status.clips, status.highlights.as_deref())
            .await
        {
            warn!(user_id, "Failed to record history: {}", e);
        }
    }
}
