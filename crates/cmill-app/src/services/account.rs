//! Account service: subscription and usage reads for the signed-in user.

use std::sync::Arc;

use chrono::{Datelike, NaiveDate, Utc};
use tracing::info;

use cmill_models::{Subscription, UsageSummary};
use cmill_supabase::{SubscriptionRepository, UsageRepository};

use crate::error::{AppError, AppResult};
use crate::state::AppState;

#[derive(Clone)]
pub struct AccountService {
    state: Arc<AppState>,
}

impl AccountService {
    pub fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }

    /// The user's subscription, defaulting to free/active when no row
    /// exists. The result is cached in state for display.
    pub async fn subscription(&self) -> AppResult<Subscription> {
        let session = self.state.require_session().await?;
        let repo = SubscriptionRepository::new(self.state.supabase.clone(), &session.user_id);

        let subscription = repo.fetch().await?.unwrap_or_default();
        self.state.cache_subscription(subscription.clone()).await;
        Ok(subscription)
    }

    /// Usage against the plan limit, for display.
    pub async fn usage(&self) -> AppResult<UsageSummary> {
        let session = self.state.require_session().await?;
        let tier = self.subscription().await?.tier;

        let used = UsageRepository::new(self.state.supabase.clone(), &session.user_id)
            .monthly_count()
            .await
            .map_err(AppError::UsageFetchFailed)?;

        let summary = UsageSummary::new(tier, used, self.state.plans.clip_limit(tier));
        self.state.cache_usage(summary).await;
        Ok(summary)
    }

    /// First day of the next month, when the counter is expected to reset.
    ///
    /// Display-only date math; the actual reset happens server-side.
    pub fn renewal_hint(&self) -> NaiveDate {
        renewal_date(Utc::now().date_naive())
    }

    /// Mark the subscription canceled and return the refreshed view.
    ///
    /// The tier keeps its value; the billing backend downgrades it when
    /// the paid period ends.
    pub async fn cancel_subscription(&self) -> AppResult<Subscription> {
        let session = self.state.require_session().await?;
        let repo = SubscriptionRepository::new(self.state.supabase.clone(), &session.user_id);

        repo.set_canceled().await?;
        info!(user_id = %session.user_id, "Subscription canceled");

        self.subscription().await
    }
}

fn renewal_date(today: NaiveDate) -> NaiveDate {
    let (year, month) = if today.month() == 12 {
        (today.year() + 1, 1)
    } else {
        (today.year(), today.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(today)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_renewal_date_mid_year() {
        let today = NaiveDate::from_ymd_opt(2025, 6, 15).unwrap();
        assert_eq!(
            renewal_date(today),
            NaiveDate::from_ymd_opt(2025, 7, 1).unwrap()
        );
    }

    #[test]
    fn test_renewal_date_wraps_december() {
        let today = NaiveDate::from_ymd_opt(2025, 12, 31).unwrap();
        assert_eq!(
            renewal_date(today),
            NaiveDate::from_ymd_opt(2026, 1, 1).unwrap()
        );
    }

    #[test]
    fn test_renewal_date_first_of_month() {
        // Already on the first: still points at next month.
        let today = NaiveDate::from_ymd_opt(2025, 2, 1).unwrap();
        assert_eq!(
            renewal_date(today),
            NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()
        );
    }
}
