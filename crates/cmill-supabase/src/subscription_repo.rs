//! Subscription state in the `users` table.

use serde::Serialize;
use tracing::debug;

use cmill_models::{Subscription, SubscriptionStatus};

use crate::client::SupabaseClient;
use crate::error::SupabaseResult;

const TABLE: &str = "users";

#[derive(Debug, Serialize)]
struct StatusPatch {
    subscription_status: SubscriptionStatus,
}

/// One user's subscription row.
#[derive(Clone)]
pub struct SubscriptionRepository {
    client: SupabaseClient,
    user_id: String,
}

impl SubscriptionRepository {
    pub fn new(client: SupabaseClient, user_id: impl Into<String>) -> Self {
        Self {
            client,
            user_id: user_id.into(),
        }
    }

    /// The user's subscription, if a row exists.
    ///
    /// A missing row means the user predates billing; callers fall back to
    /// the default free/active subscription.
    pub async fn fetch(&self) -> SupabaseResult<Option<Subscription>> {
        self.client
            .with_retry("subscription_fetch", || async {
                self.client
                    .select_one(TABLE, &[("id", self.user_id.as_str())])
                    .await
            })
            .await
    }

    /// Mark the subscription canceled.
    ///
    /// The tier is left untouched; the billing webhook downgrades it when
    /// the paid period actually ends.
    pub async fn set_canceled(&self) -> SupabaseResult<()> {
        let updated: Vec<Subscription> = self
            .client
            .update(
                TABLE,
                &[("id", self.user_id.as_str())],
                &StatusPatch {
                    subscription_status: SubscriptionStatus::Canceled,
                },
            )
            .await?;

        if updated.is_empty() {
            debug!(user_id = %self.user_id, "No subscription row to cancel");
        }
        Ok(())
    }
}
