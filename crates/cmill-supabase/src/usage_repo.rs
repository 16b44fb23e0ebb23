//! Monthly usage counters in the `user_usage` table.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use cmill_models::UsageCounter;

use crate::client::SupabaseClient;
use crate::error::SupabaseResult;

const TABLE: &str = "user_usage";

#[derive(Debug, Serialize)]
struct NewUsageRow<'a> {
    user_id: &'a str,
    monthly_count: u32,
    last_updated: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
struct CountPatch {
    monthly_count: u32,
    last_updated: DateTime<Utc>,
}

/// One user's monthly usage counter.
#[derive(Clone)]
pub struct UsageRepository {
    client: SupabaseClient,
    user_id: String,
}

impl UsageRepository {
    pub fn new(client: SupabaseClient, user_id: impl Into<String>) -> Self {
        Self {
            client,
            user_id: user_id.into(),
        }
    }

    /// Clips generated this month. A user with no row has used 0.
    pub async fn monthly_count(&self) -> SupabaseResult<u32> {
        let row: Option<UsageCounter> = self
            .client
            .with_retry("usage_fetch", || async {
                self.client
                    .select_one(TABLE, &[("user_id", self.user_id.as_str())])
                    .await
            })
            .await?;

        Ok(row.map(|r| r.monthly_count).unwrap_or(0))
    }

    /// Bump the counter by one, creating the row on first use, and return
    /// the new count.
    ///
    /// This is read-modify-write, not an atomic increment: two clients
    /// finishing at the same moment can both read N and both store N+1,
    /// losing one bump. Closing that window needs a server-side increment
    /// (an RPC or a DB trigger); the counter is advisory until then.
    pub async fn increment(&self) -> SupabaseResult<u32> {
        let existing: Option<UsageCounter> = self
            .client
            .select_one(TABLE, &[("user_id", self.user_id.as_str())])
            .await?;

        match existing {
            Some(row) => {
                let next = row.monthly_count + 1;
                let _updated: Vec<UsageCounter> = self
                    .client
                    .update(
                        TABLE,
                        &[("user_id", self.user_id.as_str())],
                        &CountPatch {
                            monthly_count: next,
                            last_updated: Utc::now(),
                        },
                    )
                    .await?;
                debug!(user_id = %self.user_id, count = next, "Usage counter incremented");
                Ok(next)
            }
            None => {
                let created: UsageCounter = self
                    .client
                    .insert(
                        TABLE,
                        &NewUsageRow {
                            user_id: &self.user_id,
                            monthly_count: 1,
                            last_updated: Utc::now(),
                        },
                    )
                    .await?;
                debug!(user_id = %self.user_id, "Usage row created");
                Ok(created.monthly_count)
            }
        }
    }
}
