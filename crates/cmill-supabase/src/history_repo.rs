//! Processing history in the `video_history` table.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use cmill_models::{Clip, PlanTier};

use crate::client::SupabaseClient;
use crate::error::SupabaseResult;

const TABLE: &str = "video_history";

/// Rows per history page.
pub const HISTORY_PAGE_SIZE: u32 = 10;

/// One completed processing run.
///
/// `subscription_tier` is a snapshot of the plan the run was billed
/// against, not a live reference; old rows without one read as free.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub user_id: String,
    /// Source video the run was started from.
    pub video_url: String,
    #[serde(default)]
    pub clips: Vec<Clip>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highlights_url: Option<String>,
    #[serde(default, deserialize_with = "cmill_models::plan::tier_or_free")]
    pub subscription_tier: PlanTier,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct HistoryRepository {
    client: SupabaseClient,
    user_id: String,
}

impl HistoryRepository {
    pub fn new(client: SupabaseClient, user_id: impl Into<String>) -> Self {
        Self {
            client,
            user_id: user_id.into(),
        }
    }

    /// Append a completed run to the history.
    pub async fn record(
        &self,
        video_url: &str,
        tier: PlanTier,
        clips: &[Clip],
        highlights_url: Option<&str>,
    ) -> SupabaseResult<HistoryEntry> {
        let entry = HistoryEntry {
            id: None,
            user_id: self.user_id.clone(),
            video_url: video_url.to_string(),
            clips: clips.to_vec(),
            highlights_url: highlights_url.map(|s| s.to_string()),
            subscription_tier: tier,
            created_at: Utc::now(),
        };
        self.client.insert(TABLE, &entry).await
    }

    /// One page of history, newest first. Pages are zero-based.
    pub async fn recent(&self, page: u32) -> SupabaseResult<Vec<HistoryEntry>> {
        let offset = page * HISTORY_PAGE_SIZE;
        self.client
            .with_retry("history_fetch", || async {
                self.client
                    .select_list(
                        TABLE,
                        &[("user_id", self.user_id.as_str())],
                        Some("created_at.desc"),
                        Some(HISTORY_PAGE_SIZE),
                        Some(offset),
                    )
                    .await
            })
            .await
    }
}
