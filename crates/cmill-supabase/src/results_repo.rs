//! Current video results in the `video_results` table.
//!
//! One row per user holding the clips from their latest completed run, so
//! a fresh session can restore them without reprocessing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use cmill_models::Clip;

use crate::client::SupabaseClient;
use crate::error::SupabaseResult;

const TABLE: &str = "video_results";

/// A user's saved result set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedResults {
    pub user_id: String,
    #[serde(default)]
    pub clips: Vec<Clip>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highlights_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct VideoResultsRepository {
    client: SupabaseClient,
    user_id: String,
}

impl VideoResultsRepository {
    pub fn new(client: SupabaseClient, user_id: impl Into<String>) -> Self {
        Self {
            client,
            user_id: user_id.into(),
        }
    }

    /// Store the latest run's results, replacing any previous row.
    pub async fn save(
        &self,
        clips: &[Clip],
        highlights_url: Option<&str>,
    ) -> SupabaseResult<SavedResults> {
        let now = Utc::now();
        let row = SavedResults {
            user_id: self.user_id.clone(),
            clips: clips.to_vec(),
            highlights_url: highlights_url.map(|s| s.to_string()),
            created_at: now,
            updated_at: now,
        };
        self.client.upsert(TABLE, "user_id", &row).await
    }

    /// Restore saved results. No row means nothing saved.
    pub async fn load(&self) -> SupabaseResult<Option<SavedResults>> {
        self.client
            .with_retry("results_load", || async {
                self.client
                    .select_one(TABLE, &[("user_id", self.user_id.as_str())])
                    .await
            })
            .await
    }

    /// Delete the saved results, so a dismissed run stays dismissed across
    /// sessions.
    pub async fn clear(&self) -> SupabaseResult<()> {
        self.client
            .delete(TABLE, &[("user_id", self.user_id.as_str())])
            .await
    }
}
