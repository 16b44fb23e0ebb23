//! Social post types for the composer and scheduler.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Platforms a post can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SocialPlatform {
    Twitter,
    Facebook,
    Instagram,
    Linkedin,
    Youtube,
}

impl SocialPlatform {
    /// Parse from string (case-insensitive).
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "twitter" => Some(SocialPlatform::Twitter),
            "facebook" => Some(SocialPlatform::Facebook),
            "instagram" => Some(SocialPlatform::Instagram),
            "linkedin" => Some(SocialPlatform::Linkedin),
            "youtube" => Some(SocialPlatform::Youtube),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SocialPlatform::Twitter => "twitter",
            SocialPlatform::Facebook => "facebook",
            SocialPlatform::Instagram => "instagram",
            SocialPlatform::Linkedin => "linkedin",
            SocialPlatform::Youtube => "youtube",
        }
    }

    /// Content length cap enforced at compose time.
    pub fn content_limit(&self) -> usize {
        match self {
            SocialPlatform::Twitter => 280,
            _ => 2200,
        }
    }
}

impl std::fmt::Display for SocialPlatform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A composed post ready to publish.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostDraft {
    /// Post text.
    pub content: String,
    /// Attached media paths or URLs.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub media: Vec<String>,
    /// Target platforms, at least one.
    pub platforms: Vec<SocialPlatform>,
}

/// A post queued for a future publish time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledPost {
    pub id: String,
    pub title: String,
    pub platform: SocialPlatform,
    pub scheduled_for: DateTime<Utc>,
}

impl ScheduledPost {
    pub fn new(
        title: impl Into<String>,
        platform: SocialPlatform,
        scheduled_for: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: title.into(),
            platform,
            scheduled_for,
        }
    }

    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.scheduled_for <= now
    }
}
