//! Submission options for a processing run.

use serde::{Deserialize, Serialize};

/// Options sent alongside the video URL on submission.
///
/// Field names mirror the service's request schema, which mixes camelCase
/// flags with a snake_case `user_id` (historical accident, load-bearing).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessingOptions {
    /// Use the video transcript to guide clip selection
    #[serde(rename = "useTranscript")]
    pub use_transcript: bool,

    /// Run scene detection to find cut points
    #[serde(rename = "detectScenes")]
    pub detect_scenes: bool,

    /// Apply quality enhancement to output clips
    #[serde(rename = "enhanceQuality")]
    pub enhance_quality: bool,

    /// Submitting user, when a session exists
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

impl Default for ProcessingOptions {
    fn default() -> Self {
        Self {
            use_transcript: true,
            detect_scenes: true,
            enhance_quality: false,
            user_id: None,
        }
    }
}

impl ProcessingOptions {
    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let opts = ProcessingOptions::default();
        assert!(opts.use_transcript);
        assert!(opts.detect_scenes);
        assert!(!opts.enhance_quality);
        assert!(opts.user_id.is_none());
    }

    #[test]
    fn test_wire_field_names() {
        let opts = ProcessingOptions::default().with_user("user-1");
        let json = serde_json::to_value(&opts).unwrap();
        assert_eq!(json["useTranscript"], true);
        assert_eq!(json["detectScenes"], true);
        assert_eq!(json["enhanceQuality"], false);
        assert_eq!(json["user_id"], "user-1");
    }

    #[test]
    fn test_user_id_omitted_when_anonymous() {
        let json = serde_json::to_string(&ProcessingOptions::default()).unwrap();
        assert!(!json.contains("user_id"));
    }
}
