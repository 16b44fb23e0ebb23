//! Generated clip metadata.

use serde::{Deserialize, Serialize};

/// One generated clip as the processing service reports it.
///
/// Only `url` is guaranteed; older service builds omit the scoring and
/// timing fields entirely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clip {
    /// Clip URL, relative (`/clips/...`) or absolute
    pub url: String,

    /// Short description of the clip content
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Virality score from 0 to 10
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub viral_potential: Option<u8>,

    /// Suggested target platforms (free-form, e.g. "TikTok")
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub platforms: Vec<String>,

    /// Start offset in the source video, seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<f64>,

    /// End offset in the source video, seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<f64>,
}

impl Clip {
    /// Clip with only a URL, all metadata absent.
    pub fn from_url(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            description: None,
            viral_potential: None,
            platforms: Vec::new(),
            start_time: None,
            end_time: None,
        }
    }

    /// Clip duration in seconds, when both offsets are known.
    pub fn duration_secs(&self) -> Option<f64> {
        match (self.start_time, self.end_time) {
            (Some(start), Some(end)) if end >= start => Some(end - start),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_only_wire_body() {
        let clip: Clip = serde_json::from_str(r#"{"url": "/clips/1.mp4"}"#).unwrap();
        assert_eq!(clip.url, "/clips/1.mp4");
        assert!(clip.description.is_none());
        assert!(clip.platforms.is_empty());
        assert!(clip.duration_secs().is_none());
    }

    #[test]
    fn test_full_wire_body() {
        let clip: Clip = serde_json::from_str(
            r#"{
                "url": "/clips/2.mp4",
                "description": "Kicker moment",
                "viral_potential": 9,
                "platforms": ["TikTok", "Shorts"],
                "start_time": 12.5,
                "end_time": 44.0
            }"#,
        )
        .unwrap();
        assert_eq!(clip.viral_potential, Some(9));
        assert_eq!(clip.platforms.len(), 2);
        assert_eq!(clip.duration_secs(), Some(31.5));
    }

    #[test]
    fn test_serialize_skips_empty_metadata() {
        let json = serde_json::to_string(&Clip::from_url("/clips/3.mp4")).unwrap();
        assert_eq!(json, r#"{"url":"/clips/3.mp4"}"#);
    }
}
