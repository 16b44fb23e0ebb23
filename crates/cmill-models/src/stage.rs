//! Coarse processing stages derived from free-text status messages.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The four user-visible phases of a processing run.
///
/// The status endpoint reports progress as free text, so stages are
/// recovered by substring matching against known message prefixes. The
/// match table is a compatibility shim with the service's wording; a
/// message that matches nothing maps to `None` and callers keep whatever
/// stage they last saw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Downloading and preparing the source video
    Preparing,
    /// Analyzing content and generating clip ideas
    Generating,
    /// Cutting clips and building the highlights reel
    Creating,
    /// Removing intermediate files
    Cleaning,
}

impl Stage {
    /// Map a status message to a stage, if it matches a known phrase.
    pub fn from_message(message: &str) -> Option<Stage> {
        if message.contains("Starting video download") {
            Some(Stage::Preparing)
        } else if message.contains("Analyzing video content")
            || message.contains("Sending prompt to Gemini")
        {
            Some(Stage::Generating)
        } else if message.contains("Processing clip") || message.contains("Creating highlights") {
            Some(Stage::Creating)
        } else if message.contains("Cleaning up files") {
            Some(Stage::Cleaning)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Preparing => "preparing",
            Stage::Generating => "generating",
            Stage::Creating => "creating",
            Stage::Cleaning => "cleaning",
        }
    }

    /// Human-readable label for progress display.
    pub fn label(&self) -> &'static str {
        match self {
            Stage::Preparing => "Preparing Video",
            Stage::Generating => "Generating Analysis",
            Stage::Creating => "Creating Clips",
            Stage::Cleaning => "Cleaning Up",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
