//! Error types for post composing and scheduling.

use cmill_models::SocialPlatform;
use thiserror::Error;

pub type SocialResult<T> = Result<T, SocialError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SocialError {
    #[error("Post content is empty")]
    EmptyContent,

    #[error("No platforms selected")]
    NoPlatforms,

    #[error("Content is {len} characters, over the {platform} limit of {limit}")]
    ContentTooLong {
        platform: SocialPlatform,
        limit: usize,
        len: usize,
    },

    #[error("Post title is empty")]
    EmptyTitle,

    #[error("Scheduled time is not in the future")]
    ScheduleInPast,
}
