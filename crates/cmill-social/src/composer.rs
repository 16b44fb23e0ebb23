//! Post composition with per-platform validation.

use cmill_models::{PostDraft, SocialPlatform};

use crate::error::{SocialError, SocialResult};

/// Validates post input and builds a [`PostDraft`].
///
/// Publishing itself is out of scope; a composed draft is as far as the
/// pipeline goes.
pub struct PostComposer;

impl PostComposer {
    /// Build a draft from raw input.
    ///
    /// Content must be non-empty after trimming and fit the tightest cap
    /// among the selected platforms. Content is kept as given; trimming is
    /// only applied for the emptiness check.
    pub fn compose(
        content: &str,
        media: Vec<String>,
        platforms: &[SocialPlatform],
    ) -> SocialResult<PostDraft> {
        if content.trim().is_empty() {
            return Err(SocialError::EmptyContent);
        }
        if platforms.is_empty() {
            return Err(SocialError::NoPlatforms);
        }

        let len = content.chars().count();
        if let Some(platform) = platforms.iter().copied().min_by_key(|p| p.content_limit()) {
            let limit = platform.content_limit();
            if len > limit {
                return Err(SocialError::ContentTooLong {
                    platform,
                    limit,
                    len,
                });
            }
        }

        let mut targets: Vec<SocialPlatform> = Vec::with_capacity(platforms.len());
        for platform in platforms.iter().copied() {
            if !targets.contains(&platform) {
                targets.push(platform);
            }
        }

        Ok(PostDraft {
            content: content.to_string(),
            media,
            platforms: targets,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compose_basic_draft() {
        let draft = PostComposer::compose(
            "Check out my new clip!",
            vec!["https://cdn.example.com/c/1.mp4".to_string()],
            &[SocialPlatform::Twitter, SocialPlatform::Instagram],
        )
        .unwrap();

        assert_eq!(draft.content, "Check out my new clip!");
        assert_eq!(draft.media.len(), 1);
        assert_eq!(draft.platforms.len(), 2);
    }

    #[test]
    fn test_compose_rejects_blank_content() {
        let err = PostComposer::compose("   \n", vec![], &[SocialPlatform::Twitter]).unwrap_err();
        assert_eq!(err, SocialError::EmptyContent);
    }

    #[test]
    fn test_compose_rejects_no_platforms() {
        let err = PostComposer::compose("hello", vec![], &[]).unwrap_err();
        assert_eq!(err, SocialError::NoPlatforms);
    }

    #[test]
    fn test_compose_enforces_tightest_limit() {
        // 300 chars clears Instagram's cap but not Twitter's.
        let long = "x".repeat(300);
        let err = PostComposer::compose(
            &long,
            vec![],
            &[SocialPlatform::Instagram, SocialPlatform::Twitter],
        )
        .unwrap_err();

        assert_eq!(
            err,
            SocialError::ContentTooLong {
                platform: SocialPlatform::Twitter,
                limit: 280,
                len: 300,
            }
        );

        // Same content is fine when Twitter is not targeted.
        assert!(PostComposer::compose(&long, vec![], &[SocialPlatform::Instagram]).is_ok());
    }

    #[test]
    fn test_compose_dedupes_platforms() {
        let draft = PostComposer::compose(
            "hello",
            vec![],
            &[
                SocialPlatform::Twitter,
                SocialPlatform::Twitter,
                SocialPlatform::Youtube,
            ],
        )
        .unwrap();
        assert_eq!(
            draft.platforms,
            vec![SocialPlatform::Twitter, SocialPlatform::Youtube]
        );
    }

    #[test]
    fn test_compose_counts_characters_not_bytes() {
        // 280 multibyte chars fit the Twitter cap even at >280 bytes.
        let content = "é".repeat(280);
        assert!(content.len() > 280);
        assert!(PostComposer::compose(&content, vec![], &[SocialPlatform::Twitter]).is_ok());
    }
}
