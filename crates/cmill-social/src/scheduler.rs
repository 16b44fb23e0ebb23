//! In-memory post scheduler.

use chrono::{DateTime, Utc};
use tracing::debug;

use cmill_models::{ScheduledPost, SocialPlatform};

use crate::error::{SocialError, SocialResult};

/// Queue of posts waiting for their publish time.
///
/// Held in memory only; the queue lives and dies with the session, the
/// same way the original kept it in view state. Publishing is out of
/// scope, so [`PostScheduler::due`] hands entries back to the caller
/// instead of sending anything.
#[derive(Debug, Default)]
pub struct PostScheduler {
    queue: Vec<ScheduledPost>,
}

impl PostScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a post for a future time.
    pub fn schedule(
        &mut self,
        title: &str,
        platform: SocialPlatform,
        when: DateTime<Utc>,
    ) -> SocialResult<ScheduledPost> {
        if title.trim().is_empty() {
            return Err(SocialError::EmptyTitle);
        }
        if when <= Utc::now() {
            return Err(SocialError::ScheduleInPast);
        }

        let post = ScheduledPost::new(title.trim(), platform, when);
        debug!(post_id = %post.id, platform = %platform, "Post scheduled");
        self.queue.push(post.clone());
        Ok(post)
    }

    /// All queued posts, soonest first.
    pub fn upcoming(&self) -> Vec<ScheduledPost> {
        let mut posts = self.queue.clone();
        posts.sort_by_key(|p| p.scheduled_for);
        posts
    }

    /// Remove a queued post by id. Returns false when no such post exists.
    pub fn cancel(&mut self, id: &str) -> bool {
        let before = self.queue.len();
        self.queue.retain(|p| p.id != id);
        before != self.queue.len()
    }

    /// Take every post whose time has passed out of the queue.
    pub fn due(&mut self, now: DateTime<Utc>) -> Vec<ScheduledPost> {
        let (due, pending): (Vec<_>, Vec<_>) =
            self.queue.drain(..).partition(|p| p.is_due(now));
        self.queue = pending;

        let mut due = due;
        due.sort_by_key(|p| p.scheduled_for);
        due
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_schedule_and_upcoming_order() {
        let mut scheduler = PostScheduler::new();
        let later = Utc::now() + Duration::hours(2);
        let sooner = Utc::now() + Duration::hours(1);

        scheduler
            .schedule("Friday teaser", SocialPlatform::Youtube, later)
            .unwrap();
        scheduler
            .schedule("Launch clip", SocialPlatform::Twitter, sooner)
            .unwrap();

        let upcoming = scheduler.upcoming();
        assert_eq!(upcoming.len(), 2);
        assert_eq!(upcoming[0].title, "Launch clip");
        assert_eq!(upcoming[1].title, "Friday teaser");
    }

    #[test]
    fn test_schedule_rejects_blank_title() {
        let mut scheduler = PostScheduler::new();
        let err = scheduler
            .schedule("  ", SocialPlatform::Twitter, Utc::now() + Duration::hours(1))
            .unwrap_err();
        assert_eq!(err, SocialError::EmptyTitle);
        assert!(scheduler.is_empty());
    }

    #[test]
    fn test_schedule_rejects_past_time() {
        let mut scheduler = PostScheduler::new();
        let err = scheduler
            .schedule(
                "Old news",
                SocialPlatform::Facebook,
                Utc::now() - Duration::minutes(5),
            )
            .unwrap_err();
        assert_eq!(err, SocialError::ScheduleInPast);
    }

    #[test]
    fn test_cancel_by_id() {
        let mut scheduler = PostScheduler::new();
        let post = scheduler
            .schedule("Teaser", SocialPlatform::Instagram, Utc::now() + Duration::hours(1))
            .unwrap();

        assert!(scheduler.cancel(&post.id));
        assert!(!scheduler.cancel(&post.id));
        assert!(scheduler.is_empty());
    }

    #[test]
    fn test_due_drains_only_past_entries() {
        let mut scheduler = PostScheduler::new();
        let soon = Utc::now() + Duration::minutes(1);
        let far = Utc::now() + Duration::hours(3);

        scheduler
            .schedule("Due first", SocialPlatform::Twitter, soon)
            .unwrap();
        scheduler
            .schedule("Still waiting", SocialPlatform::Youtube, far)
            .unwrap();

        let due = scheduler.due(Utc::now() + Duration::hours(1));
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].title, "Due first");
        assert_eq!(scheduler.len(), 1);

        // Drained entries stay gone.
        assert!(scheduler.due(Utc::now() + Duration::hours(1)).is_empty());
    }
}
