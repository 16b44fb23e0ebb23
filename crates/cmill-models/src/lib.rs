//! Shared data models for the ClipMill client core.
//!
//! This crate provides Serde-serializable types for:
//! - Job identifiers, states and status reports
//! - Generated clips and processing stages
//! - Submission options
//! - Plans, subscriptions and usage counters
//! - Social posts

pub mod clip;
pub mod job;
pub mod options;
pub mod plan;
pub mod post;
pub mod stage;
pub mod subscription;
pub mod usage;

// Re-export common types
pub use clip::Clip;
pub use job::{JobId, JobState, JobStatus};
pub use options::ProcessingOptions;
pub use plan::{PlanCatalog, PlanLimits, PlanTier};
pub use post::{PostDraft, ScheduledPost, SocialPlatform};
pub use stage::Stage;
pub use subscription::{Subscription, SubscriptionStatus};
pub use usage::{UsageCounter, UsageSummary};
