//! Supabase-backed storage for ClipMill account data.
//!
//! A small typed client over PostgREST plus one repository per concern:
//!
//! - [`UsageRepository`] for the monthly clip counter
//! - [`SubscriptionRepository`] for the billing tier and status
//! - [`VideoResultsRepository`] for the latest run's clips
//! - [`HistoryRepository`] for the paginated run history
//!
//! "No row" is data here, not an error: absent counters read as zero and
//! absent subscriptions fall back to free/active at the call site.

pub mod client;
pub mod error;
pub mod history_repo;
pub mod results_repo;
pub mod retry;
pub mod subscription_repo;
pub mod usage_repo;

pub use client::{SupabaseClient, SupabaseConfig};
pub use error::{SupabaseError, SupabaseResult};
pub use history_repo::{HistoryEntry, HistoryRepository, HISTORY_PAGE_SIZE};
pub use results_repo::{SavedResults, VideoResultsRepository};
pub use retry::{with_retry, RetryConfig};
pub use subscription_repo::SubscriptionRepository;
pub use usage_repo::UsageRepository;
