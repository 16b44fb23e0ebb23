//! Application error types.

use thiserror::Error;

use cmill_models::PlanTier;
use cmill_processing::ProcessingError;
use cmill_social::SocialError;
use cmill_supabase::SupabaseError;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not signed in")]
    NotSignedIn,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Monthly clip limit reached ({used}/{limit} on the {tier} plan)")]
    UsageLimitReached {
        used: u32,
        limit: u32,
        tier: PlanTier,
    },

    #[error("Failed to read usage: {0}")]
    UsageFetchFailed(#[source] SupabaseError),

    #[error("Failed to record usage: {0}")]
    UsageWriteFailed(#[source] SupabaseError),

    #[error(transparent)]
    Processing(#[from] ProcessingError),

    #[error("Store error: {0}")]
    Store(#[from] SupabaseError),

    #[error(transparent)]
    Social(#[from] SocialError),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl AppError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// True for the gate refusing a submission, as opposed to something
    /// breaking.
    pub fn is_limit_reached(&self) -> bool {
        matches!(self, AppError::UsageLimitReached { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limit_error_message_names_the_plan() {
        let err = AppError::UsageLimitReached {
            used: 3,
            limit: 3,
            tier: PlanTier::Free,
        };
        assert!(err.is_limit_reached());
        assert_eq!(
            err.to_string(),
            "Monthly clip limit reached (3/3 on the free plan)"
        );
    }

    #[test]
    fn test_processing_error_is_transparent() {
        let err = AppError::from(ProcessingError::Cancelled);
        assert_eq!(err.to_string(), ProcessingError::Cancelled.to_string());
    }
}
