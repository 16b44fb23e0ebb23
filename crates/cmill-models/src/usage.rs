//! Monthly usage counters for the submission gate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::PlanTier;

/// One `user_usage` row: how many clips a user generated this month.
///
/// The counter is reset server-side at the start of each billing month; a
/// user with no row simply has not generated anything yet and reads as 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageCounter {
    pub user_id: String,
    pub monthly_count: u32,
    pub last_updated: DateTime<Utc>,
}

impl UsageCounter {
    /// Fresh counter for a user's first generated clip.
    pub fn first_use(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            monthly_count: 1,
            last_updated: Utc::now(),
        }
    }
}

/// Snapshot of usage against the plan limit, for gating and display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageSummary {
    pub tier: PlanTier,
    pub used: u32,
    pub limit: u32,
}

impl UsageSummary {
    pub fn new(tier: PlanTier, used: u32, limit: u32) -> Self {
        Self { tier, used, limit }
    }

    /// Clips left this month.
    pub fn remaining(&self) -> u32 {
        self.limit.saturating_sub(self.used)
    }

    /// True when the gate should block further submissions.
    pub fn at_limit(&self) -> bool {
        self.used >= self.limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_at_limit_boundary() {
        let summary = UsageSummary::new(PlanTier::Free, 3, 3);
        assert!(summary.at_limit());
        assert_eq!(summary.remaining(), 0);

        let summary = UsageSummary::new(PlanTier::Free, 2, 3);
        assert!(!summary.at_limit());
        assert_eq!(summary.remaining(), 1);
    }

    #[test]
    fn test_over_limit_still_blocks() {
        // A downgraded user can sit above their new limit.
        let summary = UsageSummary::new(PlanTier::Free, 31, 3);
        assert!(summary.at_limit());
        assert_eq!(summary.remaining(), 0);
    }

    #[test]
    fn test_first_use_counter() {
        let counter = UsageCounter::first_use("user-1");
        assert_eq!(counter.user_id, "user-1");
        assert_eq!(counter.monthly_count, 1);
    }
}
