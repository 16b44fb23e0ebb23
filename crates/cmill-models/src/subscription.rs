//! Subscription state as stored in the `users` table.

use serde::{Deserialize, Serialize};

use crate::PlanTier;

/// Billing status of a subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    #[default]
    Active,
    Canceled,
    PastDue,
}

impl SubscriptionStatus {
    /// Parse from string (case-insensitive). Unknown statuses degrade to
    /// Active, matching how missing data is read.
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "canceled" => SubscriptionStatus::Canceled,
            "past_due" => SubscriptionStatus::PastDue,
            _ => SubscriptionStatus::Active,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionStatus::Active => "active",
            SubscriptionStatus::Canceled => "canceled",
            SubscriptionStatus::PastDue => "past_due",
        }
    }
}

impl std::fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A user's subscription record.
///
/// Billing itself lives with Stripe; this is the replicated view the app
/// reads for gating. A user without a row is treated as the default
/// free/active subscription.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Subscription {
    #[serde(
        rename = "subscription_tier",
        default,
        deserialize_with = "crate::plan::tier_or_free"
    )]
    pub tier: PlanTier,

    #[serde(
        rename = "subscription_status",
        default,
        deserialize_with = "lenient_status"
    )]
    pub status: SubscriptionStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stripe_customer_id: Option<String>,
}

// Rows predating billing carry nulls, and Stripe can write statuses this
// enum does not model. Both read as the free/active defaults.
fn lenient_status<'de, D>(deserializer: D) -> Result<SubscriptionStatus, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw
        .as_deref()
        .map(SubscriptionStatus::from_str)
        .unwrap_or_default())
}

impl Subscription {
    pub fn is_active(&self) -> bool {
        self.status == SubscriptionStatus::Active
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_free_active() {
        let sub = Subscription::default();
        assert_eq!(sub.tier, PlanTier::Free);
        assert_eq!(sub.status, SubscriptionStatus::Active);
        assert!(sub.is_active());
    }

    #[test]
    fn test_deserialize_users_row() {
        let sub: Subscription = serde_json::from_str(
            r#"{
                "subscription_tier": "pro",
                "subscription_status": "active",
                "stripe_customer_id": "cus_123"
            }"#,
        )
        .unwrap();
        assert_eq!(sub.tier, PlanTier::Pro);
        assert_eq!(sub.stripe_customer_id.as_deref(), Some("cus_123"));
    }

    #[test]
    fn test_deserialize_sparse_row_falls_back() {
        // Rows written before the billing columns existed.
        let sub: Subscription = serde_json::from_str("{}").unwrap();
        assert_eq!(sub.tier, PlanTier::Free);
        assert!(sub.is_active());
    }

    #[test]
    fn test_deserialize_null_columns_fall_back() {
        let sub: Subscription = serde_json::from_str(
            r#"{"subscription_tier": null, "subscription_status": null}"#,
        )
        .unwrap();
        assert_eq!(sub.tier, PlanTier::Free);
        assert_eq!(sub.status, SubscriptionStatus::Active);
    }

    #[test]
    fn test_deserialize_unknown_values_fall_back() {
        let sub: Subscription = serde_json::from_str(
            r#"{"subscription_tier": "enterprise", "subscription_status": "trialing"}"#,
        )
        .unwrap();
        assert_eq!(sub.tier, PlanTier::Free);
        assert_eq!(sub.status, SubscriptionStatus::Active);
    }

    #[test]
    fn test_status_from_str() {
        assert_eq!(
            SubscriptionStatus::from_str("canceled"),
            SubscriptionStatus::Canceled
        );
        assert_eq!(
            SubscriptionStatus::from_str("PAST_DUE"),
            SubscriptionStatus::PastDue
        );
        assert_eq!(
            SubscriptionStatus::from_str("incomplete"),
            SubscriptionStatus::Active
        );
    }
}
