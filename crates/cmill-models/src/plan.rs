//! Subscription plan tiers and per-tier entitlements.

use serde::{Deserialize, Serialize};

/// Default monthly clip limits per tier.
pub const FREE_CLIP_LIMIT: u32 = 3;
pub const REGULAR_CLIP_LIMIT: u32 = 30;
pub const PRO_CLIP_LIMIT: u32 = 100;

/// Max clip duration on the free tier, seconds.
pub const FREE_CLIP_DURATION_SECS: u32 = 120;

/// Plan tier enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PlanTier {
    #[default]
    Free,
    Regular,
    Pro,
}

impl PlanTier {
    /// Parse from string (case-insensitive). Unknown tiers degrade to Free.
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "regular" => PlanTier::Regular,
            "pro" => PlanTier::Pro,
            _ => PlanTier::Free,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PlanTier::Free => "free",
            PlanTier::Regular => "regular",
            PlanTier::Pro => "pro",
        }
    }
}

impl std::fmt::Display for PlanTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Entitlements and billing metadata for one tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanLimits {
    /// Tier this entry belongs to.
    pub tier: PlanTier,
    /// Display name.
    pub name: String,
    /// Clips allowed per calendar month.
    pub clip_limit: u32,
    /// Max clip duration in seconds, where the tier caps it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_clip_duration_secs: Option<u32>,
    /// Monthly price in cents.
    pub price_cents: u32,
    /// Stripe price id, for paid tiers with checkout configured.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_id: Option<String>,
}

impl PlanLimits {
    /// Built-in limits for a tier.
    pub fn for_tier(tier: PlanTier) -> Self {
        match tier {
            PlanTier::Free => Self {
                tier,
                name: "Free".to_string(),
                clip_limit: FREE_CLIP_LIMIT,
                max_clip_duration_secs: Some(FREE_CLIP_DURATION_SECS),
                price_cents: 0,
                price_id: None,
            },
            PlanTier::Regular => Self {
                tier,
                name: "Regular Clipper".to_string(),
                clip_limit: REGULAR_CLIP_LIMIT,
                max_clip_duration_secs: None,
                price_cents: 100,
                price_id: None,
            },
            PlanTier::Pro => Self {
                tier,
                name: "Pro Clipper".to_string(),
                clip_limit: PRO_CLIP_LIMIT,
                max_clip_duration_secs: None,
                price_cents: 200,
                price_id: None,
            },
        }
    }
}

/// All three plans, with limits resolvable by tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanCatalog {
    pub free: PlanLimits,
    pub regular: PlanLimits,
    pub pro: PlanLimits,
}

impl Default for PlanCatalog {
    fn default() -> Self {
        Self {
            free: PlanLimits::for_tier(PlanTier::Free),
            regular: PlanLimits::for_tier(PlanTier::Regular),
            pro: PlanLimits::for_tier(PlanTier::Pro),
        }
    }
}

impl PlanCatalog {
    /// Catalog with limits overridable from the environment:
    /// `FREE_PLAN_LIMIT`, `FREE_PLAN_DURATION`, `REGULAR_PLAN_LIMIT`,
    /// `PRO_PLAN_LIMIT`, `REGULAR_PRICE_ID`, `PRO_PRICE_ID`.
    pub fn from_env() -> Self {
        let mut catalog = Self::default();
        catalog.free.clip_limit = env_u32("FREE_PLAN_LIMIT", FREE_CLIP_LIMIT);
        catalog.free.max_clip_duration_secs =
            Some(env_u32("FREE_PLAN_DURATION", FREE_CLIP_DURATION_SECS));
        catalog.regular.clip_limit = env_u32("REGULAR_PLAN_LIMIT", REGULAR_CLIP_LIMIT);
        catalog.pro.clip_limit = env_u32("PRO_PLAN_LIMIT", PRO_CLIP_LIMIT);
        catalog.regular.price_id = std::env::var("REGULAR_PRICE_ID").ok();
        catalog.pro.price_id = std::env::var("PRO_PRICE_ID").ok();
        catalog
    }

    pub fn for_tier(&self, tier: PlanTier) -> &PlanLimits {
        match tier {
            PlanTier::Free => &self.free,
            PlanTier::Regular => &self.regular,
            PlanTier::Pro => &self.pro,
        }
    }

    /// Clip limit for a tier.
    pub fn clip_limit(&self, tier: PlanTier) -> u32 {
        self.for_tier(tier).clip_limit
    }
}

fn env_u32(name: &str, default: u32) -> u32 {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Deserialize a tier column that may be null, absent, or carry a value
/// this enum does not know, falling back to Free.
///
/// Store rows predate the tier column in places, and billing can write
/// tier names a given build has never heard of; both read as the free
/// tier rather than failing the whole row.
pub fn tier_or_free<'de, D>(deserializer: D) -> Result<PlanTier, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().map(PlanTier::from_str).unwrap_or_default())
}
