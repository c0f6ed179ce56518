//! Tier and points balance models

use serde::{Deserialize, Serialize};

/// Loyalty tier names, ordered from lowest to highest
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TierName {
    Silver,
    Gold,
    Platinum,
}

impl TierName {
    /// Platinum has no further progression
    pub fn is_highest(&self) -> bool {
        matches!(self, TierName::Platinum)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TierName::Silver => "silver",
            TierName::Gold => "gold",
            TierName::Platinum => "platinum",
        }
    }
}

/// Tier classification computed by the server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tier {
    pub name: TierName,
    /// Minimum points for this tier
    pub threshold: i64,
    #[serde(default)]
    pub benefits: Vec<String>,
}

/// Aggregate counters returned alongside the balance
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardStatistics {
    #[serde(default)]
    pub total_earned: i64,
    #[serde(default)]
    pub total_redeemed: i64,
    #[serde(default)]
    pub transactions_count: u64,
}

/// Response from `GET /api/rewards/points`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardsPointsState {
    pub points: i64,
    pub tier: Tier,
    #[serde(default)]
    pub next_tier: Option<Tier>,
    /// Position toward `next_tier`, 0-100
    #[serde(default)]
    pub progress: f64,
    #[serde(default)]
    pub statistics: RewardStatistics,
}

impl RewardsPointsState {
    /// Points still needed to reach the next tier, `None` at the top tier
    pub fn points_to_next_tier(&self) -> Option<i64> {
        self.next_tier
            .as_ref()
            .map(|next| (next.threshold - self.points).max(0))
    }
}
