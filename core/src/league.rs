//! League tier lookup and cohort zones.
//!
//! Tier tables are ordered lowest to highest and the lowest tier starts
//! at score 0 (enforced by `GameConfig::validate`).

use crate::{config::LeagueTier, types::Tokens};
use serde::{Deserialize, Serialize};

/// The tier a score places a player in.
///
/// A score equal to a threshold resolves to the higher tier. Negative
/// and NaN scores resolve to the lowest tier.
///
/// Panics only if `tiers` is empty, which config validation rejects.
pub fn assign_tier(tiers: &[LeagueTier], score: f64) -> &LeagueTier {
    let score = if score.is_nan() { 0.0 } else { score };
    tiers
        .iter()
        .rev()
        .find(|tier| score >= tier.min_score as f64)
        .unwrap_or(&tiers[0])
}

pub fn tier_index(tiers: &[LeagueTier], id: &str) -> Option<usize> {
    tiers.iter().position(|t| t.id == id)
}

pub fn next_tier<'a>(tiers: &'a [LeagueTier], id: &str) -> Option<&'a LeagueTier> {
    tier_index(tiers, id).and_then(|i| tiers.get(i + 1))
}

pub fn previous_tier<'a>(tiers: &'a [LeagueTier], id: &str) -> Option<&'a LeagueTier> {
    tier_index(tiers, id)
        .and_then(|i| i.checked_sub(1))
        .and_then(|i| tiers.get(i))
}

/// Score still needed to reach the next tier's threshold.
/// None at the top tier.
pub fn score_to_next_tier(tiers: &[LeagueTier], score: Tokens) -> Option<Tokens> {
    let current = assign_tier(tiers, score as f64);
    next_tier(tiers, &current.id).map(|next| (next.min_score - score).max(0))
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Zone {
    Promotion,
    Safe,
    Danger,
}

impl Zone {
    /// Zone for a 1-based rank within a cohort of the given tier.
    pub fn for_rank(tier: &LeagueTier, rank: usize) -> Self {
        if rank <= tier.promotion_slots {
            Self::Promotion
        } else if tier.relegation_slots > 0 && rank > tier.cohort_size - tier.relegation_slots {
            Self::Danger
        } else {
            Self::Safe
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Promotion => "promotion",
            Self::Safe      => "safe",
            Self::Danger    => "danger",
        }
    }
}
