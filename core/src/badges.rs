//! Badge catalog and unlock evaluation.
//!
//! The catalog is static. A badge, once in a profile's set, is never
//! removed; evaluation only ever adds ids.

use crate::{profile::PlayerProfile, types::Tokens};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BadgeCategory {
    Courage,
    Exploration,
    Mastery,
    Streak,
    Staking,
    Special,
}

impl BadgeCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Courage => "courage",
            Self::Exploration => "exploration",
            Self::Mastery => "mastery",
            Self::Streak => "streak",
            Self::Staking => "staking",
            Self::Special => "special",
        }
    }
}

pub struct Badge {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub category: BadgeCategory,
    /// Tokens granted when the badge unlocks.
    pub reward: Tokens,
    pub is_earned: fn(&PlayerProfile) -> bool,
}

/// A badge unlocked by an event, as reported to the caller.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UnlockedBadge {
    pub id: String,
    pub name: String,
    pub category: BadgeCategory,
    pub reward: Tokens,
}

impl From<&Badge> for UnlockedBadge {
    fn from(badge: &Badge) -> Self {
        Self {
            id:       badge.id.to_string(),
            name:     badge.name.to_string(),
            category: badge.category,
            reward:   badge.reward,
        }
    }
}

pub static BADGES: &[Badge] = &[
    // ── Courage ────────────────────────────────────────────────────
    Badge {
        id: "first-risk",
        name: "First Steps",
        description: "Made your first investment",
        category: BadgeCategory::Courage,
        reward: 25,
        is_earned: |p| p.stats.investments_made >= 1,
    },
    Badge {
        id: "bold-move",
        name: "Bold Move",
        description: "Made a high-risk investment",
        category: BadgeCategory::Courage,
        reward: 50,
        is_earned: |p| p.stats.high_risk_investments >= 1,
    },
    Badge {
        id: "fearless",
        name: "Fearless Explorer",
        description: "Made an extreme-risk investment",
        category: BadgeCategory::Courage,
        reward: 75,
        is_earned: |p| p.stats.extreme_risk_investments >= 1,
    },
    Badge {
        id: "resilient",
        name: "Resilient Spirit",
        description: "Invested again after a loss",
        category: BadgeCategory::Courage,
        reward: 75,
        is_earned: |p| p.stats.investments_after_loss >= 1,
    },
    Badge {
        id: "battle-tested",
        name: "Battle Tested",
        description: "Experienced 3 losses and kept going",
        category: BadgeCategory::Courage,
        reward: 100,
        is_earned: |p| p.stats.losses_experienced >= 3,
    },
    // ── Exploration ────────────────────────────────────────────────
    Badge {
        id: "diversifier",
        name: "Diversifier",
        description: "Explored 3 different asset classes",
        category: BadgeCategory::Exploration,
        reward: 50,
        is_earned: |p| p.stats.asset_classes.len() >= 3,
    },
    Badge {
        id: "asset-master",
        name: "Asset Master",
        description: "Explored all 6 asset classes",
        category: BadgeCategory::Exploration,
        reward: 150,
        is_earned: |p| p.stats.asset_classes.len() >= 6,
    },
    Badge {
        id: "risk-spectrum",
        name: "Full Spectrum",
        description: "Tried all risk levels",
        category: BadgeCategory::Exploration,
        reward: 100,
        is_earned: |p| p.stats.risk_levels.len() >= 5,
    },
    Badge {
        id: "coach-collector",
        name: "Open Minded",
        description: "Got advice from all 4 coaches",
        category: BadgeCategory::Exploration,
        reward: 75,
        is_earned: |p| p.stats.coaches.len() >= 4,
    },
    // ── Mastery ────────────────────────────────────────────────────
    Badge {
        id: "mission-starter",
        name: "Mission Starter",
        description: "Completed your first mission",
        category: BadgeCategory::Mastery,
        reward: 25,
        is_earned: |p| p.stats.missions_completed >= 1,
    },
    Badge {
        id: "mission-veteran",
        name: "Mission Veteran",
        description: "Completed 3 missions",
        category: BadgeCategory::Mastery,
        reward: 75,
        is_earned: |p| p.stats.missions_completed >= 3,
    },
    Badge {
        id: "history-scholar",
        name: "History Scholar",
        description: "Completed all 6 historical missions",
        category: BadgeCategory::Mastery,
        reward: 200,
        is_earned: |p| p.stats.missions_completed >= 6,
    },
    // ── Streaks ────────────────────────────────────────────────────
    Badge {
        id: "streak-3",
        name: "3-Day Streak",
        description: "3 days in a row!",
        category: BadgeCategory::Streak,
        reward: 25,
        is_earned: |p| p.longest_streak >= 3,
    },
    Badge {
        id: "streak-7",
        name: "Weekly Warrior",
        description: "7 days in a row!",
        category: BadgeCategory::Streak,
        reward: 75,
        is_earned: |p| p.longest_streak >= 7,
    },
    Badge {
        id: "streak-30",
        name: "Monthly Legend",
        description: "30 days in a row!",
        category: BadgeCategory::Streak,
        reward: 300,
        is_earned: |p| p.longest_streak >= 30,
    },
    // ── Staking ────────────────────────────────────────────────────
    Badge {
        id: "first-stake",
        name: "First Stake",
        description: "Staked iii tokens for the first time",
        category: BadgeCategory::Staking,
        reward: 25,
        is_earned: |p| p.stats.total_staked > 0,
    },
    Badge {
        id: "whale",
        name: "Whale",
        description: "Staked 10,000+ iii tokens",
        category: BadgeCategory::Staking,
        reward: 250,
        is_earned: |p| p.stats.total_staked >= 10_000,
    },
    Badge {
        id: "yield-farmer",
        name: "Yield Farmer",
        description: "Earned 1,000+ iii from staking rewards",
        category: BadgeCategory::Staking,
        reward: 150,
        is_earned: |p| p.stats.staking_rewards_earned >= 1_000,
    },
    // ── Special ────────────────────────────────────────────────────
    Badge {
        id: "first-referral",
        name: "Recruiter",
        description: "A friend joined through your invite",
        category: BadgeCategory::Special,
        reward: 50,
        is_earned: |p| p.stats.referrals_converted >= 1,
    },
];

/// Badges whose predicate holds for `profile` but which it does not hold yet.
/// Catalog order.
pub fn newly_unlocked(profile: &PlayerProfile) -> Vec<&'static Badge> {
    BADGES
        .iter()
        .filter(|badge| !profile.has_badge(badge.id))
        .filter(|badge| (badge.is_earned)(profile))
        .collect()
}

/// Held badges per category. Ids outside the catalog (season trophies)
/// count as special.
pub fn count_by_category(profile: &PlayerProfile) -> BTreeMap<&'static str, usize> {
    let mut counts = BTreeMap::new();
    for id in &profile.badges {
        let category = BADGES
            .iter()
            .find(|badge| badge.id == id.as_str())
            .map_or(BadgeCategory::Special, |badge| badge.category);
        *counts.entry(category.as_str()).or_insert(0) += 1;
    }
    counts
}
