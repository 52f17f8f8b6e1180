//! Waitlists for upcoming premium features.
//!
//! An address joins each feature at most once. Its position is the number
//! of signups for that feature up to and including its own.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const WAITLIST_FEATURES: &[&str] = &[
    "risk-quiz",
    "portfolio-builder",
    "risk-roulette",
    "fo-certification",
    "ai-mentor",
    "premium-missions",
    "discord-community",
    "mobile-app",
];

pub fn is_waitlist_feature(feature: &str) -> bool {
    WAITLIST_FEATURES.contains(&feature)
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WaitlistEntry {
    pub id:         String,
    pub email:      String,
    pub feature:    String,
    pub created_at: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum JoinOutcome {
    Joined,
    AlreadyListed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WaitlistSignup {
    pub entry:    WaitlistEntry,
    /// 1-based place in the feature's queue.
    pub position: u64,
    pub outcome:  JoinOutcome,
}

/// Signups per feature. Every known feature is present, zero when empty.
pub type WaitlistStats = BTreeMap<String, u64>;
