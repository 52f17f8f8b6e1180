//! Gameplay events, the only input the reward tracker accepts.
//!
//! Variants are added over time, never removed or reordered.
//! The wire form is a flat JSON object with a `type` tag, e.g.
//! `{"type":"streak_claimed","days":3,"event_id":"evt-9"}`.

use crate::types::Tokens;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GameplayEvent {
    /// Optional delivery id. Repeated ids are ignored by the tracker.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,
    #[serde(flatten)]
    pub kind: EventKind,
}

impl GameplayEvent {
    pub fn new(kind: EventKind) -> Self {
        Self { event_id: None, kind }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.event_id = Some(id.into());
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventKind {
    // ── Missions ───────────────────────────────────
    MissionCompleted {
        mission_id: String,
        base_reward: Tokens,
        #[serde(default)]
        outcome: MissionOutcome,
    },

    // ── Courage / exploration ──────────────────────
    InvestmentMade {
        risk_level: String,
        asset_class: String,
        #[serde(default)]
        was_loss: bool,
    },
    CoachAdviceViewed {
        coach_id: String,
    },
    RiskPreviewViewed,

    // ── Engagement ─────────────────────────────────
    QuizCompleted {
        correct: u32,
        total: u32,
    },
    ThesisWritten,
    StreakClaimed {
        days: u32,
    },
    ReferralConverted {
        referral_id: String,
    },
    WelcomeBonus {
        amount: Tokens,
    },

    // ── Staking ────────────────────────────────────
    StakingReward {
        amount: Tokens,
    },
    StakeUpdated {
        staked: Tokens,
    },

    // ── Spending ───────────────────────────────────
    TokensSpent {
        amount: Tokens,
        reason: String,
    },
}

impl EventKind {
    /// Stable name, used for ledger sources and logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::MissionCompleted { .. }  => "mission",
            Self::InvestmentMade { .. }    => "investment",
            Self::CoachAdviceViewed { .. } => "coach",
            Self::RiskPreviewViewed        => "preview",
            Self::QuizCompleted { .. }     => "quiz",
            Self::ThesisWritten            => "thesis",
            Self::StreakClaimed { .. }     => "streak",
            Self::ReferralConverted { .. } => "referral",
            Self::WelcomeBonus { .. }      => "welcome",
            Self::StakingReward { .. }     => "staking",
            Self::StakeUpdated { .. }      => "stake",
            Self::TokensSpent { .. }       => "spend",
        }
    }

    /// Events that cannot be applied meaningfully. The tracker ignores them.
    pub fn is_well_formed(&self) -> bool {
        match self {
            Self::MissionCompleted { mission_id, base_reward, .. } => {
                !mission_id.trim().is_empty() && *base_reward >= 0
            }
            Self::InvestmentMade { risk_level, asset_class, .. } => {
                !risk_level.trim().is_empty() && !asset_class.trim().is_empty()
            }
            Self::CoachAdviceViewed { coach_id } => !coach_id.trim().is_empty(),
            Self::QuizCompleted { correct, total } => correct <= total,
            Self::StreakClaimed { days } => *days > 0,
            Self::ReferralConverted { referral_id } => !referral_id.trim().is_empty(),
            Self::WelcomeBonus { amount } | Self::StakingReward { amount } => *amount >= 0,
            Self::StakeUpdated { staked } => *staked >= 0,
            Self::TokensSpent { amount, .. } => *amount > 0,
            Self::RiskPreviewViewed | Self::ThesisWritten => true,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum MissionOutcome {
    Profit,
    Loss,
    #[default]
    BreakEven,
}
