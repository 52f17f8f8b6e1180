//! Player profile: the state every reward and league operation transforms.
//!
//! Profiles are created at onboarding completion and never deleted.
//! Experience and the badge set only grow.

use crate::{
    config::GameConfig,
    error::CoreResult,
    ledger::{add_tokens, TokenLedger},
    league,
    season::Season,
    types::{BadgeId, LeagueId, PlayerId, Tokens},
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PlayerStats {
    // Investments
    pub investments_made: u32,
    pub high_risk_investments: u32,
    pub extreme_risk_investments: u32,
    pub losses_experienced: u32,
    pub investments_after_loss: u32,
    pub last_investment_was_loss: bool,

    // Exploration
    pub asset_classes: BTreeSet<String>,
    pub risk_levels: BTreeSet<String>,
    pub coaches: BTreeSet<String>,

    // Progress
    pub missions_completed: u32,
    pub quizzes_passed: u32,
    pub theses_written: u32,
    pub referrals_converted: u32,

    // Activity
    pub total_days_played: u32,
    pub last_play_date: Option<NaiveDate>,

    // Staking
    pub total_staked: Tokens,
    pub staking_rewards_earned: Tokens,
}

/// Which league the player sits in and which season they are playing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LeagueProgress {
    pub league_id: LeagueId,
    pub season:    Season,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlayerProfile {
    pub id: PlayerId,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub coach_id: Option<String>,

    pub experience: Tokens,
    pub level: u32,
    /// Score accumulated during the current league season.
    pub weekly_score: Tokens,
    pub ledger: TokenLedger,

    /// Distinct missions completed, in completion order.
    pub completed_missions: Vec<String>,
    pub current_streak: u32,
    pub longest_streak: u32,
    #[serde(default)]
    pub welcome_claimed: bool,

    pub badges: BTreeSet<BadgeId>,
    pub stats: PlayerStats,
    pub league: LeagueProgress,

    /// Most recent first. Used to drop duplicate deliveries.
    #[serde(default)]
    pub recent_event_ids: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl PlayerProfile {
    /// Create the profile at onboarding completion.
    /// The player is placed in the tier their (zero) experience maps to.
    pub fn onboard(
        id: impl Into<PlayerId>,
        coach_id: Option<String>,
        config: &GameConfig,
        now: DateTime<Utc>,
    ) -> Self {
        let tier = league::assign_tier(&config.leagues, 0.0);
        Self {
            id: id.into(),
            display_name: None,
            coach_id,
            experience: 0,
            level: config.levels.level_for(0),
            weekly_score: 0,
            ledger: TokenLedger::default(),
            completed_missions: Vec::new(),
            current_streak: 0,
            longest_streak: 0,
            welcome_claimed: false,
            badges: BTreeSet::new(),
            stats: PlayerStats::default(),
            league: LeagueProgress {
                league_id: tier.id.clone(),
                season:    Season::containing(now),
            },
            recent_event_ids: Vec::new(),
            created_at: now,
        }
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    pub fn balance(&self) -> Tokens {
        self.ledger.balance
    }

    pub fn has_badge(&self, id: &str) -> bool {
        self.badges.contains(id)
    }

    pub fn has_seen_event(&self, id: &str) -> bool {
        self.recent_event_ids.iter().any(|seen| seen == id)
    }

    pub(crate) fn remember_event(&mut self, id: &str, window: usize) {
        self.recent_event_ids.insert(0, id.to_string());
        self.recent_event_ids.truncate(window);
    }

    /// Streak length a claim on `today` would record, or None when today's
    /// claim is already in. A claim the day after the last one extends the
    /// streak; any longer gap starts over at one.
    pub fn next_streak_days(&self, today: NaiveDate) -> Option<u32> {
        match self.stats.last_play_date {
            Some(last) if last == today && self.current_streak > 0 => None,
            Some(last) if today.pred_opt() == Some(last) => {
                Some(self.current_streak.saturating_add(1))
            }
            _ => Some(1),
        }
    }

    /// Credit earned tokens: experience, balance and weekly score all rise.
    /// On overflow nothing changes.
    pub(crate) fn earn(
        &mut self,
        amount: Tokens,
        source: &str,
        description: &str,
        config: &GameConfig,
        now: DateTime<Utc>,
    ) -> CoreResult<()> {
        if amount <= 0 {
            return Ok(());
        }
        let experience = add_tokens(self.experience, amount, "experience")?;
        let weekly_score = add_tokens(self.weekly_score, amount, "weekly score")?;
        self.ledger
            .credit(amount, source, description, now, config.rewards.transaction_history)?;
        self.experience = experience;
        self.weekly_score = weekly_score;
        self.level = config.levels.level_for(experience);
        Ok(())
    }
}
