//! Reward/progress tracker.
//!
//! `apply` is a pure transformation: it takes a profile and one gameplay
//! event and returns the next profile plus any badges the event unlocked.
//! The input profile is never mutated.
//!
//! Invariants:
//!   - experience never decreases
//!   - badges are never removed
//!   - the balance only drops through `tokens_spent`, which leaves the
//!     profile untouched when the balance is short
//!
//! Season settlement is not done here; callers run `season::settle_if_due`
//! before applying events that may land after a season end.

use crate::{
    badges::{self, UnlockedBadge},
    config::GameConfig,
    error::CoreError,
    event::{EventKind, GameplayEvent, MissionOutcome},
    ledger::add_tokens,
    profile::PlayerProfile,
    types::Tokens,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ApplyStatus {
    Applied,
    /// Malformed event, or a reward that would overflow; profile unchanged.
    Ignored,
    /// Event id already applied; profile unchanged.
    Duplicate,
    /// Spend larger than the balance; profile unchanged.
    InsufficientBalance,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApplyOutcome {
    pub profile:  PlayerProfile,
    pub unlocked: Vec<UnlockedBadge>,
    /// Tokens credited by the event itself and by unlocked badges.
    pub earned:   Tokens,
    pub status:   ApplyStatus,
}

impl ApplyOutcome {
    fn unchanged(profile: &PlayerProfile, status: ApplyStatus) -> Self {
        Self {
            profile: profile.clone(),
            unlocked: Vec::new(),
            earned: 0,
            status,
        }
    }
}

pub struct RewardTracker<'a> {
    config: &'a GameConfig,
}

impl<'a> RewardTracker<'a> {
    pub fn new(config: &'a GameConfig) -> Self {
        Self { config }
    }

    pub fn apply(
        &self,
        profile: &PlayerProfile,
        event: &GameplayEvent,
        now: DateTime<Utc>,
    ) -> ApplyOutcome {
        if !event.kind.is_well_formed() {
            log::debug!("[tracker] {} ignored malformed {} event", profile.id, event.kind.name());
            return ApplyOutcome::unchanged(profile, ApplyStatus::Ignored);
        }
        if let Some(id) = &event.event_id {
            if profile.has_seen_event(id) {
                log::debug!("[tracker] {} ignored duplicate event {id}", profile.id);
                return ApplyOutcome::unchanged(profile, ApplyStatus::Duplicate);
            }
        }

        let mut next = profile.clone();
        let result = self.apply_kind(&mut next, &event.kind, now).and_then(|earned| {
            let (unlocked, badge_rewards) = self.award_badges(&mut next, now)?;
            Ok((add_tokens(earned, badge_rewards, "event earnings")?, unlocked))
        });
        let (earned, unlocked) = match result {
            Ok(applied) => applied,
            Err(CoreError::InsufficientBalance { needed, available }) => {
                log::debug!(
                    "[tracker] {} spend of {needed} rejected, balance {available}",
                    profile.id
                );
                return ApplyOutcome::unchanged(profile, ApplyStatus::InsufficientBalance);
            }
            Err(e) => {
                log::warn!("[tracker] {} event failed: {e}", profile.id);
                return ApplyOutcome::unchanged(profile, ApplyStatus::Ignored);
            }
        };

        if let Some(id) = &event.event_id {
            next.remember_event(id, self.config.rewards.dedup_window);
        }

        log::debug!(
            "[tracker] {} applied {}: +{} iii, {} badge(s), balance {}",
            next.id,
            event.kind.name(),
            earned,
            unlocked.len(),
            next.balance()
        );

        ApplyOutcome {
            profile: next,
            unlocked,
            earned,
            status: ApplyStatus::Applied,
        }
    }

    /// Apply a sequence of events in order, threading the profile through.
    pub fn apply_all<'e>(
        &self,
        profile: &PlayerProfile,
        events: impl IntoIterator<Item = &'e GameplayEvent>,
        now: DateTime<Utc>,
    ) -> (PlayerProfile, Vec<UnlockedBadge>) {
        let mut current = profile.clone();
        let mut unlocked = Vec::new();
        for event in events {
            let outcome = self.apply(&current, event, now);
            current = outcome.profile;
            unlocked.extend(outcome.unlocked);
        }
        (current, unlocked)
    }

    /// Badges are evaluated once, after the stat update.
    fn award_badges(
        &self,
        p: &mut PlayerProfile,
        now: DateTime<Utc>,
    ) -> Result<(Vec<UnlockedBadge>, Tokens), CoreError> {
        let mut unlocked = Vec::new();
        let mut rewards: Tokens = 0;
        for badge in badges::newly_unlocked(p) {
            p.badges.insert(badge.id.to_string());
            p.earn(
                badge.reward,
                "badge",
                &format!("Badge unlocked: {}", badge.name),
                self.config,
                now,
            )?;
            rewards = add_tokens(rewards, badge.reward, "badge rewards")?;
            unlocked.push(UnlockedBadge::from(badge));
        }
        Ok((unlocked, rewards))
    }

    /// Update stats and credit the event's own reward. Returns tokens earned.
    fn apply_kind(
        &self,
        p: &mut PlayerProfile,
        kind: &EventKind,
        now: DateTime<Utc>,
    ) -> Result<Tokens, CoreError> {
        let r = &self.config.rewards;
        let source = kind.name();

        let (earned, description) = match kind {
            EventKind::MissionCompleted { mission_id, base_reward, outcome } => {
                let mut earned = *base_reward;
                if !p.completed_missions.contains(mission_id) {
                    p.completed_missions.push(mission_id.clone());
                    earned = add_tokens(earned, r.mission_first_time, "mission reward")?;
                }
                p.stats.missions_completed = p.stats.missions_completed.saturating_add(1);
                if *outcome == MissionOutcome::Loss {
                    p.stats.losses_experienced = p.stats.losses_experienced.saturating_add(1);
                    earned = add_tokens(earned, r.loss_lesson, "mission reward")?;
                }
                (earned, format!("Mission: {mission_id}"))
            }

            EventKind::InvestmentMade { risk_level, asset_class, was_loss } => {
                let risk = risk_level.trim().to_lowercase();
                let asset = asset_class.trim().to_lowercase();
                let s = &mut p.stats;
                let mut earned = 0;

                if s.investments_made == 0 {
                    earned += r.first_investment;
                }
                if s.asset_classes.insert(asset) {
                    earned += r.new_asset_class;
                }
                if risk == "high" {
                    s.high_risk_investments = s.high_risk_investments.saturating_add(1);
                    earned += r.high_risk_investment;
                } else if risk == "extreme" {
                    s.extreme_risk_investments = s.extreme_risk_investments.saturating_add(1);
                    earned += r.extreme_risk_investment;
                }
                if s.risk_levels.insert(risk) {
                    earned += r.new_risk_level;
                }
                if *was_loss {
                    s.losses_experienced = s.losses_experienced.saturating_add(1);
                    earned += r.loss_lesson;
                } else if s.last_investment_was_loss {
                    s.investments_after_loss = s.investments_after_loss.saturating_add(1);
                    earned += r.invest_after_loss;
                }
                s.investments_made = s.investments_made.saturating_add(1);
                s.last_investment_was_loss = *was_loss;
                (earned, "Investment rewards".to_string())
            }

            EventKind::CoachAdviceViewed { coach_id } => {
                let earned = if p.stats.coaches.insert(coach_id.clone()) {
                    r.coach_advice_viewed
                } else {
                    0
                };
                (earned, "Coach advice viewed".to_string())
            }

            EventKind::RiskPreviewViewed => {
                (r.risk_preview_viewed, "Risk preview viewed".to_string())
            }

            EventKind::QuizCompleted { correct, total } => {
                let mut earned = Tokens::from(*correct)
                    .checked_mul(r.quiz_correct)
                    .ok_or(CoreError::Overflow("quiz reward"))?;
                if correct == total && *total > 0 {
                    p.stats.quizzes_passed = p.stats.quizzes_passed.saturating_add(1);
                    earned = add_tokens(earned, r.quiz_perfect, "quiz reward")?;
                }
                (earned, format!("Quiz: {correct}/{total} correct"))
            }

            EventKind::ThesisWritten => {
                p.stats.theses_written = p.stats.theses_written.saturating_add(1);
                (r.thesis_written, "Investment thesis written".to_string())
            }

            EventKind::StreakClaimed { days } => {
                p.current_streak = *days;
                p.longest_streak = p.longest_streak.max(*days);
                p.stats.total_days_played = p.stats.total_days_played.saturating_add(1);
                p.stats.last_play_date = Some(now.date_naive());
                (r.streak_bonus(*days), format!("{days}-day streak bonus"))
            }

            EventKind::ReferralConverted { referral_id } => {
                p.stats.referrals_converted = p.stats.referrals_converted.saturating_add(1);
                (r.referral_converted, format!("Referral: {referral_id}"))
            }

            EventKind::WelcomeBonus { amount } => {
                if p.welcome_claimed {
                    (0, String::new())
                } else {
                    p.welcome_claimed = true;
                    (*amount, "Welcome bonus for completing onboarding".to_string())
                }
            }

            EventKind::StakingReward { amount } => {
                p.stats.staking_rewards_earned =
                    add_tokens(p.stats.staking_rewards_earned, *amount, "staking rewards")?;
                (*amount, "Staking rewards".to_string())
            }

            EventKind::StakeUpdated { staked } => {
                p.stats.total_staked = *staked;
                (0, String::new())
            }

            EventKind::TokensSpent { amount, reason } => {
                p.ledger.spend(*amount, source, reason, now, r.transaction_history)?;
                return Ok(0);
            }
        };

        p.earn(earned, source, &description, self.config, now)?;
        Ok(earned.max(0))
    }
}
