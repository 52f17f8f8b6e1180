//! Weekly league seasons and lazy season settlement.
//!
//! Seasons run Monday 00:00 UTC to the following Monday. There is no
//! timer: whichever read first happens at or after the stored season end
//! settles it. Only the stored season is settled. Weeks the player missed
//! entirely are skipped and the profile jumps to the season containing `now`.

use crate::{
    cohort::{compute_cohort, CohortPlayer},
    config::GameConfig,
    error::{CoreError, CoreResult},
    league::{self, Zone},
    profile::PlayerProfile,
    types::{LeagueId, Tokens},
};
use chrono::{DateTime, Datelike, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Season {
    /// `week_{iso year}_{iso week}`, e.g. `week_2026_10`.
    pub id:        String,
    pub starts_at: DateTime<Utc>,
    pub ends_at:   DateTime<Utc>,
}

impl Season {
    /// The season that contains `now`.
    pub fn containing(now: DateTime<Utc>) -> Self {
        let (starts_at, ends_at) = season_bounds(now);
        Self {
            id: season_id(starts_at),
            starts_at,
            ends_at,
        }
    }

    pub fn has_ended(&self, now: DateTime<Utc>) -> bool {
        now >= self.ends_at
    }

    pub fn seconds_remaining(&self, now: DateTime<Utc>) -> i64 {
        (self.ends_at - now).num_seconds().max(0)
    }
}

/// Monday 00:00 UTC at or before `now`, and the Monday after it.
pub fn season_bounds(now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    let date = now.date_naive();
    let monday = date - Duration::days(i64::from(date.weekday().num_days_from_monday()));
    let start = Utc.from_utc_datetime(&monday.and_time(chrono::NaiveTime::MIN));
    (start, start + Duration::days(7))
}

pub fn season_id(at: DateTime<Utc>) -> String {
    let week = at.iso_week();
    format!("week_{}_{:02}", week.year(), week.week())
}

// ── Settlement ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TierMovement {
    Promoted,
    Stayed,
    Relegated,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SeasonEndResult {
    pub season_id:     String,
    pub league_id:     LeagueId,
    pub final_rank:    usize,
    pub weekly_score:  Tokens,
    pub movement:      TierMovement,
    pub new_league_id: LeagueId,
    pub bonus:         Tokens,
    pub badge:         Option<String>,
    pub special:       Option<String>,
}

/// Settle the stored season if it has ended. Returns None while it runs.
///
/// The final rank comes from the cohort as it stood at the season end.
pub fn settle_if_due(
    profile: &mut PlayerProfile,
    config: &GameConfig,
    seed: u64,
    now: DateTime<Utc>,
) -> CoreResult<Option<SeasonEndResult>> {
    let stored = profile.league.season.clone();
    if !stored.has_ended(now) {
        return Ok(None);
    }

    let tier = config
        .league(&profile.league.league_id)
        .ok_or_else(|| CoreError::UnknownLeague {
            id: profile.league.league_id.clone(),
        })?;

    let standings = compute_cohort(
        &CohortPlayer::from(&*profile),
        tier,
        &stored,
        seed,
        stored.ends_at,
    );
    let rank = standings.user_rank;

    let (movement, new_tier) = match standings.zone {
        Zone::Promotion => match league::next_tier(&config.leagues, &tier.id) {
            Some(next) => (TierMovement::Promoted, next),
            None => (TierMovement::Stayed, tier),
        },
        Zone::Danger => match league::previous_tier(&config.leagues, &tier.id) {
            Some(prev) => (TierMovement::Relegated, prev),
            None => (TierMovement::Stayed, tier),
        },
        Zone::Safe => (TierMovement::Stayed, tier),
    };

    let reward = tier.reward_for_rank(rank);
    let bonus = reward.map(|r| r.bonus).unwrap_or(0);
    let badge = reward.and_then(|r| r.badge.clone());
    let special = reward.and_then(|r| r.special.clone());

    let result = SeasonEndResult {
        season_id:     stored.id.clone(),
        league_id:     tier.id.clone(),
        final_rank:    rank,
        weekly_score:  profile.weekly_score,
        movement,
        new_league_id: new_tier.id.clone(),
        bonus,
        badge:         badge.clone(),
        special,
    };

    let description = format!("{} season reward (rank #{rank})", tier.name);
    profile.earn(bonus, "season", &description, config, now)?;
    if let Some(badge) = badge {
        profile.badges.insert(badge);
    }
    profile.weekly_score = 0;
    profile.league.league_id = new_tier.id.clone();
    profile.league.season = Season::containing(now);

    log::debug!(
        "[season] {} settled {} in {}: rank {} -> {:?} to {}",
        profile.id,
        result.season_id,
        result.league_id,
        rank,
        movement,
        result.new_league_id
    );

    Ok(Some(result))
}
