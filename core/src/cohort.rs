//! Synthetic league cohorts.
//!
//! A cohort is the player plus `cohort_size - 1` generated peers. It is
//! recomputed on every read and never persisted. Peers are drawn from a
//! CohortRng, so the same player, seed and season always produce the
//! same standings.
//!
//! Peer weekly score = tier entry threshold + (cohort_size - i) * 50 + [0, 200).

use crate::{
    config::LeagueTier,
    league::Zone,
    name_generator::NameGenerator,
    profile::PlayerProfile,
    rng::CohortRng,
    season::Season,
    types::{PlayerId, Tokens},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const PEER_STEP: Tokens = 50;
const PEER_JITTER: u64 = 200;
const TOTAL_JITTER: u64 = 1_000;
const MAX_PEER_STREAK: u64 = 14;

/// What the cohort needs to know about the real player.
#[derive(Debug, Clone, PartialEq)]
pub struct CohortPlayer {
    pub id:           PlayerId,
    pub display_name: String,
    pub weekly_score: Tokens,
    pub total_score:  Tokens,
    pub streak:       u32,
}

impl From<&PlayerProfile> for CohortPlayer {
    fn from(profile: &PlayerProfile) -> Self {
        Self {
            id:           profile.id.clone(),
            display_name: profile.display_name.clone().unwrap_or_else(|| "You".to_string()),
            weekly_score: profile.weekly_score,
            total_score:  profile.experience,
            streak:       profile.current_streak,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CohortEntry {
    pub player_id:       String,
    pub display_name:    String,
    pub country:         String,
    pub weekly_score:    Tokens,
    pub total_score:     Tokens,
    pub streak:          u32,
    pub rank:            usize,
    pub is_current_user: bool,
}

/// The nearest rival above or below the player.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Rival {
    pub player_id:    String,
    pub display_name: String,
    pub weekly_score: Tokens,
    /// Score needed to overtake (above) or the lead held (below).
    pub gap:          Tokens,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Standings {
    pub league_id:             String,
    pub league_name:           String,
    pub season:                Season,
    pub seconds_remaining:     i64,
    pub entries:               Vec<CohortEntry>,
    pub user_rank:             usize,
    pub zone:                  Zone,
    pub to_pass:               Option<Rival>,
    pub chasing:               Option<Rival>,
    /// Weekly score held by the last promotion rank.
    pub promotion_threshold:   Option<Tokens>,
    /// Weekly score held by the last safe rank. None when nobody relegates.
    pub relegation_threshold:  Option<Tokens>,
}

impl Standings {
    pub fn current_user(&self) -> Option<&CohortEntry> {
        self.entries.iter().find(|e| e.is_current_user)
    }
}

/// Build the standings for `player` in `tier` during `season`.
pub fn compute_cohort(
    player: &CohortPlayer,
    tier: &LeagueTier,
    season: &Season,
    seed: u64,
    now: DateTime<Utc>,
) -> Standings {
    let mut rng = CohortRng::new(&player.id, seed, &season.id);
    let peer_count = tier.cohort_size.saturating_sub(1);

    let mut peers: Vec<CohortEntry> = (0..peer_count)
        .map(|i| {
            let weekly = tier.min_score
                + (tier.cohort_size - i) as Tokens * PEER_STEP
                + rng.next_u64_below(PEER_JITTER) as Tokens;
            CohortEntry {
                player_id:       format!("peer_{:02}", i + 1),
                display_name:    NameGenerator::generate_handle(&mut rng),
                country:         NameGenerator::generate_country(&mut rng).to_string(),
                weekly_score:    weekly,
                total_score:     weekly * 3 + rng.next_u64_below(TOTAL_JITTER) as Tokens,
                streak:          rng.next_u64_below(MAX_PEER_STREAK) as u32,
                rank:            0,
                is_current_user: false,
            }
        })
        .collect();

    peers.sort_by(|a, b| {
        b.weekly_score
            .cmp(&a.weekly_score)
            .then_with(|| a.player_id.cmp(&b.player_id))
    });

    // Ties favour the player: only strictly higher peers rank above.
    let position = peers
        .iter()
        .take_while(|p| p.weekly_score > player.weekly_score)
        .count();

    let you = CohortEntry {
        player_id:       player.id.clone(),
        display_name:    player.display_name.clone(),
        country:         String::new(),
        weekly_score:    player.weekly_score,
        total_score:     player.total_score,
        streak:          player.streak,
        rank:            0,
        is_current_user: true,
    };

    let mut entries = peers;
    entries.insert(position, you);
    for (i, entry) in entries.iter_mut().enumerate() {
        entry.rank = i + 1;
    }

    let user_rank = position + 1;
    let to_pass = position.checked_sub(1).map(|i| {
        let above = &entries[i];
        Rival {
            player_id:    above.player_id.clone(),
            display_name: above.display_name.clone(),
            weekly_score: above.weekly_score,
            gap:          above.weekly_score - player.weekly_score + 1,
        }
    });
    let chasing = entries.get(position + 1).map(|below| Rival {
        player_id:    below.player_id.clone(),
        display_name: below.display_name.clone(),
        weekly_score: below.weekly_score,
        gap:          player.weekly_score - below.weekly_score,
    });

    let score_at = |rank: usize| {
        rank.checked_sub(1)
            .and_then(|i| entries.get(i))
            .map(|e| e.weekly_score)
    };
    let promotion_threshold = score_at(tier.promotion_slots);
    let relegation_threshold = if tier.relegation_slots > 0 {
        score_at(tier.cohort_size - tier.relegation_slots)
    } else {
        None
    };

    Standings {
        league_id:            tier.id.clone(),
        league_name:          tier.name.clone(),
        season:               season.clone(),
        seconds_remaining:    season.seconds_remaining(now),
        zone:                 Zone::for_rank(tier, user_rank),
        user_rank,
        to_pass,
        chasing,
        promotion_threshold,
        relegation_threshold,
        entries,
    }
}
