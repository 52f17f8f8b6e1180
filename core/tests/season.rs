//! Season settlement tests.
//!
//! Settlement is lazy: nothing happens until a read at or after the
//! stored season end. Tests cover promotion, relegation, the tier caps,
//! season rewards, skipped weeks and unknown leagues.

use chrono::{DateTime, Duration, TimeZone, Utc};
use minifi_core::{
    season::{settle_if_due, Season, TierMovement},
    CoreError, GameConfig, PlayerProfile,
};

const SEED: u64 = 0x5EA5_0001;

fn season_start() -> DateTime<Utc> {
    // Wednesday of ISO week 10, 2026.
    Utc.with_ymd_and_hms(2026, 3, 4, 10, 0, 0).unwrap()
}

fn after_season() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 9, 8, 0, 0).unwrap()
}

fn profile_in(config: &GameConfig, league: &str, weekly: i64) -> PlayerProfile {
    let mut p = PlayerProfile::onboard("player-1", None, config, season_start());
    p.league.league_id = league.to_string();
    p.weekly_score = weekly;
    p
}

#[test]
fn nothing_happens_while_the_season_runs() {
    let config = GameConfig::default();
    let mut p = profile_in(&config, "silver", 900);
    let before = p.clone();
    let result = settle_if_due(&mut p, &config, SEED, season_start() + Duration::days(2))
        .expect("settle");
    assert!(result.is_none());
    assert_eq!(p, before);
}

#[test]
fn winner_is_promoted_and_rewarded() {
    let config = GameConfig::default();
    let mut p = profile_in(&config, "bronze", 5_000);
    let result = settle_if_due(&mut p, &config, SEED, after_season())
        .expect("settle")
        .expect("season was due");

    assert_eq!(result.final_rank, 1);
    assert_eq!(result.movement, TierMovement::Promoted);
    assert_eq!(result.new_league_id, "silver");
    assert_eq!(result.bonus, 100);
    assert_eq!(result.badge.as_deref(), Some("bronze_champion"));

    assert_eq!(p.league.league_id, "silver");
    assert_eq!(p.weekly_score, 0, "weekly score resets");
    assert_eq!(p.experience, 100);
    assert!(p.has_badge("bronze_champion"));
    assert_eq!(p.league.season, Season::containing(after_season()));
    assert_eq!(p.league.season.id, "week_2026_11");
}

#[test]
fn last_place_is_relegated() {
    let config = GameConfig::default();
    let mut p = profile_in(&config, "gold", 0);
    let result = settle_if_due(&mut p, &config, SEED, after_season())
        .expect("settle")
        .expect("season was due");

    assert_eq!(result.final_rank, 30);
    assert_eq!(result.movement, TierMovement::Relegated);
    assert_eq!(p.league.league_id, "silver");
    assert_eq!(result.bonus, 0);
}

#[test]
fn tiers_are_capped_at_both_ends() {
    let config = GameConfig::default();

    let mut top = profile_in(&config, "diamond", 1_000_000);
    let result = settle_if_due(&mut top, &config, SEED, after_season())
        .expect("settle")
        .expect("season was due");
    assert_eq!(result.movement, TierMovement::Stayed);
    assert_eq!(top.league.league_id, "diamond");
    assert_eq!(result.special.as_deref(), Some("hall_of_fame"));

    let mut bottom = profile_in(&config, "bronze", 0);
    let result = settle_if_due(&mut bottom, &config, SEED, after_season())
        .expect("settle")
        .expect("season was due");
    assert_eq!(result.movement, TierMovement::Stayed);
    assert_eq!(bottom.league.league_id, "bronze");
}

#[test]
fn missed_weeks_are_skipped() {
    let config = GameConfig::default();
    let mut p = profile_in(&config, "silver", 900);
    let much_later = season_start() + Duration::weeks(3);

    let first = settle_if_due(&mut p, &config, SEED, much_later).expect("settle");
    assert!(first.is_some());
    assert_eq!(p.league.season, Season::containing(much_later));

    let second = settle_if_due(&mut p, &config, SEED, much_later).expect("settle");
    assert!(second.is_none(), "one settlement per stored season");
}

#[test]
fn settling_is_deterministic() {
    let config = GameConfig::default();
    let mut a = profile_in(&config, "silver", 1_200);
    let mut b = profile_in(&config, "silver", 1_200);
    let ra = settle_if_due(&mut a, &config, SEED, after_season()).expect("settle");
    let rb = settle_if_due(&mut b, &config, SEED, after_season()).expect("settle");
    assert_eq!(ra, rb);
    assert_eq!(a, b);
}

#[test]
fn unknown_league_is_an_error() {
    let config = GameConfig::default();
    let mut p = profile_in(&config, "obsidian", 100);
    let err = settle_if_due(&mut p, &config, SEED, after_season()).unwrap_err();
    assert!(matches!(err, CoreError::UnknownLeague { ref id } if id == "obsidian"));
}
