//! progress-runner: headless replay of gameplay events through the reward
//! tracker, settling league seasons along the way.
//!
//! Usage:
//!   progress-runner --seed 12345 --weeks 4 --db run.db
//!   progress-runner --events session.jsonl --player p-42 --db run.db
//!
//! Each line of an events file is `{"at": <RFC3339>?, "event": {...}}`.
//! Lines without `at` land one hour after the previous event.

use anyhow::{anyhow, Result};
use chrono::{DateTime, Duration, TimeZone, Utc};
use minifi_core::{
    cohort::{compute_cohort, CohortPlayer},
    event::MissionOutcome,
    ledger::format_tokens,
    rng::CohortRng,
    season::{settle_if_due, SeasonEndResult},
    ApplyStatus, Datastore, EventKind, GameConfig, GameplayEvent, PlayerProfile, RewardTracker,
    SqliteStore,
};
use std::env;
use std::fs::File;
use std::io::{BufRead, BufReader};

const RISK_LEVELS: &[&str] = &["low", "medium", "high", "extreme"];
const ASSET_CLASSES: &[&str] = &["stocks", "bonds", "crypto", "etf", "commodities", "real_estate"];
const COACHES: &[&str] = &["sage", "nova", "blaze", "atlas"];
const MISSIONS: &[&str] = &[
    "dotcom-2000",
    "crash-2008",
    "covid-2020",
    "gamestop-2021",
    "crypto-winter-2022",
    "ai-boom-2023",
];

#[derive(serde::Deserialize)]
struct ReplayLine {
    #[serde(default)]
    at: Option<DateTime<Utc>>,
    event: GameplayEvent,
}

#[derive(Default)]
struct RunTotals {
    applied:   u32,
    skipped:   u32,
    seasons:   Vec<SeasonEndResult>,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let seed = parse_arg(&args, "--seed", 42u64);
    let weeks = parse_arg(&args, "--weeks", 4i64);
    let db = str_arg(&args, "--db").unwrap_or(":memory:");
    let data_dir = str_arg(&args, "--data-dir").unwrap_or("./data");
    let player = str_arg(&args, "--player").unwrap_or("runner");
    let events_path = str_arg(&args, "--events");

    println!("Mini.Fi progress-runner");
    println!("  seed:      {seed}");
    println!("  player:    {player}");
    println!("  db:        {db}");
    println!("  data_dir:  {data_dir}");
    match events_path {
        Some(path) => println!("  events:    {path}"),
        None => println!("  weeks:     {weeks} (generated)"),
    }
    println!();

    let config = GameConfig::load(data_dir)?;
    let store = SqliteStore::open_migrated(db)?;

    let start = Utc
        .with_ymd_and_hms(2026, 1, 5, 9, 0, 0)
        .single()
        .ok_or_else(|| anyhow!("invalid start date"))?;
    let mut profile = match store.load_profile(player)? {
        Some(existing) => {
            log::info!("resuming profile {player}");
            existing
        }
        None => PlayerProfile::onboard(player, Some("sage".to_string()), &config, start),
    };

    let timeline = match events_path {
        Some(path) => read_events(path, start)?,
        None => generate_events(seed, weeks, start),
    };

    let tracker = RewardTracker::new(&config);
    let mut totals = RunTotals::default();
    for (at, event) in &timeline {
        if let Some(result) = settle_if_due(&mut profile, &config, seed, *at)? {
            totals.seasons.push(result);
        }
        let outcome = tracker.apply(&profile, event, *at);
        match outcome.status {
            ApplyStatus::Applied => totals.applied += 1,
            status => {
                log::debug!("{} -> {status:?}", event.kind.name());
                totals.skipped += 1;
            }
        }
        profile = outcome.profile;
    }

    let finished_at = timeline.last().map(|(at, _)| *at).unwrap_or(start);
    store.save_profile(&profile)?;
    println!("  profiles stored: {}", store.profile_count()?);
    println!();
    print_summary(&profile, &config, &totals, seed, finished_at)
}

fn read_events(path: &str, start: DateTime<Utc>) -> Result<Vec<(DateTime<Utc>, GameplayEvent)>> {
    let file = File::open(path).map_err(|e| anyhow!("Cannot read {path}: {e}"))?;
    let mut clock = start;
    let mut timeline = Vec::new();
    for (n, line) in BufReader::new(file).lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let entry: ReplayLine = serde_json::from_str(&line)
            .map_err(|e| anyhow!("{path}:{}: {e}", n + 1))?;
        clock = entry.at.unwrap_or(clock + Duration::hours(1));
        timeline.push((clock, entry.event));
    }
    Ok(timeline)
}

/// A plausible daily routine: claim the streak, take a quiz, make a trade,
/// and every other day play a historical mission.
fn generate_events(seed: u64, weeks: i64, start: DateTime<Utc>) -> Vec<(DateTime<Utc>, GameplayEvent)> {
    let mut rng = CohortRng::from_seed(seed);
    let mut timeline = vec![(
        start,
        GameplayEvent::new(EventKind::WelcomeBonus { amount: 100 }).with_id("welcome"),
    )];

    for day in 0..weeks * 7 {
        let at = start + Duration::days(day);
        let mut push = |offset_min: i64, kind: EventKind| {
            let id = format!("gen-{day}-{offset_min}");
            timeline.push((at + Duration::minutes(offset_min), GameplayEvent::new(kind).with_id(id)));
        };

        push(0, EventKind::StreakClaimed { days: day as u32 + 1 });

        let total = 5;
        let correct = rng.next_u64_below(total + 1) as u32;
        push(10, EventKind::QuizCompleted { correct, total: total as u32 });

        let risk = rng.pick(RISK_LEVELS).copied().unwrap_or("low");
        let asset = rng.pick(ASSET_CLASSES).copied().unwrap_or("stocks");
        push(20, EventKind::InvestmentMade {
            risk_level:  risk.to_string(),
            asset_class: asset.to_string(),
            was_loss:    rng.next_f64() < 0.3,
        });

        if day % 2 == 0 {
            let mission = rng.pick(MISSIONS).copied().unwrap_or("dotcom-2000");
            let outcome = match rng.next_u64_below(3) {
                0 => MissionOutcome::Loss,
                1 => MissionOutcome::Profit,
                _ => MissionOutcome::BreakEven,
            };
            push(30, EventKind::MissionCompleted {
                mission_id:  mission.to_string(),
                base_reward: 100,
                outcome,
            });
        }

        if day % 5 == 0 {
            let coach = rng.pick(COACHES).copied().unwrap_or("sage");
            push(40, EventKind::CoachAdviceViewed { coach_id: coach.to_string() });
        }
    }
    timeline
}

fn print_summary(
    profile: &PlayerProfile,
    config: &GameConfig,
    totals: &RunTotals,
    seed: u64,
    now: DateTime<Utc>,
) -> Result<()> {
    println!("=== RUN SUMMARY ===");
    println!("  events applied: {}", totals.applied);
    println!("  events skipped: {}", totals.skipped);
    println!("  level:          {}", profile.level);
    println!("  experience:     {}", format_tokens(profile.experience));
    println!("  balance:        {}", format_tokens(profile.balance()));
    println!("  streak:         {} (best {})", profile.current_streak, profile.longest_streak);
    println!("  badges:         {}", profile.badges.len());
    println!("  league:         {}", profile.league.league_id);

    println!();
    println!("=== SEASONS ===");
    if totals.seasons.is_empty() {
        println!("  (No seasons completed yet)");
    }
    for s in &totals.seasons {
        println!(
            "  {} | {} rank {} | {:?} -> {} | +{}",
            s.season_id,
            s.league_id,
            s.final_rank,
            s.movement,
            s.new_league_id,
            format_tokens(s.bonus)
        );
    }

    let tier = config
        .league(&profile.league.league_id)
        .ok_or_else(|| anyhow!("unknown league {}", profile.league.league_id))?;
    let standings = compute_cohort(
        &CohortPlayer::from(profile),
        tier,
        &profile.league.season,
        seed,
        now,
    );
    println!();
    println!("=== CURRENT STANDINGS ({}) ===", standings.season.id);
    println!(
        "  rank {} of {} | zone {} | weekly {}",
        standings.user_rank,
        standings.entries.len(),
        standings.zone.as_str(),
        format_tokens(profile.weekly_score)
    );
    if let Some(rival) = &standings.to_pass {
        println!("  next up: {} (+{} to pass)", rival.display_name, rival.gap);
    }
    Ok(())
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}

fn str_arg<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}
