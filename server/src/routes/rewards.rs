//! Reward tracker, onboarding and reward summary endpoints.
//!
//! The tracker itself is pure. The client may hold the profile and send it
//! with each event; when a datastore is configured the server also keeps
//! the latest snapshot per player and can apply events to it by id.

use super::blocking;
use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
    validation::sanitize_text,
};
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    Json,
};
use chrono::{DateTime, Utc};
use minifi_core::{
    badges::count_by_category,
    event::{EventKind, GameplayEvent},
    season::{settle_if_due, SeasonEndResult},
    types::Tokens,
    ApplyStatus, CoreError, PlayerProfile, RewardTracker,
};
use serde::Deserialize;
use serde_json::{json, Value};

const WELCOME_BONUS: Tokens = 100;
const MAX_ADVENTURE_NAME_LEN: usize = 40;
const RECENT_TRANSACTIONS: usize = 20;

/// Close out the profile's season if `now` is past its end.
pub(super) fn settle(
    state: &AppState,
    profile: &mut PlayerProfile,
    now: DateTime<Utc>,
) -> ApiResult<Option<SeasonEndResult>> {
    settle_if_due(profile, &state.game, state.league_seed, now).map_err(|e| match e {
        CoreError::UnknownLeague { .. } => ApiError::bad_request("Unknown league"),
        other => ApiError::bad_request(other.to_string()),
    })
}

/// Store the snapshot when a datastore is configured. Returns whether it was stored.
pub(super) async fn persist(state: &AppState, profile: &PlayerProfile) -> ApiResult<bool> {
    let Some(store) = state.store.as_ref() else {
        return Ok(false);
    };
    let snapshot = profile.clone();
    blocking(store, "Could not save progress", move |s| s.save_profile(&snapshot)).await?;
    Ok(true)
}

pub(super) async fn load(state: &AppState, player_id: &str) -> ApiResult<Option<PlayerProfile>> {
    let Some(store) = state.store.as_ref() else {
        return Ok(None);
    };
    let id = player_id.to_string();
    blocking(store, "Could not load progress", move |s| s.load_profile(&id)).await
}

#[derive(Debug, Deserialize)]
pub struct ApplyRequest {
    /// The client's copy. When absent the stored snapshot for `playerId` is used.
    #[serde(default)]
    pub profile:   Option<PlayerProfile>,
    #[serde(default, rename = "playerId")]
    pub player_id: Option<String>,
    pub event:     GameplayEvent,
    /// Override for the event time. Defaults to the server clock.
    #[serde(default)]
    pub now:       Option<DateTime<Utc>>,
}

pub async fn apply(
    State(state): State<AppState>,
    body: Result<Json<ApplyRequest>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let Json(ApplyRequest { profile, player_id, event, now }) = body?;
    let now = now.unwrap_or_else(Utc::now);

    let mut profile = match (profile, player_id.filter(|id| !id.trim().is_empty())) {
        (Some(profile), _) => profile,
        (None, Some(id)) => {
            if !state.datastore_configured() {
                return Err(ApiError::NotConfigured("Could not load progress"));
            }
            load(&state, &id)
                .await?
                .ok_or_else(|| ApiError::bad_request("Profile not found"))?
        }
        (None, None) => return Err(ApiError::bad_request("Profile or playerId is required")),
    };

    let season_end = settle(&state, &mut profile, now)?;

    let outcome = RewardTracker::new(&state.game).apply(&profile, &event, now);
    // A settled season changes the profile even when the event does not apply.
    let persisted = if outcome.status == ApplyStatus::Applied || season_end.is_some() {
        persist(&state, &outcome.profile).await?
    } else {
        false
    };
    let message = match outcome.status {
        ApplyStatus::Applied => "Event applied",
        ApplyStatus::Ignored => "Event ignored",
        ApplyStatus::Duplicate => "Event already applied",
        ApplyStatus::InsufficientBalance => "Insufficient balance",
    };

    Ok(Json(json!({
        "success": outcome.status == ApplyStatus::Applied,
        "message": message,
        "status": outcome.status,
        "profile": outcome.profile,
        "unlocked": outcome.unlocked,
        "earned": outcome.earned,
        "seasonEnded": season_end,
        "persisted": persisted,
    })))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnboardingRequest {
    pub player_id:       Option<String>,
    pub selected_coach:  Option<String>,
    pub adventure_name:  Option<String>,
    #[serde(default)]
    pub terms_accepted:  bool,
}

pub async fn onboard(
    State(state): State<AppState>,
    body: Result<Json<OnboardingRequest>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let Json(request) = body?;
    let coach = request
        .selected_coach
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty());
    let (Some(coach), true) = (coach, request.terms_accepted) else {
        return Err(ApiError::bad_request("Missing required fields"));
    };

    let player_id = request
        .player_id
        .filter(|id| !id.trim().is_empty())
        .unwrap_or_else(|| format!("player_{}", uuid::Uuid::new_v4().simple()));
    let now = Utc::now();

    let mut profile = PlayerProfile::onboard(player_id, Some(coach.to_string()), &state.game, now);
    if let Some(name) = request.adventure_name.as_deref() {
        let name = sanitize_text(name, MAX_ADVENTURE_NAME_LEN);
        if !name.is_empty() {
            profile = profile.with_display_name(name);
        }
    }

    let welcome = GameplayEvent::new(EventKind::WelcomeBonus { amount: WELCOME_BONUS })
        .with_id(format!("welcome_{}", profile.id));
    let outcome = RewardTracker::new(&state.game).apply(&profile, &welcome, now);
    log::info!("[onboarding] {} joined with coach {coach}", outcome.profile.id);
    let persisted = persist(&state, &outcome.profile).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Welcome to Mini.Fi!",
        "profile": outcome.profile,
        "welcomeBonus": outcome.earned,
        "unlocked": outcome.unlocked,
        "persisted": persisted,
    })))
}

#[derive(Debug, Default, Deserialize)]
pub struct SummaryQuery {
    player_id: Option<String>,
}

pub async fn summary(
    State(state): State<AppState>,
    query: Result<Query<SummaryQuery>, QueryRejection>,
) -> ApiResult<Json<Value>> {
    let Query(query) = query?;
    let Some(player_id) = query.player_id.filter(|id| !id.trim().is_empty()) else {
        return Err(ApiError::bad_request("player_id is required"));
    };

    let profile = load(&state, &player_id).await?;
    let data = match &profile {
        Some(p) => {
            let recent: Vec<_> = p.ledger.recent.iter().take(RECENT_TRANSACTIONS).collect();
            json!({
                "profile": p,
                "badges": p.badges,
                "recentTransactions": recent,
                "summary": {
                    "totalIII": p.balance(),
                    "weeklyIII": p.weekly_score,
                    "stakedIII": p.stats.total_staked,
                    "totalBadges": p.badges.len(),
                    "badgesByCategory": count_by_category(p),
                },
            })
        }
        None => json!({
            "profile": null,
            "badges": [],
            "recentTransactions": [],
            "summary": {
                "totalIII": 0,
                "weeklyIII": 0,
                "stakedIII": 0,
                "totalBadges": 0,
                "badgesByCategory": {},
            },
        }),
    };

    Ok(Json(json!({
        "success": true,
        "data": data,
        "datastoreConfigured": state.datastore_configured(),
    })))
}
