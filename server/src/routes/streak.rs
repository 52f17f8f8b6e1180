//! Daily streak claims against the stored profile.
//!
//! One claim per UTC day. A claim the day after the previous one extends the
//! streak; a gap starts over at one. Players without a stored profile get one
//! created on their first claim.

use super::rewards::{load, persist, settle};
use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
};
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    Json,
};
use chrono::{DateTime, Utc};
use minifi_core::{event::EventKind, GameplayEvent, PlayerProfile, RewardTracker};
use serde::Deserialize;
use serde_json::{json, Value};

#[derive(Debug, Default, Deserialize)]
pub struct StatusQuery {
    player_id: Option<String>,
}

pub async fn status(
    State(state): State<AppState>,
    query: Result<Query<StatusQuery>, QueryRejection>,
) -> ApiResult<Json<Value>> {
    let Query(query) = query?;
    let profile = match query.player_id.filter(|id| !id.trim().is_empty()) {
        Some(id) => load(&state, &id).await?,
        None => None,
    };

    let today = Utc::now().date_naive();
    let data = match &profile {
        Some(p) => json!({
            "currentStreak": p.current_streak,
            "longestStreak": p.longest_streak,
            "todayClaimed": p.next_streak_days(today).is_none(),
            "totalXP": p.experience,
            "lastClaimDate": p.stats.last_play_date,
            "playerLevel": p.level,
        }),
        None => json!({
            "currentStreak": 0,
            "longestStreak": 0,
            "todayClaimed": false,
            "totalXP": 0,
            "lastClaimDate": null,
            "playerLevel": 1,
        }),
    };

    Ok(Json(json!({
        "success": true,
        "data": data,
        "datastoreConfigured": state.datastore_configured(),
    })))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimRequest {
    pub player_id: Option<String>,
    /// Override for the claim time. Defaults to the server clock.
    #[serde(default)]
    pub now:       Option<DateTime<Utc>>,
}

pub async fn claim(
    State(state): State<AppState>,
    body: Result<Json<ClaimRequest>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let Json(request) = body?;
    let Some(player_id) = request.player_id.filter(|id| !id.trim().is_empty()) else {
        return Err(ApiError::bad_request("playerId is required to claim a streak"));
    };
    if !state.datastore_configured() {
        return Err(ApiError::NotConfigured("Failed to claim streak"));
    }
    let now = request.now.unwrap_or_else(Utc::now);

    let (mut profile, created) = match load(&state, &player_id).await? {
        Some(profile) => (profile, false),
        None => (PlayerProfile::onboard(player_id.as_str(), None, &state.game, now), true),
    };
    let season_end = settle(&state, &mut profile, now)?;

    let today = now.date_naive();
    let Some(days) = profile.next_streak_days(today) else {
        if season_end.is_some() {
            persist(&state, &profile).await?;
        }
        return Ok(Json(json!({
            "success": true,
            "data": {
                "currentStreak": profile.current_streak,
                "xpEarned": 0,
                "totalXP": profile.experience,
                "alreadyClaimed": true,
            },
            "seasonEnded": season_end,
        })));
    };

    let event = GameplayEvent::new(EventKind::StreakClaimed { days })
        .with_id(format!("streak_{player_id}_{today}"));
    let outcome = RewardTracker::new(&state.game).apply(&profile, &event, now);
    persist(&state, &outcome.profile).await?;
    log::info!("[streak] {player_id} claimed day {days} (+{})", outcome.earned);

    Ok(Json(json!({
        "success": true,
        "data": {
            "currentStreak": outcome.profile.current_streak,
            "xpEarned": outcome.earned,
            "totalXP": outcome.profile.experience,
            "alreadyClaimed": false,
            "profileCreated": created,
            "unlocked": outcome.unlocked,
        },
        "seasonEnded": season_end,
    })))
}
