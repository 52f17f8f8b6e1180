use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
};
use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};
use chrono::Utc;
use minifi_core::{
    cohort::{compute_cohort, CohortPlayer},
    league,
    season::Season,
    types::Tokens,
};
use serde::Deserialize;
use serde_json::{json, Value};

#[derive(Debug, Default, Deserialize)]
pub struct StandingsQuery {
    player_id:    Option<String>,
    display_name: Option<String>,
    #[serde(default)]
    weekly_score: Tokens,
    #[serde(default)]
    total_score:  Tokens,
    #[serde(default)]
    streak:       u32,
    /// Tier the player sits in. Placed by total score when absent.
    league:       Option<String>,
    seed:         Option<u64>,
}

pub async fn standings(
    State(state): State<AppState>,
    query: Result<Query<StandingsQuery>, QueryRejection>,
) -> ApiResult<Json<Value>> {
    let Query(query) = query?;
    let Some(player_id) = query.player_id.filter(|id| !id.trim().is_empty()) else {
        return Err(ApiError::bad_request("player_id is required"));
    };

    let tiers = &state.game.leagues;
    let tier = match query.league.as_deref() {
        Some(id) => state
            .game
            .league(id)
            .ok_or_else(|| ApiError::bad_request("Unknown league"))?,
        None => league::assign_tier(tiers, query.total_score as f64),
    };

    let player = CohortPlayer {
        id:           player_id,
        display_name: query.display_name.unwrap_or_else(|| "You".to_string()),
        weekly_score: query.weekly_score.max(0),
        total_score:  query.total_score.max(0),
        streak:       query.streak,
    };
    let now = Utc::now();
    let season = Season::containing(now);
    let seed = query.seed.unwrap_or(state.league_seed);
    let standings = compute_cohort(&player, tier, &season, seed, now);

    Ok(Json(json!({
        "success": true,
        "standings": standings,
        "scoreToNextTier": league::score_to_next_tier(tiers, player.total_score),
    })))
}
